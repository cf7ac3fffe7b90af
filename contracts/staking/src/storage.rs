use common::ttl::{
    INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL, PERSISTENT_RENEWAL_THRESHOLD,
    PERSISTENT_TARGET_TTL,
};
use soroban_sdk::{
    contracttype, log, panic_with_error, Address, ConversionError, Env, TryFromVal, Val, Vec,
};

use crate::error::ContractError;

/// Layout written by `initialize` and by `migrate`.
pub const SCHEMA_VERSION: u32 = 2;

#[derive(Clone, Copy)]
#[repr(u32)]
pub enum DataKey {
    Config = 0,
    TotalStaked = 1,
    StakerCount = 2,
    NextPositionId = 3,
    SchemaVersion = 4,
    Initialized = 5,
}

impl TryFromVal<Env, DataKey> for Val {
    type Error = ConversionError;

    fn try_from_val(_env: &Env, v: &DataKey) -> Result<Self, Self::Error> {
        Ok((*v as u32).into())
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HolderKey {
    Account(Address),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Token that is staked and paid out as reward
    pub token: Address,
    pub annual_rate_percent: u32,
    pub start_date: u64,
    /// Staking closes and accrual freezes at this timestamp
    pub end_date: u64,
    /// Cumulative stake cap per contract year, see `schedule::cap_for`
    pub pool_limits: Vec<i128>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakingPosition {
    /// Never reused, survives removal of other positions
    pub id: u64,
    pub amount: i128,
    /// Creation time
    pub timestamp: u64,
    /// Rewards accrue from here, moved forward by claims
    pub reward_checkpoint: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HolderAccount {
    /// Insertion ordered
    pub positions: Vec<StakingPosition>,
    /// Sum of all position amounts
    pub staking_total: i128,
}

impl HolderAccount {
    pub fn new(env: &Env) -> Self {
        HolderAccount {
            positions: Vec::new(env),
            staking_total: 0,
        }
    }
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Initialized)
        .unwrap_or(false)
}

pub fn set_initialized(env: &Env) {
    env.storage().instance().set(&DataKey::Initialized, &true);
    env.storage().instance().set(&DataKey::SchemaVersion, &SCHEMA_VERSION);
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);
}

pub fn get_schema_version(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::SchemaVersion)
        .unwrap_or(legacy::SCHEMA_VERSION)
}

pub fn save_config(env: &Env, config: &Config) {
    env.storage().instance().set(&DataKey::Config, config);
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);
}

pub fn get_config(env: &Env) -> Config {
    let config = env
        .storage()
        .instance()
        .get(&DataKey::Config)
        .unwrap_or_else(|| {
            log!(env, "Staking: Config not set");
            panic_with_error!(env, ContractError::NotInitialized)
        });
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);

    config
}

/// Loads the account of `holder` for a state changing call. Positions stored
/// in the previous layout are converted and persisted here, which assigns
/// their ids.
pub fn get_account(env: &Env, holder: &Address) -> HolderAccount {
    if let Some(account) = stored_account(env, holder) {
        return account;
    }
    match legacy::take_positions(env, holder) {
        Some(positions) => {
            let first_id = utils::reserve_position_ids(env, positions.len().into());
            let account = legacy::convert_positions(env, positions, first_id);
            save_account(env, holder, &account);
            account
        }
        None => HolderAccount::new(env),
    }
}

/// Read-only counterpart of [`get_account`] for queries. Legacy positions are
/// converted in memory only, with the ids they would receive if converted
/// now. Nothing is written and no ids are consumed.
pub fn view_account(env: &Env, holder: &Address) -> HolderAccount {
    if let Some(account) = stored_account(env, holder) {
        return account;
    }
    match legacy::positions(env, holder) {
        Some(positions) => {
            legacy::convert_positions(env, positions, utils::peek_next_position_id(env))
        }
        None => HolderAccount::new(env),
    }
}

fn stored_account(env: &Env, holder: &Address) -> Option<HolderAccount> {
    let key = HolderKey::Account(holder.clone());
    let account = env.storage().persistent().get::<_, HolderAccount>(&key)?;
    env.storage().persistent().extend_ttl(
        &key,
        PERSISTENT_RENEWAL_THRESHOLD,
        PERSISTENT_TARGET_TTL,
    );
    Some(account)
}

pub fn save_account(env: &Env, holder: &Address, account: &HolderAccount) {
    let key = HolderKey::Account(holder.clone());
    if account.positions.is_empty() {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, account);
    env.storage().persistent().extend_ttl(
        &key,
        PERSISTENT_RENEWAL_THRESHOLD,
        PERSISTENT_TARGET_TTL,
    );
}

pub mod utils {
    use super::*;

    pub fn get_total_staked(env: &Env) -> i128 {
        env.storage()
            .instance()
            .get(&DataKey::TotalStaked)
            .unwrap_or(0)
    }

    pub fn increase_total_staked(env: &Env, amount: i128) -> Result<i128, ContractError> {
        let total = get_total_staked(env)
            .checked_add(amount)
            .ok_or(ContractError::ContractMathError)?;
        env.storage().instance().set(&DataKey::TotalStaked, &total);

        Ok(total)
    }

    pub fn decrease_total_staked(env: &Env, amount: i128) -> Result<i128, ContractError> {
        let total = get_total_staked(env)
            .checked_sub(amount)
            .filter(|total| *total >= 0)
            .ok_or(ContractError::ContractMathError)?;
        env.storage().instance().set(&DataKey::TotalStaked, &total);

        Ok(total)
    }

    pub fn get_staker_count(env: &Env) -> u32 {
        env.storage()
            .instance()
            .get(&DataKey::StakerCount)
            .unwrap_or(0)
    }

    pub fn increment_staker_count(env: &Env) -> Result<(), ContractError> {
        let count = get_staker_count(env)
            .checked_add(1)
            .ok_or(ContractError::ContractMathError)?;
        env.storage().instance().set(&DataKey::StakerCount, &count);
        Ok(())
    }

    pub fn decrement_staker_count(env: &Env) -> Result<(), ContractError> {
        let count = get_staker_count(env)
            .checked_sub(1)
            .ok_or(ContractError::ContractMathError)?;
        env.storage().instance().set(&DataKey::StakerCount, &count);
        Ok(())
    }

    pub fn peek_next_position_id(env: &Env) -> u64 {
        env.storage()
            .instance()
            .get(&DataKey::NextPositionId)
            .unwrap_or(0)
    }

    /// Hands out `count` consecutive position ids and returns the first.
    pub fn reserve_position_ids(env: &Env, count: u64) -> u64 {
        let id = peek_next_position_id(env);
        env.storage()
            .instance()
            .set(&DataKey::NextPositionId, &(id + count));

        id
    }

    pub fn next_position_id(env: &Env) -> u64 {
        reserve_position_ids(env, 1)
    }
}

/// The first deployed layout: no pool schedule, a single admin address and
/// positions without ids or reward checkpoints.
pub mod legacy {
    use super::*;

    pub const SCHEMA_VERSION: u32 = 1;

    #[contracttype]
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub enum LegacyKey {
        Config,
        Admin,
        Positions(Address),
    }

    #[contracttype]
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct LegacyConfig {
        pub token: Address,
        pub annual_rate_percent: u32,
        pub start_date: u64,
    }

    #[contracttype]
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct LegacyPosition {
        pub amount: i128,
        pub timestamp: u64,
    }

    pub fn take_config(env: &Env) -> Option<(LegacyConfig, Address)> {
        let storage = env.storage().instance();
        let config: LegacyConfig = storage.get(&LegacyKey::Config)?;
        let admin: Address = storage.get(&LegacyKey::Admin)?;
        storage.remove(&LegacyKey::Config);
        storage.remove(&LegacyKey::Admin);

        Some((config, admin))
    }

    pub fn positions(env: &Env, holder: &Address) -> Option<Vec<LegacyPosition>> {
        env.storage()
            .persistent()
            .get(&LegacyKey::Positions(holder.clone()))
    }

    pub fn take_positions(env: &Env, holder: &Address) -> Option<Vec<LegacyPosition>> {
        let positions = positions(env, holder)?;
        env.storage()
            .persistent()
            .remove(&LegacyKey::Positions(holder.clone()));

        Some(positions)
    }

    /// Numbers the converted positions from `first_id` in stored order.
    pub fn convert_positions(
        env: &Env,
        legacy: Vec<LegacyPosition>,
        first_id: u64,
    ) -> HolderAccount {
        let mut account = HolderAccount::new(env);
        for (id, position) in (first_id..).zip(legacy.iter()) {
            account.staking_total += position.amount;
            account.positions.push_back(StakingPosition {
                id,
                amount: position.amount,
                timestamp: position.timestamp,
                reward_checkpoint: position.timestamp,
            });
        }

        account
    }
}
