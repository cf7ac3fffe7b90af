use common::{
    access::{self, Role},
    escapable, pausable,
};
use soroban_sdk::{
    contract, contractimpl, contractmeta, log, token, Address, BytesN, Env, Vec,
};

use crate::{
    error::ContractError,
    ledger::{self, Payout},
    msg::{ConfigResponse, StakedResponse},
    rewards::{current_year, lifetime_reward_bound, rewards_per_second, SECONDS_PER_YEAR},
    schedule::{self, cap_for, default_pool_limits, DEFAULT_LIFETIME_YEARS},
    storage::{
        get_account, get_config, get_schema_version, is_initialized, legacy, save_config,
        set_initialized, view_account,
        utils::{get_staker_count, get_total_staked},
        Config, StakingPosition, SCHEMA_VERSION,
    },
};

// Metadata that is added on to the WASM custom section
contractmeta!(
    key = "Description",
    val = "Fixed rate token staking with yearly pool limits"
);

#[contract]
pub struct Staking;

pub trait StakingTrait {
    // `pool_limits[i]` caps the total staked during contract year i + 1.
    // Staking closes `lifetime_years` after initialization.
    fn initialize(
        env: Env,
        admin: Address,
        token: Address,
        annual_rate_percent: u32,
        escape_destination: Address,
        pool_limits: Vec<i128>,
        lifetime_years: u64,
    ) -> Result<(), ContractError>;

    // Opens a new position and returns its id
    fn stake(env: Env, sender: Address, amount: i128) -> Result<u64, ContractError>;

    // Closes every position of the sender, paying principal plus rewards
    fn unstake(env: Env, sender: Address) -> Result<i128, ContractError>;

    fn claim_rewards(env: Env, sender: Address) -> Result<i128, ContractError>;

    fn close_position(env: Env, sender: Address, index: u32) -> Result<i128, ContractError>;

    fn partial_close_position(
        env: Env,
        sender: Address,
        index: u32,
        amount: i128,
    ) -> Result<i128, ContractError>;

    fn close_position_by_id(env: Env, sender: Address, id: u64) -> Result<i128, ContractError>;

    fn partial_close_position_by_id(
        env: Env,
        sender: Address,
        id: u64,
        amount: i128,
    ) -> Result<i128, ContractError>;

    fn pause(env: Env, sender: Address) -> Result<(), ContractError>;

    fn resume(env: Env, sender: Address) -> Result<(), ContractError>;

    // Moves the whole token balance to the escape destination
    fn escape_hatch(env: Env, sender: Address) -> Result<i128, ContractError>;

    fn transfer_escape_capability(
        env: Env,
        sender: Address,
        new_holder: Address,
    ) -> Result<(), ContractError>;

    // Sends the whole token balance to the calling admin, only while paused
    fn withdraw_funds(env: Env, sender: Address) -> Result<i128, ContractError>;

    fn grant_role(
        env: Env,
        sender: Address,
        role: Role,
        account: Address,
    ) -> Result<(), ContractError>;

    fn revoke_role(
        env: Env,
        sender: Address,
        role: Role,
        account: Address,
    ) -> Result<(), ContractError>;

    fn upgrade(env: Env, sender: Address, new_wasm_hash: BytesN<32>)
        -> Result<(), ContractError>;

    fn migrate(env: Env, sender: Address) -> Result<(), ContractError>;

    // QUERIES

    fn query_config(env: Env) -> ConfigResponse;

    fn query_stake_limit(env: Env) -> i128;

    fn query_current_year(env: Env) -> u32;

    fn query_user_rewards(env: Env, address: Address) -> Result<i128, ContractError>;

    fn query_user_rewards_per_second(env: Env, address: Address) -> Result<i128, ContractError>;

    fn query_number_of_stakers(env: Env) -> u32;

    fn query_total_staked(env: Env) -> i128;

    fn query_user_staking_total(env: Env, address: Address) -> i128;

    fn query_user_position_count(env: Env, address: Address) -> u32;

    fn query_positions(env: Env, address: Address) -> StakedResponse;

    fn query_position(
        env: Env,
        address: Address,
        index: u32,
    ) -> Result<StakingPosition, ContractError>;

    fn query_paused(env: Env) -> bool;

    fn query_escape_destination(env: Env) -> Result<Address, ContractError>;

    fn query_escape_caller(env: Env) -> Option<Address>;

    fn has_role(env: Env, role: Role, address: Address) -> bool;

    fn query_schema_version(env: Env) -> u32;
}

#[contractimpl]
impl StakingTrait for Staking {
    fn initialize(
        env: Env,
        admin: Address,
        token: Address,
        annual_rate_percent: u32,
        escape_destination: Address,
        pool_limits: Vec<i128>,
        lifetime_years: u64,
    ) -> Result<(), ContractError> {
        if is_initialized(&env) {
            log!(&env, "Staking: Initialize: initializing contract twice is not allowed");
            return Err(ContractError::AlreadyInitialized);
        }
        if annual_rate_percent == 0 {
            log!(&env, "Staking: Initialize: annual rate must be bigger than 0");
            return Err(ContractError::InvalidAnnualRate);
        }
        if !schedule::is_valid(&pool_limits) {
            log!(
                &env,
                "Staking: Initialize: pool limits must be positive and non-decreasing, got {}",
                pool_limits
            );
            return Err(ContractError::InvalidPoolSchedule);
        }

        let start_date = env.ledger().timestamp();
        let end_date = lifetime_years
            .checked_mul(SECONDS_PER_YEAR)
            .and_then(|lifetime| start_date.checked_add(lifetime))
            .filter(|_| lifetime_years > 0)
            .ok_or_else(|| {
                log!(
                    &env,
                    "Staking: Initialize: invalid lifetime of {} years",
                    lifetime_years
                );
                ContractError::InvalidLifetime
            })?;

        let max_pool = pool_limits.last().unwrap_or(0);
        if lifetime_reward_bound(&env, max_pool, annual_rate_percent, lifetime_years).is_none() {
            log!(
                &env,
                "Staking: Initialize: rewards on a pool of {} at {}% over {} years overflow",
                max_pool,
                annual_rate_percent,
                lifetime_years
            );
            return Err(ContractError::InvalidPoolSchedule);
        }

        save_config(
            &env,
            &Config {
                token: token.clone(),
                annual_rate_percent,
                start_date,
                end_date,
                pool_limits,
            },
        );
        access::grant_role(&env, Role::Admin, &admin);
        escapable::initialize(&env, &escape_destination, &admin);
        set_initialized(&env);

        env.events()
            .publish(("initialize", "Token staking contract"), &token);

        Ok(())
    }

    fn stake(env: Env, sender: Address, amount: i128) -> Result<u64, ContractError> {
        sender.require_auth();
        ensure_active(&env)?;

        let config = get_config(&env);
        if amount <= 0 {
            log!(&env, "Staking: Stake: amount must be bigger than 0, got {}", amount);
            return Err(ContractError::ZeroAmount);
        }

        let now = env.ledger().timestamp();
        if now >= config.end_date {
            log!(
                &env,
                "Staking: Stake: staking period ended at {}",
                config.end_date
            );
            return Err(ContractError::StakingPeriodEnded);
        }

        let token_client = token::Client::new(&env, &config.token);
        let balance = token_client.balance(&sender);
        if balance < amount {
            log!(
                &env,
                "Staking: Stake: trying to stake {} with a balance of {}",
                amount,
                balance
            );
            return Err(ContractError::InsufficientBalance);
        }

        let cap = cap_for(&config.pool_limits, current_year(config.start_date, now));
        let total_staked = get_total_staked(&env);
        if total_staked
            .checked_add(amount)
            .map_or(true, |total| total > cap)
        {
            log!(
                &env,
                "Staking: Stake: pool limit of {} reached, {} already staked",
                cap,
                total_staked
            );
            return Err(ContractError::PoolLimitExceeded);
        }

        let position = ledger::open(&env, &sender, amount, now)?;
        token_client.transfer(&sender, &env.current_contract_address(), &amount);

        env.events().publish(("stake", "user"), &sender);
        env.events().publish(("stake", "position_id"), position.id);
        env.events().publish(("stake", "amount"), amount);

        Ok(position.id)
    }

    fn unstake(env: Env, sender: Address) -> Result<i128, ContractError> {
        sender.require_auth();
        ensure_active(&env)?;

        let config = get_config(&env);
        let payout = ledger::close_all(&env, &config, &sender, env.ledger().timestamp())?;
        let total = pay_out(&env, &config, &sender, payout)?;

        env.events().publish(("unstake", "user"), &sender);
        env.events().publish(("unstake", "principal"), payout.principal);
        env.events().publish(("unstake", "reward"), payout.reward);

        Ok(total)
    }

    fn claim_rewards(env: Env, sender: Address) -> Result<i128, ContractError> {
        sender.require_auth();
        ensure_active(&env)?;

        let config = get_config(&env);
        let reward = ledger::claim(&env, &config, &sender, env.ledger().timestamp())?;
        pay_out(
            &env,
            &config,
            &sender,
            Payout {
                principal: 0,
                reward,
            },
        )?;

        env.events().publish(("claim_rewards", "user"), &sender);
        env.events().publish(("claim_rewards", "reward"), reward);

        Ok(reward)
    }

    fn close_position(env: Env, sender: Address, index: u32) -> Result<i128, ContractError> {
        sender.require_auth();
        ensure_active(&env)?;

        close(&env, &sender, index)
    }

    fn partial_close_position(
        env: Env,
        sender: Address,
        index: u32,
        amount: i128,
    ) -> Result<i128, ContractError> {
        sender.require_auth();
        ensure_active(&env)?;

        partial_close(&env, &sender, index, amount)
    }

    fn close_position_by_id(env: Env, sender: Address, id: u64) -> Result<i128, ContractError> {
        sender.require_auth();
        ensure_active(&env)?;

        let index = index_of(&env, &sender, id)?;
        close(&env, &sender, index)
    }

    fn partial_close_position_by_id(
        env: Env,
        sender: Address,
        id: u64,
        amount: i128,
    ) -> Result<i128, ContractError> {
        sender.require_auth();
        ensure_active(&env)?;

        let index = index_of(&env, &sender, id)?;
        partial_close(&env, &sender, index, amount)
    }

    fn pause(env: Env, sender: Address) -> Result<(), ContractError> {
        sender.require_auth();
        require_admin(&env, &sender)?;

        pausable::pause(&env).map_err(|err| {
            log!(&env, "Staking: Pause: contract is already paused");
            ContractError::from(err)
        })?;

        env.events().publish(("pause", "admin"), &sender);

        Ok(())
    }

    fn resume(env: Env, sender: Address) -> Result<(), ContractError> {
        sender.require_auth();
        require_admin(&env, &sender)?;

        pausable::resume(&env).map_err(|err| {
            log!(&env, "Staking: Resume: contract is not paused");
            ContractError::from(err)
        })?;

        env.events().publish(("resume", "admin"), &sender);

        Ok(())
    }

    fn escape_hatch(env: Env, sender: Address) -> Result<i128, ContractError> {
        sender.require_auth();
        if !escapable::is_permitted(&env, &sender) {
            log!(&env, "Staking: Escape hatch: {} is not the escape caller", sender);
            return Err(ContractError::NotPermitted);
        }

        let config = get_config(&env);
        let (destination, amount) =
            escapable::drain(&env, &config.token).ok_or(ContractError::NotInitialized)?;

        env.events().publish(("escape_hatch", "destination"), &destination);
        env.events().publish(("escape_hatch", "amount"), amount);

        Ok(amount)
    }

    fn transfer_escape_capability(
        env: Env,
        sender: Address,
        new_holder: Address,
    ) -> Result<(), ContractError> {
        sender.require_auth();
        require_admin(&env, &sender)?;

        let previous = escapable::transfer_capability(&env, &new_holder);

        env.events()
            .publish(("transfer_escape_capability", "previous"), previous);
        env.events()
            .publish(("transfer_escape_capability", "new"), &new_holder);

        Ok(())
    }

    fn withdraw_funds(env: Env, sender: Address) -> Result<i128, ContractError> {
        sender.require_auth();
        require_admin(&env, &sender)?;
        pausable::when_paused(&env).map_err(|err| {
            log!(&env, "Staking: Withdraw funds: contract must be paused first");
            ContractError::from(err)
        })?;

        let config = get_config(&env);
        let token_client = token::Client::new(&env, &config.token);
        let contract = env.current_contract_address();
        let amount = token_client.balance(&contract);
        token_client.transfer(&contract, &sender, &amount);

        env.events().publish(("withdraw_funds", "admin"), &sender);
        env.events().publish(("withdraw_funds", "amount"), amount);

        Ok(amount)
    }

    fn grant_role(
        env: Env,
        sender: Address,
        role: Role,
        account: Address,
    ) -> Result<(), ContractError> {
        sender.require_auth();
        require_admin(&env, &sender)?;
        ensure_managed_role(&env, role)?;

        if access::grant_role(&env, role, &account) {
            env.events().publish(("grant_role", "account"), &account);
        }

        Ok(())
    }

    fn revoke_role(
        env: Env,
        sender: Address,
        role: Role,
        account: Address,
    ) -> Result<(), ContractError> {
        sender.require_auth();
        require_admin(&env, &sender)?;
        ensure_managed_role(&env, role)?;

        let members = access::role_members(&env, role);
        if members.len() == 1 && members.contains(&account) {
            log!(&env, "Staking: Revoke role: cannot revoke the last admin");
            return Err(ContractError::LastAdmin);
        }

        if access::revoke_role(&env, role, &account) {
            env.events().publish(("revoke_role", "account"), &account);
        }

        Ok(())
    }

    fn upgrade(
        env: Env,
        sender: Address,
        new_wasm_hash: BytesN<32>,
    ) -> Result<(), ContractError> {
        sender.require_auth();
        require_admin(&env, &sender)?;

        env.deployer().update_current_contract_wasm(new_wasm_hash);

        Ok(())
    }

    fn migrate(env: Env, sender: Address) -> Result<(), ContractError> {
        sender.require_auth();

        let version = get_schema_version(&env);
        if version >= SCHEMA_VERSION {
            log!(&env, "Staking: Migrate: storage is already at version {}", version);
            return Err(ContractError::AlreadyMigrated);
        }

        let (legacy_config, admin) = legacy::take_config(&env).ok_or_else(|| {
            log!(&env, "Staking: Migrate: no legacy configuration found");
            ContractError::NotInitialized
        })?;
        if sender != admin {
            log!(&env, "Staking: Migrate: {} is not the admin", sender);
            return Err(ContractError::NotPermitted);
        }

        let end_date = legacy_config
            .start_date
            .checked_add(DEFAULT_LIFETIME_YEARS * SECONDS_PER_YEAR)
            .ok_or(ContractError::ContractMathError)?;
        save_config(
            &env,
            &Config {
                token: legacy_config.token,
                annual_rate_percent: legacy_config.annual_rate_percent,
                start_date: legacy_config.start_date,
                end_date,
                pool_limits: default_pool_limits(&env),
            },
        );
        access::grant_role(&env, Role::Admin, &admin);
        escapable::initialize(&env, &admin, &admin);
        set_initialized(&env);

        env.events().publish(("migrate", "from_version"), version);
        env.events().publish(("migrate", "to_version"), SCHEMA_VERSION);

        Ok(())
    }

    // QUERIES

    fn query_config(env: Env) -> ConfigResponse {
        ConfigResponse {
            config: get_config(&env),
        }
    }

    fn query_stake_limit(env: Env) -> i128 {
        let config = get_config(&env);
        let year = current_year(config.start_date, env.ledger().timestamp());
        cap_for(&config.pool_limits, year)
    }

    fn query_current_year(env: Env) -> u32 {
        let config = get_config(&env);
        current_year(config.start_date, env.ledger().timestamp())
    }

    fn query_user_rewards(env: Env, address: Address) -> Result<i128, ContractError> {
        let config = get_config(&env);
        let account = view_account(&env, &address);
        ledger::pending_rewards(&env, &config, &account, env.ledger().timestamp())
    }

    fn query_user_rewards_per_second(env: Env, address: Address) -> Result<i128, ContractError> {
        let config = get_config(&env);
        if env.ledger().timestamp() >= config.end_date {
            return Ok(0);
        }
        let account = view_account(&env, &address);
        rewards_per_second(&env, account.staking_total, config.annual_rate_percent)
            .ok_or(ContractError::ContractMathError)
    }

    fn query_number_of_stakers(env: Env) -> u32 {
        get_staker_count(&env)
    }

    fn query_total_staked(env: Env) -> i128 {
        get_total_staked(&env)
    }

    fn query_user_staking_total(env: Env, address: Address) -> i128 {
        view_account(&env, &address).staking_total
    }

    fn query_user_position_count(env: Env, address: Address) -> u32 {
        view_account(&env, &address).positions.len()
    }

    fn query_positions(env: Env, address: Address) -> StakedResponse {
        let account = view_account(&env, &address);
        StakedResponse {
            positions: account.positions,
            staking_total: account.staking_total,
        }
    }

    fn query_position(
        env: Env,
        address: Address,
        index: u32,
    ) -> Result<StakingPosition, ContractError> {
        view_account(&env, &address)
            .positions
            .get(index)
            .ok_or(ContractError::PositionNotFound)
    }

    fn query_paused(env: Env) -> bool {
        pausable::is_paused(&env)
    }

    fn query_escape_destination(env: Env) -> Result<Address, ContractError> {
        escapable::destination(&env).ok_or(ContractError::NotInitialized)
    }

    fn query_escape_caller(env: Env) -> Option<Address> {
        escapable::caller(&env)
    }

    fn has_role(env: Env, role: Role, address: Address) -> bool {
        access::has_role(&env, role, &address)
    }

    fn query_schema_version(env: Env) -> u32 {
        get_schema_version(&env)
    }
}

fn ensure_active(env: &Env) -> Result<(), ContractError> {
    pausable::when_not_paused(env).map_err(|err| {
        log!(env, "Staking: Contract is paused");
        ContractError::from(err)
    })
}

fn require_admin(env: &Env, sender: &Address) -> Result<(), ContractError> {
    if !access::has_role(env, Role::Admin, sender) {
        log!(env, "Staking: {} is not an admin", sender);
        return Err(ContractError::NotPermitted);
    }
    Ok(())
}

// Only the admin role is managed through grant/revoke, the escape
// capability moves with `transfer_escape_capability`.
fn ensure_managed_role(env: &Env, role: Role) -> Result<(), ContractError> {
    if role != Role::Admin {
        log!(env, "Staking: Role {} cannot be granted or revoked", role as u32);
        return Err(ContractError::InvalidRole);
    }
    Ok(())
}

fn index_of(env: &Env, holder: &Address, id: u64) -> Result<u32, ContractError> {
    ledger::find_index(&get_account(env, holder), id).ok_or_else(|| {
        log!(env, "Staking: No position with id {}", id);
        ContractError::PositionNotFound
    })
}

fn close(env: &Env, holder: &Address, index: u32) -> Result<i128, ContractError> {
    let config = get_config(env);
    let payout = ledger::close_at(env, &config, holder, index, env.ledger().timestamp())?;
    let total = pay_out(env, &config, holder, payout)?;

    env.events().publish(("close_position", "user"), holder);
    env.events().publish(("close_position", "principal"), payout.principal);
    env.events().publish(("close_position", "reward"), payout.reward);

    Ok(total)
}

fn partial_close(
    env: &Env,
    holder: &Address,
    index: u32,
    amount: i128,
) -> Result<i128, ContractError> {
    let config = get_config(env);
    let payout = ledger::partial_close_at(
        env,
        &config,
        holder,
        index,
        amount,
        env.ledger().timestamp(),
    )?;
    let total = pay_out(env, &config, holder, payout)?;

    env.events().publish(("partial_close_position", "user"), holder);
    env.events()
        .publish(("partial_close_position", "principal"), payout.principal);
    env.events()
        .publish(("partial_close_position", "reward"), payout.reward);

    Ok(total)
}

// Runs after the ledger write. A failing transfer aborts the whole invocation.
// Every payout is exactly one transfer, zero amounts included.
fn pay_out(
    env: &Env,
    config: &Config,
    to: &Address,
    payout: Payout,
) -> Result<i128, ContractError> {
    let total = payout.total()?;
    token::Client::new(env, &config.token).transfer(
        &env.current_contract_address(),
        to,
        &total,
    );

    Ok(total)
}
