use common::ttl::{INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL};
use decimal::{Decimal, Decimal256};
use soroban_sdk::{
    contracttype, log, panic_with_error, Address, ConversionError, Env, TryFromVal, Val,
};

use crate::error::ContractError;

#[derive(Clone, Copy)]
#[repr(u32)]
pub enum DataKey {
    Config = 0,
    Initialized = 1,
}

impl TryFromVal<Env, DataKey> for Val {
    type Error = ConversionError;

    fn try_from_val(_env: &Env, v: &DataKey) -> Result<Self, Self::Error> {
        Ok((*v as u32).into())
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Holds the base asset and receives the quote asset
    pub treasury: Address,
    /// Asset being sold
    pub base_asset: Address,
    /// Asset the buyer pays with
    pub quote_asset: Address,
    /// Quote units per base unit, 18 decimal places
    pub bid_rate: i128,
    /// Markup on the bid rate, 18 decimal places (0.01 = 1%)
    pub spread: i128,
}

impl Config {
    /// `bid_rate * (1 + spread)`, truncated.
    pub fn ask_rate(&self, env: &Env) -> Option<i128> {
        let bid = Decimal256::from_decimal(env, Decimal::raw(self.bid_rate))?;
        let markup = Decimal::one().checked_add(Decimal::raw(self.spread))?;
        let markup = Decimal256::from_decimal(env, markup)?;
        bid.mul(env, &markup).to_decimal().map(|ask| ask.atomics())
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
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);
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
            log!(env, "Broker: Config not set");
            panic_with_error!(env, ContractError::NotInitialized)
        });
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);

    config
}
