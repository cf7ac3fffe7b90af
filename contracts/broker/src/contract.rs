use common::{
    access::{self, Role},
    ensure_positive,
};
use decimal::{Decimal, Decimal256};
use soroban_sdk::{contract, contractimpl, contractmeta, log, token, Address, Env};

use crate::{
    error::ContractError,
    storage::{get_config, is_initialized, save_config, set_initialized, Config},
};

// Metadata that is added on to the WASM custom section
contractmeta!(
    key = "Description",
    val = "Fixed spread commodity broker"
);

#[contract]
pub struct Broker;

pub trait BrokerTrait {
    // bid_rate and spread carry 18 decimal places
    fn initialize(
        env: Env,
        admin: Address,
        treasury: Address,
        base_asset: Address,
        quote_asset: Address,
        bid_rate: i128,
        spread: i128,
    ) -> Result<(), ContractError>;

    // Buys `quantity` of the base asset from the treasury. `expected_ask` must
    // match the current ask rate. Both sides must have approved the broker
    // beforehand. Returns the amount of quote asset paid.
    fn purchase(
        env: Env,
        buyer: Address,
        quantity: i128,
        expected_ask: i128,
    ) -> Result<i128, ContractError>;

    fn set_rate_and_spread(
        env: Env,
        sender: Address,
        bid_rate: i128,
        spread: i128,
    ) -> Result<(), ContractError>;

    fn set_treasury(env: Env, sender: Address, treasury: Address) -> Result<(), ContractError>;

    // QUERIES

    fn query_config(env: Env) -> Config;

    fn query_admin(env: Env) -> Result<Address, ContractError>;

    fn query_ask(env: Env) -> Result<i128, ContractError>;

    fn query_bid(env: Env) -> i128;
}

#[contractimpl]
impl BrokerTrait for Broker {
    fn initialize(
        env: Env,
        admin: Address,
        treasury: Address,
        base_asset: Address,
        quote_asset: Address,
        bid_rate: i128,
        spread: i128,
    ) -> Result<(), ContractError> {
        if is_initialized(&env) {
            log!(&env, "Broker: Initialize: initializing contract twice is not allowed");
            return Err(ContractError::AlreadyInitialized);
        }
        validate_rates(&env, bid_rate, spread)?;
        if base_asset == quote_asset {
            log!(&env, "Broker: Initialize: base and quote asset must differ");
            return Err(ContractError::SameAssets);
        }

        save_config(
            &env,
            &Config {
                treasury,
                base_asset: base_asset.clone(),
                quote_asset: quote_asset.clone(),
                bid_rate,
                spread,
            },
        );
        access::grant_role(&env, Role::Admin, &admin);
        set_initialized(&env);

        env.events().publish(("initialize", "base_asset"), base_asset);
        env.events().publish(("initialize", "quote_asset"), quote_asset);

        Ok(())
    }

    fn purchase(
        env: Env,
        buyer: Address,
        quantity: i128,
        expected_ask: i128,
    ) -> Result<i128, ContractError> {
        buyer.require_auth();

        let config = get_config(&env);
        ensure_positive!(ContractError::ZeroAmount; quantity);

        let ask = ask_rate(&env, &config)?;
        if expected_ask != ask {
            log!(
                &env,
                "Broker: Purchase: expected ask {} does not match current ask {}",
                expected_ask,
                ask
            );
            return Err(ContractError::StaleRate);
        }

        let broker = env.current_contract_address();
        let base_client = token::Client::new(&env, &config.base_asset);
        let quote_client = token::Client::new(&env, &config.quote_asset);

        let treasury_allowance = base_client.allowance(&config.treasury, &broker);
        if treasury_allowance < quantity {
            log!(
                &env,
                "Broker: Purchase: treasury allowance of {} is below {}",
                treasury_allowance,
                quantity
            );
            return Err(ContractError::InsufficientTreasuryAllowance);
        }
        let treasury_balance = base_client.balance(&config.treasury);
        if treasury_balance < quantity {
            log!(
                &env,
                "Broker: Purchase: treasury holds {} of {} requested",
                treasury_balance,
                quantity
            );
            return Err(ContractError::InsufficientTreasuryBalance);
        }

        let cost = Decimal256::mul_int(&env, quantity, Decimal::raw(ask))
            .ok_or(ContractError::ContractMathError)?;

        let buyer_balance = quote_client.balance(&buyer);
        if buyer_balance < cost {
            log!(
                &env,
                "Broker: Purchase: buyer holds {} but the cost is {}",
                buyer_balance,
                cost
            );
            return Err(ContractError::InsufficientBuyerBalance);
        }
        let buyer_allowance = quote_client.allowance(&buyer, &broker);
        if buyer_allowance < cost {
            log!(
                &env,
                "Broker: Purchase: buyer allowance of {} is below the cost of {}",
                buyer_allowance,
                cost
            );
            return Err(ContractError::InsufficientBuyerAllowance);
        }

        base_client.transfer_from(&broker, &config.treasury, &buyer, &quantity);
        quote_client.transfer_from(&broker, &buyer, &config.treasury, &cost);

        env.events().publish(("purchase", "buyer"), &buyer);
        env.events().publish(("purchase", "quantity"), quantity);
        env.events().publish(("purchase", "ask"), ask);
        env.events().publish(("purchase", "cost"), cost);

        Ok(cost)
    }

    fn set_rate_and_spread(
        env: Env,
        sender: Address,
        bid_rate: i128,
        spread: i128,
    ) -> Result<(), ContractError> {
        sender.require_auth();
        require_admin(&env, &sender)?;
        validate_rates(&env, bid_rate, spread)?;

        let mut config = get_config(&env);
        config.bid_rate = bid_rate;
        config.spread = spread;
        save_config(&env, &config);

        env.events().publish(("set_rate_and_spread", "bid_rate"), bid_rate);
        env.events().publish(("set_rate_and_spread", "spread"), spread);

        Ok(())
    }

    fn set_treasury(env: Env, sender: Address, treasury: Address) -> Result<(), ContractError> {
        sender.require_auth();
        require_admin(&env, &sender)?;

        let mut config = get_config(&env);
        config.treasury = treasury.clone();
        save_config(&env, &config);

        env.events().publish(("set_treasury", "treasury"), treasury);

        Ok(())
    }

    fn query_config(env: Env) -> Config {
        get_config(&env)
    }

    fn query_admin(env: Env) -> Result<Address, ContractError> {
        access::role_members(&env, Role::Admin)
            .first()
            .ok_or(ContractError::NotInitialized)
    }

    fn query_ask(env: Env) -> Result<i128, ContractError> {
        ask_rate(&env, &get_config(&env))
    }

    fn query_bid(env: Env) -> i128 {
        get_config(&env).bid_rate
    }
}

fn ask_rate(env: &Env, config: &Config) -> Result<i128, ContractError> {
    config.ask_rate(env).ok_or_else(|| {
        log!(
            env,
            "Broker: Ask rate overflows for bid {} and spread {}",
            config.bid_rate,
            config.spread
        );
        ContractError::ContractMathError
    })
}

fn validate_rates(env: &Env, bid_rate: i128, spread: i128) -> Result<(), ContractError> {
    if bid_rate <= 0 || spread < 0 {
        log!(
            env,
            "Broker: Bid rate must be positive and spread non-negative, got {} and {}",
            bid_rate,
            spread
        );
        return Err(ContractError::InvalidRate);
    }
    Ok(())
}

fn require_admin(env: &Env, sender: &Address) -> Result<(), ContractError> {
    if !access::has_role(env, Role::Admin, sender) {
        log!(env, "Broker: {} is not an admin", sender);
        return Err(ContractError::NotPermitted);
    }
    Ok(())
}
