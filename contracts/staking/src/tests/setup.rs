use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token, Address, Env,
};

use crate::{
    contract::{Staking, StakingClient},
    schedule::{default_pool_limits, DEFAULT_LIFETIME_YEARS},
};

pub const ONE: i128 = 1_000_000_000_000_000_000;
pub const ANNUAL_RATE_PERCENT: u32 = 12;
pub const ONE_DAY: u64 = 86_400;
pub use crate::rewards::SECONDS_PER_YEAR;

pub fn tokens(amount: i128) -> i128 {
    amount * ONE
}

pub struct TokenClients<'a> {
    pub token: token::Client<'a>,
    pub admin: token::StellarAssetClient<'a>,
}

impl TokenClients<'_> {
    pub fn address(&self) -> &Address {
        &self.token.address
    }

    pub fn mint(&self, to: &Address, amount: i128) {
        self.admin.mint(to, &amount);
    }

    pub fn balance(&self, of: &Address) -> i128 {
        self.token.balance(of)
    }
}

pub fn deploy_token_contract<'a>(env: &Env, admin: &Address) -> TokenClients<'a> {
    let address = env
        .register_stellar_asset_contract_v2(admin.clone())
        .address();
    TokenClients {
        token: token::Client::new(env, &address),
        admin: token::StellarAssetClient::new(env, &address),
    }
}

pub fn deploy_staking_contract<'a>(
    env: &Env,
    admin: &Address,
    token: &Address,
    escape_destination: &Address,
) -> StakingClient<'a> {
    let staking = StakingClient::new(env, &env.register(Staking, ()));
    staking.initialize(
        admin,
        token,
        &ANNUAL_RATE_PERCENT,
        escape_destination,
        &default_pool_limits(env),
        &DEFAULT_LIFETIME_YEARS,
    );
    staking
}

pub struct TestSetup<'a> {
    pub env: Env,
    pub admin: Address,
    pub escape_destination: Address,
    pub token: TokenClients<'a>,
    pub staking: StakingClient<'a>,
}

/// Staking contract at 12% per year with the default schedule, starting at
/// ledger time zero.
pub fn setup<'a>() -> TestSetup<'a> {
    let env = Env::default();
    env.mock_all_auths();
    env.cost_estimate().budget().reset_unlimited();

    let admin = Address::generate(&env);
    let escape_destination = Address::generate(&env);
    let token = deploy_token_contract(&env, &admin);
    let staking = deploy_staking_contract(&env, &admin, token.address(), &escape_destination);

    TestSetup {
        env,
        admin,
        escape_destination,
        token,
        staking,
    }
}

impl TestSetup<'_> {
    pub fn funded_user(&self, amount: i128) -> Address {
        let user = Address::generate(&self.env);
        self.token.mint(&user, amount);
        user
    }

    /// Tops up the reward pool held by the staking contract.
    pub fn fund_rewards(&self, amount: i128) {
        self.token.mint(&self.staking.address, amount);
    }

    pub fn set_time(&self, timestamp: u64) {
        self.env.ledger().with_mut(|li| {
            li.timestamp = timestamp;
        });
    }

    pub fn advance(&self, seconds: u64) {
        self.env.ledger().with_mut(|li| {
            li.timestamp += seconds;
        });
    }
}
