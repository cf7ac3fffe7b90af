use soroban_sdk::{contracttype, Vec};

use crate::storage::{Config, StakingPosition};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigResponse {
    pub config: Config,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedResponse {
    pub positions: Vec<StakingPosition>,
    pub staking_total: i128,
}
