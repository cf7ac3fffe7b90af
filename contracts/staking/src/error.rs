use common::pausable::PauseError;
use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    AlreadyInitialized = 100,
    NotInitialized = 101,
    InvalidAnnualRate = 102,
    InvalidPoolSchedule = 103,
    InvalidLifetime = 104,
    ZeroAmount = 105,
    InsufficientBalance = 106,
    PoolLimitExceeded = 107,
    StakingPeriodEnded = 108,
    Paused = 109,
    NotPaused = 110,
    NotPermitted = 111,
    PositionNotFound = 112,
    InvalidWithdrawAmount = 113,
    NoStakingPositions = 114,
    InvalidRole = 115,
    LastAdmin = 116,
    AlreadyMigrated = 117,
    ContractMathError = 118,
}

impl From<PauseError> for ContractError {
    fn from(err: PauseError) -> Self {
        match err {
            PauseError::Paused => ContractError::Paused,
            PauseError::NotPaused => ContractError::NotPaused,
        }
    }
}
