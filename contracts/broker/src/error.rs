use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    AlreadyInitialized = 200,
    NotInitialized = 201,
    ZeroAmount = 202,
    StaleRate = 203,
    InsufficientTreasuryAllowance = 204,
    InsufficientTreasuryBalance = 205,
    InsufficientBuyerBalance = 206,
    InsufficientBuyerAllowance = 207,
    NotPermitted = 208,
    InvalidRate = 209,
    ContractMathError = 210,
    SameAssets = 211,
}
