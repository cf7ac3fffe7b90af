// Constants for storage bump amounts
pub const DAY_IN_LEDGERS: u32 = 17280;

// target TTL for the contract instance and its code, i.e. config, counters and roles.
// When a TTL extension is triggered the instance's TTL is reset to this value (7 days of ledger units).
pub const INSTANCE_TARGET_TTL: u32 = 7 * DAY_IN_LEDGERS;
// below this threshold (6 days of ledger units) the instance TTL is refreshed to INSTANCE_TARGET_TTL.
pub const INSTANCE_RENEWAL_THRESHOLD: u32 = INSTANCE_TARGET_TTL - DAY_IN_LEDGERS;

// holder accounts are bumped to this value (30 days of ledger units) whenever they are read or written.
pub const PERSISTENT_TARGET_TTL: u32 = 30 * DAY_IN_LEDGERS;
// below this threshold (29 days of ledger units) a holder account is bumped back to PERSISTENT_TARGET_TTL.
pub const PERSISTENT_RENEWAL_THRESHOLD: u32 = PERSISTENT_TARGET_TTL - DAY_IN_LEDGERS;
