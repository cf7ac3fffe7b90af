//! Yearly cap on the total amount staked.
//!
//! `limits[i]` is the cumulative cap for contract year `i + 1`; years past
//! the last tier keep the last cap.

use soroban_sdk::{vec, Env, Vec};

const UNIT: i128 = 1_000_000_000_000_000_000;

pub const DEFAULT_LIFETIME_YEARS: u64 = 38;

pub fn default_pool_limits(env: &Env) -> Vec<i128> {
    vec![
        env,
        500_000_000 * UNIT,
        1_500_000_000 * UNIT,
        3_000_000_000 * UNIT,
    ]
}

/// Non-empty, strictly positive and non-decreasing.
pub fn is_valid(limits: &Vec<i128>) -> bool {
    if limits.is_empty() {
        return false;
    }
    let mut previous = 0i128;
    for limit in limits.iter() {
        if limit <= 0 || limit < previous {
            return false;
        }
        previous = limit;
    }
    true
}

/// Cap in force during `year`. Year zero reads as year one.
pub fn cap_for(limits: &Vec<i128>, year: u32) -> i128 {
    if limits.is_empty() {
        return 0;
    }
    let index = year.saturating_sub(1).min(limits.len() - 1);
    limits.get(index).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, 500_000_000 ; "year zero reads as first year")]
    #[test_case(1, 500_000_000 ; "first year")]
    #[test_case(2, 1_500_000_000 ; "second year")]
    #[test_case(3, 3_000_000_000 ; "third year")]
    #[test_case(38, 3_000_000_000 ; "last year of lifetime")]
    #[test_case(39, 3_000_000_000 ; "past lifetime")]
    #[test_case(u32::MAX, 3_000_000_000 ; "far future")]
    fn default_schedule(year: u32, expected_tokens: i128) {
        let env = Env::default();
        let limits = default_pool_limits(&env);
        assert_eq!(cap_for(&limits, year), expected_tokens * UNIT);
    }

    #[test]
    fn schedule_validation() {
        let env = Env::default();
        assert!(is_valid(&default_pool_limits(&env)));
        assert!(is_valid(&vec![&env, 10, 10, 20]));
        assert!(!is_valid(&Vec::new(&env)));
        assert!(!is_valid(&vec![&env, 0, 10]));
        assert!(!is_valid(&vec![&env, 10, -1]));
        assert!(!is_valid(&vec![&env, 20, 10]));
    }

    #[test]
    fn empty_schedule_caps_at_zero() {
        let env = Env::default();
        assert_eq!(cap_for(&Vec::new(&env), 1), 0);
    }
}
