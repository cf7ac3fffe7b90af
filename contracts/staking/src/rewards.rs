//! Time based reward arithmetic on 18-place fixed-point amounts.
//!
//! Rewards accrue linearly: a position earns `annual_rate_percent` of its
//! amount per year. The annual figure is multiplied by the elapsed seconds
//! before dividing by the year length, so whole years pay out exactly. Both
//! products go through a 256-bit intermediate, only the final reward has to
//! fit in an `i128`.

use decimal::Decimal256;
use soroban_sdk::Env;

/// 365.25 days.
pub const SECONDS_PER_YEAR: u64 = 31_557_600;

const PERCENT: i128 = 100;

pub fn annual_reward(env: &Env, amount: i128, annual_rate_percent: u32) -> Option<i128> {
    Decimal256::mul_div(env, amount, annual_rate_percent as i128, PERCENT)
}

pub fn current_or_end_time(as_of: u64, end_date: u64) -> u64 {
    as_of.min(end_date)
}

/// Reward accrued by `amount` between `checkpoint` and `as_of`, with accrual
/// frozen at `end_date`. `None` when the reward does not fit in an `i128`.
pub fn reward_for(
    env: &Env,
    amount: i128,
    annual_rate_percent: u32,
    checkpoint: u64,
    as_of: u64,
    end_date: u64,
) -> Option<i128> {
    let elapsed = current_or_end_time(as_of, end_date).saturating_sub(checkpoint);
    Decimal256::mul_div(
        env,
        annual_reward(env, amount, annual_rate_percent)?,
        elapsed as i128,
        SECONDS_PER_YEAR as i128,
    )
}

/// Per-second accrual rate, truncated. Informational only, payouts never
/// compound this value.
pub fn rewards_per_second(env: &Env, amount: i128, annual_rate_percent: u32) -> Option<i128> {
    annual_reward(env, amount, annual_rate_percent)
        .map(|annual| annual / SECONDS_PER_YEAR as i128)
}

/// Largest reward the whole pool can accrue over `lifetime_years`, `None` when
/// it does not fit in an `i128`.
pub fn lifetime_reward_bound(
    env: &Env,
    max_pool: i128,
    annual_rate_percent: u32,
    lifetime_years: u64,
) -> Option<i128> {
    annual_reward(env, max_pool, annual_rate_percent)?.checked_mul(lifetime_years.into())
}

/// One-based contract year containing `as_of`.
pub fn current_year(start_date: u64, as_of: u64) -> u32 {
    let years = as_of.saturating_sub(start_date) / SECONDS_PER_YEAR;
    u32::try_from(years).unwrap_or(u32::MAX - 1) + 1
}
