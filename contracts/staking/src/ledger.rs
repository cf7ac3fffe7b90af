//! Per-holder position bookkeeping.
//!
//! Every function here updates the holder account and the global counters
//! together. Token transfers are left to the caller, which runs them after
//! the ledger has been written.

use soroban_sdk::{log, Address, Env};

use crate::{
    error::ContractError,
    rewards::{current_or_end_time, reward_for},
    storage::{
        get_account, save_account,
        utils::{
            decrease_total_staked, decrement_staker_count, increase_total_staked,
            increment_staker_count, next_position_id,
        },
        Config, HolderAccount, StakingPosition,
    },
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Payout {
    pub principal: i128,
    pub reward: i128,
}

impl Payout {
    pub fn total(&self) -> Result<i128, ContractError> {
        self.principal
            .checked_add(self.reward)
            .ok_or(ContractError::ContractMathError)
    }
}

pub fn position_reward(
    env: &Env,
    config: &Config,
    position: &StakingPosition,
    now: u64,
) -> Result<i128, ContractError> {
    reward_for(
        env,
        position.amount,
        config.annual_rate_percent,
        position.reward_checkpoint,
        now,
        config.end_date,
    )
    .ok_or(ContractError::ContractMathError)
}

pub fn pending_rewards(
    env: &Env,
    config: &Config,
    account: &HolderAccount,
    now: u64,
) -> Result<i128, ContractError> {
    account.positions.iter().try_fold(0i128, |acc, position| {
        acc.checked_add(position_reward(env, config, &position, now)?)
            .ok_or(ContractError::ContractMathError)
    })
}

pub fn find_index(account: &HolderAccount, id: u64) -> Option<u32> {
    account
        .positions
        .iter()
        .position(|position| position.id == id)
        .map(|index| index as u32)
}

pub fn open(
    env: &Env,
    holder: &Address,
    amount: i128,
    now: u64,
) -> Result<StakingPosition, ContractError> {
    if amount <= 0 {
        log!(env, "Staking: Cannot open a position of {}", amount);
        return Err(ContractError::ZeroAmount);
    }

    let mut account = get_account(env, holder);
    let first_position = account.positions.is_empty();

    let position = StakingPosition {
        id: next_position_id(env),
        amount,
        timestamp: now,
        reward_checkpoint: now,
    };
    account.positions.push_back(position.clone());
    account.staking_total = account
        .staking_total
        .checked_add(amount)
        .ok_or(ContractError::ContractMathError)?;
    save_account(env, holder, &account);

    increase_total_staked(env, amount)?;
    if first_position {
        increment_staker_count(env)?;
    }

    Ok(position)
}

pub fn close_at(
    env: &Env,
    config: &Config,
    holder: &Address,
    index: u32,
    now: u64,
) -> Result<Payout, ContractError> {
    let mut account = get_account(env, holder);
    let position = position_at(env, &account, index)?;

    let payout = Payout {
        principal: position.amount,
        reward: position_reward(env, config, &position, now)?,
    };

    account.positions.remove(index);
    account.staking_total -= position.amount;
    save_account(env, holder, &account);

    decrease_total_staked(env, position.amount)?;
    if account.positions.is_empty() {
        decrement_staker_count(env)?;
    }

    Ok(payout)
}

/// Withdraws part of a position. The remainder keeps its creation time and
/// reward checkpoint, the reward paid is the share earned by the withdrawn
/// amount, so closing the remainder afterwards pays the same total as
/// closing the whole position at once.
pub fn partial_close_at(
    env: &Env,
    config: &Config,
    holder: &Address,
    index: u32,
    withdraw: i128,
    now: u64,
) -> Result<Payout, ContractError> {
    let mut account = get_account(env, holder);
    let mut position = position_at(env, &account, index)?;

    if withdraw <= 0 || withdraw >= position.amount {
        log!(
            env,
            "Staking: Partial close of {} from a position of {}",
            withdraw,
            position.amount
        );
        return Err(ContractError::InvalidWithdrawAmount);
    }

    let full_reward = position_reward(env, config, &position, now)?;
    position.amount -= withdraw;
    let remainder_reward = position_reward(env, config, &position, now)?;

    account.positions.set(index, position);
    account.staking_total -= withdraw;
    save_account(env, holder, &account);

    decrease_total_staked(env, withdraw)?;

    Ok(Payout {
        principal: withdraw,
        reward: full_reward - remainder_reward,
    })
}

pub fn close_all(
    env: &Env,
    config: &Config,
    holder: &Address,
    now: u64,
) -> Result<Payout, ContractError> {
    let account = get_account(env, holder);
    if account.positions.is_empty() {
        log!(env, "Staking: No positions to close");
        return Err(ContractError::NoStakingPositions);
    }

    let payout = Payout {
        principal: account.staking_total,
        reward: pending_rewards(env, config, &account, now)?,
    };

    save_account(env, holder, &HolderAccount::new(env));
    decrease_total_staked(env, account.staking_total)?;
    decrement_staker_count(env)?;

    Ok(payout)
}

/// Pays out accrued rewards and moves every checkpoint to `now`, or to the
/// end date once staking has closed.
pub fn claim(env: &Env, config: &Config, holder: &Address, now: u64) -> Result<i128, ContractError> {
    let mut account = get_account(env, holder);
    if account.positions.is_empty() {
        log!(env, "Staking: No positions to claim from");
        return Err(ContractError::NoStakingPositions);
    }

    let reward = pending_rewards(env, config, &account, now)?;
    let checkpoint = current_or_end_time(now, config.end_date);
    for index in 0..account.positions.len() {
        if let Some(mut position) = account.positions.get(index) {
            position.reward_checkpoint = position.reward_checkpoint.max(checkpoint);
            account.positions.set(index, position);
        }
    }
    save_account(env, holder, &account);

    Ok(reward)
}

fn position_at(
    env: &Env,
    account: &HolderAccount,
    index: u32,
) -> Result<StakingPosition, ContractError> {
    account.positions.get(index).ok_or_else(|| {
        log!(
            env,
            "Staking: No position at index {}, holder has {}",
            index,
            account.positions.len()
        );
        ContractError::PositionNotFound
    })
}
