//! Contract-wide circuit breaker.

use soroban_sdk::{contracttype, Env};

#[contracttype]
#[derive(Clone)]
enum PauseKey {
    Paused,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PauseError {
    Paused,
    NotPaused,
}

pub fn is_paused(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&PauseKey::Paused)
        .unwrap_or(false)
}

pub fn when_not_paused(env: &Env) -> Result<(), PauseError> {
    if is_paused(env) {
        return Err(PauseError::Paused);
    }
    Ok(())
}

pub fn when_paused(env: &Env) -> Result<(), PauseError> {
    if !is_paused(env) {
        return Err(PauseError::NotPaused);
    }
    Ok(())
}

pub fn pause(env: &Env) -> Result<(), PauseError> {
    when_not_paused(env)?;
    env.storage().instance().set(&PauseKey::Paused, &true);
    Ok(())
}

pub fn resume(env: &Env) -> Result<(), PauseError> {
    when_paused(env)?;
    env.storage().instance().set(&PauseKey::Paused, &false);
    Ok(())
}
