#![no_std]

pub mod access;
pub mod escapable;
pub mod pausable;
pub mod ttl;
pub mod utils;

#[cfg(test)]
mod testutils;
