#![no_std]
mod contract;
mod error;
mod storage;

#[cfg(test)]
mod tests;
