#![no_std]
mod contract;
mod error;
mod ledger;
mod msg;
mod rewards;
mod schedule;
mod storage;
