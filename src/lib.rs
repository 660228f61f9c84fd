#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

extern crate alloc;

pub mod config;
pub mod constants;
pub mod cycle;
pub mod log_buffer;
pub mod readings;
pub mod report;
pub mod sensors;
pub mod weather;
