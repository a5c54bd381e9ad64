#![cfg_attr(not(test), no_std)]

//! Platform-independent core of the Minutely e-paper clock.
//!
//! Everything that can be decided without touching hardware lives here:
//! refresh cadence, the wireless connection machine, the time-sync budget,
//! calendar math, credential parsing, the SNTP wire codec, and the view
//! models handed to the board renderer.

pub mod clock;
pub mod config;
pub mod fault;
pub mod link;
pub mod ntp;
pub mod refresh;
pub mod render;
pub mod sync;
