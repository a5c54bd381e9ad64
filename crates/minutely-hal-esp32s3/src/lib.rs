#![no_std]

//! Board layer for the Minutely clock: exclusive panel ownership, the
//! clock-face renderer, and SD-card credential storage.

pub mod panel;
pub mod render;
pub mod storage;
