#![no_std]

//! ESP32 board glue for the wake-alarm controller.

pub mod clock;
pub mod input;
pub mod network;
pub mod output;
pub mod platform;
pub mod storage;
