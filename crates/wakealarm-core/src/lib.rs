#![cfg_attr(not(test), no_std)]

//! Wake-driven control core for the deep-sleep alarm clock.
//!
//! Nothing in this crate touches registers. The board crate supplies the
//! hardware through the traits in [`io`] and [`sync`].

pub mod clock;
pub mod controller;
pub mod io;
pub mod persist;
pub mod render;
pub mod schedule;
pub mod sleep;
pub mod sntp;
pub mod sync;
pub mod wake;
