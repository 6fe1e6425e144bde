//! Domain layer - Pure computational logic
//!
//! This module contains the RNGs, the boot hash and the outcome types, without
//! threading or I/O.

pub mod advances;
pub mod filter;
pub mod keypress;
pub mod lcg;
pub mod mt;
pub mod packed;
pub mod profile;
pub mod sha1;
pub mod state;
pub mod timer;
