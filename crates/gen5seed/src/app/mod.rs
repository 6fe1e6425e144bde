//! Application layer - Use case implementations
//!
//! This module coordinates the domain layer to implement projection and search.

pub mod calibration;
pub mod generator;
pub mod searcher;
