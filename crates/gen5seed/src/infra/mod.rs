//! Infrastructure layer - I/O and external dependencies
//!
//! This module handles profile files.

pub mod profile_io;
