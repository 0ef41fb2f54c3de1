//! Command implementations for the alerts-export CLI
//!
//! Each command lives in its own module.

pub mod config;
pub mod export;
pub mod listen;
pub mod version;
