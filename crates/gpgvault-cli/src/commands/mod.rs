//! CLI command implementations.

pub mod config;
pub mod item;
pub mod key;
