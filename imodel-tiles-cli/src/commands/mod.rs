//! CLI command implementations.

pub mod acquire;
pub mod common;
pub mod config;
pub mod locate;
