//! CLI command implementations.

pub mod common;
pub mod emit;
pub mod gates;
pub mod schedule;
pub mod version;
