//! CLI command implementations

pub mod health;
pub mod models;
pub mod predict;
