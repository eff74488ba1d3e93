//! HTTP surface over the inference library

pub mod api;
pub mod config;
