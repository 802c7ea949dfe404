pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod manifest;
pub mod output;
pub mod platform;
pub mod registry;
pub mod resolve;
pub mod results;
pub mod service;

pub use anyhow::Result;
