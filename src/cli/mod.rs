//! CLI module for the car price API
//!
//! Provides subcommands:
//! - `serve`: run the HTTP server
//! - `check-model`: load the artifact and report on it

pub mod check_model;
pub mod serve;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// Car price prediction API
#[derive(Parser)]
#[command(name = "car-price-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Load the model artifact, print a summary and optionally predict once
    CheckModel(check_model::CheckModelArgs),
}

/// Loads `.env` and the layered configuration
///
/// An unreadable file or a malformed `APP__*` value stops the command rather
/// than silently falling back to defaults.
pub(crate) fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();
    AppConfig::load().context("Invalid configuration (config/*.toml or APP__* variables)")
}
