//! CLI command definitions and dispatch.

pub mod config;
pub mod key;
pub mod scheme;
pub mod ticket;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use cookiegate_auth::{KeyRingDataProtectionProvider, OptionsResolver, SchemeRegistry};
use cookiegate_core::config::AppConfig;
use cookiegate_core::error::AppError;

/// Cookiegate: cookie authentication scheme and ticket tooling
#[derive(Debug, Parser)]
#[command(name = "cookiegate", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List resolved cookie authentication schemes
    Schemes,
    /// Issue and inspect ticket cookies
    Ticket(ticket::TicketArgs),
    /// Data protection key management
    Key(key::KeyArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Schemes => scheme::execute(config, self.format).await,
            Commands::Ticket(args) => ticket::execute(args, config, self.format).await,
            Commands::Key(args) => key::execute(args, config, self.format).await,
            Commands::Config(args) => config::execute(args, config, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: resolve every configured scheme against the configured key ring
pub fn build_registry(config: &AppConfig) -> Result<SchemeRegistry, AppError> {
    let provider = KeyRingDataProtectionProvider::from_config(&config.data_protection)?;
    let resolver = OptionsResolver::new(Arc::new(provider));
    SchemeRegistry::from_config(config, resolver)
}
