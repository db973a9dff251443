//! Configuration commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use cookiegate_core::config::AppConfig;
use cookiegate_core::error::AppError;

/// Config command arguments
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Load the configuration and resolve every scheme
    Validate,
    /// Print the effective configuration with secrets masked
    Show,
}

/// Execute a config command
pub async fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Validate => {
            let registry = super::build_registry(config)?;
            for (name, options) in registry.iter() {
                options.resolved()?;
                output::print_kv(name, "resolved");
            }
            if config.data_protection.is_ephemeral() {
                output::print_warning("No data protection keys configured; using an ephemeral key");
            }
            output::print_success(&format!(
                "{config_path}: {} scheme(s) valid",
                registry.len()
            ));
            Ok(())
        }
        ConfigCommand::Show => {
            output::print_item(&masked(config), format);
            Ok(())
        }
    }
}

/// Copy of `config` with key secrets replaced
fn masked(config: &AppConfig) -> AppConfig {
    let mut config = config.clone();
    for key in &mut config.data_protection.keys {
        key.secret = "****".to_string();
    }
    config
}
