//! Data protection key commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use cookiegate_auth::{KeyRing, MasterKey};
use cookiegate_core::config::AppConfig;
use cookiegate_core::error::AppError;

/// Key command arguments
#[derive(Debug, Args)]
pub struct KeyArgs {
    #[command(subcommand)]
    pub command: KeyCommand,
}

/// Key subcommands
#[derive(Debug, Subcommand)]
pub enum KeyCommand {
    /// Generate a new master key as a configuration snippet
    Generate {
        /// Write the snippet to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List configured key ids
    List,
}

/// Key display row
#[derive(Debug, Serialize, Tabled)]
struct KeyRow {
    /// Key id
    id: String,
    /// Whether new payloads are protected with this key
    default: bool,
}

/// Execute a key command
pub async fn execute(
    args: &KeyArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        KeyCommand::Generate { output: path } => {
            let key = MasterKey::generate();
            let snippet = key_snippet(&key);

            match path {
                Some(path) => {
                    tokio::fs::write(path, &snippet).await.map_err(|e| {
                        AppError::storage(format!("Failed to write key to {path}: {e}"))
                    })?;
                    tracing::info!(key_id = %key.id(), path = %path, "Master key written");
                    output::print_success(&format!("Key {} written to {}", key.id(), path));
                }
                None => print!("{snippet}"),
            }
            Ok(())
        }
        KeyCommand::List => {
            if config.data_protection.is_ephemeral() {
                output::print_warning(
                    "No keys configured; cookies will not survive a restart",
                );
                return Ok(());
            }

            let ring = KeyRing::from_config(&config.data_protection)?;
            let default_key = ring.default_key();
            let rows: Vec<KeyRow> = ring
                .keys()
                .map(|key| KeyRow {
                    id: key.id().to_string(),
                    default: key.id() == default_key,
                })
                .collect();
            output::print_list(&rows, format);
            Ok(())
        }
    }
}

/// Render a key as a `[[data_protection.keys]]` TOML entry
fn key_snippet(key: &MasterKey) -> String {
    format!(
        "[[data_protection.keys]]\nid = \"{}\"\nsecret = \"{}\"\n",
        key.id(),
        key.secret_base64()
    )
}
