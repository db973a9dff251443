//! Scheme listing command.

use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use cookiegate_core::config::AppConfig;
use cookiegate_core::error::AppError;

/// Scheme display row
#[derive(Debug, Serialize, Tabled)]
struct SchemeRow {
    /// Scheme name
    scheme: String,
    /// Cookie name
    cookie: String,
    /// Login path
    login: String,
    /// Logout path
    logout: String,
    /// Access denied path
    access_denied: String,
    /// Ticket lifetime
    expires: String,
    /// Protector purposes
    purposes: String,
}

/// Execute the schemes command
pub async fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let registry = super::build_registry(config)?;

    let mut rows = Vec::with_capacity(registry.len());
    for (name, options) in registry.iter() {
        let resolved = options.resolved()?;
        rows.push(SchemeRow {
            scheme: name.to_string(),
            cookie: resolved.cookie_name.to_string(),
            login: resolved.login_path.to_string(),
            logout: resolved.logout_path.to_string(),
            access_denied: resolved.access_denied_path.to_string(),
            expires: format_lifetime(options.expire_time_span),
            purposes: resolved.ticket_data_format.purposes().to_string(),
        });
    }

    output::print_list(&rows, format);
    Ok(())
}

/// Render a lifetime as days, hours, or minutes
fn format_lifetime(span: chrono::Duration) -> String {
    if span.num_minutes() % (24 * 60) == 0 {
        format!("{}d", span.num_days())
    } else if span.num_minutes() % 60 == 0 {
        format!("{}h", span.num_hours())
    } else {
        format!("{}m", span.num_minutes())
    }
}
