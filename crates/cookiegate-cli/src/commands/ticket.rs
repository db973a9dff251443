//! Ticket cookie commands.

use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use cookiegate_auth::cookie::{issue_ticket, read_ticket, write_ticket};
use cookiegate_auth::options::lifetime_from_minutes;
use cookiegate_auth::ticket::claim_types;
use cookiegate_auth::{AuthenticationTicket, ClaimsIdentity, ClaimsPrincipal};
use cookiegate_core::config::AppConfig;
use cookiegate_core::error::AppError;
use cookiegate_core::types::RequestCookies;

/// Ticket command arguments
#[derive(Debug, Args)]
pub struct TicketArgs {
    #[command(subcommand)]
    pub command: TicketCommand,
}

/// Ticket subcommands
#[derive(Debug, Subcommand)]
pub enum TicketCommand {
    /// Issue a ticket and print the resulting Set-Cookie headers
    Issue {
        /// Scheme name
        #[arg(short, long)]
        scheme: String,
        /// Subject stored as name and name identifier claims
        #[arg(long)]
        subject: String,
        /// Extra claim as type=value (repeatable)
        #[arg(long = "claim", value_parser = parse_claim)]
        claims: Vec<(String, String)>,
        /// Role claim (repeatable)
        #[arg(long = "role")]
        roles: Vec<String>,
        /// Override the scheme's ticket lifetime
        #[arg(long)]
        ttl_minutes: Option<i64>,
        /// Issue a persistent cookie with an explicit expiry
        #[arg(long)]
        persistent: bool,
        /// Render cookies for a plain HTTP request
        #[arg(long)]
        insecure: bool,
    },
    /// Decrypt and display a protected ticket
    Inspect {
        /// Scheme name
        #[arg(short, long)]
        scheme: String,
        /// Treat the value as a full Cookie request header
        #[arg(long)]
        header: bool,
        /// Print the login redirect for this URL instead of failing when
        /// no valid ticket is present
        #[arg(long)]
        return_url: Option<String>,
        /// Print the access-denied redirect if the ticket lacks this role
        #[arg(long)]
        require_role: Option<String>,
        /// Protected cookie value or Cookie header
        value: String,
    },
}

/// Issued cookie display row
#[derive(Debug, Serialize, Tabled)]
struct CookieRow {
    /// Cookie name
    name: String,
    /// Value length
    bytes: usize,
    /// Set-Cookie header
    set_cookie: String,
}

/// Claim display row
#[derive(Debug, Serialize, Tabled)]
struct ClaimRow {
    /// Claim type
    #[serde(rename = "type")]
    #[tabled(rename = "type")]
    claim_type: String,
    /// Claim value
    value: String,
    /// Issuer
    issuer: String,
}

/// Ticket summary for JSON output
#[derive(Debug, Serialize)]
struct TicketView<'a> {
    scheme: &'a str,
    name: Option<&'a str>,
    issued_utc: Option<String>,
    expires_utc: Option<String>,
    is_persistent: bool,
    claims: Vec<ClaimRow>,
}

/// Execute a ticket command
pub async fn execute(
    args: &TicketArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let registry = super::build_registry(config)?;

    match &args.command {
        TicketCommand::Issue {
            scheme,
            subject,
            claims,
            roles,
            ttl_minutes,
            persistent,
            insecure,
        } => {
            let options = registry.require(scheme)?;
            let resolved = options.resolved()?;

            let mut identity = ClaimsIdentity::new(scheme.as_str())
                .with_claim(claim_types::NAME_IDENTIFIER, subject.as_str())
                .with_claim(claim_types::NAME, subject.as_str());
            for role in roles {
                identity = identity.with_claim(claim_types::ROLE, role.as_str());
            }
            for (claim_type, value) in claims {
                identity = identity.with_claim(claim_type.as_str(), value.as_str());
            }

            let now = Utc::now();
            let mut ticket = issue_ticket(
                scheme,
                &resolved,
                ClaimsPrincipal::from_identity(identity),
                *persistent,
                now,
            );
            if let Some(minutes) = ttl_minutes {
                let lifetime = lifetime_from_minutes(*minutes)?;
                ticket.properties.expires_utc = Some(
                    now.checked_add_signed(lifetime)
                        .ok_or_else(|| AppError::configuration("--ttl-minutes is out of range"))?,
                );
            }

            let mut response = Vec::new();
            write_ticket(&resolved, &ticket, !insecure, &mut response)?;

            let rows: Vec<CookieRow> = response
                .iter()
                .map(|cookie| CookieRow {
                    name: cookie.name().to_string(),
                    bytes: cookie.value().len(),
                    set_cookie: cookie.to_string(),
                })
                .collect();
            output::print_list(&rows, format);
            Ok(())
        }
        TicketCommand::Inspect {
            scheme,
            header,
            return_url,
            require_role,
            value,
        } => {
            let options = registry.require(scheme)?;
            let resolved = options.resolved()?;

            let ticket = if *header {
                let request = RequestCookies::parse_header(value);
                tracing::debug!(cookies = request.len(), "Parsed Cookie header");
                read_ticket(&resolved, &request, Utc::now())?
            } else {
                match resolved.ticket_data_format.unprotect(value.trim()) {
                    Ok(ticket) => Some(ticket),
                    Err(e) if e.is_recoverable() && return_url.is_some() => None,
                    Err(e) => return Err(e),
                }
            };

            let Some(ticket) = ticket else {
                let Some(return_url) = return_url else {
                    return Err(AppError::invalid_ticket(format!(
                        "No valid '{}' ticket in the cookie header",
                        resolved.cookie_name
                    )));
                };
                output::print_warning("No valid ticket; request would be challenged");
                output::print_kv("Redirect", &resolved.login_redirect(return_url));
                return Ok(());
            };

            print_ticket(&ticket, format);
            if let Some(role) = require_role {
                if !ticket.principal.is_in_role(role) {
                    output::print_warning(&format!("Ticket lacks role '{role}'"));
                    output::print_kv(
                        "Redirect",
                        &resolved.access_denied_redirect(return_url.as_deref().unwrap_or("/")),
                    );
                }
            }
            Ok(())
        }
    }
}

fn print_ticket(ticket: &AuthenticationTicket, format: OutputFormat) {
    let claims: Vec<ClaimRow> = ticket
        .principal
        .claims()
        .map(|claim| ClaimRow {
            claim_type: claim.claim_type.clone(),
            value: claim.value.clone(),
            issuer: claim.issuer.clone(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let view = TicketView {
                scheme: &ticket.authentication_scheme,
                name: ticket.principal.name(),
                issued_utc: ticket.properties.issued_utc.map(|t| t.to_rfc3339()),
                expires_utc: ticket.properties.expires_utc.map(|t| t.to_rfc3339()),
                is_persistent: ticket.properties.is_persistent,
                claims,
            };
            output::print_item(&view, format);
        }
        OutputFormat::Table => {
            println!("Ticket:");
            output::print_kv("Scheme", &ticket.authentication_scheme);
            output::print_kv("Name", ticket.principal.name().unwrap_or("-"));
            output::print_kv(
                "Issued",
                &ticket
                    .properties
                    .issued_utc
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "-".into()),
            );
            output::print_kv(
                "Expires",
                &ticket
                    .expires_utc()
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "-".into()),
            );
            output::print_kv("Persistent", &ticket.properties.is_persistent.to_string());
            if ticket.is_expired() {
                output::print_warning("Ticket has expired");
            }
            println!();
            output::print_list(&claims, format);
        }
    }
}

/// Parse a `type=value` claim argument
fn parse_claim(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((claim_type, value)) if !claim_type.is_empty() => {
            Ok((claim_type.to_string(), value.to_string()))
        }
        _ => Err(format!("expected type=value, got '{raw}'")),
    }
}
