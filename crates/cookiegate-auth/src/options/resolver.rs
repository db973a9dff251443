//! Fills unset cookie authentication options with defaults.

use std::sync::Arc;

use cookiegate_core::error::AppError;
use cookiegate_core::traits::DataProtectionProvider;

use super::cookie_options::CookieAuthenticationOptions;
use crate::cookie::ChunkingCookieManager;
use crate::defaults;
use crate::format::TicketDataFormat;

/// Resolves scheme options at composition time.
///
/// Every step only touches a field that is currently unset, so resolving
/// the same options twice is a no-op and caller-supplied values always win.
#[derive(Debug, Clone)]
pub struct OptionsResolver {
    /// Process-wide provider bound to schemes that bring none of their own.
    data_protection: Option<Arc<dyn DataProtectionProvider>>,
}

impl OptionsResolver {
    /// Creates a resolver that binds `data_protection` to every scheme
    /// lacking a provider.
    pub fn new(data_protection: Arc<dyn DataProtectionProvider>) -> Self {
        Self {
            data_protection: Some(data_protection),
        }
    }

    /// Creates a resolver without a process-wide provider.
    ///
    /// Each scheme must then supply its own provider or ticket format;
    /// otherwise [`resolve`](Self::resolve) fails.
    pub fn without_data_protection() -> Self {
        Self {
            data_protection: None,
        }
    }

    /// Resolves `options` for the scheme called `name` in place.
    ///
    /// `name` may be empty, denoting the default scheme.
    ///
    /// # Errors
    ///
    /// Returns `FatalConfiguration` if a ticket format has to be built and
    /// no data protection provider is available.
    pub fn resolve(
        &self,
        name: &str,
        options: &mut CookieAuthenticationOptions,
    ) -> Result<(), AppError> {
        if options.data_protection_provider.is_none() {
            if let Some(provider) = &self.data_protection {
                tracing::debug!(scheme = name, "Binding process-wide data protection provider");
                options.data_protection_provider = Some(Arc::clone(provider));
            }
        }

        if options.cookie_name.as_deref().is_none_or(str::is_empty) {
            let cookie_name = defaults::cookie_name(name);
            tracing::debug!(scheme = name, cookie_name = %cookie_name, "Applying default cookie name");
            options.cookie_name = Some(cookie_name);
        }

        if options.ticket_data_format.is_none() {
            let provider = options.data_protection_provider.as_ref().ok_or_else(|| {
                tracing::error!(scheme = name, "No data protection provider available");
                AppError::fatal_configuration("DataProtectionProvider must be provided.")
            })?;

            // Purposes are part of the wire format; changing them orphans issued cookies.
            let purposes = defaults::ticket_purposes(name);
            let protector = provider.create_protector(&purposes).map_err(|e| {
                AppError::fatal_configuration(format!(
                    "Failed to create ticket protector for scheme '{name}': {}",
                    e.message
                ))
            })?;
            tracing::debug!(scheme = name, purposes = %purposes, "Built ticket data format");
            options.ticket_data_format = Some(Arc::new(TicketDataFormat::new(protector)));
        }

        if options.cookie_manager.is_none() {
            options.cookie_manager = Some(Arc::new(ChunkingCookieManager::default()));
        }

        if options.login_path.is_none() {
            options.login_path = Some(defaults::login_path());
        }
        if options.logout_path.is_none() {
            options.logout_path = Some(defaults::logout_path());
        }
        if options.access_denied_path.is_none() {
            options.access_denied_path = Some(defaults::access_denied_path());
        }

        tracing::info!(
            scheme = name,
            cookie_name = options.cookie_name.as_deref().unwrap_or_default(),
            "Cookie authentication options resolved"
        );
        Ok(())
    }
}
