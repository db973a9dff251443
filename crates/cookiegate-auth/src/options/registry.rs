//! Resolved options for every configured scheme.

use std::collections::BTreeMap;
use std::sync::Arc;

use cookiegate_core::config::AppConfig;
use cookiegate_core::error::AppError;

use super::cookie_options::CookieAuthenticationOptions;
use super::resolver::OptionsResolver;

/// Immutable set of resolved schemes, built once at startup.
///
/// Registration takes `&mut self`, so resolution is serialized by
/// construction; afterwards the registry is shared read-only.
#[derive(Debug, Clone)]
pub struct SchemeRegistry {
    resolver: OptionsResolver,
    schemes: BTreeMap<String, Arc<CookieAuthenticationOptions>>,
}

impl SchemeRegistry {
    pub fn new(resolver: OptionsResolver) -> Self {
        Self {
            resolver,
            schemes: BTreeMap::new(),
        }
    }

    /// Resolves and registers every scheme in `config.schemes`.
    pub fn from_config(config: &AppConfig, resolver: OptionsResolver) -> Result<Self, AppError> {
        let mut registry = Self::new(resolver);
        for (name, settings) in &config.schemes {
            registry.register(name, CookieAuthenticationOptions::from_settings(settings)?)?;
        }
        tracing::info!(schemes = registry.len(), "Scheme registry built");
        Ok(registry)
    }

    /// Resolves `options` under `name` and stores them.
    ///
    /// Registering the same name twice is a composition error.
    pub fn register(
        &mut self,
        name: &str,
        mut options: CookieAuthenticationOptions,
    ) -> Result<Arc<CookieAuthenticationOptions>, AppError> {
        if self.schemes.contains_key(name) {
            return Err(AppError::fatal_configuration(format!(
                "Scheme '{name}' is already registered"
            )));
        }

        self.resolver.resolve(name, &mut options)?;
        let options = Arc::new(options);
        self.schemes.insert(name.to_string(), Arc::clone(&options));
        Ok(options)
    }

    pub fn get(&self, name: &str) -> Option<Arc<CookieAuthenticationOptions>> {
        self.schemes.get(name).cloned()
    }

    /// Like [`get`](Self::get), failing when the scheme is unknown.
    pub fn require(&self, name: &str) -> Result<Arc<CookieAuthenticationOptions>, AppError> {
        self.get(name).ok_or_else(|| {
            AppError::configuration(format!("No cookie authentication scheme named '{name}'"))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<CookieAuthenticationOptions>)> {
        self.schemes.iter().map(|(name, options)| (name.as_str(), options))
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}
