//! Raw setting providers.
//!
//! A provider answers one question: what raw value is stored under this key?
//! `Ok(None)` means the key is unknown. Providers never convert; they hand out
//! [`Value`]s and leave typing to the converter registry.
//!
//! Two flavors exist. [`RawSettingsProvider`] answers synchronously and
//! [`AsyncRawSettingsProvider`] answers through a future. [`Provider`] holds
//! exactly one of them, so a provider is always one flavor or the other.
//!
//! | Provider | Source |
//! |----------|--------|
//! | [`EnvProvider`] | process environment, optionally prefixed |
//! | [`FnProvider`] | a sync closure |
//! | [`AsyncFnProvider`] | an async closure |
//! | [`MapProvider`] | an in-memory key/value map |
//! | [`TomlProvider`] | TOML text or files, layered |
//! | [`JsonProvider`] | JSON text or a file |

mod env;
mod func;
mod json_file;
mod toml_file;

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::bridge;
use crate::error::FillfigError;
use crate::value::Value;

pub use self::env::EnvProvider;
pub use self::func::{AsyncFnProvider, FnProvider, MapProvider};
pub use self::json_file::JsonProvider;
pub use self::toml_file::TomlProvider;

/// Synchronous raw setting lookup.
pub trait RawSettingsProvider: Send + Sync {
    /// Raw value stored under `key`, or `None` when the key is unknown.
    ///
    /// An empty key is an [`InvalidArgument`](FillfigError::InvalidArgument).
    fn get_raw_setting(&self, key: &str) -> Result<Option<Value>, FillfigError>;
}

/// Asynchronous raw setting lookup.
#[async_trait]
pub trait AsyncRawSettingsProvider: Send + Sync {
    /// Raw value stored under `key`, or `None` when the key is unknown.
    async fn get_raw_setting_async(&self, key: &str) -> Result<Option<Value>, FillfigError>;
}

/// A registered provider of either flavor.
#[derive(Clone)]
pub enum Provider {
    Sync(Arc<dyn RawSettingsProvider>),
    Async(Arc<dyn AsyncRawSettingsProvider>),
}

impl Provider {
    pub fn from_sync<P: RawSettingsProvider + 'static>(provider: P) -> Self {
        Provider::Sync(Arc::new(provider))
    }

    pub fn from_async<P: AsyncRawSettingsProvider + 'static>(provider: P) -> Self {
        Provider::Async(Arc::new(provider))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Provider::Async(_))
    }

    /// Lookup from synchronous code. Async providers are driven to completion
    /// on the current Tokio runtime, or on a private one when none is running.
    pub fn fetch_blocking(&self, key: &str) -> Result<Option<Value>, FillfigError> {
        match self {
            Provider::Sync(p) => p.get_raw_setting(key),
            Provider::Async(p) => bridge::block_on(p.get_raw_setting_async(key))?,
        }
    }

    /// Lookup from async code. Sync providers are called inline.
    pub async fn fetch(&self, key: &str) -> Result<Option<Value>, FillfigError> {
        match self {
            Provider::Sync(p) => p.get_raw_setting(key),
            Provider::Async(p) => p.get_raw_setting_async(key).await,
        }
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Sync(_) => f.write_str("Provider::Sync"),
            Provider::Async(_) => f.write_str("Provider::Async"),
        }
    }
}

/// Named providers in registration order, plus an optional default.
///
/// When no default is named, the first registered provider is the default.
#[derive(Debug, Clone, Default)]
pub struct Providers {
    by_name: IndexMap<String, Provider>,
    default: Option<String>,
}

impl Providers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a provider under `name`.
    pub fn insert(&mut self, name: impl Into<String>, provider: Provider) {
        self.by_name.insert(name.into(), provider);
    }

    pub fn with(mut self, name: impl Into<String>, provider: Provider) -> Self {
        self.insert(name, provider);
        self
    }

    /// Name the provider used by members that don't pick one.
    pub fn default_provider(mut self, name: impl Into<String>) -> Self {
        self.default = Some(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Result<&Provider, FillfigError> {
        self.by_name.get(name).ok_or_else(|| self.not_found(name))
    }

    fn not_found(&self, name: &str) -> FillfigError {
        FillfigError::ProviderNotFound {
            name: name.to_string(),
            available: self.by_name.keys().cloned().collect(),
        }
    }

    /// Name of the default provider.
    pub fn default_name(&self) -> Option<&str> {
        self.default
            .as_deref()
            .or_else(|| self.by_name.keys().next().map(String::as_str))
    }

    /// Provider for `requested`, or the default when `requested` is absent or empty.
    pub fn resolve(&self, requested: Option<&str>) -> Result<(&str, &Provider), FillfigError> {
        let name = match requested.filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => self.default_name().ok_or_else(|| {
                FillfigError::InvalidArgument("no providers registered".into())
            })?,
        };
        let (name, provider) = self
            .by_name
            .get_key_value(name)
            .ok_or_else(|| self.not_found(name))?;
        Ok((name.as_str(), provider))
    }

    /// Check that the set can serve lookups: at least one provider, and a
    /// named default that exists.
    pub fn validate(&self) -> Result<(), FillfigError> {
        if self.is_empty() {
            return Err(FillfigError::InvalidArgument(
                "provider set cannot be empty".into(),
            ));
        }
        if let Some(name) = &self.default {
            self.get(name)?;
        }
        Ok(())
    }
}
