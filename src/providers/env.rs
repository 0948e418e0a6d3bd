use std::collections::HashMap;
use std::env::VarError;

use super::RawSettingsProvider;
use crate::error::FillfigError;
use crate::value::Value;

/// Reads settings from environment variables.
///
/// The variable name is `{prefix}{key}`, with every `:` in the key replaced by
/// a double underscore: `Database:Url` reads `Database__Url`. Case is kept as is.
#[derive(Debug, Clone, Default)]
pub struct EnvProvider {
    prefix: String,
    snapshot: Option<HashMap<String, String>>,
}

impl EnvProvider {
    /// Reads the live process environment on every lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads from a fixed set of variables instead of the process environment.
    ///
    /// Takes an iterator so tests can pass synthetic data instead of `std::env::vars()`.
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            prefix: String::new(),
            snapshot: Some(vars.into_iter().collect()),
        }
    }

    /// Prepend `prefix` to every variable name.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn variable_name(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key.replace(':', "__"))
    }
}

impl RawSettingsProvider for EnvProvider {
    fn get_raw_setting(&self, key: &str) -> Result<Option<Value>, FillfigError> {
        if key.is_empty() {
            return Err(FillfigError::empty_key());
        }
        let name = self.variable_name(key);
        if let Some(vars) = &self.snapshot {
            return Ok(vars.get(&name).map(|v| Value::String(v.clone())));
        }
        match std::env::var(&name) {
            Ok(v) => Ok(Some(Value::String(v))),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(FillfigError::ProviderFailed {
                provider: "env".into(),
                key: key.to_string(),
                reason: format!("variable {name} is not valid unicode"),
            }),
        }
    }
}
