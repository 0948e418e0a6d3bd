use std::path::PathBuf;
use thiserror::Error;

use crate::types::TypeTag;

#[derive(Debug, Error)]
pub enum FillfigError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No suitable converter from {from} to {to}")]
    NoSuitableConverter { from: TypeTag, to: TypeTag },

    #[error("Raw value is null and cannot be converted to {to}")]
    NullValue { to: TypeTag },

    #[error("Raw value {raw} cannot be converted to {to} with converter '{converter}'")]
    ConversionFailed {
        raw: String,
        to: TypeTag,
        converter: String,
        #[source]
        source: Box<FillfigError>,
    },

    #[error("Invalid value {raw} for {to}: {reason}")]
    InvalidValue {
        raw: String,
        to: TypeTag,
        reason: String,
    },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: TypeTag, found: TypeTag },

    #[error("Cannot build a list, set or map assignable to {to}")]
    UnsupportedTargetShape { to: TypeTag },

    #[error("Raw value of type {found} is not iterable")]
    NotIterable { found: TypeTag },

    #[error("Duplicate map key {key}")]
    DuplicateMapKey { key: String },

    #[error("Provider '{name}' not found (available: {})", available.join(", "))]
    ProviderNotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("Required setting '{member}' (key '{key}') returned no value")]
    RequiredSettingMissing { member: String, key: String },

    #[error("Conversion of required setting '{member}' (key '{key}') failed")]
    RequiredSettingConversionFailed {
        member: String,
        key: String,
        #[source]
        source: Box<FillfigError>,
    },

    #[error("Member '{member}' is marked to be filled but has no setter")]
    MemberNotWritable { member: String },

    #[error("Converter '{converter}' already supports {from} -> {to}")]
    DuplicateCapability {
        converter: String,
        from: TypeTag,
        to: TypeTag,
    },

    #[error("Provider '{provider}' failed for key '{key}': {reason}")]
    ProviderFailed {
        provider: String,
        key: String,
        reason: String,
    },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Cannot block on an async provider: {0}")]
    BlockingBridge(String),
}

impl FillfigError {
    /// Error for an empty retrieval key, shared by every provider.
    pub fn empty_key() -> Self {
        FillfigError::InvalidArgument("key cannot be empty".into())
    }
}
