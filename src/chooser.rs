//! Converter registry and dispatch.
//!
//! [`ConverterChooser`] holds an ordered list of [`Converter`]s. For a requested
//! `(from, to)` pair it:
//!
//! 1. Strips an optional layer from `to`; matching always uses the concrete type.
//! 2. Returns the raw value unchanged when `to` already accepts `from`
//!    (identity shortcut, on by default).
//! 3. Rejects a null raw value whose declared type is not optional.
//! 4. Scans the converters in registration order and picks the first whose
//!    `can_convert` accepts the pair. Overlapping converters are the caller's
//!    problem: the first one registered always wins.
//! 5. Wraps any converter failure in [`FillfigError::ConversionFailed`], keeping
//!    the original error as its source.
//!
//! Passthrough converters receive the chooser back as a [`Dispatch`] handle and
//! use it to convert the parts of a composite value, so arbitrary nesting
//! resolves by repeated delegation.

use std::sync::Arc;

use tracing::debug;

use crate::converters::{
    KeyValuePairConverter, OptionalConverter, SequenceConverter, commonly_used_classes,
    framework_types,
};
use crate::error::FillfigError;
use crate::types::TypeTag;
use crate::value::Value;

/// Converts raw values between the type pairs it declares.
pub trait Converter: Send + Sync {
    /// Identity used in error messages and logs.
    fn name(&self) -> &str;

    fn can_convert(&self, from: &TypeTag, to: &TypeTag) -> bool;

    /// Convert `raw` (declared as `from`) into `to`.
    ///
    /// `to` is the requested type as the caller wrote it, optional layer included.
    fn convert(
        &self,
        raw: &Value,
        from: &TypeTag,
        to: &TypeTag,
        dispatch: &dyn Dispatch,
    ) -> Result<Value, FillfigError>;
}

/// Entry point converters use to delegate the conversion of nested values.
pub trait Dispatch {
    fn choose_and_convert(
        &self,
        raw: &Value,
        from: &TypeTag,
        to: &TypeTag,
    ) -> Result<Value, FillfigError>;
}

/// Ordered converter registry. Configure once, then share read-only.
pub struct ConverterChooser {
    converters: Vec<Arc<dyn Converter>>,
    identity_shortcut: bool,
}

impl ConverterChooser {
    pub fn builder() -> ConverterChooserBuilder {
        ConverterChooserBuilder::new()
    }

    /// Registry with the identity shortcut enabled.
    pub fn new(converters: Vec<Arc<dyn Converter>>) -> Result<Self, FillfigError> {
        ConverterChooserBuilder {
            converters,
            identity_shortcut: true,
        }
        .build()
    }

    /// The passthrough converters followed by the built-in leaf tables.
    pub fn standard() -> Result<Self, FillfigError> {
        Self::builder().standard_converters()?.build()
    }

    pub fn converters(&self) -> &[Arc<dyn Converter>] {
        &self.converters
    }

    /// First registered converter accepting `(from, to)`.
    pub fn choose(&self, from: &TypeTag, to: &TypeTag) -> Option<&Arc<dyn Converter>> {
        self.converters.iter().find(|c| c.can_convert(from, to))
    }
}

impl Dispatch for ConverterChooser {
    fn choose_and_convert(
        &self,
        raw: &Value,
        from: &TypeTag,
        to: &TypeTag,
    ) -> Result<Value, FillfigError> {
        let target = to.underlying();

        if self.identity_shortcut && target.is_assignable_from(from) {
            return Ok(raw.clone());
        }

        if raw.is_null() && !from.is_optional() {
            return Err(FillfigError::NullValue { to: to.clone() });
        }

        let converter = self
            .choose(from, target)
            .ok_or_else(|| FillfigError::NoSuitableConverter {
                from: from.clone(),
                to: target.clone(),
            })?;
        debug!(converter = converter.name(), %from, %to, "converting raw value");

        converter
            .convert(raw, from, to, self)
            .map_err(|source| FillfigError::ConversionFailed {
                raw: raw.to_string(),
                to: to.clone(),
                converter: converter.name().to_string(),
                source: Box::new(source),
            })
    }
}

/// Builder for [`ConverterChooser`].
pub struct ConverterChooserBuilder {
    converters: Vec<Arc<dyn Converter>>,
    identity_shortcut: bool,
}

impl ConverterChooserBuilder {
    fn new() -> Self {
        Self {
            converters: Vec::new(),
            identity_shortcut: true,
        }
    }

    /// Append a converter. Registration order is the tie-break.
    pub fn converter<C: Converter + 'static>(mut self, converter: C) -> Self {
        self.converters.push(Arc::new(converter));
        self
    }

    /// Append an already shared converter.
    pub fn shared_converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converters.push(converter);
        self
    }

    /// Append the optional, pair and sequence passthrough converters and the
    /// framework and commonly-used-classes tables, in that order.
    pub fn standard_converters(self) -> Result<Self, FillfigError> {
        Ok(self
            .converter(OptionalConverter)
            .converter(KeyValuePairConverter)
            .converter(SequenceConverter)
            .converter(framework_types()?)
            .converter(commonly_used_classes()?))
    }

    /// Enable or disable returning values unchanged when the target type
    /// already accepts them (default: `true`).
    pub fn identity_shortcut(mut self, enabled: bool) -> Self {
        self.identity_shortcut = enabled;
        self
    }

    pub fn build(self) -> Result<ConverterChooser, FillfigError> {
        if self.converters.is_empty() {
            return Err(FillfigError::InvalidArgument(
                "converter list cannot be empty".into(),
            ));
        }
        Ok(ConverterChooser {
            converters: self.converters,
            identity_shortcut: self.identity_shortcut,
        })
    }
}
