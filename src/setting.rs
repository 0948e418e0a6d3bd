//! The optional [`Setting`] wrapper and the metadata it carries.

use std::ops::Deref;

use serde::Serialize;

/// How a single member was resolved during one fill.
///
/// `has_value_specified` is true only when the provider returned a value and
/// that value converted successfully. Built fresh for every resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettingMetadata {
    key: String,
    is_required: bool,
    has_value_specified: bool,
}

impl SettingMetadata {
    pub fn new(key: impl Into<String>, is_required: bool, has_value_specified: bool) -> Self {
        Self {
            key: key.into(),
            is_required,
            has_value_specified,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_required(&self) -> bool {
        self.is_required
    }

    pub fn has_value_specified(&self) -> bool {
        self.has_value_specified
    }
}

/// A member value paired with the metadata of its resolution.
///
/// Declaring a member as `Setting<T>` instead of `T` lets the caller tell a
/// value that came from a provider apart from a fallback default.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Setting<T> {
    value: T,
    metadata: SettingMetadata,
}

impl<T> Setting<T> {
    pub fn new(value: T, metadata: SettingMetadata) -> Self {
        Self { value, metadata }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn metadata(&self) -> &SettingMetadata {
        &self.metadata
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub(crate) fn set_metadata(&mut self, metadata: SettingMetadata) {
        self.metadata = metadata;
    }
}

impl<T> Deref for Setting<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deref_reaches_value() {
        let setting = Setting::new(vec![1, 2], SettingMetadata::new("List", true, true));
        assert_eq!(setting.len(), 2);
        assert_eq!(setting.metadata().key(), "List");
    }

    #[test]
    fn serializes_value_and_metadata() {
        let setting = Setting::new(8080u16, SettingMetadata::new("Port", false, true));
        let json = serde_json::to_value(&setting).unwrap();
        assert_eq!(json["value"], 8080);
        assert_eq!(json["metadata"]["key"], "Port");
        assert_eq!(json["metadata"]["has_value_specified"], true);
    }
}
