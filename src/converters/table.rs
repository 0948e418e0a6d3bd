//! Capability tables for leaf conversions.
//!
//! A [`ConverterTable`] maps `(from, to)` pairs to conversion functions. Lookup
//! is exact first. Failing that, the first registered capability that covers
//! the request covariantly wins: the declared source must accept the requested
//! source, and the requested target must accept the declared result.

use std::sync::Arc;

use crate::chooser::{Converter, Dispatch};
use crate::error::FillfigError;
use crate::types::TypeTag;
use crate::value::Value;

/// Conversion function of a capability. Receives the raw value and the
/// concrete target type; an `Err` carries the human readable reason.
pub type ConvertFn = Arc<dyn Fn(&Value, &TypeTag) -> Result<Value, String> + Send + Sync>;

struct Capability {
    from: TypeTag,
    to: TypeTag,
    convert: ConvertFn,
}

impl Capability {
    fn covers(&self, from: &TypeTag, to: &TypeTag) -> bool {
        self.from.is_assignable_from(from) && to.is_assignable_from(&self.to)
    }
}

/// Named set of `(from, to)` conversions.
pub struct ConverterTable {
    name: String,
    capabilities: Vec<Capability>,
}

impl ConverterTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: Vec::new(),
        }
    }

    /// Register a capability. A second registration of the same pair fails.
    pub fn add<F>(&mut self, from: TypeTag, to: TypeTag, convert: F) -> Result<(), FillfigError>
    where
        F: Fn(&Value, &TypeTag) -> Result<Value, String> + Send + Sync + 'static,
    {
        if self
            .capabilities
            .iter()
            .any(|c| c.from == from && c.to == to)
        {
            return Err(FillfigError::DuplicateCapability {
                converter: self.name.clone(),
                from,
                to,
            });
        }
        self.capabilities.push(Capability {
            from,
            to,
            convert: Arc::new(convert),
        });
        Ok(())
    }

    /// Chaining form of [`add`](Self::add).
    pub fn with<F>(mut self, from: TypeTag, to: TypeTag, convert: F) -> Result<Self, FillfigError>
    where
        F: Fn(&Value, &TypeTag) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.add(from, to, convert)?;
        Ok(self)
    }

    /// Declared `(from, to)` pairs in registration order.
    pub fn capabilities(&self) -> impl Iterator<Item = (&TypeTag, &TypeTag)> {
        self.capabilities.iter().map(|c| (&c.from, &c.to))
    }

    fn find(&self, from: &TypeTag, to: &TypeTag) -> Option<&Capability> {
        self.capabilities
            .iter()
            .find(|c| &c.from == from && &c.to == to)
            .or_else(|| self.capabilities.iter().find(|c| c.covers(from, to)))
    }
}

impl Converter for ConverterTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_convert(&self, from: &TypeTag, to: &TypeTag) -> bool {
        self.find(from, to).is_some()
    }

    fn convert(
        &self,
        raw: &Value,
        from: &TypeTag,
        to: &TypeTag,
        _dispatch: &dyn Dispatch,
    ) -> Result<Value, FillfigError> {
        let target = to.underlying();
        if raw.is_null() {
            return Err(FillfigError::NullValue { to: to.clone() });
        }
        let capability =
            self.find(from, target)
                .ok_or_else(|| FillfigError::NoSuitableConverter {
                    from: from.clone(),
                    to: target.clone(),
                })?;
        (capability.convert)(raw, target).map_err(|reason| FillfigError::InvalidValue {
            raw: raw.to_string(),
            to: target.clone(),
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chooser::ConverterChooser;
    use crate::types::CustomType;

    fn a() -> TypeTag {
        TypeTag::custom(CustomType::new("A"))
    }

    fn b() -> TypeTag {
        TypeTag::custom(CustomType::new("B").extends("A"))
    }

    fn c() -> TypeTag {
        TypeTag::custom(CustomType::new("C").extends("B").extends("A"))
    }

    fn passthrough(raw: &Value, _: &TypeTag) -> Result<Value, String> {
        Ok(raw.clone())
    }

    #[test]
    fn duplicate_capability_rejected() {
        let mut table = ConverterTable::new("t");
        table.add(TypeTag::String, TypeTag::I32, passthrough).unwrap();
        let err = table
            .add(TypeTag::String, TypeTag::I32, passthrough)
            .unwrap_err();
        match err {
            FillfigError::DuplicateCapability { converter, from, to } => {
                assert_eq!(converter, "t");
                assert_eq!(from, TypeTag::String);
                assert_eq!(to, TypeTag::I32);
            }
            other => panic!("Expected DuplicateCapability, got: {other:?}"),
        }
    }

    #[test]
    fn exact_capability() {
        let table = ConverterTable::new("t")
            .with(TypeTag::String, TypeTag::I32, passthrough)
            .unwrap();
        assert!(table.can_convert(&TypeTag::String, &TypeTag::I32));
        assert!(!table.can_convert(&TypeTag::String, &TypeTag::I64));
        assert!(!table.can_convert(&TypeTag::I32, &TypeTag::String));
    }

    #[test]
    fn from_covariance() {
        let table = ConverterTable::new("t").with(a(), TypeTag::String, passthrough).unwrap();
        assert!(table.can_convert(&b(), &TypeTag::String));
        assert!(table.can_convert(&c(), &TypeTag::String));
    }

    #[test]
    fn to_covariance() {
        let table = ConverterTable::new("t").with(TypeTag::String, c(), passthrough).unwrap();
        assert!(table.can_convert(&TypeTag::String, &a()));
        assert!(table.can_convert(&TypeTag::String, &b()));
        assert!(table.can_convert(&TypeTag::String, &c()));
    }

    #[test]
    fn no_contravariance() {
        let table = ConverterTable::new("t").with(c(), a(), passthrough).unwrap();
        assert!(!table.can_convert(&a(), &a()));
        assert!(!table.can_convert(&c(), &c()));
    }

    #[test]
    fn exact_match_preferred_over_earlier_covariant_one() {
        let table = ConverterTable::new("t")
            .with(TypeTag::String, TypeTag::I32, |_, _| Ok(Value::I32(1)))
            .unwrap()
            .with(TypeTag::String, TypeTag::Convertible, |_, _| Ok(Value::I32(2)))
            .unwrap();
        let chooser = ConverterChooser::builder()
            .converter(table)
            .identity_shortcut(false)
            .build()
            .unwrap();
        let converted = chooser
            .choose_and_convert(&Value::from("x"), &TypeTag::String, &TypeTag::Convertible)
            .unwrap();
        assert_eq!(converted, Value::I32(2));
    }

    #[test]
    fn failed_function_reports_invalid_value() {
        let table = ConverterTable::new("t")
            .with(TypeTag::String, TypeTag::I32, |_, _| Err("nope".to_string()))
            .unwrap();
        let chooser = ConverterChooser::new(vec![Arc::new(table)]).unwrap();
        let err = table_err(&chooser);
        assert!(err.contains("nope"), "unexpected: {err}");
    }

    fn table_err(chooser: &ConverterChooser) -> String {
        use std::error::Error;
        let err = chooser
            .choose_and_convert(&Value::from("x"), &TypeTag::String, &TypeTag::I32)
            .unwrap_err();
        err.source().map(|s| s.to_string()).unwrap_or_default()
    }
}
