//! Conversions for commonly used non-primitive classes.

use std::fmt;

use url::Url;

use super::table::ConverterTable;
use crate::error::FillfigError;
use crate::types::{CustomType, TypeTag};
use crate::value::{SettingValue, Value, mismatch};

/// An e-mail address with an optional display name.
///
/// Parsed from `"address"` or `"Display Name#address"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MailAddress {
    display_name: Option<String>,
    address: String,
}

impl MailAddress {
    pub fn custom_type() -> CustomType {
        CustomType::new("MailAddress")
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        let parts: Vec<&str> = s
            .split('#')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        let (display_name, address) = match parts.as_slice() {
            [address] => (None, *address),
            [name, address] => (Some(name.to_string()), *address),
            _ => return Err("expected 'address' or 'name#address'".into()),
        };
        validate_address(address)?;
        Ok(Self {
            display_name,
            address: address.to_string(),
        })
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

fn validate_address(address: &str) -> Result<(), String> {
    match address.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !address.contains(char::is_whitespace) =>
        {
            Ok(())
        }
        _ => Err(format!("'{address}' is not a valid e-mail address")),
    }
}

impl fmt::Display for MailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_name {
            Some(name) => write!(f, "{name} <{}>", self.address),
            None => f.write_str(&self.address),
        }
    }
}

impl SettingValue for MailAddress {
    fn type_tag() -> TypeTag {
        TypeTag::custom(Self::custom_type())
    }

    fn from_value(value: Value) -> Result<Self, FillfigError> {
        if let Value::Custom(custom) = &value
            && let Some(mail) = custom.downcast::<MailAddress>()
        {
            return Ok((*mail).clone());
        }
        Err(mismatch::<Self>(&value))
    }
}

/// String to [`Url`] and string to [`MailAddress`].
pub fn commonly_used_classes() -> Result<ConverterTable, FillfigError> {
    ConverterTable::new("commonly_used_classes")
        .with(TypeTag::String, TypeTag::Url, |raw, _| {
            let s = raw.as_str().ok_or("expected a string")?;
            Url::parse(s.trim()).map(Value::Url).map_err(|e| e.to_string())
        })?
        .with(TypeTag::String, MailAddress::type_tag(), |raw, _| {
            let s = raw.as_str().ok_or("expected a string")?;
            MailAddress::parse(s).map(|m| Value::custom(MailAddress::custom_type(), m))
        })
}
