//! Raw and intermediate values, and the mapping between them and Rust field types.
//!
//! Providers hand out [`Value`]s; converters turn one `Value` into another; the
//! [`SettingValue`] trait finally moves the converted `Value` into a typed field.
//! Each `Value` knows its own runtime [`TypeTag`] so the converter registry can
//! pick a converter without reflection.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use url::Url;
use uuid::Uuid;

use crate::error::FillfigError;
use crate::types::{CustomType, TypeTag};

/// A value of a user-defined type, shared behind an `Arc`.
#[derive(Clone)]
pub struct CustomValue {
    ty: CustomType,
    payload: Arc<dyn Any + Send + Sync>,
}

impl CustomValue {
    pub fn custom_type(&self) -> &CustomType {
        &self.ty
    }

    pub fn downcast<C: Any + Send + Sync>(&self) -> Option<Arc<C>> {
        Arc::clone(&self.payload).downcast::<C>().ok()
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomValue({})", self.ty.name())
    }
}

/// Tagged union of everything a provider or converter can produce.
///
/// `Null` stands for an absent optional value. Its runtime type is
/// `option<any>`, which routes it to the optional converter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Uuid(Uuid),
    Duration(Duration),
    Date(NaiveDate),
    NaiveDateTime(NaiveDateTime),
    DateTime(DateTime<FixedOffset>),
    Url(Url),
    Path(PathBuf),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Pair(Box<Value>, Box<Value>),
    Custom(CustomValue),
}

impl Value {
    pub fn pair(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Value::Pair(Box::new(key.into()), Box::new(value.into()))
    }

    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn custom<C: Any + Send + Sync>(ty: CustomType, payload: C) -> Self {
        Value::Custom(CustomValue {
            ty,
            payload: Arc::new(payload),
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Runtime type of this value.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::optional(TypeTag::Any),
            Value::Bool(_) => TypeTag::Bool,
            Value::Char(_) => TypeTag::Char,
            Value::I8(_) => TypeTag::I8,
            Value::I16(_) => TypeTag::I16,
            Value::I32(_) => TypeTag::I32,
            Value::I64(_) => TypeTag::I64,
            Value::U8(_) => TypeTag::U8,
            Value::U16(_) => TypeTag::U16,
            Value::U32(_) => TypeTag::U32,
            Value::U64(_) => TypeTag::U64,
            Value::F32(_) => TypeTag::F32,
            Value::F64(_) => TypeTag::F64,
            Value::String(_) => TypeTag::String,
            Value::Uuid(_) => TypeTag::Uuid,
            Value::Duration(_) => TypeTag::Duration,
            Value::Date(_) => TypeTag::Date,
            Value::NaiveDateTime(_) => TypeTag::NaiveDateTime,
            Value::DateTime(_) => TypeTag::DateTime,
            Value::Url(_) => TypeTag::Url,
            Value::Path(_) => TypeTag::Path,
            Value::List(items) => TypeTag::list(common_type(items.iter())),
            Value::Set(items) => TypeTag::set(common_type(items.iter())),
            Value::Map(pairs) => TypeTag::map(
                common_type(pairs.iter().map(|(k, _)| k)),
                common_type(pairs.iter().map(|(_, v)| v)),
            ),
            Value::Pair(k, v) => TypeTag::pair(k.type_tag(), v.type_tag()),
            Value::Custom(c) => TypeTag::Custom(c.ty.clone()),
        }
    }

    /// Elements of an iterable value. Maps yield their entries as pairs.
    pub fn elements(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) | Value::Set(items) => Some(items.clone()),
            Value::Map(pairs) => Some(
                pairs
                    .iter()
                    .map(|(k, v)| Value::pair(k.clone(), v.clone()))
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// The shared element type of `items`, or `Any` when they disagree or there are none.
fn common_type<'a>(mut items: impl Iterator<Item = &'a Value>) -> TypeTag {
    let Some(first) = items.next() else {
        return TypeTag::Any;
    };
    let tag = first.type_tag();
    if items.all(|item| item.type_tag() == tag) {
        tag
    } else {
        TypeTag::Any
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v:?}"),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Duration(v) => write!(f, "{v:?}"),
            Value::Date(v) => write!(f, "{v}"),
            Value::NaiveDateTime(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Url(v) => write!(f, "{v}"),
            Value::Path(v) => write!(f, "{}", v.display()),
            Value::List(items) | Value::Set(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(pairs) => {
                f.write_str("{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Pair(k, v) => write!(f, "({k}, {v})"),
            Value::Custom(c) => write!(f, "<{}>", c.ty.name()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl<K: Into<Value>, V: Into<Value>> From<(K, V)> for Value {
    fn from((key, value): (K, V)) -> Self {
        Value::pair(key, value)
    }
}

/// A Rust type that a member can be declared as.
///
/// `zero` is the value assigned when an optional member cannot be resolved.
/// Types with no natural default return `None`, and the member keeps whatever
/// value it was constructed with.
pub trait SettingValue: Sized {
    fn type_tag() -> TypeTag;

    fn from_value(value: Value) -> Result<Self, FillfigError>;

    fn zero() -> Option<Self> {
        None
    }
}

/// Build the error for a value that does not fit `T`.
pub fn mismatch<T: SettingValue>(found: &Value) -> FillfigError {
    FillfigError::TypeMismatch {
        expected: T::type_tag(),
        found: found.type_tag(),
    }
}

macro_rules! leaf_value {
    ($ty:ty, $variant:ident, $zero:expr) => {
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::$variant(value)
            }
        }

        impl SettingValue for $ty {
            fn type_tag() -> TypeTag {
                TypeTag::$variant
            }

            fn from_value(value: Value) -> Result<Self, FillfigError> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(mismatch::<Self>(&other)),
                }
            }

            fn zero() -> Option<Self> {
                $zero
            }
        }
    };
}

leaf_value!(bool, Bool, Some(false));
leaf_value!(char, Char, Some('\0'));
leaf_value!(i8, I8, Some(0));
leaf_value!(i16, I16, Some(0));
leaf_value!(i32, I32, Some(0));
leaf_value!(i64, I64, Some(0));
leaf_value!(u8, U8, Some(0));
leaf_value!(u16, U16, Some(0));
leaf_value!(u32, U32, Some(0));
leaf_value!(u64, U64, Some(0));
leaf_value!(f32, F32, Some(0.0));
leaf_value!(f64, F64, Some(0.0));
leaf_value!(String, String, Some(String::new()));
leaf_value!(Uuid, Uuid, Some(Uuid::nil()));
leaf_value!(Duration, Duration, Some(Duration::ZERO));
leaf_value!(NaiveDate, Date, None);
leaf_value!(NaiveDateTime, NaiveDateTime, None);
leaf_value!(DateTime<FixedOffset>, DateTime, None);
leaf_value!(Url, Url, None);
leaf_value!(PathBuf, Path, Some(PathBuf::new()));

impl SettingValue for usize {
    fn type_tag() -> TypeTag {
        TypeTag::U64
    }

    fn from_value(value: Value) -> Result<Self, FillfigError> {
        match value {
            Value::U64(v) => usize::try_from(v).map_err(|e| FillfigError::InvalidValue {
                raw: v.to_string(),
                to: TypeTag::U64,
                reason: e.to_string(),
            }),
            other => Err(mismatch::<Self>(&other)),
        }
    }

    fn zero() -> Option<Self> {
        Some(0)
    }
}

impl SettingValue for Value {
    fn type_tag() -> TypeTag {
        TypeTag::Any
    }

    fn from_value(value: Value) -> Result<Self, FillfigError> {
        Ok(value)
    }

    fn zero() -> Option<Self> {
        Some(Value::Null)
    }
}

impl<T: SettingValue> SettingValue for Option<T> {
    fn type_tag() -> TypeTag {
        TypeTag::optional(T::type_tag())
    }

    fn from_value(value: Value) -> Result<Self, FillfigError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn zero() -> Option<Self> {
        Some(None)
    }
}

fn items_of<T: SettingValue>(value: Value) -> Result<Vec<Value>, FillfigError> {
    match value {
        Value::List(items) | Value::Set(items) => Ok(items),
        other => Err(mismatch::<T>(&other)),
    }
}

fn entries_of<T: SettingValue>(value: Value) -> Result<Vec<(Value, Value)>, FillfigError> {
    match value {
        Value::Map(pairs) => Ok(pairs),
        other => Err(mismatch::<T>(&other)),
    }
}

impl<T: SettingValue> SettingValue for Vec<T> {
    fn type_tag() -> TypeTag {
        TypeTag::list(T::type_tag())
    }

    fn from_value(value: Value) -> Result<Self, FillfigError> {
        items_of::<Self>(value)?
            .into_iter()
            .map(T::from_value)
            .collect()
    }

    fn zero() -> Option<Self> {
        Some(Vec::new())
    }
}

impl<T: SettingValue + Eq + Hash> SettingValue for HashSet<T> {
    fn type_tag() -> TypeTag {
        TypeTag::set(T::type_tag())
    }

    fn from_value(value: Value) -> Result<Self, FillfigError> {
        items_of::<Self>(value)?
            .into_iter()
            .map(T::from_value)
            .collect()
    }

    fn zero() -> Option<Self> {
        Some(HashSet::new())
    }
}

impl<T: SettingValue + Ord> SettingValue for BTreeSet<T> {
    fn type_tag() -> TypeTag {
        TypeTag::set(T::type_tag())
    }

    fn from_value(value: Value) -> Result<Self, FillfigError> {
        items_of::<Self>(value)?
            .into_iter()
            .map(T::from_value)
            .collect()
    }

    fn zero() -> Option<Self> {
        Some(BTreeSet::new())
    }
}

impl<K: SettingValue + Eq + Hash, V: SettingValue> SettingValue for HashMap<K, V> {
    fn type_tag() -> TypeTag {
        TypeTag::map(K::type_tag(), V::type_tag())
    }

    fn from_value(value: Value) -> Result<Self, FillfigError> {
        entries_of::<Self>(value)?
            .into_iter()
            .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
            .collect()
    }

    fn zero() -> Option<Self> {
        Some(HashMap::new())
    }
}

impl<K: SettingValue + Ord, V: SettingValue> SettingValue for BTreeMap<K, V> {
    fn type_tag() -> TypeTag {
        TypeTag::map(K::type_tag(), V::type_tag())
    }

    fn from_value(value: Value) -> Result<Self, FillfigError> {
        entries_of::<Self>(value)?
            .into_iter()
            .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
            .collect()
    }

    fn zero() -> Option<Self> {
        Some(BTreeMap::new())
    }
}

impl<K: SettingValue + Eq + Hash, V: SettingValue> SettingValue for IndexMap<K, V> {
    fn type_tag() -> TypeTag {
        TypeTag::map(K::type_tag(), V::type_tag())
    }

    fn from_value(value: Value) -> Result<Self, FillfigError> {
        entries_of::<Self>(value)?
            .into_iter()
            .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
            .collect()
    }

    fn zero() -> Option<Self> {
        Some(IndexMap::new())
    }
}

impl<K: SettingValue, V: SettingValue> SettingValue for (K, V) {
    fn type_tag() -> TypeTag {
        TypeTag::pair(K::type_tag(), V::type_tag())
    }

    fn from_value(value: Value) -> Result<Self, FillfigError> {
        match value {
            Value::Pair(k, v) => Ok((K::from_value(*k)?, V::from_value(*v)?)),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_of_strings_has_string_elements() {
        let value = Value::list(["1", "2"]);
        assert_eq!(value.type_tag(), TypeTag::list(TypeTag::String));
    }

    #[test]
    fn mixed_list_has_any_elements() {
        let value = Value::List(vec![Value::from("1"), Value::from(2i32)]);
        assert_eq!(value.type_tag(), TypeTag::list(TypeTag::Any));
    }

    #[test]
    fn empty_list_has_any_elements() {
        assert_eq!(Value::List(vec![]).type_tag(), TypeTag::list(TypeTag::Any));
    }

    #[test]
    fn null_is_optional_any() {
        assert_eq!(Value::Null.type_tag(), TypeTag::optional(TypeTag::Any));
    }

    #[test]
    fn map_elements_are_pairs() {
        let map = Value::Map(vec![(Value::from("a"), Value::from(1i32))]);
        assert_eq!(map.elements(), Some(vec![Value::pair("a", 1i32)]));
        assert_eq!(Value::from("a").elements(), None);
    }

    #[test]
    fn leaf_from_value_rejects_other_variant() {
        let err = i32::from_value(Value::from("1")).unwrap_err();
        assert!(matches!(
            err,
            FillfigError::TypeMismatch {
                expected: TypeTag::I32,
                found: TypeTag::String
            }
        ));
    }

    #[test]
    fn option_from_null_is_none() {
        assert_eq!(Option::<i32>::from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i32>::from_value(Value::I32(4)).unwrap(), Some(4));
    }

    #[test]
    fn nested_map_from_value() {
        let value = Value::Map(vec![(
            Value::from("a"),
            Value::List(vec![Value::I32(1), Value::I32(2)]),
        )]);
        let map = HashMap::<String, Vec<i32>>::from_value(value).unwrap();
        assert_eq!(map["a"], vec![1, 2]);
    }

    #[test]
    fn zero_values() {
        assert_eq!(i32::zero(), Some(0));
        assert_eq!(String::zero(), Some(String::new()));
        assert_eq!(Option::<u8>::zero(), Some(None));
        assert_eq!(Url::zero(), None);
        assert_eq!(Vec::<i32>::zero(), Some(vec![]));
    }

    #[test]
    fn custom_value_downcasts() {
        #[derive(Debug, PartialEq)]
        struct Token(u8);

        let value = Value::custom(CustomType::new("Token"), Token(7));
        let Value::Custom(custom) = &value else {
            panic!("expected custom value");
        };
        assert_eq!(*custom.downcast::<Token>().unwrap(), Token(7));
        assert!(custom.downcast::<String>().is_none());
        assert_eq!(value.type_tag().to_string(), "Token");
    }
}
