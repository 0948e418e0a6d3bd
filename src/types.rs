//! Runtime type descriptors and the assignability relation between them.
//!
//! Rust has no runtime covariance checks, so every type that takes part in a
//! fill is described by a [`TypeTag`]. The tag tree mirrors the declared type of
//! a member (`Option<Vec<u16>>` is `Optional(List(U16))`) and the runtime type of
//! a raw [`Value`](crate::value::Value).
//!
//! [`TypeTag::is_assignable_from`] is the single subtype relation used by the
//! converter registry:
//!
//! | Target | Accepts |
//! |--------|---------|
//! | any tag `T` | `T` itself |
//! | `Any` | everything |
//! | `Convertible` | scalar leaves (bool, char, numbers, string, naive date-time) |
//! | `Custom(a)` | `Custom(b)` when `b` is `a` or lists `a` among its ancestors |
//! | `Sequence<E>` | `List<E>`, `Set<E>`, `Collection<E>`, `Deque<E>`, `Sequence<E>`, and `Map<K, V>` when `E` is `Pair<K, V>` |
//! | `Collection<E>` | `List<E>`, `Set<E>`, and `Map<K, V>` when `E` is `Pair<K, V>` |
//! | `Optional<T>` | `U` and `Optional<U>` whenever `T` accepts `U` |
//!
//! Element types are invariant: `Sequence<Any>` does not accept `List<I32>`.

use std::fmt;

/// A user-defined type taking part in covariance checks.
///
/// `ancestors` lists every supertype by name, nearest first. A converter
/// declared for an ancestor can serve the descendant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomType {
    name: &'static str,
    ancestors: Vec<&'static str>,
}

impl CustomType {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ancestors: Vec::new(),
        }
    }

    /// Declare a supertype. Call once per ancestor, nearest first.
    pub fn extends(mut self, ancestor: &'static str) -> Self {
        self.ancestors.push(ancestor);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ancestors(&self) -> &[&'static str] {
        &self.ancestors
    }

    fn is_or_extends(&self, name: &str) -> bool {
        self.name == name || self.ancestors.contains(&name)
    }
}

/// Runtime description of a settings type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Top type; every tag is assignable to it.
    Any,
    /// Interface implemented by every scalar leaf.
    Convertible,
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    Uuid,
    Duration,
    Date,
    NaiveDateTime,
    DateTime,
    Url,
    Path,
    /// Read-only iterable interface.
    Sequence(Box<TypeTag>),
    /// Mutable collection interface, implemented by list, set and map.
    Collection(Box<TypeTag>),
    List(Box<TypeTag>),
    Set(Box<TypeTag>),
    /// Double-ended queue. Iterable, but never built by the sequence converter.
    Deque(Box<TypeTag>),
    Map(Box<TypeTag>, Box<TypeTag>),
    Pair(Box<TypeTag>, Box<TypeTag>),
    Optional(Box<TypeTag>),
    Setting(Box<TypeTag>),
    Custom(CustomType),
}

impl TypeTag {
    pub fn sequence(element: TypeTag) -> Self {
        TypeTag::Sequence(Box::new(element))
    }

    pub fn collection(element: TypeTag) -> Self {
        TypeTag::Collection(Box::new(element))
    }

    pub fn list(element: TypeTag) -> Self {
        TypeTag::List(Box::new(element))
    }

    pub fn set(element: TypeTag) -> Self {
        TypeTag::Set(Box::new(element))
    }

    pub fn deque(element: TypeTag) -> Self {
        TypeTag::Deque(Box::new(element))
    }

    pub fn map(key: TypeTag, value: TypeTag) -> Self {
        TypeTag::Map(Box::new(key), Box::new(value))
    }

    pub fn pair(key: TypeTag, value: TypeTag) -> Self {
        TypeTag::Pair(Box::new(key), Box::new(value))
    }

    pub fn optional(inner: TypeTag) -> Self {
        TypeTag::Optional(Box::new(inner))
    }

    pub fn setting(inner: TypeTag) -> Self {
        TypeTag::Setting(Box::new(inner))
    }

    pub fn custom(custom: CustomType) -> Self {
        TypeTag::Custom(custom)
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeTag::Optional(_))
    }

    /// Strip one optional layer, if present.
    pub fn underlying(&self) -> &TypeTag {
        match self {
            TypeTag::Optional(inner) => inner,
            other => other,
        }
    }

    /// Strip the setting wrapper, if present.
    pub fn unwrap_setting(&self) -> &TypeTag {
        match self {
            TypeTag::Setting(inner) => inner,
            other => other,
        }
    }

    /// Element type when this tag is iterable. Maps iterate as pairs.
    pub fn element_type(&self) -> Option<TypeTag> {
        match self {
            TypeTag::Sequence(e)
            | TypeTag::Collection(e)
            | TypeTag::List(e)
            | TypeTag::Set(e)
            | TypeTag::Deque(e) => Some((**e).clone()),
            TypeTag::Map(k, v) => Some(TypeTag::Pair(k.clone(), v.clone())),
            _ => None,
        }
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, TypeTag::Pair(..))
    }

    fn is_scalar(&self) -> bool {
        matches!(
            self,
            TypeTag::Bool
                | TypeTag::Char
                | TypeTag::I8
                | TypeTag::I16
                | TypeTag::I32
                | TypeTag::I64
                | TypeTag::U8
                | TypeTag::U16
                | TypeTag::U32
                | TypeTag::U64
                | TypeTag::F32
                | TypeTag::F64
                | TypeTag::String
                | TypeTag::NaiveDateTime
        )
    }

    /// True when a value of type `other` can be used where `self` is expected.
    pub fn is_assignable_from(&self, other: &TypeTag) -> bool {
        if self == other {
            return true;
        }
        match (self, other) {
            (TypeTag::Any, _) => true,
            (TypeTag::Convertible, o) => o.is_scalar(),
            (TypeTag::Custom(target), TypeTag::Custom(source)) => source.is_or_extends(target.name),
            (TypeTag::Optional(target), TypeTag::Optional(source)) => {
                target.is_assignable_from(source)
            }
            (TypeTag::Optional(target), source) => target.is_assignable_from(source),
            (TypeTag::Sequence(e), source) => source.element_type().as_ref() == Some(&**e),
            (TypeTag::Collection(e), TypeTag::List(s) | TypeTag::Set(s)) => e == s,
            (TypeTag::Collection(e), TypeTag::Map(k, v)) => {
                **e == TypeTag::Pair(k.clone(), v.clone())
            }
            _ => false,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Any => f.write_str("any"),
            TypeTag::Convertible => f.write_str("convertible"),
            TypeTag::Bool => f.write_str("bool"),
            TypeTag::Char => f.write_str("char"),
            TypeTag::I8 => f.write_str("i8"),
            TypeTag::I16 => f.write_str("i16"),
            TypeTag::I32 => f.write_str("i32"),
            TypeTag::I64 => f.write_str("i64"),
            TypeTag::U8 => f.write_str("u8"),
            TypeTag::U16 => f.write_str("u16"),
            TypeTag::U32 => f.write_str("u32"),
            TypeTag::U64 => f.write_str("u64"),
            TypeTag::F32 => f.write_str("f32"),
            TypeTag::F64 => f.write_str("f64"),
            TypeTag::String => f.write_str("string"),
            TypeTag::Uuid => f.write_str("uuid"),
            TypeTag::Duration => f.write_str("duration"),
            TypeTag::Date => f.write_str("date"),
            TypeTag::NaiveDateTime => f.write_str("naive_datetime"),
            TypeTag::DateTime => f.write_str("datetime"),
            TypeTag::Url => f.write_str("url"),
            TypeTag::Path => f.write_str("path"),
            TypeTag::Sequence(e) => write!(f, "sequence<{e}>"),
            TypeTag::Collection(e) => write!(f, "collection<{e}>"),
            TypeTag::List(e) => write!(f, "list<{e}>"),
            TypeTag::Set(e) => write!(f, "set<{e}>"),
            TypeTag::Deque(e) => write!(f, "deque<{e}>"),
            TypeTag::Map(k, v) => write!(f, "map<{k}, {v}>"),
            TypeTag::Pair(k, v) => write!(f, "pair<{k}, {v}>"),
            TypeTag::Optional(t) => write!(f, "option<{t}>"),
            TypeTag::Setting(t) => write!(f, "setting<{t}>"),
            TypeTag::Custom(c) => f.write_str(c.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a() -> TypeTag {
        TypeTag::custom(CustomType::new("A"))
    }

    fn b() -> TypeTag {
        TypeTag::custom(CustomType::new("B").extends("A"))
    }

    fn c() -> TypeTag {
        TypeTag::custom(CustomType::new("C").extends("B").extends("A"))
    }

    #[test]
    fn identity_is_assignable() {
        assert!(TypeTag::I32.is_assignable_from(&TypeTag::I32));
        assert!(TypeTag::list(TypeTag::I32).is_assignable_from(&TypeTag::list(TypeTag::I32)));
    }

    #[test]
    fn any_accepts_everything() {
        assert!(TypeTag::Any.is_assignable_from(&TypeTag::map(TypeTag::String, TypeTag::I32)));
        assert!(TypeTag::Any.is_assignable_from(&c()));
    }

    #[test]
    fn convertible_accepts_scalars_only() {
        assert!(TypeTag::Convertible.is_assignable_from(&TypeTag::String));
        assert!(TypeTag::Convertible.is_assignable_from(&TypeTag::U64));
        assert!(!TypeTag::Convertible.is_assignable_from(&TypeTag::Url));
        assert!(!TypeTag::Convertible.is_assignable_from(&TypeTag::list(TypeTag::I32)));
    }

    #[test]
    fn custom_hierarchy() {
        assert!(a().is_assignable_from(&b()));
        assert!(a().is_assignable_from(&c()));
        assert!(b().is_assignable_from(&c()));
        assert!(!c().is_assignable_from(&b()));
        assert!(!b().is_assignable_from(&a()));
    }

    #[test]
    fn sequence_accepts_every_iterable_of_same_element() {
        let seq = TypeTag::sequence(TypeTag::I32);
        assert!(seq.is_assignable_from(&TypeTag::list(TypeTag::I32)));
        assert!(seq.is_assignable_from(&TypeTag::set(TypeTag::I32)));
        assert!(seq.is_assignable_from(&TypeTag::deque(TypeTag::I32)));
        assert!(!seq.is_assignable_from(&TypeTag::list(TypeTag::I64)));
    }

    #[test]
    fn map_is_a_sequence_of_pairs() {
        let seq = TypeTag::sequence(TypeTag::pair(TypeTag::String, TypeTag::I32));
        assert!(seq.is_assignable_from(&TypeTag::map(TypeTag::String, TypeTag::I32)));
        let coll = TypeTag::collection(TypeTag::pair(TypeTag::String, TypeTag::I32));
        assert!(coll.is_assignable_from(&TypeTag::map(TypeTag::String, TypeTag::I32)));
    }

    #[test]
    fn collection_does_not_accept_deque() {
        let coll = TypeTag::collection(TypeTag::I32);
        assert!(coll.is_assignable_from(&TypeTag::list(TypeTag::I32)));
        assert!(!coll.is_assignable_from(&TypeTag::deque(TypeTag::I32)));
    }

    #[test]
    fn optional_accepts_bare_and_optional() {
        let opt = TypeTag::optional(TypeTag::I32);
        assert!(opt.is_assignable_from(&TypeTag::I32));
        assert!(opt.is_assignable_from(&TypeTag::optional(TypeTag::I32)));
        assert!(!TypeTag::I32.is_assignable_from(&opt));
    }

    #[test]
    fn element_type_of_map_is_pair() {
        let map = TypeTag::map(TypeTag::String, TypeTag::I32);
        assert_eq!(
            map.element_type(),
            Some(TypeTag::pair(TypeTag::String, TypeTag::I32))
        );
        assert_eq!(TypeTag::String.element_type(), None);
    }

    #[test]
    fn underlying_strips_one_layer() {
        let nested = TypeTag::optional(TypeTag::optional(TypeTag::I32));
        assert_eq!(nested.underlying(), &TypeTag::optional(TypeTag::I32));
        assert_eq!(TypeTag::I32.underlying(), &TypeTag::I32);
    }

    #[test]
    fn display_nested() {
        let tag = TypeTag::map(TypeTag::String, TypeTag::list(TypeTag::optional(TypeTag::U16)));
        assert_eq!(tag.to_string(), "map<string, list<option<u16>>>");
    }
}
