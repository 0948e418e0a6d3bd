//! Declaring which members of a settings type get filled.
//!
//! Rust has no runtime attributes, so a settings type describes itself by
//! implementing [`Fillable`] and returning a [`Schema`]: an ordered list of
//! members, each with a name, an optional [`ToFill`] annotation and an accessor
//! that reaches the field.
//!
//! # Effective descriptors
//!
//! Before anything is fetched, the schema is expanded into one
//! [`MemberDescriptor`] per member that will be filled:
//!
//! - An annotated member uses its own key (default: the member name), its own
//!   required flag, and its own provider, falling back to the class provider.
//! - An unannotated member is filled only when the schema carries a
//!   [`ClassToFill`]. Its key is the class prefix followed by the member name,
//!   and it takes the class required flag and provider.
//! - Annotated members are never prefixed, whether their key is explicit or
//!   defaults to the member name.
//!
//! Expansion fails with [`InvalidArgument`](FillfigError::InvalidArgument) for
//! an empty member name or key, and with
//! [`MemberNotWritable`](FillfigError::MemberNotWritable) for an annotated
//! member declared without an accessor.

use std::fmt;

use crate::error::FillfigError;
use crate::setting::{Setting, SettingMetadata};
use crate::types::TypeTag;
use crate::value::{SettingValue, Value};

/// Per-member annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToFill {
    key: Option<String>,
    required: bool,
    provider: Option<String>,
}

impl ToFill {
    /// Required member, keyed by its own name, read from the default provider.
    pub fn new() -> Self {
        Self {
            key: None,
            required: true,
            provider: None,
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Shorthand for `required(false)`.
    pub fn optional(self) -> Self {
        self.required(false)
    }

    pub fn provider(mut self, name: impl Into<String>) -> Self {
        self.provider = Some(name.into());
        self
    }
}

impl Default for ToFill {
    fn default() -> Self {
        Self::new()
    }
}

/// Class-wide defaults. Makes every member of the schema eligible for filling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassToFill {
    key_prefix: String,
    all_required: bool,
    provider: Option<String>,
}

impl ClassToFill {
    pub fn new() -> Self {
        Self {
            key_prefix: String::new(),
            all_required: true,
            provider: None,
        }
    }

    /// Prepended verbatim to the name of every unannotated member.
    ///
    /// A member carrying its own [`ToFill`] is never prefixed, even when the
    /// annotation leaves its key at the member name.
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn all_required(mut self, required: bool) -> Self {
        self.all_required = required;
        self
    }

    pub fn provider(mut self, name: impl Into<String>) -> Self {
        self.provider = Some(name.into());
        self
    }
}

impl Default for ClassToFill {
    fn default() -> Self {
        Self::new()
    }
}

/// The effective, validated description of one member to fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor {
    member: String,
    key: String,
    required: bool,
    provider: Option<String>,
    declared: TypeTag,
}

impl MemberDescriptor {
    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Provider name, or `None` for the filler's default provider.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// The member type as declared, `Setting` wrapper included.
    pub fn declared_type(&self) -> &TypeTag {
        &self.declared
    }

    /// The type values are converted to: the declared type without its
    /// `Setting` wrapper.
    pub fn target_type(&self) -> &TypeTag {
        self.declared.unwrap_setting()
    }

    pub(crate) fn metadata(&self, has_value_specified: bool) -> SettingMetadata {
        SettingMetadata::new(self.key.clone(), self.required, has_value_specified)
    }
}

impl fmt::Display for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (key '{}', {})", self.member, self.key, self.declared)
    }
}

/// Writes converted values into one member of `T`.
pub(crate) trait Slot<T>: Send + Sync {
    fn assign(
        &self,
        target: &mut T,
        value: Value,
        metadata: SettingMetadata,
    ) -> Result<(), FillfigError>;

    /// Reset the member to its natural default. Members without one keep their
    /// value; a `Setting` wrapper still gets fresh metadata.
    fn assign_default(&self, target: &mut T, metadata: SettingMetadata);
}

struct FieldSlot<T, F> {
    accessor: fn(&mut T) -> &mut F,
}

impl<T, F: SettingValue> Slot<T> for FieldSlot<T, F> {
    fn assign(&self, target: &mut T, value: Value, _: SettingMetadata) -> Result<(), FillfigError> {
        *(self.accessor)(target) = F::from_value(value)?;
        Ok(())
    }

    fn assign_default(&self, target: &mut T, _: SettingMetadata) {
        if let Some(zero) = F::zero() {
            *(self.accessor)(target) = zero;
        }
    }
}

struct SettingSlot<T, F> {
    accessor: fn(&mut T) -> &mut Setting<F>,
}

impl<T, F: SettingValue> Slot<T> for SettingSlot<T, F> {
    fn assign(
        &self,
        target: &mut T,
        value: Value,
        metadata: SettingMetadata,
    ) -> Result<(), FillfigError> {
        let value = F::from_value(value)?;
        *(self.accessor)(target) = Setting::new(value, metadata);
        Ok(())
    }

    fn assign_default(&self, target: &mut T, metadata: SettingMetadata) {
        let slot = (self.accessor)(target);
        match F::zero() {
            Some(zero) => *slot = Setting::new(zero, metadata),
            None => slot.set_metadata(metadata),
        }
    }
}

struct Member<T> {
    name: String,
    annotation: Option<ToFill>,
    declared: TypeTag,
    slot: Option<Box<dyn Slot<T>>>,
}

/// Ordered member declarations of a settings type.
pub struct Schema<T> {
    class: Option<ClassToFill>,
    members: Vec<Member<T>>,
}

impl<T: 'static> Schema<T> {
    pub fn new() -> Self {
        Self {
            class: None,
            members: Vec::new(),
        }
    }

    pub fn class_to_fill(mut self, class: ClassToFill) -> Self {
        self.class = Some(class);
        self
    }

    /// Unannotated member. Filled only under [`ClassToFill`].
    pub fn field<F: SettingValue + 'static>(
        self,
        name: impl Into<String>,
        accessor: fn(&mut T) -> &mut F,
    ) -> Self {
        self.push(name, None, F::type_tag(), Box::new(FieldSlot { accessor }))
    }

    /// Annotated member.
    pub fn fill<F: SettingValue + 'static>(
        self,
        name: impl Into<String>,
        annotation: ToFill,
        accessor: fn(&mut T) -> &mut F,
    ) -> Self {
        self.push(
            name,
            Some(annotation),
            F::type_tag(),
            Box::new(FieldSlot { accessor }),
        )
    }

    /// Unannotated member wrapped in [`Setting`].
    pub fn setting<F: SettingValue + 'static>(
        self,
        name: impl Into<String>,
        accessor: fn(&mut T) -> &mut Setting<F>,
    ) -> Self {
        self.push(
            name,
            None,
            TypeTag::setting(F::type_tag()),
            Box::new(SettingSlot { accessor }),
        )
    }

    /// Annotated member wrapped in [`Setting`].
    pub fn fill_setting<F: SettingValue + 'static>(
        self,
        name: impl Into<String>,
        annotation: ToFill,
        accessor: fn(&mut T) -> &mut Setting<F>,
    ) -> Self {
        self.push(
            name,
            Some(annotation),
            TypeTag::setting(F::type_tag()),
            Box::new(SettingSlot { accessor }),
        )
    }

    /// Annotated member with no way to write it. Any fill of the schema fails
    /// with [`MemberNotWritable`](FillfigError::MemberNotWritable).
    pub fn read_only<F: SettingValue>(self, name: impl Into<String>, annotation: ToFill) -> Self {
        let mut schema = self;
        schema.members.push(Member {
            name: name.into(),
            annotation: Some(annotation),
            declared: F::type_tag(),
            slot: None,
        });
        schema
    }

    fn push(
        mut self,
        name: impl Into<String>,
        annotation: Option<ToFill>,
        declared: TypeTag,
        slot: Box<dyn Slot<T>>,
    ) -> Self {
        self.members.push(Member {
            name: name.into(),
            annotation,
            declared,
            slot: Some(slot),
        });
        self
    }
}

impl<T: 'static> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Schema<T> {
    /// Effective descriptors of the members that will be filled, in
    /// declaration order.
    pub fn descriptors(&self) -> Result<Vec<MemberDescriptor>, FillfigError> {
        Ok(self.plan()?.into_iter().map(|(d, _)| d).collect())
    }

    pub(crate) fn plan(&self) -> Result<Vec<(MemberDescriptor, &dyn Slot<T>)>, FillfigError> {
        let mut plan = Vec::with_capacity(self.members.len());
        for member in &self.members {
            if member.name.is_empty() {
                return Err(FillfigError::InvalidArgument(
                    "member name cannot be empty".into(),
                ));
            }
            let Some(descriptor) = self.describe(member)? else {
                continue;
            };
            let slot = member
                .slot
                .as_deref()
                .ok_or_else(|| FillfigError::MemberNotWritable {
                    member: member.name.clone(),
                })?;
            plan.push((descriptor, slot));
        }
        Ok(plan)
    }

    fn describe(&self, member: &Member<T>) -> Result<Option<MemberDescriptor>, FillfigError> {
        let class_provider = self.class.as_ref().and_then(|c| c.provider.clone());
        let (key, required, provider) = match (&member.annotation, &self.class) {
            (Some(annotation), _) => {
                let key = match &annotation.key {
                    Some(key) if key.is_empty() => return Err(FillfigError::empty_key()),
                    Some(key) => key.clone(),
                    None => member.name.clone(),
                };
                let provider = annotation.provider.clone().or(class_provider);
                (key, annotation.required, provider)
            }
            (None, Some(class)) => (
                format!("{}{}", class.key_prefix, member.name),
                class.all_required,
                class_provider,
            ),
            (None, None) => return Ok(None),
        };
        Ok(Some(MemberDescriptor {
            member: member.name.clone(),
            key,
            required,
            provider,
            declared: member.declared.clone(),
        }))
    }
}

/// A type that can be filled from providers.
pub trait Fillable: Sized + 'static {
    fn schema() -> Schema<Self>;
}
