//! Type-directed settings binding. Describe a struct, register providers, and
//! fill it.
//!
//! Fillfig resolves each member of a settings struct from a named key/value
//! source, converts the raw value to the member's declared type, and writes it
//! in place:
//!
//! ```
//! use fillfig::{Fillable, MapProvider, Provider, Schema, SettingsFiller, ToFill, Value};
//!
//! #[derive(Default)]
//! struct ServerSettings {
//!     port: u16,
//!     hosts: Vec<String>,
//!     timeout_secs: Option<u32>,
//! }
//!
//! impl Fillable for ServerSettings {
//!     fn schema() -> Schema<Self> {
//!         Schema::new()
//!             .fill("port", ToFill::new().key("Port"), |s: &mut Self| &mut s.port)
//!             .fill("hosts", ToFill::new().key("Hosts"), |s| &mut s.hosts)
//!             .fill("timeout_secs", ToFill::new().key("Timeout").optional(), |s| {
//!                 &mut s.timeout_secs
//!             })
//!     }
//! }
//!
//! let provider = MapProvider::new()
//!     .with("Port", "8080")
//!     .with("Hosts", Value::list(["a.example", "b.example"]));
//! let filler = SettingsFiller::builder()
//!     .provider("defaults", Provider::from_sync(provider))
//!     .build()?;
//!
//! let settings: ServerSettings = filler.create_with_settings()?;
//! assert_eq!(settings.port, 8080);
//! assert_eq!(settings.hosts.len(), 2);
//! assert_eq!(settings.timeout_secs, None);
//! # Ok::<(), fillfig::FillfigError>(())
//! ```
//!
//! # Pieces
//!
//! - **[`Schema`]** lists the members of a [`Fillable`] type with their
//!   [`ToFill`] annotation (key, required flag, provider) and an accessor.
//!   [`ClassToFill`] applies a key prefix, a required flag and a provider to
//!   every unannotated member.
//! - **Providers** ([`RawSettingsProvider`], [`AsyncRawSettingsProvider`]) map
//!   a key to a raw [`Value`] or nothing. Built in: environment variables,
//!   closures, in-memory maps, TOML and JSON documents.
//! - **[`ConverterChooser`]** picks the first registered [`Converter`] able to
//!   turn the raw value's type into the member's type. Passthrough converters
//!   take lists, sets, maps, pairs and optionals apart and dispatch each part
//!   again, so nested shapes such as `HashMap<String, Vec<Option<u16>>>`
//!   resolve without extra code.
//! - **[`SettingsFiller`]** runs the pipeline, blocking or async.
//!
//! # Types at runtime
//!
//! Matching is driven by [`TypeTag`]s rather than Rust's static types. A
//! converter declared for `(from, to)` also serves narrower requests: any
//! source its `from` accepts and any target that accepts its `to`. User types
//! join in through [`CustomType`], which lists its ancestors by name.
//!
//! # Required and optional members
//!
//! A required member (the default) that is missing or fails to convert aborts
//! the fill with [`FillfigError::RequiredSettingMissing`] or
//! [`FillfigError::RequiredSettingConversionFailed`]. Members filled before the
//! failure keep their values.
//!
//! An optional member degrades silently: it is reset to its natural default
//! (zero, empty, `None`) and a `warn!` is logged through `tracing`. Types
//! without a natural default, such as `Url`, keep their current value.
//!
//! Declare a member as [`Setting<T>`] to see how it was resolved:
//! [`SettingMetadata::has_value_specified`] is true only when a provider
//! returned a value and it converted.
//!
//! # Sync and async
//!
//! [`SettingsFiller::fill_settings`] and
//! [`SettingsFiller::fill_settings_async`] follow identical rules. The blocking
//! fill drives async providers to completion on the calling thread. Inside a
//! current-thread Tokio runtime that is impossible and the fill fails with
//! [`FillfigError::BlockingBridge`]; use the async fill there.
//!
//! # Error handling
//!
//! All fallible operations return [`FillfigError`]. Conversion failures keep
//! the converter's own error as their `source()`.

pub mod bridge;
pub mod chooser;
pub mod converters;
pub mod error;
pub mod providers;
pub mod schema;
pub mod setting;
pub mod types;
pub mod value;

mod filler;

#[cfg(test)]
mod fixtures;

pub use chooser::{Converter, ConverterChooser, ConverterChooserBuilder, Dispatch};
pub use converters::{ConverterTable, MailAddress};
pub use error::FillfigError;
pub use filler::{SettingsFiller, SettingsFillerBuilder};
pub use providers::{
    AsyncFnProvider, AsyncRawSettingsProvider, EnvProvider, FnProvider, JsonProvider, MapProvider,
    Provider, Providers, RawSettingsProvider, TomlProvider,
};
pub use schema::{ClassToFill, Fillable, MemberDescriptor, Schema, ToFill};
pub use setting::{Setting, SettingMetadata};
pub use types::{CustomType, TypeTag};
pub use value::{CustomValue, SettingValue, Value};
