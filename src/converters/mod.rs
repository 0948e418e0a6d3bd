//! Built-in converters.
//!
//! Two families live here. Leaf converters are capability tables
//! ([`ConverterTable`]) that turn one scalar into another. Passthrough
//! converters ([`OptionalConverter`], [`KeyValuePairConverter`],
//! [`SequenceConverter`]) take a composite value apart and hand each part back
//! to the chooser.

mod common;
mod framework;
mod optional;
mod pair;
mod sequence;
mod table;

pub use common::{MailAddress, commonly_used_classes};
pub use framework::{framework_types, parse_duration};
pub use optional::OptionalConverter;
pub use pair::KeyValuePairConverter;
pub use sequence::SequenceConverter;
pub use table::{ConvertFn, ConverterTable};
