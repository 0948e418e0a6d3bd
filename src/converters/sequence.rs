//! Iterable to list, set or map.

use crate::chooser::{Converter, Dispatch};
use crate::error::FillfigError;
use crate::types::TypeTag;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    List,
    Set,
    Map,
}

/// Concrete container to build for `to`, tried in the order list, set, map.
fn shape_for(to: &TypeTag) -> Option<(Shape, TypeTag)> {
    let element = to.element_type()?;
    if to.is_assignable_from(&TypeTag::list(element.clone())) {
        return Some((Shape::List, element));
    }
    if to.is_assignable_from(&TypeTag::set(element.clone())) {
        return Some((Shape::Set, element));
    }
    if let TypeTag::Pair(key, value) = &element
        && to.is_assignable_from(&TypeTag::Map(key.clone(), value.clone()))
    {
        return Some((Shape::Map, element));
    }
    None
}

/// Converts each element of an iterable raw value through the chooser and
/// collects the results into the container the target accepts.
///
/// Sets drop repeated elements. Maps are built from pair elements and fail on
/// a repeated key. Both checks compare each element against those already
/// kept, so large structured values from tree providers pay a quadratic cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceConverter;

impl Converter for SequenceConverter {
    fn name(&self) -> &str {
        "sequence"
    }

    fn can_convert(&self, from: &TypeTag, to: &TypeTag) -> bool {
        from.element_type().is_some() && shape_for(to.underlying()).is_some()
    }

    fn convert(
        &self,
        raw: &Value,
        _from: &TypeTag,
        to: &TypeTag,
        dispatch: &dyn Dispatch,
    ) -> Result<Value, FillfigError> {
        let target = to.underlying();
        let (shape, element) =
            shape_for(target).ok_or_else(|| FillfigError::UnsupportedTargetShape {
                to: target.clone(),
            })?;
        let items = raw.elements().ok_or_else(|| FillfigError::NotIterable {
            found: raw.type_tag(),
        })?;

        let converted = items
            .iter()
            .map(|item| dispatch.choose_and_convert(item, &item.type_tag(), &element))
            .collect::<Result<Vec<_>, _>>()?;

        match shape {
            Shape::List => Ok(Value::List(converted)),
            Shape::Set => {
                let mut unique: Vec<Value> = Vec::with_capacity(converted.len());
                for item in converted {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                Ok(Value::Set(unique))
            }
            Shape::Map => {
                let mut entries: Vec<(Value, Value)> = Vec::with_capacity(converted.len());
                for item in converted {
                    let (key, value) = match item {
                        Value::Pair(key, value) => (key, value),
                        other => {
                            return Err(FillfigError::TypeMismatch {
                                expected: element.clone(),
                                found: other.type_tag(),
                            });
                        }
                    };
                    if entries.iter().any(|(existing, _)| existing == &*key) {
                        return Err(FillfigError::DuplicateMapKey {
                            key: key.to_string(),
                        });
                    }
                    entries.push((*key, *value));
                }
                Ok(Value::Map(entries))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chooser::ConverterChooser;

    fn chooser() -> ConverterChooser {
        ConverterChooser::standard().unwrap()
    }

    #[test]
    fn accepts_iterable_to_buildable_shape() {
        let conv = SequenceConverter;
        let strings = TypeTag::list(TypeTag::String);
        assert!(conv.can_convert(&strings, &TypeTag::list(TypeTag::I32)));
        assert!(conv.can_convert(&strings, &TypeTag::set(TypeTag::I32)));
        assert!(conv.can_convert(&strings, &TypeTag::sequence(TypeTag::I32)));
        assert!(conv.can_convert(&strings, &TypeTag::collection(TypeTag::I32)));
        assert!(!conv.can_convert(&strings, &TypeTag::deque(TypeTag::I32)));
        assert!(!conv.can_convert(&TypeTag::String, &TypeTag::list(TypeTag::I32)));
    }

    #[test]
    fn list_of_strings_to_list_of_ints() {
        let raw = Value::list(["1", "2", "3"]);
        let converted = chooser()
            .choose_and_convert(&raw, &raw.type_tag(), &TypeTag::list(TypeTag::I32))
            .unwrap();
        assert_eq!(
            converted,
            Value::List(vec![Value::I32(1), Value::I32(2), Value::I32(3)])
        );
    }

    #[test]
    fn sequence_target_builds_list() {
        let raw = Value::list(["1"]);
        let converted = chooser()
            .choose_and_convert(&raw, &raw.type_tag(), &TypeTag::sequence(TypeTag::U8))
            .unwrap();
        assert_eq!(converted, Value::List(vec![Value::U8(1)]));
    }

    #[test]
    fn set_drops_duplicates_after_conversion() {
        let raw = Value::list(["1", " 1", "2"]);
        let converted = chooser()
            .choose_and_convert(&raw, &raw.type_tag(), &TypeTag::set(TypeTag::I32))
            .unwrap();
        assert_eq!(converted, Value::Set(vec![Value::I32(1), Value::I32(2)]));
    }

    #[test]
    fn map_from_pairs() {
        let raw = Value::Map(vec![
            (Value::from("a"), Value::from("1")),
            (Value::from("b"), Value::from("2")),
        ]);
        let converted = chooser()
            .choose_and_convert(
                &raw,
                &raw.type_tag(),
                &TypeTag::map(TypeTag::String, TypeTag::I32),
            )
            .unwrap();
        assert_eq!(
            converted,
            Value::Map(vec![
                (Value::from("a"), Value::I32(1)),
                (Value::from("b"), Value::I32(2)),
            ])
        );
    }

    #[test]
    fn map_keys_colliding_after_conversion_fail() {
        let raw = Value::Map(vec![
            (Value::from("1"), Value::from("a")),
            (Value::from(" 1"), Value::from("b")),
        ]);
        let err = chooser()
            .choose_and_convert(
                &raw,
                &raw.type_tag(),
                &TypeTag::map(TypeTag::I32, TypeTag::String),
            )
            .unwrap_err();
        let FillfigError::ConversionFailed { source, .. } = err else {
            panic!("expected ConversionFailed");
        };
        assert!(matches!(*source, FillfigError::DuplicateMapKey { .. }));
    }

    #[test]
    fn element_failure_propagates() {
        let raw = Value::list(["1", "x"]);
        let err = chooser()
            .choose_and_convert(&raw, &raw.type_tag(), &TypeTag::list(TypeTag::I32))
            .unwrap_err();
        let FillfigError::ConversionFailed { converter, source, .. } = err else {
            panic!("expected ConversionFailed");
        };
        assert_eq!(converter, "sequence");
        assert!(matches!(*source, FillfigError::ConversionFailed { .. }));
    }

    #[test]
    fn non_iterable_raw_value() {
        let err = SequenceConverter
            .convert(
                &Value::from("1"),
                &TypeTag::list(TypeTag::String),
                &TypeTag::list(TypeTag::I32),
                &chooser(),
            )
            .unwrap_err();
        assert!(matches!(err, FillfigError::NotIterable { .. }));
    }

    #[test]
    fn unbuildable_target() {
        let raw = Value::list(["1"]);
        let err = SequenceConverter
            .convert(&raw, &raw.type_tag(), &TypeTag::deque(TypeTag::I32), &chooser())
            .unwrap_err();
        assert!(matches!(err, FillfigError::UnsupportedTargetShape { .. }));
    }
}
