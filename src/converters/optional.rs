use crate::chooser::{Converter, Dispatch};
use crate::error::FillfigError;
use crate::types::TypeTag;
use crate::value::Value;

/// Bridges optional and non-optional types.
///
/// A present value is unwrapped and dispatched against the underlying target.
/// An absent value stays absent when the target is optional; otherwise it is
/// dispatched as a bare value, which the chooser rejects as null.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionalConverter;

impl Converter for OptionalConverter {
    fn name(&self) -> &str {
        "optional"
    }

    fn can_convert(&self, from: &TypeTag, to: &TypeTag) -> bool {
        from.is_optional() || to.is_optional()
    }

    fn convert(
        &self,
        raw: &Value,
        from: &TypeTag,
        to: &TypeTag,
        dispatch: &dyn Dispatch,
    ) -> Result<Value, FillfigError> {
        let target = to.underlying();
        if raw.is_null() {
            if from.is_optional() && to.is_optional() {
                return Ok(Value::Null);
            }
            return dispatch.choose_and_convert(raw, from.underlying(), target);
        }
        dispatch.choose_and_convert(raw, &raw.type_tag(), target)
    }
}
