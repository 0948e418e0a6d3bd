use crate::chooser::{Converter, Dispatch};
use crate::error::FillfigError;
use crate::types::TypeTag;
use crate::value::Value;

/// Converts a key/value pair by dispatching key and value independently.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyValuePairConverter;

impl Converter for KeyValuePairConverter {
    fn name(&self) -> &str {
        "key_value_pair"
    }

    fn can_convert(&self, from: &TypeTag, to: &TypeTag) -> bool {
        from.is_pair() && to.underlying().is_pair()
    }

    fn convert(
        &self,
        raw: &Value,
        _from: &TypeTag,
        to: &TypeTag,
        dispatch: &dyn Dispatch,
    ) -> Result<Value, FillfigError> {
        let target = to.underlying();
        let TypeTag::Pair(key_type, value_type) = target else {
            return Err(FillfigError::UnsupportedTargetShape { to: target.clone() });
        };
        let Value::Pair(key, value) = raw else {
            return Err(FillfigError::TypeMismatch {
                expected: target.clone(),
                found: raw.type_tag(),
            });
        };
        let key = dispatch.choose_and_convert(key, &key.type_tag(), key_type)?;
        let value = dispatch.choose_and_convert(value, &value.type_tag(), value_type)?;
        Ok(Value::pair(key, value))
    }
}
