use serde_json::Value;

use crate::shape_catalog::shape_schema::{FieldDescriptor, FieldKind};

/// Value a target field holds when no assignment feeds it (or its source is null)
pub fn default_value(field: &FieldDescriptor) -> Value {
    if field.nullable {
        return Value::Null;
    }
    match &field.kind {
        FieldKind::Scalar(scalar) => scalar.default_value(),
        FieldKind::Enum(_) => Value::from(0),
        FieldKind::Nested(_) => Value::Null,
        FieldKind::Collection(_) => Value::Array(Vec::new()),
    }
}

/// Short JSON type name for error messages
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
