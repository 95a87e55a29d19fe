/// Scalar Type Registry
///
/// The closed set of "primitive" value types a shape field can carry, plus the
/// alias table used when parsing type names out of a catalogue file.
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ShapeCatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Char,
    String,
    Date,
    DateTime,
    Uuid,
}

impl ScalarType {
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ScalarType::Int8
                | ScalarType::Int16
                | ScalarType::Int32
                | ScalarType::Int64
                | ScalarType::UInt8
                | ScalarType::UInt16
                | ScalarType::UInt32
                | ScalarType::UInt64
        )
    }

    /// Value a non-nullable field of this type holds when nothing is assigned to it
    pub fn default_value(&self) -> Value {
        match self {
            ScalarType::Bool => Value::Bool(false),
            ScalarType::Float32 | ScalarType::Float64 => Value::from(0.0),
            ScalarType::Decimal => Value::String("0".to_string()),
            ScalarType::Char => Value::String("\u{0}".to_string()),
            ScalarType::String => Value::String(String::new()),
            ScalarType::Date => Value::String("1970-01-01".to_string()),
            ScalarType::DateTime => Value::String("1970-01-01T00:00:00Z".to_string()),
            ScalarType::Uuid => Value::String("00000000-0000-0000-0000-000000000000".to_string()),
            _ => Value::from(0),
        }
    }

    /// ClickHouse column type used when a pushed-down projection needs a cast
    pub fn clickhouse_type(&self) -> &'static str {
        match self {
            ScalarType::Bool => "Bool",
            ScalarType::Int8 => "Int8",
            ScalarType::Int16 => "Int16",
            ScalarType::Int32 => "Int32",
            ScalarType::Int64 => "Int64",
            ScalarType::UInt8 => "UInt8",
            ScalarType::UInt16 => "UInt16",
            ScalarType::UInt32 => "UInt32",
            ScalarType::UInt64 => "UInt64",
            ScalarType::Float32 => "Float32",
            ScalarType::Float64 => "Float64",
            ScalarType::Decimal => "Decimal128(10)",
            ScalarType::Char => "FixedString(1)",
            ScalarType::String => "String",
            ScalarType::Date => "Date",
            ScalarType::DateTime => "DateTime64(3)",
            ScalarType::Uuid => "UUID",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for ScalarType {
    type Err = ShapeCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SCALAR_TYPE_ALIASES
            .get(s.trim().to_lowercase().as_str())
            .copied()
            .ok_or_else(|| ShapeCatalogError::UnknownScalarType {
                type_name: s.to_string(),
            })
    }
}

/// Check that a shape, field or enum name is a plain identifier
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER_PATTERN.is_match(name)
}

lazy_static::lazy_static! {
    static ref IDENTIFIER_PATTERN: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")
        .expect("identifier pattern is a valid regex");

    // Lowercased alias -> scalar type. Covers the usual spellings found in
    // storage schemas (C-style, SQL-style and ClickHouse-style names).
    static ref SCALAR_TYPE_ALIASES: HashMap<&'static str, ScalarType> = {
        let mut m = HashMap::new();

        // ===== BOOLEAN =====
        m.insert("bool", ScalarType::Bool);
        m.insert("boolean", ScalarType::Bool);

        // ===== SIGNED INTEGERS =====
        m.insert("sbyte", ScalarType::Int8);
        m.insert("int8", ScalarType::Int8);
        m.insert("i8", ScalarType::Int8);
        m.insert("short", ScalarType::Int16);
        m.insert("int16", ScalarType::Int16);
        m.insert("i16", ScalarType::Int16);
        m.insert("int", ScalarType::Int32);
        m.insert("int32", ScalarType::Int32);
        m.insert("integer", ScalarType::Int32);
        m.insert("i32", ScalarType::Int32);
        m.insert("long", ScalarType::Int64);
        m.insert("int64", ScalarType::Int64);
        m.insert("bigint", ScalarType::Int64);
        m.insert("i64", ScalarType::Int64);

        // ===== UNSIGNED INTEGERS =====
        m.insert("byte", ScalarType::UInt8);
        m.insert("uint8", ScalarType::UInt8);
        m.insert("u8", ScalarType::UInt8);
        m.insert("ushort", ScalarType::UInt16);
        m.insert("uint16", ScalarType::UInt16);
        m.insert("u16", ScalarType::UInt16);
        m.insert("uint", ScalarType::UInt32);
        m.insert("uint32", ScalarType::UInt32);
        m.insert("u32", ScalarType::UInt32);
        m.insert("ulong", ScalarType::UInt64);
        m.insert("uint64", ScalarType::UInt64);
        m.insert("u64", ScalarType::UInt64);

        // ===== FLOATING POINT =====
        m.insert("float", ScalarType::Float32);
        m.insert("single", ScalarType::Float32);
        m.insert("float32", ScalarType::Float32);
        m.insert("f32", ScalarType::Float32);
        m.insert("double", ScalarType::Float64);
        m.insert("float64", ScalarType::Float64);
        m.insert("f64", ScalarType::Float64);
        m.insert("decimal", ScalarType::Decimal);

        // ===== TEXT =====
        m.insert("char", ScalarType::Char);
        m.insert("string", ScalarType::String);
        m.insert("str", ScalarType::String);
        m.insert("text", ScalarType::String);

        // ===== TEMPORAL / IDENTITY =====
        m.insert("date", ScalarType::Date);
        m.insert("datetime", ScalarType::DateTime);
        m.insert("timestamp", ScalarType::DateTime);
        m.insert("guid", ScalarType::Uuid);
        m.insert("uuid", ScalarType::Uuid);

        m
    };
}
