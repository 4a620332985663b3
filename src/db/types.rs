//! MySQL type mappings.
//!
//! This module converts driver rows into JSON rows.
//!
//! # Architecture
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies column types into logical categories
//! 2. Category-specific decoders handle the actual value extraction

use crate::models::Row;
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::{Column, Decode, Row as _, Type, TypeInfo};
use tracing::warn;

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Bit,
    Text,
    Binary,
    Json,
    Date,
    DateTime,
    Time,
    Unknown,
}

/// Classify a MySQL type name into a logical category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    let lower = type_name.to_lowercase();

    // Decimal/Numeric - check first as it overlaps with "numeric" in float checks
    if lower.contains("decimal") || lower.contains("numeric") {
        return TypeCategory::Decimal;
    }

    // Boolean before integer: BOOLEAN is reported as TINYINT(1) by some servers
    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    // Integer types
    if lower.contains("int") || lower.contains("tiny") || lower == "year" {
        return TypeCategory::Integer;
    }

    // Float types
    if lower.contains("float") || lower.contains("double") || lower == "real" {
        return TypeCategory::Float;
    }

    if lower == "json" {
        return TypeCategory::Json;
    }

    // Temporal types
    match lower.as_str() {
        "date" => return TypeCategory::Date,
        "datetime" | "timestamp" => return TypeCategory::DateTime,
        "time" => return TypeCategory::Time,
        _ => {}
    }

    // BIT(n) carries an unsigned bit field, not a byte string
    if lower == "bit" {
        return TypeCategory::Bit;
    }

    // Binary types
    if lower.contains("blob") || lower.contains("binary") {
        return TypeCategory::Binary;
    }

    if lower.contains("char") || lower.contains("text") || lower == "enum" || lower == "set" {
        return TypeCategory::Text;
    }

    TypeCategory::Unknown
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// Wrapper type for raw DECIMAL values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

// =============================================================================
// Binary Encoding
// =============================================================================

/// Decode binary data to JSON value.
///
/// If `decode_binary` is true, attempts to decode as UTF-8 text first.
/// Falls back to base64 encoding if not valid UTF-8 or if `decode_binary` is false.
pub fn decode_binary_value(bytes: &[u8], decode_binary: bool) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    if decode_binary {
        match std::str::from_utf8(bytes) {
            Ok(s) => JsonValue::String(s.to_string()),
            Err(_) => JsonValue::String(STANDARD.encode(bytes)),
        }
    } else {
        JsonValue::String(STANDARD.encode(bytes))
    }
}

// =============================================================================
// Row to JSON Trait
// =============================================================================

/// Trait for converting database rows to JSON maps.
pub trait RowToJson {
    /// Convert with binary columns decoded as UTF-8 where possible.
    fn to_json_map(&self) -> Row {
        self.to_json_map_with_options(true)
    }

    fn to_json_map_with_options(&self, decode_binary: bool) -> Row;
}

impl RowToJson for MySqlRow {
    fn to_json_map_with_options(&self, decode_binary: bool) -> Row {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let type_name = col.type_info().name();
                let category = categorize_type(type_name);
                let value = decode_column(self, idx, category, decode_binary);
                (col.name().to_string(), value)
            })
            .collect()
    }
}

// =============================================================================
// Column Decoders
// =============================================================================

fn decode_column(
    row: &MySqlRow,
    idx: usize,
    category: TypeCategory,
    decode_binary: bool,
) -> JsonValue {
    match category {
        TypeCategory::Decimal => decode_decimal(row, idx),
        TypeCategory::Integer => decode_integer(row, idx),
        TypeCategory::Boolean => decode_boolean(row, idx),
        TypeCategory::Float => decode_float(row, idx),
        TypeCategory::Bit => decode_bit(row, idx),
        TypeCategory::Binary => decode_binary_col(row, idx, decode_binary),
        TypeCategory::Json => decode_json(row, idx),
        TypeCategory::Date => decode_date(row, idx),
        TypeCategory::DateTime => decode_datetime(row, idx),
        TypeCategory::Time => decode_time(row, idx),
        TypeCategory::Text | TypeCategory::Unknown => decode_text(row, idx, decode_binary),
    }
}

fn decode_decimal(row: &MySqlRow, idx: usize) -> JsonValue {
    match row.try_get::<Option<RawDecimal>, _>(idx) {
        Ok(Some(v)) => JsonValue::String(v.0),
        Ok(None) => JsonValue::Null,
        Err(e) => undecodable(row, idx, e),
    }
}

fn decode_integer(row: &MySqlRow, idx: usize) -> JsonValue {
    // Check NULL first
    if let Ok(None) = row.try_get::<Option<i64>, _>(idx) {
        return JsonValue::Null;
    }
    // Try signed types
    if let Ok(Some(v)) = row.try_get::<Option<i8>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<i16>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    // Try unsigned types
    if let Ok(Some(v)) = row.try_get::<Option<u8>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<u16>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<u32>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    match row.try_get::<Option<u64>, _>(idx) {
        Ok(Some(v)) => JsonValue::Number(v.into()),
        Ok(None) => JsonValue::Null,
        Err(e) => undecodable(row, idx, e),
    }
}

fn decode_boolean(row: &MySqlRow, idx: usize) -> JsonValue {
    match row.try_get::<Option<bool>, _>(idx) {
        Ok(Some(v)) => JsonValue::Bool(v),
        Ok(None) => JsonValue::Null,
        Err(e) => undecodable(row, idx, e),
    }
}

fn decode_bit(row: &MySqlRow, idx: usize) -> JsonValue {
    match row.try_get::<Option<u64>, _>(idx) {
        Ok(Some(v)) => JsonValue::Number(v.into()),
        Ok(None) => JsonValue::Null,
        Err(e) => undecodable(row, idx, e),
    }
}

fn decode_float(row: &MySqlRow, idx: usize) -> JsonValue {
    if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
        return float_value(v);
    }
    match row.try_get::<Option<f32>, _>(idx) {
        Ok(Some(v)) => float_value(v as f64),
        Ok(None) => JsonValue::Null,
        Err(e) => undecodable(row, idx, e),
    }
}

/// JSON has no NaN or infinity; those fall back to their text form.
fn float_value(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(v.to_string()))
}

fn decode_binary_col(row: &MySqlRow, idx: usize, decode_binary: bool) -> JsonValue {
    match row.try_get::<Option<Vec<u8>>, _>(idx) {
        Ok(Some(v)) => decode_binary_value(&v, decode_binary),
        Ok(None) => JsonValue::Null,
        Err(e) => undecodable(row, idx, e),
    }
}

/// Last resort for a column no typed decoder accepts (GEOMETRY, unexpected
/// flags): the raw value bytes, base64 encoded. A non-NULL value is never
/// reported as `null`.
fn undecodable(row: &MySqlRow, idx: usize, error: sqlx::Error) -> JsonValue {
    let column = row.column(idx);
    warn!(
        column = %column.name(),
        type_name = %column.type_info().name(),
        error = %error,
        "Column decode failed, returning raw bytes"
    );
    match row.try_get_unchecked::<Option<Vec<u8>>, _>(idx) {
        Ok(Some(bytes)) => decode_binary_value(&bytes, false),
        Ok(None) => JsonValue::Null,
        Err(e) => {
            warn!(column = %column.name(), error = %e, "Raw column read failed");
            JsonValue::Null
        }
    }
}

fn decode_json(row: &MySqlRow, idx: usize) -> JsonValue {
    // MySQL JSON type should be decoded as serde_json::Value directly
    if let Ok(Some(v)) = row.try_get::<Option<JsonValue>, _>(idx) {
        return v;
    }
    row.try_get::<Option<String>, _>(idx)
        .ok()
        .flatten()
        .map(|s| serde_json::from_str(&s).unwrap_or(JsonValue::String(s)))
        .unwrap_or(JsonValue::Null)
}

fn decode_date(row: &MySqlRow, idx: usize) -> JsonValue {
    match row.try_get::<Option<chrono::NaiveDate>, _>(idx) {
        Ok(Some(v)) => JsonValue::String(v.to_string()),
        Ok(None) => JsonValue::Null,
        // Zero dates ('0000-00-00') do not fit chrono
        Err(_) => decode_text(row, idx, true),
    }
}

fn decode_datetime(row: &MySqlRow, idx: usize) -> JsonValue {
    match row.try_get::<Option<chrono::NaiveDateTime>, _>(idx) {
        Ok(Some(v)) => JsonValue::String(v.to_string()),
        Ok(None) => JsonValue::Null,
        Err(_) => match row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx) {
            Ok(Some(v)) => JsonValue::String(v.naive_utc().to_string()),
            Ok(None) => JsonValue::Null,
            Err(_) => decode_text(row, idx, true),
        },
    }
}

fn decode_time(row: &MySqlRow, idx: usize) -> JsonValue {
    match row.try_get::<Option<chrono::NaiveTime>, _>(idx) {
        Ok(Some(v)) => JsonValue::String(v.to_string()),
        Ok(None) => JsonValue::Null,
        // Negative or >24h intervals do not fit NaiveTime
        Err(_) => decode_text(row, idx, true),
    }
}

fn decode_text(row: &MySqlRow, idx: usize, decode_binary: bool) -> JsonValue {
    match row.try_get::<Option<String>, _>(idx) {
        Ok(Some(v)) => JsonValue::String(v),
        Ok(None) => JsonValue::Null,
        // Text columns with a binary collation are reported as binary
        Err(_) => decode_binary_col(row, idx, decode_binary),
    }
}
