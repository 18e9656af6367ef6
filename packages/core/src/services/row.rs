//! Tolerant column readers
//!
//! The collector is a separate program and column affinities drift between
//! its versions (a `version_id` stored as text, `compression` as a label, a
//! payload as text). These helpers read libsql values leniently and only fail
//! when a required column is genuinely missing.

use crate::services::error::StoreError;
use libsql::{Row, Value};

pub(crate) fn value(row: &Row, idx: i32, column: &str) -> Result<Value, StoreError> {
    row.get_value(idx)
        .map_err(|e| StoreError::invalid_row(column, e.to_string()))
}

pub(crate) fn opt_text(row: &Row, idx: i32, column: &str) -> Result<Option<String>, StoreError> {
    Ok(match value(row, idx, column)? {
        Value::Null => None,
        Value::Text(s) => Some(s),
        Value::Integer(n) => Some(n.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
    })
}

pub(crate) fn text(row: &Row, idx: i32, column: &str) -> Result<String, StoreError> {
    opt_text(row, idx, column)?.ok_or_else(|| StoreError::invalid_row(column, "unexpected NULL"))
}

pub(crate) fn opt_int(row: &Row, idx: i32, column: &str) -> Result<Option<i64>, StoreError> {
    Ok(match value(row, idx, column)? {
        Value::Null => None,
        Value::Integer(n) => Some(n),
        Value::Real(f) => Some(f as i64),
        Value::Text(s) => s.trim().parse().ok(),
        Value::Blob(_) => None,
    })
}

pub(crate) fn int(row: &Row, idx: i32, column: &str) -> Result<i64, StoreError> {
    opt_int(row, idx, column)?.ok_or_else(|| StoreError::invalid_row(column, "expected integer"))
}

pub(crate) fn opt_bytes(row: &Row, idx: i32, column: &str) -> Result<Option<Vec<u8>>, StoreError> {
    Ok(match value(row, idx, column)? {
        Value::Null => None,
        Value::Blob(b) => Some(b),
        Value::Text(s) => Some(s.into_bytes()),
        Value::Integer(_) | Value::Real(_) => None,
    })
}

/// Truthy flag: non-zero integers, or any label other than "", "0", "false", "none"
pub(crate) fn flag(row: &Row, idx: i32, column: &str) -> Result<bool, StoreError> {
    Ok(match value(row, idx, column)? {
        Value::Null => false,
        Value::Integer(n) => n != 0,
        Value::Real(f) => f != 0.0,
        Value::Text(s) => {
            let s = s.trim().to_ascii_lowercase();
            !(s.is_empty() || s == "0" || s == "false" || s == "none")
        }
        Value::Blob(b) => !b.is_empty(),
    })
}
