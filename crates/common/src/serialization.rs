//! Serialization utilities.
//!
//! This module provides helpers for embedding serialized records in log
//! lines and custom serde predicates used by those records.

use serde::Serialize;
use std::fmt::Debug;

/// Serialize a record to a JSON string for structured logging.
///
/// Serialization failures never fail the log call; the record's `Debug`
/// rendering is returned instead.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use aop_logging_common::serialization::to_json_string;
///
/// let mut record = BTreeMap::new();
/// record.insert("requestId", "3f9a1c2e");
/// assert_eq!(to_json_string(&record), r#"{"requestId":"3f9a1c2e"}"#);
/// ```
pub fn to_json_string<T>(value: &T) -> String
where
    T: Serialize + Debug + ?Sized,
{
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to serialize log payload");
            format!("{:?}", value)
        }
    }
}

/// Skip serializing if the value is false.
pub fn is_false(value: &bool) -> bool {
    !value
}
