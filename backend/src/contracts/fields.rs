//! Field presence rules for contract structs.
//!
//! serde treats a missing `Option` field as `None` and a `null` as `None`.
//! The contracts need to tell these apart:
//!
//! | rule        | omitted | `null`        | value            |
//! |-------------|---------|---------------|------------------|
//! | `nullable`  | error   | `None`        | `Some(v)`        |
//! | `non_null`  | `None`  | error         | `Some(v)`        |
//! | `patch`     | `None`  | `Some(None)`  | `Some(Some(v))`  |
//!
//! `non_null` and `patch` must be paired with `#[serde(default)]`.

use serde::{Deserialize, Deserializer};
use validator::ValidationError;

use crate::services::file_store::is_contained;

pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

pub fn non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

pub fn patch<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub fn default_true() -> bool {
    true
}

pub fn default_calibration_factor() -> f64 {
    1.0
}

pub fn default_limit() -> i64 {
    100
}

/// Stored paths are relative to the file store root and may not climb out of it.
pub fn stored_path(path: &str) -> Result<(), ValidationError> {
    if is_contained(path) {
        return Ok(());
    }
    let mut error = ValidationError::new("stored_path");
    error.message = Some("must be a relative path inside the file store".into());
    Err(error)
}
