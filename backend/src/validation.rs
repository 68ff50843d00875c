//! Turns raw JSON into a checked contract value, or a list of issues naming
//! the offending field and the constraint it broke.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use crate::error::ApiError;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    Required,
    Type,
    Enum,
    Format,
    Range,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Issue {
    /// Dotted path of the field, `.` for the input itself.
    pub path: String,
    pub constraint: Constraint,
    pub message: String,
}

impl Issue {
    pub fn new(path: impl Into<String>, constraint: Constraint, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            constraint,
            message: message.into(),
        }
    }
}

/// Deserialize and validate a contract. Defaults are applied here.
pub fn parse_input<T>(raw: Value) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let input: T = parse_value(raw)?;
    input
        .validate()
        .map_err(|errors| ApiError::Validation(issues_from_validator(&errors)))?;
    Ok(input)
}

/// Like [`parse_input`] for procedures whose whole input may be omitted.
pub fn parse_optional_input<T>(raw: Value) -> Result<Option<T>, ApiError>
where
    T: DeserializeOwned + Validate,
{
    if raw.is_null() {
        return Ok(None);
    }
    parse_input(raw).map(Some)
}

/// Deserialize without constraint checks; used for scalar inputs (ids).
pub fn parse_value<T>(raw: Value) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    serde_path_to_error::deserialize(raw).map_err(|err| {
        let path = err.path().to_string();
        let message = err.inner().to_string();
        ApiError::Validation(vec![issue_from_serde(path, message)])
    })
}

fn issue_from_serde(path: String, message: String) -> Issue {
    if let Some(field) = missing_field_name(&message) {
        let path = if path == "." {
            field.to_string()
        } else {
            format!("{path}.{field}")
        };
        return Issue::new(path, Constraint::Required, message);
    }

    let constraint = if message.starts_with("unknown variant") {
        Constraint::Enum
    } else if message.starts_with("invalid type") && message.contains("null") && path == "." {
        // A required input that was not sent at all.
        Constraint::Required
    } else {
        Constraint::Type
    };
    Issue::new(path, constraint, message)
}

fn missing_field_name(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next()
}

fn issues_from_validator(errors: &ValidationErrors) -> Vec<Issue> {
    let mut issues: Vec<Issue> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            let field = field.to_string();
            field_errors.iter().map(move |error| {
                let constraint = match error.code.as_ref() {
                    "range" => Constraint::Range,
                    _ => Constraint::Format,
                };
                let message = match &error.message {
                    Some(message) => message.to_string(),
                    None => describe(error),
                };
                Issue::new(field.clone(), constraint, message)
            })
        })
        .collect();
    issues.sort_by(|a, b| a.path.cmp(&b.path));
    issues
}

fn describe(error: &validator::ValidationError) -> String {
    match error.code.as_ref() {
        "email" => "must be a valid email address".to_string(),
        "range" => {
            let bound = |key: &str| error.params.get(key).map(|v| v.to_string());
            match (bound("min"), bound("max")) {
                (Some(min), Some(max)) => format!("must be between {min} and {max}"),
                (Some(min), None) => format!("must be at least {min}"),
                (None, Some(max)) => format!("must be at most {max}"),
                (None, None) => "out of range".to_string(),
            }
        }
        code => format!("failed {code} check"),
    }
}
