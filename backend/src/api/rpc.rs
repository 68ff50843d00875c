//! Wire format of the RPC surface.
//!
//! Queries carry their input as JSON in the `input` query parameter, mutations
//! as the JSON request body. Either may be absent, which reads as `null`.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::validation::{Constraint, Issue};

#[derive(Deserialize, Debug, Default)]
pub struct RpcQuery {
    pub input: Option<String>,
}

impl RpcQuery {
    pub fn value(&self) -> Result<Value, ApiError> {
        match self.input.as_deref() {
            None => Ok(Value::Null),
            Some(raw) => parse_json(raw.as_bytes()),
        }
    }
}

pub fn body_value(body: &web::Bytes) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    parse_json(body)
}

fn parse_json(raw: &[u8]) -> Result<Value, ApiError> {
    serde_json::from_slice(raw).map_err(|e| {
        ApiError::Validation(vec![Issue::new(
            ".",
            Constraint::Type,
            format!("input is not valid JSON: {e}"),
        )])
    })
}

/// Wraps a procedure's output in the success envelope.
pub fn respond<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "result": { "data": data } }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_missing_input_is_null() {
        assert_eq!(RpcQuery::default().value().unwrap(), Value::Null);
        assert_eq!(body_value(&web::Bytes::new()).unwrap(), Value::Null);
        assert_eq!(body_value(&web::Bytes::from_static(b" \n")).unwrap(), Value::Null);
    }

    #[test]
    fn test_query_input_is_parsed() {
        let query = RpcQuery {
            input: Some(r#"{"limit": 5}"#.to_string()),
        };
        assert_eq!(query.value().unwrap(), json!({"limit": 5}));

        let scalar = RpcQuery {
            input: Some("42".to_string()),
        };
        assert_eq!(scalar.value().unwrap(), json!(42));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        match body_value(&web::Bytes::from_static(b"{name:")) {
            Err(ApiError::Validation(issues)) => {
                assert_eq!(issues[0].path, ".");
                assert_eq!(issues[0].constraint, Constraint::Type);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_success_envelope() {
        let response = respond(json!({"deleted": true}));
        let body = to_bytes(response.into_body()).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({"result": {"data": {"deleted": true}}}));
    }
}
