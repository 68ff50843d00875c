use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;

use crate::api::rpc::{body_value, respond, RpcQuery};
use crate::contracts::{CreateDeviceInput, GetDevicesInput, UpdateDeviceInput};
use crate::db::DbPool;
use crate::error::ApiError;
use crate::models::Device;
use crate::schema::devices;
use crate::validation::{parse_input, parse_optional_input};

#[post("/createDevice")]
pub async fn create_device(
    pool: web::Data<DbPool>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let input: CreateDeviceInput = parse_input(body_value(&body)?)?;
    let mut conn = pool.get()?;

    let device: Device = diesel::insert_into(devices::table)
        .values(&input)
        .returning(Device::as_returning())
        .get_result(&mut conn)?;

    log::info!("Registered {} device {} ({})", device.kind, device.id, device.name);
    Ok(respond(device))
}

/// Devices by id, optionally filtered by type and status.
#[get("/getDevices")]
pub async fn get_devices(
    pool: web::Data<DbPool>,
    query: web::Query<RpcQuery>,
) -> Result<HttpResponse, ApiError> {
    let input: GetDevicesInput = parse_optional_input(query.value()?)?.unwrap_or_default();
    let mut conn = pool.get()?;

    let mut filtered = devices::table.into_boxed();
    if let Some(kind) = input.kind {
        filtered = filtered.filter(devices::kind.eq(kind));
    }
    if let Some(status) = input.status {
        filtered = filtered.filter(devices::status.eq(status));
    }

    let found: Vec<Device> = filtered
        .order(devices::id.asc())
        .limit(input.limit)
        .select(Device::as_select())
        .load(&mut conn)?;

    Ok(respond(found))
}

#[post("/updateDevice")]
pub async fn update_device(
    pool: web::Data<DbPool>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let input: UpdateDeviceInput = parse_input(body_value(&body)?)?;
    let mut conn = pool.get()?;

    let device: Device = diesel::update(devices::table.find(input.id))
        .set((&input, devices::updated_at.eq(Utc::now())))
        .returning(Device::as_returning())
        .get_result(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("device", input.id))?;

    log::info!("Updated device {} (status {})", device.id, device.status);
    Ok(respond(device))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::{first_issue, mutation, query, send};
    use actix_web::http::StatusCode;
    use serde_json::json;

    #[actix_rt::test]
    async fn test_create_device_requires_nullable_fields() {
        let (status, body) = send(mutation(
            "createDevice",
            json!({"name": "Feeder 7 meter", "type": "meter"}),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (path, constraint) = first_issue(&body);
        assert_eq!(constraint, "required");
        assert!(["location", "latitude", "longitude"].contains(&path.as_str()));
    }

    #[actix_rt::test]
    async fn test_create_device_rejects_null_metadata() {
        let (status, body) = send(mutation(
            "createDevice",
            json!({
                "name": "Feeder 7 meter",
                "type": "meter",
                "location": null,
                "latitude": null,
                "longitude": null,
                "metadata": null
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(first_issue(&body).0, "metadata");
    }

    #[actix_rt::test]
    async fn test_get_devices_limit_out_of_range() {
        let (status, body) = send(query("getDevices", r#"{"limit":0}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(first_issue(&body), ("limit".to_string(), "range".to_string()));
    }

    #[actix_rt::test]
    async fn test_get_devices_unknown_status() {
        let (status, body) = send(query("getDevices", r#"{"status":"sleeping"}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(first_issue(&body), ("status".to_string(), "enum".to_string()));
    }

    #[actix_rt::test]
    async fn test_query_input_survives_reserved_characters() {
        let (status, body) = send(query("getDevices", r#"{"status":"on & off #2"}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(first_issue(&body), ("status".to_string(), "enum".to_string()));
        let message = body["error"]["data"]["issues"][0]["message"].as_str().unwrap();
        assert!(message.contains("`on & off #2`"), "{message}");
    }

    #[actix_rt::test]
    async fn test_update_device_latitude_must_be_number() {
        let (status, body) = send(mutation(
            "updateDevice",
            json!({"id": 4, "latitude": "north"}),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(first_issue(&body), ("latitude".to_string(), "type".to_string()));
    }
}
