use actix_web::{get, post, web, HttpResponse};
use diesel::prelude::*;

use crate::api::rpc::{body_value, respond, RpcQuery};
use crate::contracts::{CreateSensorInput, CreateSensorReadingInput, GetSensorReadingsInput};
use crate::db::DbPool;
use crate::error::ApiError;
use crate::models::{Sensor, SensorReading};
use crate::schema::{sensor_readings, sensors};
use crate::validation::{parse_input, parse_value};

#[post("/createSensor")]
pub async fn create_sensor(
    pool: web::Data<DbPool>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let input: CreateSensorInput = parse_input(body_value(&body)?)?;
    let mut conn = pool.get()?;

    let sensor: Sensor = diesel::insert_into(sensors::table)
        .values(&input)
        .returning(Sensor::as_returning())
        .get_result(&mut conn)?;

    log::info!(
        "Created {} sensor {} on device {}",
        sensor.kind,
        sensor.id,
        sensor.device_id
    );
    Ok(respond(sensor))
}

/// All sensors, or those of one device when a device id is given.
#[get("/getSensors")]
pub async fn get_sensors(
    pool: web::Data<DbPool>,
    query: web::Query<RpcQuery>,
) -> Result<HttpResponse, ApiError> {
    let device_id: Option<i32> = parse_value(query.value()?)?;
    let mut conn = pool.get()?;

    let mut filtered = sensors::table.into_boxed();
    if let Some(device_id) = device_id {
        filtered = filtered.filter(sensors::device_id.eq(device_id));
    }

    let found: Vec<Sensor> = filtered
        .order(sensors::id.asc())
        .select(Sensor::as_select())
        .load(&mut conn)?;

    Ok(respond(found))
}

#[post("/createSensorReading")]
pub async fn create_sensor_reading(
    pool: web::Data<DbPool>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let input: CreateSensorReadingInput = parse_input(body_value(&body)?)?;
    let mut conn = pool.get()?;

    let reading: SensorReading = diesel::insert_into(sensor_readings::table)
        .values(&input)
        .returning(SensorReading::as_returning())
        .get_result(&mut conn)?;

    log::debug!(
        "Stored reading {} for sensor {} at {}",
        reading.id,
        reading.sensor_id,
        reading.timestamp
    );
    Ok(respond(reading))
}

/// Newest first; date bounds are inclusive.
#[get("/getSensorReadings")]
pub async fn get_sensor_readings(
    pool: web::Data<DbPool>,
    query: web::Query<RpcQuery>,
) -> Result<HttpResponse, ApiError> {
    let input: GetSensorReadingsInput = parse_input(query.value()?)?;
    let mut conn = pool.get()?;

    let mut filtered = sensor_readings::table
        .filter(sensor_readings::sensor_id.eq(input.sensor_id))
        .into_boxed();
    if let Some(start) = input.start_date {
        filtered = filtered.filter(sensor_readings::timestamp.ge(start));
    }
    if let Some(end) = input.end_date {
        filtered = filtered.filter(sensor_readings::timestamp.le(end));
    }

    let readings: Vec<SensorReading> = filtered
        .order((sensor_readings::timestamp.desc(), sensor_readings::id.desc()))
        .limit(input.limit)
        .select(SensorReading::as_select())
        .load(&mut conn)?;

    Ok(respond(readings))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::{first_issue, mutation, query, send};
    use actix_web::http::StatusCode;
    use serde_json::json;

    #[actix_rt::test]
    async fn test_get_sensors_rejects_non_integer_device() {
        let (status, body) = send(query("getSensors", r#""main""#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(first_issue(&body).1, "type");
    }

    #[actix_rt::test]
    async fn test_create_sensor_rejects_unknown_type() {
        let (status, body) = send(mutation(
            "createSensor",
            json!({
                "device_id": 1,
                "type": "radiation",
                "name": "Geiger",
                "unit": "uSv",
                "min_value": null,
                "max_value": null
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(first_issue(&body), ("type".to_string(), "enum".to_string()));
    }

    #[actix_rt::test]
    async fn test_reading_quality_score_bounds() {
        let (status, body) = send(mutation(
            "createSensorReading",
            json!({"sensor_id": 2, "value": 230.1, "quality_score": -0.1}),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            first_issue(&body),
            ("quality_score".to_string(), "range".to_string())
        );
    }

    #[actix_rt::test]
    async fn test_get_sensor_readings_requires_input() {
        let (status, body) = send(actix_web::test::TestRequest::get().uri("/trpc/getSensorReadings")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(first_issue(&body), (".".to_string(), "required".to_string()));
    }

    #[actix_rt::test]
    async fn test_get_sensor_readings_rejects_bad_date() {
        let (status, body) = send(query(
            "getSensorReadings",
            r#"{"sensor_id":1,"start_date":"yesterday"}"#,
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(first_issue(&body).0, "start_date");
    }
}
