use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;

use crate::api::rpc::{body_value, respond, RpcQuery};
use crate::contracts::{AcknowledgeAlertInput, CreateAlertInput};
use crate::db::DbPool;
use crate::error::ApiError;
use crate::models::Alert;
use crate::schema::alerts;
use crate::services::alerts::{self as lifecycle, LifecycleError};
use crate::validation::{parse_input, parse_value};

#[post("/createAlert")]
pub async fn create_alert(
    pool: web::Data<DbPool>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let input: CreateAlertInput = parse_input(body_value(&body)?)?;
    let mut conn = pool.get()?;

    let alert: Alert = diesel::insert_into(alerts::table)
        .values(&input)
        .returning(Alert::as_returning())
        .get_result(&mut conn)?;

    log::warn!(
        "Alert {} raised: [{}] {} ({})",
        alert.id,
        alert.severity,
        alert.title,
        alert.kind
    );
    Ok(respond(alert))
}

/// Newest first, optionally only those of one device.
#[get("/getAlerts")]
pub async fn get_alerts(
    pool: web::Data<DbPool>,
    query: web::Query<RpcQuery>,
) -> Result<HttpResponse, ApiError> {
    let device_id: Option<i32> = parse_value(query.value()?)?;
    let mut conn = pool.get()?;

    let mut filtered = alerts::table.into_boxed();
    if let Some(device_id) = device_id {
        filtered = filtered.filter(alerts::device_id.eq(device_id));
    }

    let found: Vec<Alert> = filtered
        .order((alerts::created_at.desc(), alerts::id.desc()))
        .select(Alert::as_select())
        .load(&mut conn)?;

    Ok(respond(found))
}

#[post("/acknowledgeAlert")]
pub async fn acknowledge_alert(
    pool: web::Data<DbPool>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let input: AcknowledgeAlertInput = parse_input(body_value(&body)?)?;
    let mut conn = pool.get()?;

    let alert = load_alert(&mut conn, input.alert_id)?;
    let changes = lifecycle::acknowledge(&alert, input.user_id, Utc::now())?;

    // Conditional on the flag so that only one of two racing requests wins.
    let acknowledged: Alert = diesel::update(
        alerts::table
            .find(alert.id)
            .filter(alerts::acknowledged.eq(false)),
    )
    .set(&changes)
    .returning(Alert::as_returning())
    .get_result(&mut conn)
    .optional()?
    .ok_or(LifecycleError::AlreadyAcknowledged(alert.id))?;

    log::info!("Alert {} acknowledged by user {}", alert.id, input.user_id);
    Ok(respond(acknowledged))
}

#[post("/resolveAlert")]
pub async fn resolve_alert(
    pool: web::Data<DbPool>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let alert_id: i32 = parse_value(body_value(&body)?)?;
    let mut conn = pool.get()?;

    let alert = load_alert(&mut conn, alert_id)?;
    let changes = lifecycle::resolve(&alert, Utc::now())?;

    let resolved: Alert = diesel::update(
        alerts::table
            .find(alert.id)
            .filter(alerts::resolved.eq(false)),
    )
    .set(&changes)
    .returning(Alert::as_returning())
    .get_result(&mut conn)
    .optional()?
    .ok_or(LifecycleError::AlreadyResolved(alert.id))?;

    log::info!("Alert {} resolved", alert.id);
    Ok(respond(resolved))
}

fn load_alert(conn: &mut PgConnection, alert_id: i32) -> Result<Alert, ApiError> {
    alerts::table
        .find(alert_id)
        .select(Alert::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("alert", alert_id))
}
