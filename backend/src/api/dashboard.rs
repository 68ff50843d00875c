use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;

use crate::api::rpc::{body_value, respond};
use crate::contracts::{ExportDashboardInput, HealthStatus};
use crate::db::DbPool;
use crate::error::ApiError;
use crate::schema::users;
use crate::services::dashboard::DashboardService;
use crate::services::export::{export_dashboard as render_export, RenderError, RenderRequest};
use crate::services::ServiceRegistry;
use crate::validation::parse_input;

#[get("/healthcheck")]
pub async fn healthcheck() -> HttpResponse {
    respond(HealthStatus {
        status: "ok",
        timestamp: Utc::now(),
    })
}

#[get("/getDashboardStats")]
pub async fn get_dashboard_stats(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let stats = DashboardService::new(pool.get_ref().clone()).stats(Utc::now())?;
    Ok(respond(stats))
}

/// Renders the user's visible tiles and stores the artifact in the export area.
#[post("/exportDashboard")]
pub async fn export_dashboard(
    pool: web::Data<DbPool>,
    services: web::Data<ServiceRegistry>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let input: ExportDashboardInput = parse_input(body_value(&body)?)?;
    if !services.renderers.supports(input.format) {
        return Err(RenderError::NoRenderer(input.format).into());
    }

    let user_exists: bool = {
        let mut conn = pool.get()?;
        diesel::select(diesel::dsl::exists(users::table.find(input.user_id)))
            .get_result(&mut conn)?
    };
    if !user_exists {
        return Err(ApiError::not_found("user", input.user_id));
    }

    let tiles = DashboardService::new(pool.get_ref().clone())
        .visible_tiles(input.user_id, input.tile_ids.as_deref())?;

    let request = RenderRequest {
        user_id: input.user_id,
        generated_at: Utc::now(),
        tiles: &tiles,
    };
    let result = render_export(
        &services.renderers,
        services.files.as_ref(),
        &services.export_dir,
        input.format,
        &request,
    )
    .await?;

    Ok(respond(result))
}
