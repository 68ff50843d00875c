use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;
use serde_json::json;

use crate::api::rpc::{body_value, respond, RpcQuery};
use crate::contracts::{CreateDashboardTileInput, UpdateDashboardTileInput};
use crate::db::DbPool;
use crate::error::ApiError;
use crate::models::DashboardTile;
use crate::schema::dashboard_tiles;
use crate::validation::{parse_input, parse_value};

#[post("/createDashboardTile")]
pub async fn create_dashboard_tile(
    pool: web::Data<DbPool>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let input: CreateDashboardTileInput = parse_input(body_value(&body)?)?;
    let mut conn = pool.get()?;

    let tile: DashboardTile = diesel::insert_into(dashboard_tiles::table)
        .values(&input)
        .returning(DashboardTile::as_returning())
        .get_result(&mut conn)?;

    log::info!("Added {} tile {} for user {}", tile.kind, tile.id, tile.user_id);
    Ok(respond(tile))
}

/// Every tile of a user, hidden ones included, top row first.
#[get("/getDashboardTiles")]
pub async fn get_dashboard_tiles(
    pool: web::Data<DbPool>,
    query: web::Query<RpcQuery>,
) -> Result<HttpResponse, ApiError> {
    let user_id: i32 = parse_value(query.value()?)?;
    let mut conn = pool.get()?;

    let tiles: Vec<DashboardTile> = dashboard_tiles::table
        .filter(dashboard_tiles::user_id.eq(user_id))
        .order((
            dashboard_tiles::position_y.asc(),
            dashboard_tiles::position_x.asc(),
            dashboard_tiles::id.asc(),
        ))
        .select(DashboardTile::as_select())
        .load(&mut conn)?;

    Ok(respond(tiles))
}

#[post("/updateDashboardTile")]
pub async fn update_dashboard_tile(
    pool: web::Data<DbPool>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let input: UpdateDashboardTileInput = parse_input(body_value(&body)?)?;
    let mut conn = pool.get()?;

    let tile: DashboardTile = diesel::update(dashboard_tiles::table.find(input.id))
        .set((&input, dashboard_tiles::updated_at.eq(Utc::now())))
        .returning(DashboardTile::as_returning())
        .get_result(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("tile", input.id))?;

    Ok(respond(tile))
}

#[post("/deleteDashboardTile")]
pub async fn delete_dashboard_tile(
    pool: web::Data<DbPool>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let tile_id: i32 = parse_value(body_value(&body)?)?;
    let mut conn = pool.get()?;

    let deleted = diesel::delete(dashboard_tiles::table.find(tile_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(ApiError::not_found("tile", tile_id));
    }

    log::info!("Deleted tile {}", tile_id);
    Ok(respond(json!({ "deleted": true })))
}
