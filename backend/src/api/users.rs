use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;

use crate::api::rpc::{body_value, respond};
use crate::contracts::{CreateUserInput, UpdateUserInput};
use crate::db::DbPool;
use crate::error::ApiError;
use crate::models::User;
use crate::schema::users;
use crate::validation::parse_input;

#[post("/createUser")]
pub async fn create_user(
    pool: web::Data<DbPool>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let input: CreateUserInput = parse_input(body_value(&body)?)?;
    let mut conn = pool.get()?;

    let user: User = diesel::insert_into(users::table)
        .values(&input)
        .returning(User::as_returning())
        .get_result(&mut conn)?;

    log::info!("Created user {} with role {}", user.id, user.role);
    Ok(respond(user))
}

#[get("/getUsers")]
pub async fn get_users(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let mut conn = pool.get()?;

    let all: Vec<User> = users::table
        .order(users::id.asc())
        .select(User::as_select())
        .load(&mut conn)?;

    Ok(respond(all))
}

#[post("/updateUser")]
pub async fn update_user(
    pool: web::Data<DbPool>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let input: UpdateUserInput = parse_input(body_value(&body)?)?;
    let mut conn = pool.get()?;

    let user: User = diesel::update(users::table.find(input.id))
        .set((&input, users::updated_at.eq(Utc::now())))
        .returning(User::as_returning())
        .get_result(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("user", input.id))?;

    log::info!("Updated user {}", user.id);
    Ok(respond(user))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::{first_issue, mutation, send};
    use actix_web::http::StatusCode;
    use serde_json::json;

    #[actix_rt::test]
    async fn test_create_user_rejects_bad_email() {
        let (status, body) = send(mutation(
            "createUser",
            json!({"email": "ops-at-grid", "name": "Ops", "role": "operator"}),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert_eq!(first_issue(&body), ("email".to_string(), "format".to_string()));
    }

    #[actix_rt::test]
    async fn test_create_user_rejects_unknown_role() {
        let (status, body) = send(mutation(
            "createUser",
            json!({"email": "ops@grid.example", "name": "Ops", "role": "root"}),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(first_issue(&body), ("role".to_string(), "enum".to_string()));
    }

    #[actix_rt::test]
    async fn test_update_user_requires_id() {
        let (status, body) = send(mutation("updateUser", json!({"name": "Renamed"}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(first_issue(&body), ("id".to_string(), "required".to_string()));
    }

    #[actix_rt::test]
    async fn test_update_user_rejects_null_theme() {
        let (status, body) = send(mutation("updateUser", json!({"id": 1, "theme": null}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(first_issue(&body).0, "theme");
    }
}
