use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;

use crate::api::rpc::{body_value, respond, RpcQuery};
use crate::contracts::UploadDocumentInput;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::models::Document;
use crate::schema::documents;
use crate::services::ServiceRegistry;
use crate::validation::{parse_input, parse_value};

/// Records an uploaded file. The bytes are expected at `file_path` in the file store.
#[post("/uploadDocument")]
pub async fn upload_document(
    pool: web::Data<DbPool>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let input: UploadDocumentInput = parse_input(body_value(&body)?)?;
    let mut conn = pool.get()?;

    let document: Document = diesel::insert_into(documents::table)
        .values(&input)
        .returning(Document::as_returning())
        .get_result(&mut conn)?;

    log::info!(
        "Recorded document {} ({}, {} bytes) for user {}",
        document.id,
        document.file_type,
        document.file_size,
        document.user_id
    );
    Ok(respond(document))
}

#[get("/getDocuments")]
pub async fn get_documents(
    pool: web::Data<DbPool>,
    query: web::Query<RpcQuery>,
) -> Result<HttpResponse, ApiError> {
    let user_id: i32 = parse_value(query.value()?)?;
    let mut conn = pool.get()?;

    let found: Vec<Document> = documents::table
        .filter(documents::user_id.eq(user_id))
        .order((documents::created_at.desc(), documents::id.desc()))
        .select(Document::as_select())
        .load(&mut conn)?;

    Ok(respond(found))
}

#[post("/processDocument")]
pub async fn process_document(
    pool: web::Data<DbPool>,
    services: web::Data<ServiceRegistry>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let document_id: i32 = parse_value(body_value(&body)?)?;
    let mut conn = pool.get()?;

    let document: Document = documents::table
        .find(document_id)
        .select(Document::as_select())
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("document", document_id))?;

    let outcome = services
        .processor
        .process(&document, services.files.as_ref())
        .await?;

    let processed: Document = diesel::update(documents::table.find(document_id))
        .set(outcome.into_changeset(Utc::now()))
        .returning(Document::as_returning())
        .get_result(&mut conn)?;

    log::info!(
        "Processed document {} with {}",
        processed.id,
        services.processor.name()
    );
    Ok(respond(processed))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::{first_issue, mutation, query, send};
    use actix_web::http::StatusCode;
    use serde_json::json;

    #[actix_rt::test]
    async fn test_upload_rejects_unknown_file_type() {
        let (status, body) = send(mutation(
            "uploadDocument",
            json!({
                "user_id": 1,
                "filename": "a1.xlsx",
                "original_filename": "loads.xlsx",
                "file_type": "xlsx",
                "file_size": 2048,
                "file_path": "uploads/a1.xlsx"
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(first_issue(&body), ("file_type".to_string(), "enum".to_string()));
    }

    #[actix_rt::test]
    async fn test_upload_rejects_escaping_path() {
        let (status, body) = send(mutation(
            "uploadDocument",
            json!({
                "user_id": 1,
                "filename": "passwd",
                "original_filename": "passwd",
                "file_type": "txt",
                "file_size": 1,
                "file_path": "../../etc/passwd"
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(first_issue(&body), ("file_path".to_string(), "format".to_string()));
    }

    #[actix_rt::test]
    async fn test_get_documents_requires_user_id() {
        let (status, body) = send(query("getDocuments", "null")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(first_issue(&body).1, "required");
    }

    #[actix_rt::test]
    async fn test_process_document_takes_bare_id() {
        let (status, body) = send(mutation("processDocument", json!({"id": 3}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(first_issue(&body).1, "type");
    }
}
