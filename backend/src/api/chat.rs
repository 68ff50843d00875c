use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;

use crate::api::rpc::{body_value, respond, RpcQuery};
use crate::contracts::{ChatQueryInput, CreateChatConversationInput, CreateChatMessageInput};
use crate::db::DbPool;
use crate::error::ApiError;
use crate::models::{ChatConversation, ChatMessage, Document};
use crate::schema::{chat_conversations, chat_messages, documents};
use crate::services::chat::{answer_question, ChatContext};
use crate::services::ServiceRegistry;
use crate::validation::{parse_input, parse_value};

#[post("/createChatConversation")]
pub async fn create_chat_conversation(
    pool: web::Data<DbPool>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let input: CreateChatConversationInput = parse_input(body_value(&body)?)?;
    let mut conn = pool.get()?;

    let conversation: ChatConversation = diesel::insert_into(chat_conversations::table)
        .values(&input)
        .returning(ChatConversation::as_returning())
        .get_result(&mut conn)?;

    log::info!(
        "Started conversation {} for user {}",
        conversation.id,
        conversation.user_id
    );
    Ok(respond(conversation))
}

/// Most recently active first.
#[get("/getChatConversations")]
pub async fn get_chat_conversations(
    pool: web::Data<DbPool>,
    query: web::Query<RpcQuery>,
) -> Result<HttpResponse, ApiError> {
    let user_id: i32 = parse_value(query.value()?)?;
    let mut conn = pool.get()?;

    let found: Vec<ChatConversation> = chat_conversations::table
        .filter(chat_conversations::user_id.eq(user_id))
        .order((
            chat_conversations::updated_at.desc(),
            chat_conversations::id.desc(),
        ))
        .select(ChatConversation::as_select())
        .load(&mut conn)?;

    Ok(respond(found))
}

#[post("/createChatMessage")]
pub async fn create_chat_message(
    pool: web::Data<DbPool>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let input: CreateChatMessageInput = parse_input(body_value(&body)?)?;
    let mut conn = pool.get()?;

    let message = conn.transaction::<ChatMessage, ApiError, _>(|conn| {
        let message = insert_message(conn, &input)?;
        touch_conversation(conn, input.conversation_id)?;
        Ok(message)
    })?;

    Ok(respond(message))
}

/// Oldest first.
#[get("/getChatMessages")]
pub async fn get_chat_messages(
    pool: web::Data<DbPool>,
    query: web::Query<RpcQuery>,
) -> Result<HttpResponse, ApiError> {
    let conversation_id: i32 = parse_value(query.value()?)?;
    let mut conn = pool.get()?;

    let messages = load_history(&mut conn, conversation_id)?;
    Ok(respond(messages))
}

/// Asks the responder, then stores the question and its reply together.
#[post("/chatQuery")]
pub async fn chat_query(
    pool: web::Data<DbPool>,
    services: web::Data<ServiceRegistry>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let input: ChatQueryInput = parse_input(body_value(&body)?)?;
    let mut conn = pool.get()?;

    let conversation: ChatConversation = chat_conversations::table
        .find(input.conversation_id)
        .select(ChatConversation::as_select())
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("conversation", input.conversation_id))?;

    let history = load_history(&mut conn, conversation.id)?;

    // Only the conversation owner's documents are visible to the responder.
    let referenced: Vec<Document> = match input.document_ids.as_deref() {
        Some(ids) if !ids.is_empty() => documents::table
            .filter(documents::id.eq_any(ids.to_vec()))
            .filter(documents::user_id.eq(conversation.user_id))
            .order(documents::id.asc())
            .select(Document::as_select())
            .load(&mut conn)?,
        _ => Vec::new(),
    };

    let context = ChatContext {
        question: &input.message,
        history: &history,
        documents: &referenced,
    };
    let exchange = answer_question(
        services.responder.as_ref(),
        conversation.id,
        input.document_ids.clone(),
        &context,
    )
    .await?;

    let message = conn.transaction::<ChatMessage, ApiError, _>(|conn| {
        insert_message(conn, &exchange.question)?;
        let answer = insert_message(conn, &exchange.answer)?;
        touch_conversation(conn, conversation.id)?;
        Ok(answer)
    })?;

    log::info!(
        "Answered query in conversation {} using {} documents",
        conversation.id,
        referenced.len()
    );
    Ok(respond(message))
}

fn insert_message(
    conn: &mut PgConnection,
    input: &CreateChatMessageInput,
) -> Result<ChatMessage, ApiError> {
    let message = diesel::insert_into(chat_messages::table)
        .values(input)
        .returning(ChatMessage::as_returning())
        .get_result(conn)?;
    Ok(message)
}

fn touch_conversation(conn: &mut PgConnection, conversation_id: i32) -> Result<(), ApiError> {
    diesel::update(chat_conversations::table.find(conversation_id))
        .set(chat_conversations::updated_at.eq(Utc::now()))
        .execute(conn)?;
    Ok(())
}

fn load_history(
    conn: &mut PgConnection,
    conversation_id: i32,
) -> Result<Vec<ChatMessage>, ApiError> {
    let messages = chat_messages::table
        .filter(chat_messages::conversation_id.eq(conversation_id))
        .order((chat_messages::created_at.asc(), chat_messages::id.asc()))
        .select(ChatMessage::as_select())
        .load(conn)?;
    Ok(messages)
}
