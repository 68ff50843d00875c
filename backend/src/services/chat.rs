use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use crate::contracts::CreateChatMessageInput;
use crate::models::{ChatMessage, Document, JsonRecord, MessageRole};

#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("responder unavailable: {0}")]
    Unavailable(String),
}

/// Everything a responder may look at when answering a question.
pub struct ChatContext<'a> {
    pub question: &'a str,
    /// Earlier messages of the conversation, oldest first.
    pub history: &'a [ChatMessage],
    /// Referenced documents owned by the conversation's user.
    pub documents: &'a [Document],
}

/// Produces the assistant's side of a chat exchange.
#[async_trait]
pub trait ChatResponder: Send + Sync {
    fn name(&self) -> &'static str;

    async fn respond(&self, context: &ChatContext<'_>) -> Result<String, ResponderError>;
}

/// Answers with a digest of the referenced documents' summaries.
pub struct DocumentDigestResponder;

#[async_trait]
impl ChatResponder for DocumentDigestResponder {
    fn name(&self) -> &'static str {
        "document_digest"
    }

    async fn respond(&self, context: &ChatContext<'_>) -> Result<String, ResponderError> {
        if context.documents.is_empty() {
            return Ok(
                "No documents were referenced. Attach documents to get a digest of their summaries."
                    .to_string(),
            );
        }

        let mut lines = vec![format!(
            "Referenced documents ({}):",
            context.documents.len()
        )];
        for document in context.documents {
            let detail = match (&document.summary, document.processed) {
                (Some(summary), _) => summary.clone(),
                (None, true) => "processed, no summary available".to_string(),
                (None, false) => "not processed yet".to_string(),
            };
            lines.push(format!("- {}: {}", document.original_filename, detail));
        }
        Ok(lines.join("\n"))
    }
}

/// The two messages of one answered question, ready to be stored together.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatExchange {
    pub question: CreateChatMessageInput,
    pub answer: CreateChatMessageInput,
}

/// Asks the responder first so that nothing is stored when it fails.
pub async fn answer_question(
    responder: &dyn ChatResponder,
    conversation_id: i32,
    document_ids: Option<Vec<i32>>,
    context: &ChatContext<'_>,
) -> Result<ChatExchange, ResponderError> {
    let reply = responder.respond(context).await?;

    let mut metadata = JsonRecord::default();
    metadata.insert("responder", json!(responder.name()));

    Ok(ChatExchange {
        question: CreateChatMessageInput {
            conversation_id,
            role: MessageRole::User,
            content: context.question.to_string(),
            document_references: document_ids,
            metadata: None,
        },
        answer: CreateChatMessageInput {
            conversation_id,
            role: MessageRole::Assistant,
            content: reply,
            document_references: Some(context.documents.iter().map(|d| d.id).collect()),
            metadata: Some(metadata),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentType;
    use chrono::Utc;

    fn document(id: i32, name: &str, summary: Option<&str>, processed: bool) -> Document {
        let now = Utc::now();
        Document {
            id,
            user_id: 1,
            filename: format!("{id}.pdf"),
            original_filename: name.to_string(),
            file_type: DocumentType::Pdf,
            file_size: 100,
            file_path: format!("uploads/{id}.pdf"),
            processed,
            summary: summary.map(str::to_string),
            extracted_text: None,
            metadata: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[actix_rt::test]
    async fn test_digest_without_documents() {
        let context = ChatContext {
            question: "What failed last night?",
            history: &[],
            documents: &[],
        };
        let reply = DocumentDigestResponder.respond(&context).await.unwrap();
        assert!(reply.starts_with("No documents were referenced"));
    }

    struct OfflineResponder;

    #[async_trait]
    impl ChatResponder for OfflineResponder {
        fn name(&self) -> &'static str {
            "offline"
        }

        async fn respond(&self, _context: &ChatContext<'_>) -> Result<String, ResponderError> {
            Err(ResponderError::Unavailable("model host unreachable".to_string()))
        }
    }

    #[actix_rt::test]
    async fn test_failing_responder_produces_no_messages() {
        let context = ChatContext {
            question: "Why did feeder 2 trip?",
            history: &[],
            documents: &[],
        };
        let err = answer_question(&OfflineResponder, 5, Some(vec![1]), &context)
            .await
            .unwrap_err();
        assert!(matches!(err, ResponderError::Unavailable(_)));
    }

    #[actix_rt::test]
    async fn test_exchange_pairs_question_and_answer() {
        let documents = vec![document(4, "relay-settings.pdf", Some("Relay R2 set to 40A"), true)];
        let context = ChatContext {
            question: "What is R2 set to?",
            history: &[],
            documents: &documents,
        };

        let exchange = answer_question(&DocumentDigestResponder, 5, Some(vec![4, 99]), &context)
            .await
            .unwrap();

        assert_eq!(exchange.question.conversation_id, 5);
        assert_eq!(exchange.question.role, MessageRole::User);
        assert_eq!(exchange.question.content, "What is R2 set to?");
        assert_eq!(exchange.question.document_references, Some(vec![4, 99]));
        assert!(exchange.question.metadata.is_none());

        assert_eq!(exchange.answer.role, MessageRole::Assistant);
        assert!(exchange.answer.content.contains("relay-settings.pdf: Relay R2 set to 40A"));
        assert_eq!(exchange.answer.document_references, Some(vec![4]));
        let metadata = exchange.answer.metadata.unwrap();
        assert_eq!(metadata.get("responder").unwrap(), "document_digest");
    }

    #[actix_rt::test]
    async fn test_digest_lists_each_document() {
        let documents = vec![
            document(1, "transformer-log.pdf", Some("Overheating on T3 at 02:10"), true),
            document(2, "inspection.pdf", None, true),
            document(3, "draft.pdf", None, false),
        ];
        let context = ChatContext {
            question: "Summarize",
            history: &[],
            documents: &documents,
        };

        let reply = DocumentDigestResponder.respond(&context).await.unwrap();
        let lines: Vec<&str> = reply.lines().collect();
        assert_eq!(lines[0], "Referenced documents (3):");
        assert_eq!(lines[1], "- transformer-log.pdf: Overheating on T3 at 02:10");
        assert_eq!(lines[2], "- inspection.pdf: processed, no summary available");
        assert_eq!(lines[3], "- draft.pdf: not processed yet");
    }
}
