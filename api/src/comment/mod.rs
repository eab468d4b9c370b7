pub mod create;
pub mod get;
pub mod reply;
pub mod routes;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::ApiRequestError, models::user::AuthorProfile, store::StoreError};

#[derive(thiserror::Error, Debug)]
pub enum CommentError {
    #[error("El ID de usuario no coincide con ninguno en la base de datos")]
    AuthorNotFound,

    #[error("El ID de la publicación no existe")]
    PublicationNotFound,

    #[error("El comentario padre no existe")]
    ParentCommentNotFound,

    #[error("El comentario padre no pertenece a la publicación")]
    ParentCommentMismatch,

    #[error("El texto del comentario es obligatorio")]
    EmptyText,

    #[error("El comentario es demasiado largo (máximo {max} caracteres)")]
    TextTooLong { max: usize },

    /// Rebuilding the tree failed after the comment was already written.
    #[error("Error al obtener los comentarios")]
    Retrieval(#[source] Box<CommentError>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiRequestError for CommentError {
    fn status_code(&self) -> StatusCode {
        match self {
            CommentError::AuthorNotFound
            | CommentError::PublicationNotFound
            | CommentError::ParentCommentNotFound
            | CommentError::ParentCommentMismatch
            | CommentError::EmptyText
            | CommentError::TextTooLong { .. } => StatusCode::BAD_REQUEST,
            CommentError::Retrieval(_) | CommentError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// The model that will be returned to the client
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    #[serde(rename = "_id")]
    pub id: i32,
    pub text: String,
    /// `None` when the author no longer exists.
    pub author: Option<AuthorProfile>,
    pub publication: i32,
    pub parent_comment: Option<i32>,
    pub replys: Vec<Reply>,
    pub created_at: DateTime<Utc>,
}

/// A reply is either expanded in place or, past the resolution depth, left
/// as the bare id of the stored comment.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Reply {
    Resolved(CommentNode),
    Unresolved(i32),
}

/// Body of both creation routes. Missing ids are reported as not found.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CommentSubmission {
    text: Option<String>,
    parent_comment: Option<i32>,
    publication: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub ok: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<&'static str>,

    pub comments: Vec<CommentNode>,
}

/// Trims the text and checks it against `max_len` characters.
fn validate_text(text: Option<String>, max_len: usize) -> Result<String, CommentError> {
    let text = text.unwrap_or_default().trim().to_string();

    if text.is_empty() {
        return Err(CommentError::EmptyText);
    }

    if text.chars().count() > max_len {
        return Err(CommentError::TextTooLong { max: max_len });
    }

    Ok(text)
}

/// Ids come in as path segments; anything that isn't one can't match a row.
fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validate_text_trims() {
        assert_eq!(validate_text(Some("  hola  ".into()), 10).unwrap(), "hola");
    }

    #[test]
    fn test_validate_text_rejects_blank_and_missing() {
        assert!(matches!(
            validate_text(Some("   ".into()), 10),
            Err(CommentError::EmptyText)
        ));
        assert!(matches!(validate_text(None, 10), Err(CommentError::EmptyText)));
    }

    #[test]
    fn test_validate_text_counts_characters_not_bytes() {
        assert!(validate_text(Some("ñññññ".into()), 5).is_ok());
        assert!(matches!(
            validate_text(Some("ññññññ".into()), 5),
            Err(CommentError::TextTooLong { max: 5 })
        ));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("64b7f0c2e1"), None);
    }

    #[test]
    fn test_unresolved_reply_serializes_as_bare_id() {
        assert_eq!(serde_json::to_value(Reply::Unresolved(7)).unwrap(), serde_json::json!(7));
    }
}
