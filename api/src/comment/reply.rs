use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{App, error::AppError, models::comment::NewComment, store::CommentStore};

use super::{
    CommentError, CommentNode, CommentSubmission, CommentsResponse,
    get::get_comments_by_publication, parse_id, validate_text,
};

const CREATED_MSG: &str = "Respuesta al comentario creada exitosamente";
const CREATE_FAILED_MSG: &str = "Error al crear la respuesta al comentario";

#[debug_handler]
pub async fn reply_to_comment(
    State(ctx): State<App>,
    Path(author_id): Path<String>,
    crate::json::Json(submission): crate::json::Json<CommentSubmission>,
) -> Result<(StatusCode, Json<CommentsResponse>), AppError> {
    let comments = add_reply(
        ctx.store.as_ref(),
        parse_id(&author_id),
        submission,
        ctx.config.comment_max_length,
    )
    .await
    .map_err(|e| AppError::from_request_error(e, CREATE_FAILED_MSG))?;

    Ok((
        StatusCode::CREATED,
        Json(CommentsResponse {
            ok: true,
            msg: Some(CREATED_MSG),
            comments,
        }),
    ))
}

/// Appends a reply to an existing comment and returns the publication's
/// refreshed comment tree. The publication's top-level list is left alone.
pub async fn add_reply(
    store: &dyn CommentStore,
    author_id: Option<i32>,
    submission: CommentSubmission,
    max_text_len: usize,
) -> Result<Vec<CommentNode>, CommentError> {
    let author_id = author_id.ok_or(CommentError::AuthorNotFound)?;
    if !store.user_exists(author_id).await? {
        return Err(CommentError::AuthorNotFound);
    }

    let parent_id = submission
        .parent_comment
        .ok_or(CommentError::ParentCommentNotFound)?;
    let parent = store
        .find_comment(parent_id)
        .await?
        .ok_or(CommentError::ParentCommentNotFound)?;

    let publication_id = submission
        .publication
        .ok_or(CommentError::PublicationNotFound)?;
    if store.find_publication(publication_id).await?.is_none() {
        return Err(CommentError::PublicationNotFound);
    }

    if parent.publication_id != publication_id {
        return Err(CommentError::ParentCommentMismatch);
    }

    let text = validate_text(submission.text, max_text_len)?;

    let inserted = store
        .insert_reply(
            NewComment::new(text, author_id, publication_id, Some(parent_id)),
            parent_id,
        )
        .await?;

    tracing::info!(
        comment_id = inserted.id,
        parent_id,
        publication_id,
        author_id,
        "Reply created"
    );

    get_comments_by_publication(store, publication_id)
        .await
        .map_err(|e| CommentError::Retrieval(Box::new(e)))
}
