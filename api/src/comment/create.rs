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

const CREATED_MSG: &str = "Comentario creado exitosamente";
const CREATE_FAILED_MSG: &str = "Error al crear el comentario";

#[debug_handler]
pub async fn create_comment(
    State(ctx): State<App>,
    Path(author_id): Path<String>,
    crate::json::Json(submission): crate::json::Json<CommentSubmission>,
) -> Result<(StatusCode, Json<CommentsResponse>), AppError> {
    let comments = add_comment(
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

/// Creates a comment listed at the front of its publication and returns the
/// publication's refreshed comment tree.
pub async fn add_comment(
    store: &dyn CommentStore,
    author_id: Option<i32>,
    submission: CommentSubmission,
    max_text_len: usize,
) -> Result<Vec<CommentNode>, CommentError> {
    let author_id = author_id.ok_or(CommentError::AuthorNotFound)?;
    if !store.user_exists(author_id).await? {
        return Err(CommentError::AuthorNotFound);
    }

    let publication_id = submission
        .publication
        .ok_or(CommentError::PublicationNotFound)?;
    if store.find_publication(publication_id).await?.is_none() {
        return Err(CommentError::PublicationNotFound);
    }

    if let Some(parent_id) = submission.parent_comment {
        if store.find_comment(parent_id).await?.is_none() {
            return Err(CommentError::ParentCommentNotFound);
        }
    }

    let text = validate_text(submission.text, max_text_len)?;

    let inserted = store
        .insert_publication_comment(NewComment::new(
            text,
            author_id,
            publication_id,
            submission.parent_comment,
        ))
        .await?;

    tracing::info!(
        comment_id = inserted.id,
        publication_id,
        author_id,
        "Comment created"
    );

    get_comments_by_publication(store, publication_id)
        .await
        .map_err(|e| CommentError::Retrieval(Box::new(e)))
}
