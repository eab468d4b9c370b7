use async_trait::async_trait;

use crate::models::{
    comment::{Comment, NewComment},
    publication::Publication,
    user::AuthorProfile,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("could not get a database connection from the pool: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),

    #[error("database query failed: {0}")]
    Query(#[from] diesel::result::Error),

    /// The row whose denormalized list should have received the new comment
    /// disappeared between validation and the write.
    #[error("{table} row `{id}` vanished before its comment index could be updated")]
    MissingIndexOwner { table: &'static str, id: i32 },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for comments and the two entities they hang off.
///
/// Both insert methods write the comment and the denormalized index that
/// lists it as a single unit: either both are persisted or neither is.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn user_exists(&self, id: i32) -> Result<bool, StoreError>;

    async fn find_publication(&self, id: i32) -> Result<Option<Publication>, StoreError>;

    async fn find_comment(&self, id: i32) -> Result<Option<Comment>, StoreError>;

    /// Every comment whose `publication_id` matches, in no particular order.
    async fn comments_by_publication(&self, publication_id: i32)
    -> Result<Vec<Comment>, StoreError>;

    /// Unknown ids are skipped.
    async fn comments_by_ids(&self, ids: &[i32]) -> Result<Vec<Comment>, StoreError>;

    /// Unknown ids are skipped.
    async fn author_profiles(&self, ids: &[i32]) -> Result<Vec<AuthorProfile>, StoreError>;

    /// Inserts the comment and puts its id at the front of its publication's
    /// top-level comment list.
    async fn insert_publication_comment(&self, comment: NewComment)
    -> Result<Comment, StoreError>;

    /// Inserts the comment and appends its id to `parent_id`'s replies.
    async fn insert_reply(&self, comment: NewComment, parent_id: i32)
    -> Result<Comment, StoreError>;
}
