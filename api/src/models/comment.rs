use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

#[derive(Queryable, Selectable, Debug, Serialize, Clone, PartialEq)]
#[diesel(table_name = crate::schema::comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Comment {
    pub id: i32,
    pub text: String,
    pub author_id: i32,
    pub publication_id: i32,
    pub parent_comment_id: Option<i32>,
    pub reply_ids: Vec<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::comments)]
pub struct NewComment {
    pub text: String,
    pub author_id: i32,
    pub publication_id: i32,
    pub parent_comment_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl NewComment {
    pub fn new(
        text: String,
        author_id: i32,
        publication_id: i32,
        parent_comment_id: Option<i32>,
    ) -> Self {
        NewComment {
            text,
            author_id,
            publication_id,
            parent_comment_id,
            created_at: Utc::now(),
        }
    }

    /// Materializes the record the store would persist under `id`.
    pub fn into_comment(self, id: i32) -> Comment {
        Comment {
            id,
            text: self.text,
            author_id: self.author_id,
            publication_id: self.publication_id,
            parent_comment_id: self.parent_comment_id,
            reply_ids: vec![],
            created_at: self.created_at,
        }
    }
}
