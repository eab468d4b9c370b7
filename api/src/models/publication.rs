use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

#[derive(Queryable, Selectable, Debug, Serialize, Clone, PartialEq)]
#[diesel(table_name = crate::schema::publications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Publication {
    pub id: i32,
    pub author_id: i32,
    /// Top-level comments, newest first.
    pub comment_ids: Vec<i32>,
    pub created_at: DateTime<Utc>,
}
