use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub name: String,
    pub last_name: String,
    pub image_profile: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The subset of a user that gets attached to every comment in a tree.
#[derive(Queryable, Selectable, Debug, Serialize, Clone, PartialEq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct AuthorProfile {
    #[serde(rename = "_id")]
    pub id: i32,
    pub name: String,
    pub last_name: String,
    pub image_profile: Option<String>,
}

impl From<&User> for AuthorProfile {
    fn from(user: &User) -> Self {
        AuthorProfile {
            id: user.id,
            name: user.name.clone(),
            last_name: user.last_name.clone(),
            image_profile: user.image_profile.clone(),
        }
    }
}
