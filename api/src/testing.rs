use std::{sync::Arc, time::Duration};

use axum::{http::StatusCode, response::IntoResponse};
use chrono::{TimeZone, Utc};

use crate::{
    App,
    config::{DEFAULT_COMMENT_MAX_LENGTH, Env, ServerConfig},
    models::{publication::Publication, user::User},
    store::MemoryStore,
};

pub fn user(id: i32) -> User {
    User {
        id,
        name: format!("Name {id}"),
        last_name: format!("Last name {id}"),
        image_profile: None,
        created_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
    }
}

pub fn publication(id: i32, author_id: i32) -> Publication {
    Publication {
        id,
        author_id,
        comment_ids: vec![],
        created_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
    }
}

pub fn app_with(store: Arc<MemoryStore>) -> App {
    App::new(
        store,
        ServerConfig {
            env: Env::Dev,
            database_url: String::new(),
            listen_addr: ([127, 0, 0, 1], 0).into(),
            database_max_connections: 1,
            database_timeout: Duration::from_secs(1),
            cors_allowed_origins: vec![],
            comment_max_length: DEFAULT_COMMENT_MAX_LENGTH,
        },
    )
}

pub async fn response_json(response: impl IntoResponse) -> (StatusCode, serde_json::Value) {
    let response = response.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
