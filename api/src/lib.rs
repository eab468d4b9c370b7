use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub mod comment;
pub mod config;
pub mod error;
pub mod json;
pub mod models;
pub mod schema;
pub mod store;

#[cfg(test)]
mod testing;

use config::{Env, ServerConfig};
use store::CommentStore;

#[derive(Clone)]
pub struct App {
    pub store: Arc<dyn CommentStore>,
    pub config: Arc<ServerConfig>,
}

impl App {
    pub fn new(store: Arc<dyn CommentStore>, config: ServerConfig) -> Self {
        App {
            store,
            config: Arc::new(config),
        }
    }
}

pub fn router(app: App) -> Router {
    let cors = cors_layer(&app.config);

    Router::new()
        .nest("/api/comments", comment::routes::route())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(origin) => Some(origin),
            Err(error) => {
                tracing::warn!(%error, %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() && config.env == Env::Dev {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
