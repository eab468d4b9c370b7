use axum::{
    Router,
    routing::{get, post},
};

use crate::App;

use super::{create::create_comment, get::get_comments, reply::reply_to_comment};

pub fn route() -> Router<App> {
    // TODO rate limit these public endpoints
    Router::<App>::new()
        .route("/{author_id}", post(create_comment))
        .route("/reply/{author_id}", post(reply_to_comment))
        .route("/publication/{publication_id}", get(get_comments))
}
