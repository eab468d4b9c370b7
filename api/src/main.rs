use std::sync::Arc;

use comments_api::{
    App,
    config::{Env, ServerConfig},
    router,
    store::PgStore,
};
use dotenv::dotenv;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn init_tracing(env: &Env) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let registry = tracing_subscriber::registry().with(filter);

    match env {
        Env::Production => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        Env::Dev | Env::Staging => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv().ok();

    init_tracing(&Env::from_env());

    let config = ServerConfig::new_from_env();

    let store = PgStore::connect(
        &config.database_url,
        config.database_max_connections,
        config.database_timeout,
    )?;

    let listen_addr = config.listen_addr;
    let app = router(App::new(Arc::new(store), config));

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!("listening on {}", listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
