use std::sync::Arc;

use codex_db::Database;
use codex_store::MemoryStore;

use codex_api::routes;
use codex_api::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let api_addr = std::env::var("CODEX_API_ADDR").unwrap_or_else(|_| "0.0.0.0:9700".into());

    let db = Database::open(MemoryStore::new()).unwrap_or_else(|e| {
        eprintln!("failed to open store: {e}");
        std::process::exit(1);
    });

    let state = AppState { db: Arc::new(db) };
    let app = routes::router().with_state(state);

    let listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("failed to bind {api_addr}: {e}");
            std::process::exit(1);
        });

    tracing::info!("codex-api listening on {api_addr}");
    axum::serve(listener, app).await.unwrap();
}
