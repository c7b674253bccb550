use std::sync::Arc;

use codex_db::Database;
use codex_store::MemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database<MemoryStore>>,
}
