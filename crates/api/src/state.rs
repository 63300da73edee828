//! Application state

use common::Config;
use processor::{BadgeUnlocked, EventHandler, PgStore};
use sqlx::PgPool;
use tokio::sync::mpsc::UnboundedReceiver;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub event_handler: EventHandler<PgStore>,
}

impl AppState {
    /// Build the state and hand back the badge unlock stream
    pub fn new(config: Config, pool: PgPool) -> (Self, UnboundedReceiver<BadgeUnlocked>) {
        let (event_handler, unlocks) =
            EventHandler::new(PgStore::new(pool.clone()), config.engine.clone());
        let state = Self {
            config,
            pool,
            event_handler,
        };
        (state, unlocks)
    }
}
