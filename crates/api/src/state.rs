//! Shared application state

use std::sync::Arc;

use sqlx::PgPool;

use crate::{config::Config, storage::SubscriptionRepository};

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }

    /// Subscription storage backed by this state's pool
    pub fn subscriptions(&self) -> SubscriptionRepository<'_> {
        SubscriptionRepository::new(&self.pool)
    }
}
