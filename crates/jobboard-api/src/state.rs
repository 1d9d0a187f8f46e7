//! Application state.

use std::sync::Arc;

use jobboard_store::DocumentStore;

use crate::auth::TokenService;
use crate::config::ApiConfig;
use crate::services::{JobService, UserService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: DocumentStore,
    pub tokens: Arc<TokenService>,
    pub user_service: UserService,
    pub job_service: JobService,
}

impl AppState {
    pub fn new(config: ApiConfig, store: DocumentStore) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl, config.is_production());

        Self {
            user_service: UserService::new(store.clone()),
            job_service: JobService::new(store.clone()),
            tokens: Arc::new(tokens),
            store,
            config,
        }
    }
}
