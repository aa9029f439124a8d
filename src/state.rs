use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::config::AppConfig;
use crate::store::ChatStore;

/// Everything a handler needs, cloned into each request
#[derive(Clone)]
pub struct AppState {
    pub store: ChatStore,
    pub keys: Arc<JwtKeys>,
    pub bcrypt_cost: u32,
    /// Echo internal error causes in 500 bodies
    pub development: bool,
}

impl AppState {
    pub fn new(store: ChatStore, config: &AppConfig) -> Self {
        Self {
            store,
            keys: Arc::new(JwtKeys::new(&config.jwt_secret, config.jwt_expiration_hours)),
            bcrypt_cost: config.bcrypt_cost,
            development: config.development,
        }
    }
}
