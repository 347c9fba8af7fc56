use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::identity::IdentityClient;

pub struct AppState {
    pub db: Connection,
    pub config: AppConfig,
    pub identity: IdentityClient,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig, identity: IdentityClient) -> Self {
        Self {
            db,
            config,
            identity,
        }
    }
}
