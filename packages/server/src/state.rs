use std::sync::Arc;

use common::storage::BlobStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::session::SessionStore;
use crate::throttle::AuthThrottle;
use crate::upload::ImageUploader;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub blob_store: Arc<dyn BlobStore>,
    pub images: ImageUploader,
    pub sessions: Arc<dyn SessionStore>,
    pub throttle: Arc<AuthThrottle>,
}
