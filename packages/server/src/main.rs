use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use common::storage::BlobStore;
use common::storage::filesystem::FilesystemBlobStore;
use tracing::{Level, info};

use botica_server::config::AppConfig;
use botica_server::database::init_db;
use botica_server::seed::seed_admin;
use botica_server::session::{InMemorySessionStore, SessionStore};
use botica_server::state::AppState;
use botica_server::throttle::AuthThrottle;
use botica_server::upload::ImageUploader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = Arc::new(AppConfig::load()?);

    let db = init_db(&config.database.url).await?;
    seed_admin(&db, &config.auth).await?;

    let blob_store: Arc<dyn BlobStore> = Arc::new(
        FilesystemBlobStore::new(
            PathBuf::from(&config.storage.root_dir),
            config.storage.max_image_size,
        )
        .await?,
    );
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let throttle = Arc::new(AuthThrottle::new(
        sessions.clone(),
        config.auth.max_login_attempts,
        config.auth.lockout_seconds,
    ));

    let state = AppState {
        db,
        config: config.clone(),
        blob_store: blob_store.clone(),
        images: ImageUploader::new(blob_store),
        sessions,
        throttle,
    };

    let app = botica_server::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    // ConnectInfo backs the client IP extractor used for login throttling.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
