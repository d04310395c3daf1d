use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cvforge_api::config::{Config, S3Config};
use cvforge_api::db::{create_pool, ensure_schema};
use cvforge_api::routes::build_router;
use cvforge_api::state::AppState;
use cvforge_api::sync::{
    EditorSession, FileCache, InlineMediaStore, MediaStore, MemoryRemoteStore, PgRemoteStore,
    RemoteStore, S3MediaStore, Synchronizer,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Forge API v{}", env!("CARGO_PKG_VERSION"));

    // Remote store: PostgreSQL when configured, otherwise in-process
    let remote: Arc<dyn RemoteStore> = match &config.database_url {
        Some(url) => {
            let db = create_pool(url).await?;
            ensure_schema(&db).await?;
            Arc::new(PgRemoteStore::new(db))
        }
        None => {
            warn!("DATABASE_URL not set, remote documents live in memory only");
            Arc::new(MemoryRemoteStore::default())
        }
    };

    // Media uploads: S3 / MinIO when configured, otherwise inline data URLs
    let uploader: Arc<dyn MediaStore> = match &config.s3 {
        Some(s3) => {
            let client = build_s3_client(s3).await;
            info!(bucket = %s3.bucket, "S3 client initialized");
            Arc::new(S3MediaStore::new(
                client,
                s3.bucket.clone(),
                s3.public_base_url.clone(),
            ))
        }
        None => {
            warn!("S3 not configured, media will be stored inline in the document");
            Arc::new(InlineMediaStore)
        }
    };

    let local = Arc::new(FileCache::new(&config.local_cache_path));
    info!(path = %config.local_cache_path, "Local cache ready");

    let sync = Synchronizer::start(local, remote, uploader);
    let state = AppState::new(EditorSession::new(sync), config.clone());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &S3Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.access_key_id,
        &config.secret_access_key,
        None,
        None,
        "cvforge-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
