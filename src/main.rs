use school_vacancy_portal::{
    config::{Config, LogFormat},
    database::{
        pool::{create_pool, run_migrations},
        PgStore,
    },
    routes,
    services::{
        storage_service::{LocalBlobStore, APPLICATION_BUCKET},
        telegram_service::TelegramClient,
    },
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,sqlx=warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let pool = create_pool(&config).await?;
    run_migrations(&pool).await?;

    tokio::fs::create_dir_all(&config.uploads_dir).await?;
    info!("Serving uploads from: {}", config.uploads_dir.display());

    let store = Arc::new(PgStore::new(pool));
    let blobs = Arc::new(LocalBlobStore::new(
        &config.uploads_dir,
        APPLICATION_BUCKET,
        &config.public_base_url,
    ));
    let telegram = TelegramClient::new(&config.telegram_api_url, &config.telegram_bot_token)?;

    if config.webapp_url.is_some() {
        let target = format!("{}/api/webhook/telegram", config.public_base_url);
        info!("Checking Telegram webhook status...");
        if let Err(e) = telegram
            .ensure_webhook(&target, config.telegram_webhook_secret.as_deref())
            .await
        {
            tracing::warn!(error = %e, "could not register telegram webhook");
        }
    }

    let addr: SocketAddr = config.server_address.parse()?;
    let state = AppState::new(config, store, blobs, Arc::new(telegram));
    let app = routes::router(state);

    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
