use bookify_wallet::api::router::create_router;
use bookify_wallet::config::AppConfig;
use bookify_wallet::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_json);

    let metrics_handle = bookify_wallet::metrics::init_metrics()?;
    let addr = config.bind_addr();

    tracing::info!(
        backend = %config.bookify_api_url,
        "Bookify wallet service starting"
    );

    let state = AppState::new(config, metrics_handle);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let registry = tracing_subscriber::registry().with(EnvFilter::from_default_env());
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
