use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qams_server::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qams_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        static_root = %config.static_root.display(),
        bind_addr = %config.bind_addr,
        cdn_base_url = %config.cdn_base_url,
        rewrite_bare_imports = config.rewrite_bare_imports,
        "Loaded configuration from environment/.env"
    );

    let app = qams_server::app(&config);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
