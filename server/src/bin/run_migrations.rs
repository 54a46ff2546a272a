use sqlx::postgres::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qams_server::migrations::{self, MigrationConfig, NEXT_STEPS};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "run_migrations=info,qams_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = MigrationConfig::load()?;
    let pending = migrations::read_migrations(&config.migrations_dir)?;

    let pool = PgPool::connect(&config.database_url).await?;
    tracing::info!("Connected to database");

    let result = migrations::run(&pool, &pending).await;
    pool.close().await;
    result?;

    tracing::info!("All migrations completed successfully");
    println!("{}", NEXT_STEPS);
    Ok(())
}
