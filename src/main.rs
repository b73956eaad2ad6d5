use profile_hub::{app::App, config::Config};

use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = Config::parse();
    let db = profile_hub::db::Db::init(&config.database_url).await?;

    profile_hub::serve(App {
        config: Arc::new(config),
        db,
        http_client: reqwest::Client::new(),
    })
    .await?;

    Ok(())
}
