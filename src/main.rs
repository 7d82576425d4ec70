use anyhow::Result;
use ochascraper::{
    config::Config,
    pipeline::{Pipeline, SoapSource},
};
use reqwest::Client;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,ochascraper=info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) configure & run ──────────────────────────────────────────
    let config = Config::default();
    info!(
        start_year = config.start_year,
        end_year = config.end_year,
        "Querying donor rankings"
    );

    let client = Client::new();
    let pipeline = Pipeline::new(config.clone(), SoapSource::new(client, config));
    pipeline.run().await?;

    info!("all done");
    Ok(())
}
