use clap::Parser;
use fashion_etl::utils::logger;
use fashion_etl::{AppConfig, Cli, EtlEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting fashion-etl");

    let config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = %cli.config, error = %e, "Failed to load configuration");
            eprintln!("❌ Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let engine = EtlEngine::new(config);
    let table = engine.run().await?;

    tracing::info!(rows = table.len(), "ETL process completed");
    println!("✅ ETL process completed: {} rows", table.len());

    Ok(())
}
