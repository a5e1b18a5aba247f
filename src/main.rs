//! Cross-sell pipeline - Main Entry Point

use clap::Parser;
use crosssell_pipeline::cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crosssell=info,crosssell_pipeline=info".into()),
        )
        .init();

    run(Cli::parse())
}
