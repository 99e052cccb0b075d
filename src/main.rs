use anyhow::Context;
use clap::Parser;
use noise_atlas::cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).await.context("noise-atlas failed")
}
