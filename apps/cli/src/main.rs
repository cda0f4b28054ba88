//! stdpdf CLI: batch downloader for published standard PDFs.
//!
//! Guesses download URLs for catalog entries without a local PDF, keeps the
//! first response that is really a PDF, and records it in the availability map.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
