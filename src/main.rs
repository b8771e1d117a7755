//! Entry point for modelgate.
//!
//! Loads `.env` files, installs the tracing subscriber, parses CLI arguments
//! via [`cli`] and dispatches the chosen subcommand.

mod cli;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = cli::parse();
    init_tracing(cli.debug);
    cli::run(cli).await
}

/// `RUST_LOG` wins; otherwise `--debug` selects `debug` and the default is `warn`.
fn init_tracing(debug: bool) {
    let fallback = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
