//! Talkie terminal client.
//!
//! # Usage
//!
//! ```bash
//! # Connect and log in right away
//! talkie --url ws://localhost:8080/ws --name alice
//!
//! # Log in interactively with /login <name>
//! RUST_LOG=talkie_client=debug talkie
//! ```

use std::io::Write;

use clap::Parser;
use talkie_app::{Runtime, SessionConfig};
use talkie_cli::StdioDriver;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Talkie chat client
#[derive(Parser, Debug)]
#[command(name = "talkie")]
#[command(about = "Terminal client for the Talkie WebSocket chat")]
#[command(version)]
struct Args {
    /// WebSocket URL of the server
    #[arg(short, long, default_value = "ws://localhost:8080/ws")]
    url: String,

    /// Display name to log in with
    ///
    /// If not provided, log in from the prompt with `/login <name>`.
    #[arg(short, long)]
    name: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Largest file that may be sent, in bytes
    #[arg(long, default_value_t = talkie_app::DEFAULT_MAX_FILE_SIZE)]
    max_file_size: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Logs go to stderr so they never interleave with chat output
    tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();

    tracing::info!(url = %args.url, "talkie starting");

    let config = SessionConfig::default().with_max_file_size(args.max_file_size);
    let driver = StdioDriver::new(args.url);
    if args.name.is_none() {
        writeln!(std::io::stdout(), "Type /login <name> to start, /help for commands")?;
    }

    let mut runtime = Runtime::new(driver, config, args.name.unwrap_or_default());
    runtime.run().await?;
    Ok(())
}
