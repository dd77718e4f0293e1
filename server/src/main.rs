mod http;
mod io;

use dirstream_core::ServerConfig;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_usage() {
    eprintln!("Usage: dirstream-server [--list [PATH]]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  (none)        Serve GET /api/files over HTTP");
    eprintln!("  --list [PATH] Stream one listing as NDJSON to stdout and exit");
    eprintln!("  --version     Print version and exit");
    eprintln!("  --help        Print this help message");
    eprintln!();
    eprintln!("Environment: DATA_ROOT (default ./data), HOST, PORT (default 4000), STREAM_BUFFER");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("--version") => {
            println!("dirstream-server {}", VERSION);
            Ok(())
        }
        Some("--help") => {
            print_usage();
            Ok(())
        }
        Some("--list") => {
            init_tracing();
            let config = ServerConfig::from_env()?;
            let request = args.get(2).map(String::as_str).unwrap_or("");
            io::stdout::run_list(&config, request).await
        }
        None => {
            init_tracing();
            let config = ServerConfig::from_env()?;
            info!("dirstream-server {} starting", VERSION);

            let shutdown = CancellationToken::new();
            let signal_token = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Shutdown signal received");
                    signal_token.cancel();
                }
            });

            http::serve(&config, shutdown).await
        }
        Some(other) => {
            eprintln!("Unknown option: {}", other);
            print_usage();
            std::process::exit(1);
        }
    }
}

/// Log to stderr so `--list` output on stdout stays pure NDJSON.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
