//! BlazeKV - An In-Memory Key-Value Store with Crash Recovery
//!
//! This is the main entry point for the BlazeKV server.
//! It sets up logging, opens and replays the append-only log, binds the
//! TCP listener, and spawns one task per accepted connection.

use blazekv::aof::Aof;
use blazekv::commands::CommandHandler;
use blazekv::connection::{handle_connection, ConnectionStats};
use blazekv::storage::Store;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Server configuration
struct Config {
    /// Host to bind to
    host: String,
    /// Port to listen on
    port: u16,
    /// Path of the append-only log, or None to run without persistence
    aof_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: blazekv::DEFAULT_HOST.to_string(),
            port: blazekv::DEFAULT_PORT,
            aof_path: Some("database.aof".to_string()),
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    if i + 1 < args.len() {
                        config.host = args[i + 1].clone();
                        i += 2;
                    } else {
                        eprintln!("Error: --host requires a value");
                        std::process::exit(1);
                    }
                }
                "--port" | "-p" => {
                    if i + 1 < args.len() {
                        config.port = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid port number");
                            std::process::exit(1);
                        });
                        i += 2;
                    } else {
                        eprintln!("Error: --port requires a value");
                        std::process::exit(1);
                    }
                }
                "--aof" => {
                    if i + 1 < args.len() {
                        config.aof_path = Some(args[i + 1].clone());
                        i += 2;
                    } else {
                        eprintln!("Error: --aof requires a value");
                        std::process::exit(1);
                    }
                }
                "--no-aof" => {
                    config.aof_path = None;
                    i += 1;
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("BlazeKV version {}", blazekv::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        config
    }

    /// Returns the bind address as a string
    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn print_help() {
    println!(
        r#"
BlazeKV - An In-Memory Key-Value Store with Crash Recovery

USAGE:
    blazekv [OPTIONS]

OPTIONS:
    -h, --host <HOST>    Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>    Port to listen on (default: 6379)
        --aof <PATH>     Append-only log file (default: database.aof)
        --no-aof         Disable persistence entirely
    -v, --version        Print version information
        --help           Print this help message

EXAMPLES:
    blazekv                        # Start on 127.0.0.1:6379
    blazekv --port 6380            # Start on port 6380
    blazekv --aof /var/lib/kv.aof  # Log mutations to a custom path

CONNECTING:
    Use redis-cli or any Redis client to connect:
    $ redis-cli -p 6379
    127.0.0.1:6379> PING
    PONG
    127.0.0.1:6379> SET name "Ariz"
    OK
    127.0.0.1:6379> GET name
    "Ariz"
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::from_args();

    // Set up logging
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    info!("BlazeKV v{} starting", blazekv::VERSION);

    // Create the store (shared across all connections)
    let store = Arc::new(Store::new());

    // Open the durability log and rebuild state from it before the
    // listener exists; an unopenable log aborts startup.
    let aof = match &config.aof_path {
        Some(path) => {
            let aof = Aof::open(path.clone())
                .map_err(|e| anyhow::anyhow!("failed to open append-only log {path}: {e}"))?;
            let mut replayer = CommandHandler::new(Arc::clone(&store));
            let replay = aof.replay(&mut replayer)?;
            info!(
                applied = replay.applied,
                skipped = replay.skipped,
                "state recovered from append-only log"
            );
            Some(Arc::new(aof))
        }
        None => {
            info!("persistence disabled, running purely in memory");
            None
        }
    };

    // Create connection statistics
    let stats = Arc::new(ConnectionStats::new());

    // Bind the TCP listener
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("Listening on {}", config.bind_address());

    // Set up graceful shutdown
    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received, stopping server...");
    };

    // Main accept loop
    tokio::select! {
        _ = accept_loop(listener, store, aof, stats) => {}
        _ = shutdown => {}
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Main loop that accepts incoming connections
async fn accept_loop(
    listener: TcpListener,
    store: Arc<Store>,
    aof: Option<Arc<Aof>>,
    stats: Arc<ConnectionStats>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                // Each connection gets its own command handler so the
                // protocol version it negotiates stays its own.
                let commands = CommandHandler::new(Arc::clone(&store));
                let aof = aof.clone();
                let stats = Arc::clone(&stats);

                // Spawn a task to handle this connection
                tokio::spawn(async move {
                    handle_connection(stream, addr, commands, aof, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
