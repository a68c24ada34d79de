//! droplatch - TCP Remote-Control Server for Latched Output Lines
//!
//! Main entry point: parses arguments, sets up logging, configures the
//! latch bank, and runs the accept loop until Ctrl+C.

use droplatch::commands::CommandHandler;
use droplatch::connection::{handle_connection, ConnectionStats};
use droplatch::latch::{LatchBank, LineId, MockPinDriver};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Server configuration
struct Config {
    /// Host to bind to
    host: String,
    /// Port to listen on
    port: u16,
    /// How many of the default lines to configure
    latches: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: droplatch::DEFAULT_HOST.to_string(),
            port: droplatch::DEFAULT_PORT,
            latches: droplatch::DEFAULT_LINES.len(),
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
                "--latches" | "-l" => {
                    if i + 1 < args.len() {
                        config.latches = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid latch count");
                            std::process::exit(1);
                        });
                        if config.latches == 0 || config.latches > droplatch::DEFAULT_LINES.len() {
                            eprintln!(
                                "Error: latch count must be 1..={}",
                                droplatch::DEFAULT_LINES.len()
                            );
                            std::process::exit(1);
                        }
                        i += 2;
                    } else {
                        eprintln!("Error: --latches requires a value");
                        std::process::exit(1);
                    }
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("droplatch version {}", droplatch::VERSION);
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
droplatch - TCP Remote-Control Server for Latched Output Lines

USAGE:
    droplatch [OPTIONS]

OPTIONS:
    -h, --host <HOST>       Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>       Port to listen on (default: 9999)
    -l, --latches <COUNT>   Number of latches to configure (default: 8)
    -v, --version           Print version information
        --help              Print this help message

CONNECTING:
    Use the bundled client (or nc) to send commands:
    $ droplatch-client
    enter a command > echo
    echo! echo! echo!
    enter a command > toggle 3
    toggled pin 3
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args();

    // Set up logging; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    // Configure the latch bank. Swapping the mock for a GPIO-backed
    // driver is the one line a real deployment changes.
    let lines: Vec<LineId> = droplatch::DEFAULT_LINES[..config.latches]
        .iter()
        .copied()
        .map(LineId)
        .collect();
    let bank = Arc::new(LatchBank::new(Box::new(MockPinDriver::new()), lines)?);
    info!(latches = config.latches, "Latch bank ready");

    let stats = Arc::new(ConnectionStats::new());

    // Bind with the historical backlog of 2
    let listener = bind(&config)?;
    info!(addr = %config.bind_address(), "Listening");

    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received, stopping server...");
    };

    tokio::select! {
        _ = accept_loop(listener, bank, Arc::clone(&stats)) => {}
        _ = shutdown => {}
    }

    info!(
        connections = stats.connections_accepted.load(Ordering::Relaxed),
        commands = stats.commands_processed.load(Ordering::Relaxed),
        "Server shutdown complete"
    );
    Ok(())
}

/// Binds the listening socket with an explicit backlog.
fn bind(config: &Config) -> anyhow::Result<TcpListener> {
    let addr: std::net::SocketAddr = config.bind_address().parse()?;
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    Ok(socket.listen(droplatch::LISTEN_BACKLOG)?)
}

/// Main loop that accepts incoming connections
async fn accept_loop(listener: TcpListener, bank: Arc<LatchBank>, stats: Arc<ConnectionStats>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let commands = CommandHandler::new(Arc::clone(&bank));
                let stats = Arc::clone(&stats);

                tokio::spawn(async move {
                    handle_connection(stream, addr, commands, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
