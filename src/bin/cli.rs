//! framelink CLI Client
//!
//! Interactive command session over TCP, or a one-shot UDP datagram.

use std::io;

use clap::{Parser, Subcommand};
use framelink::network::{Client, DatagramClient, Session};
use framelink::Config;
use tracing_subscriber::{fmt, EnvFilter};

/// framelink CLI
#[derive(Parser, Debug)]
#[command(name = "framelink-cli")]
#[command(about = "Client for the framelink command and datagram services")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7070")]
    server: String,

    /// Read timeout in milliseconds (0 = wait forever)
    #[arg(long, default_value = "30000")]
    read_timeout_ms: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read LS / CD <path> / PWD / QUIT from stdin (default)
    Shell,

    /// Send one datagram and print the reply
    Send {
        /// Datagram payload
        #[arg(default_value = "Hello Server")]
        message: String,
    },
}

fn main() {
    // Logs go to stderr so they never interleave with replies
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .server_addr(&args.server)
        .read_timeout_ms(args.read_timeout_ms)
        .build();

    let result = match args.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let mut session = Session::new(Client::new(config));
            session.run(io::stdin().lock(), io::stdout().lock())
        }
        Commands::Send { message } => DatagramClient::connect(&config)
            .and_then(|client| client.exchange(message.as_bytes()))
            .map(|reply| println!("{}", String::from_utf8_lossy(&reply))),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
