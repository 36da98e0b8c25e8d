//! framelink Server Binary
//!
//! Runs the UDP acknowledgment service or the TCP frame responder.

use clap::{Parser, Subcommand};
use framelink::network::{Acknowledge, Acknowledger, DatagramService, FrameServer, ShutdownHandle};
use framelink::Config;
use tracing_subscriber::{fmt, EnvFilter};

/// framelink Server
#[derive(Parser, Debug)]
#[command(name = "framelink-server")]
#[command(about = "UDP acknowledgment service and TCP command frame responder")]
#[command(version)]
struct Args {
    /// Write timeout in milliseconds (0 = none)
    #[arg(long, default_value = "5000", global = true)]
    write_timeout_ms: u64,

    #[command(subcommand)]
    service: Service,
}

#[derive(Subcommand, Debug)]
enum Service {
    /// Acknowledge every datagram received
    Udp {
        /// Bind address (host:port)
        #[arg(short, long, default_value = "0.0.0.0:7070")]
        bind: String,

        /// Reply sent for every datagram
        #[arg(short, long, default_value = "OK, data received")]
        ack: String,

        /// Receive buffer size in bytes
        #[arg(long, default_value = "1024")]
        max_datagram: usize,

        /// Cap on concurrently running handlers (unbounded if omitted)
        #[arg(long)]
        max_in_flight: Option<usize>,
    },

    /// Answer command frames with an acknowledgment
    Tcp {
        /// Listen address (host:port)
        #[arg(short, long, default_value = "127.0.0.1:7070")]
        listen: String,

        /// Maximum concurrent connections
        #[arg(short, long, default_value = "1024")]
        max_connections: usize,

        /// Read timeout in milliseconds (0 = none)
        #[arg(long, default_value = "30000")]
        read_timeout_ms: u64,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,framelink=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("framelink server v{}", framelink::VERSION);

    let builder = Config::builder().write_timeout_ms(args.write_timeout_ms);

    let result = match args.service {
        Service::Udp {
            bind,
            ack,
            max_datagram,
            max_in_flight,
        } => {
            let config = builder
                .datagram_addr(bind)
                .ack_message(ack)
                .max_datagram_size(max_datagram)
                .max_in_flight(max_in_flight)
                .build();

            let handler = Acknowledge::new(config.ack_message.clone());
            DatagramService::bind(config, handler).and_then(|service| {
                install_ctrlc(service.shutdown_handle());
                service.run()
            })
        }
        Service::Tcp {
            listen,
            max_connections,
            read_timeout_ms,
        } => {
            let config = builder
                .listen_addr(listen)
                .max_connections(max_connections)
                .read_timeout_ms(read_timeout_ms)
                .build();

            FrameServer::bind(config, Acknowledger).and_then(|server| {
                install_ctrlc(server.shutdown_handle());
                server.run()
            })
        }
    };

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

/// Trigger graceful shutdown on Ctrl+C / SIGTERM
fn install_ctrlc(shutdown: ShutdownHandle) {
    let installed = ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl+C, initiating shutdown...");
        shutdown.trigger();
    });

    if let Err(e) = installed {
        tracing::warn!("Could not install Ctrl+C handler: {}", e);
    }
}
