//! fake-ptl-controller: a stand-in for a pick-to-light controller
//!
//! Listens on 127.0.0.1:5000, accepts one client, and answers every
//! message with the fixed `STX 000002 OK CR LF ETX` frame until the
//! client disconnects. Then the process exits.
//!
//! Features:
//! - Hex dump of every message received and sent
//! - Log level via CLI argument or TOML file

mod config;
mod logging;
mod protocol;
mod server;

use config::Config;
use protocol::LISTEN_ADDR;
use server::Server;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    logging::init(&config.log_level)?;

    info!(listen = LISTEN_ADDR, "Starting fake PTL controller");

    // One connection, one execution path
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let server = Server::bind(LISTEN_ADDR)?;
        server.run().await
    })?;

    Ok(())
}
