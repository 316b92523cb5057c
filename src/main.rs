//! nearby CLI entry point
//!
//! Nearby points-of-interest discovery - CLI + HTTP API

use nearby::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
