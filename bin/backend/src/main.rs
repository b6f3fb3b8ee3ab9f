//! Forum Backend Binary
//!
//! Reads its settings from flags or the environment (see `backend --help`)
//! and serves on BIND_ADDR (e.g. 0.0.0.0:8888).
use clap::Parser;

#[tokio::main]
async fn main() {
    agora_core::log();
    agora_core::kys();
    let config = match agora_server::Config::parse().validate() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(2);
        }
    };
    if let Err(e) = agora_server::run(config).await {
        log::error!("server stopped: {:#}", e);
        std::process::exit(1);
    }
}
