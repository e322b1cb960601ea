pub mod action;
pub mod bounty;
pub mod config;
pub mod convert;
pub mod error;
pub mod gha;
pub mod identity;
pub mod network;
pub mod price_feed;
pub mod tx;
pub mod utils;

use tracing_subscriber::EnvFilter;

/// Логгер: уровень из RUST_LOG (по умолчанию info), вывод в stderr,
/// stdout остаётся под workflow-команды.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
