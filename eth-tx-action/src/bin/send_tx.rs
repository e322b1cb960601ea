use clap::Parser;
use eth_tx_action::action;
use eth_tx_action::config::{ConversionMode, Inputs};
use std::process::ExitCode;

/// Send ETH (or a data-only transaction) to an address or a GitHub user/repo.
#[derive(Parser, Debug)]
#[command(name = "send-tx", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    inputs: Inputs,
}

#[tokio::main]
async fn main() -> ExitCode {
    eth_tx_action::init_tracing();
    let cli = Cli::parse();
    action::execute(&cli.inputs, ConversionMode::FlatValue).await
}
