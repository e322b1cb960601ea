use clap::Parser;
use eth_tx_action::action;
use eth_tx_action::config::{ConversionMode, Inputs};
use std::process::ExitCode;

/// Pay out an issue bounty: the USD amount from the `bounty $N` label is
/// converted to ETH at the Chainlink ETH/USD price.
#[derive(Parser, Debug)]
#[command(name = "send-bounty", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    inputs: Inputs,
}

#[tokio::main]
async fn main() -> ExitCode {
    eth_tx_action::init_tracing();
    let cli = Cli::parse();
    action::execute(&cli.inputs, ConversionMode::BountyLabelUsd).await
}
