mod quote;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::quote::{Amount, run_quote};

#[derive(Parser, Debug)]
#[command(name = "feed-quote-cli")]
#[command(about = "Сколько ETH даст сумма в USD (или bounty-лейбл) по текущему курсу Chainlink", long_about = None)]
struct Args {
    /// JSON-RPC endpoint
    #[arg(long, env = "ETH_RPC_URL")]
    rpc: String,

    /// Адрес Chainlink-агрегатора ETH/USD
    #[arg(long)]
    feed: String,

    /// Decimals фида; без флага читаются из контракта
    #[arg(long)]
    decimals: Option<u8>,

    /// Сумма в USD
    #[arg(long, conflicts_with = "labels", required_unless_present = "labels")]
    usd: Option<f64>,

    /// Лейблы issue через запятую, как в action
    #[arg(long)]
    labels: Option<String>,

    /// Путь к выходному JSON (по умолчанию stdout)
    #[arg(long)]
    out: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let amount = args
        .usd
        .map(Amount::Usd)
        .or_else(|| args.labels.clone().map(Amount::Labels))
        .context("--usd or --labels is required")?;

    info!("Котировка по фиду {}", args.feed);
    let quote = run_quote(&args.rpc, &args.feed, args.decimals, amount).await?;
    let json = serde_json::to_string_pretty(&quote)?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {path}"))?;
            info!("Готово: {}", path);
        }
        None => println!("{json}"),
    }
    Ok(())
}
