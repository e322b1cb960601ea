use anyhow::{Context, Result};
use eth_tx_action::bounty::{bounty_usd_from_labels, find_bounty_label, split_labels};
use eth_tx_action::convert::{format_wei, usd_to_wei};
use eth_tx_action::network::http_provider;
use eth_tx_action::price_feed::{feed_decimals, feed_description, fetch_latest_price};
use eth_tx_action::utils::parse_addr;
use ethers::types::{I256, U256};
use serde::Serialize;
use serde_with::{DisplayFromStr, serde_as};
use std::sync::Arc;
use tracing::warn;
use url::Url;

#[derive(Clone, Debug)]
pub enum Amount {
    Usd(f64),
    Labels(String),
}

#[serde_as]
#[derive(Debug, Serialize)]
pub struct Quote {
    pub generated_at: String,
    pub feed: String,
    pub description: Option<String>,
    #[serde_as(as = "DisplayFromStr")]
    pub round_id: u128,
    #[serde_as(as = "DisplayFromStr")]
    pub answer: I256,
    pub decimals: u8,
    pub eth_usd: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub usd: f64,
    #[serde_as(as = "DisplayFromStr")]
    pub wei: U256,
    pub eth: String,
}

/// USD-сумма и (если есть) исходный лейбл
fn resolve_amount(amount: &Amount) -> Result<(f64, Option<String>)> {
    match amount {
        Amount::Usd(usd) => Ok((*usd, None)),
        Amount::Labels(raw) => {
            let labels = split_labels(raw);
            let usd = bounty_usd_from_labels(&labels)?;
            Ok((usd, find_bounty_label(&labels).map(str::to_string)))
        }
    }
}

pub async fn run_quote(rpc: &str, feed: &str, decimals: Option<u8>, amount: Amount) -> Result<Quote> {
    let (usd, label) = resolve_amount(&amount)?;

    let feed_addr = parse_addr(feed).map_err(anyhow::Error::msg)?;
    let url = Url::parse(rpc).with_context(|| format!("invalid rpc url {rpc}"))?;
    let provider = Arc::new(http_provider(&url));

    let decimals = match decimals {
        Some(d) => d,
        None => feed_decimals(provider.clone(), feed_addr).await?,
    };
    let description = match feed_description(provider.clone(), feed_addr).await {
        Ok(d) => Some(d),
        Err(e) => {
            warn!("description() недоступен: {e}");
            None
        }
    };

    let round = fetch_latest_price(provider, feed_addr, decimals).await?;
    let wei = usd_to_wei(usd, round.price)?;

    Ok(Quote {
        generated_at: chrono::Utc::now().to_rfc3339(),
        feed: format!("{:#x}", feed_addr),
        description,
        round_id: round.round_id,
        answer: round.answer,
        decimals: round.decimals,
        eth_usd: round.price,
        label,
        usd,
        wei,
        eth: format_wei(wei),
    })
}
