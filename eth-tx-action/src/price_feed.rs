use ethers::prelude::*;
use std::sync::Arc;
use tracing::debug;

use crate::convert::normalize_price;
use crate::error::{ActionError, ActionResult};

// ---------- Chainlink AggregatorV3Interface ----------
abigen!(
    AggregatorV3Interface,
    r#"[
        function decimals() external view returns (uint8)
        function description() external view returns (string)
        function latestRoundData() external view returns (uint80 roundId, int256 answer, uint256 startedAt, uint256 updatedAt, uint80 answeredInRound)
    ]"#
);

/// Последний раунд фида; живёт в пределах одного вызова, не кэшируется.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceRoundData {
    pub round_id: u128,
    pub answer: I256,
    pub decimals: u8,
    pub updated_at: U256,
    /// answer / 10^decimals
    pub price: f64,
}

/// latestRoundData() + нормализация цены
pub async fn fetch_latest_price<M: Middleware + 'static>(
    client: Arc<M>,
    feed: Address,
    decimals: u8,
) -> ActionResult<PriceRoundData> {
    let c = AggregatorV3Interface::new(feed, client);
    let (round_id, answer, _started_at, updated_at, _answered_in_round) = c
        .latest_round_data()
        .call()
        .await
        .map_err(|e| ActionError::price_feed(feed, e))?;

    let price = normalize_price(answer, decimals).map_err(|e| ActionError::price_feed(feed, e))?;
    debug!(feed = ?feed, round_id, %answer, decimals, price, "latestRoundData");

    Ok(PriceRoundData {
        round_id,
        answer,
        decimals,
        updated_at,
        price,
    })
}

pub async fn feed_decimals<M: Middleware + 'static>(client: Arc<M>, feed: Address) -> ActionResult<u8> {
    let c = AggregatorV3Interface::new(feed, client);
    c.decimals()
        .call()
        .await
        .map_err(|e| ActionError::price_feed(feed, e))
}

pub async fn feed_description<M: Middleware + 'static>(
    client: Arc<M>,
    feed: Address,
) -> ActionResult<String> {
    let c = AggregatorV3Interface::new(feed, client);
    c.description()
        .call()
        .await
        .map_err(|e| ActionError::price_feed(feed, e))
}
