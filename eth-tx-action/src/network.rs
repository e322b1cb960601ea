use ethers::providers::{Http, Provider};
use std::time::Duration;
use url::Url;

use crate::error::{ActionError, ActionResult};

/// Интервал опроса ноды при ожидании подтверждения.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// HTTP-провайдер на дефолтном reqwest-клиенте (свои таймауты не ставим).
pub fn http_provider(rpc: &Url) -> Provider<Http> {
    let http = Http::new_with_client(rpc.clone(), reqwest::Client::new());
    Provider::new(http).interval(POLL_INTERVAL)
}

pub fn infura_url(network: &str, key: &str) -> ActionResult<Url> {
    Url::parse(&format!("https://{network}.infura.io/v3/{key}"))
        .map_err(|e| ActionError::config(format!("invalid infura network `{network}`: {e}")))
}
