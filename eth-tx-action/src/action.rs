use ethers::providers::Middleware;
use ethers::types::{TransactionReceipt, U256};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::{ActionConfig, ConversionMode, Inputs, ValueSource};
use crate::convert::{format_wei, usd_to_wei};
use crate::error::{ActionError, ActionResult};
use crate::gha;
use crate::identity::{AddressDirectory, GithubWeb3Directory};
use crate::network::http_provider;
use crate::price_feed::{feed_decimals, fetch_latest_price};
use crate::tx::{TxDraft, TxIntent, sign_and_send};

/// Итог одного запуска: собранная транзакция и, если подписывали, receipt.
#[derive(Clone, Debug)]
pub struct ActionOutcome {
    pub intent: TxIntent,
    pub receipt: Option<TransactionReceipt>,
}

/// Value in wei: either the flat input or the bounty converted at the
/// current feed price.
pub async fn compute_value<M: Middleware + 'static>(
    source: &ValueSource,
    client: Option<Arc<M>>,
) -> ActionResult<U256> {
    let (label, usd_amount, feed, decimals) = match source {
        ValueSource::Flat(wei) => return Ok(*wei),
        ValueSource::BountyUsd {
            label,
            usd_amount,
            feed,
            decimals,
        } => (label, *usd_amount, *feed, *decimals),
    };

    let client = client.ok_or_else(|| ActionError::config("bounty conversion needs an rpc endpoint"))?;
    gha::debug(&format!("USD value from input: {usd_amount}"));

    let decimals = match decimals {
        Some(d) => d,
        None => feed_decimals(client.clone(), feed).await?,
    };
    let round = fetch_latest_price(client, feed, decimals).await?;
    let wei = usd_to_wei(usd_amount, round.price)?;

    info!(
        label = %label,
        usd = usd_amount,
        eth_usd = round.price,
        round_id = round.round_id,
        eth = %format_wei(wei),
        "bounty converted"
    );
    Ok(wei)
}

pub async fn run(cfg: &ActionConfig) -> ActionResult<ActionOutcome> {
    let directory = GithubWeb3Directory::new(cfg.identity_endpoint.clone());
    run_with(cfg, &directory).await
}

/// `run` с явным каталогом web3-профилей.
pub async fn run_with<D: AddressDirectory>(
    cfg: &ActionConfig,
    directory: &D,
) -> ActionResult<ActionOutcome> {
    let provider = cfg.rpc.as_ref().map(http_provider);

    let value = compute_value(&cfg.value, provider.clone().map(Arc::new)).await?;

    let draft = TxDraft {
        to: cfg.destination.clone(),
        value,
        data: cfg.data.clone(),
        gas_limit: cfg.gas_limit,
    };
    let intent = draft.resolve(directory).await?;
    debug!(?intent, "transaction assembled");

    let receipt = match (&cfg.wallet, provider) {
        (Some(wallet), Some(provider)) => sign_and_send(provider, wallet.clone(), &intent).await?,
        (Some(_), None) => {
            return Err(ActionError::config("wallet-key is set but no rpc endpoint"));
        }
        (None, _) => {
            info!("wallet-key not set: transaction is not signed or sent");
            None
        }
    };

    Ok(ActionOutcome { intent, receipt })
}

/// Пишет outputs `result`, `transaction`, `eth-value`.
pub fn report(outcome: &ActionOutcome) -> anyhow::Result<()> {
    report_with(outcome, gha::set_output)
}

pub fn report_with(
    outcome: &ActionOutcome,
    mut set_output: impl FnMut(&str, &str) -> std::io::Result<()>,
) -> anyhow::Result<()> {
    let result = serde_json::to_string(&outcome.receipt)?;
    info!("{result}");
    set_output("result", &result)?;
    set_output("transaction", &serde_json::to_string(&outcome.intent)?)?;
    set_output("eth-value", &outcome.intent.value.to_string())?;
    Ok(())
}

/// Полный цикл entry point'а: ошибки любого вида → `::error::` и код 1.
pub async fn execute(inputs: &Inputs, mode: ConversionMode) -> ExitCode {
    let outcome = match ActionConfig::from_inputs(inputs, mode) {
        Ok(cfg) => {
            // rpc URL может содержать ключ, в лог только хост
            let rpc_host = cfg.rpc.as_ref().and_then(|u| u.host_str());
            debug!(?mode, ?rpc_host, signing = cfg.wallet.is_some(), "config loaded");
            run(&cfg).await
        }
        Err(e) => Err(e),
    };

    let outcome = match outcome {
        Ok(o) => o,
        Err(e) => {
            error!(kind = ?e.kind(), "{e:?}");
            gha::error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = report(&outcome) {
        error!("{e:#}");
        gha::error(&e.to_string());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
