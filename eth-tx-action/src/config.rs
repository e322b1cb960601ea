use clap::Args;
use ethers::signers::LocalWallet;
use ethers::types::{Address, Bytes, U256};
use std::env;
use std::str::FromStr;
use url::Url;

use crate::bounty::{bounty_usd_from_labels, find_bounty_label, split_labels};
use crate::convert::{MAX_FEED_DECIMALS, parse_eth_amount};
use crate::error::{ActionError, ActionResult};
use crate::identity::{DEFAULT_IDENTITY_ENDPOINT, Destination};
use crate::network::infura_url;
use crate::utils::{parse_addr, parse_u256};

/// Сырые входы action. GitHub передаёт их как `INPUT_<NAME>`
/// (имя в верхнем регистре, дефисы сохраняются); те же поля доступны флагами CLI.
#[derive(Args, Clone, Debug, Default)]
pub struct Inputs {
    /// JSON-RPC endpoint; `${VAR}` and `$VAR` are expanded from the environment
    #[arg(long = "rpc-node", env = "INPUT_RPC-NODE")]
    pub rpc_node: Option<String>,

    /// Infura network name, used together with --infura-key
    #[arg(long, env = "INPUT_NETWORK")]
    pub network: Option<String>,

    #[arg(long = "infura-key", env = "INPUT_INFURA-KEY", hide_env_values = true)]
    pub infura_key: Option<String>,

    /// Hex private key; without it nothing is signed or sent
    #[arg(long = "wallet-key", env = "INPUT_WALLET-KEY", hide_env_values = true)]
    pub wallet_key: Option<String>,

    /// Recipient address or GitHub `user` / `user/repo`
    #[arg(long, env = "INPUT_TO")]
    pub to: Option<String>,

    /// UTF-8 text placed into the transaction data
    #[arg(long, env = "INPUT_MESSAGE")]
    pub message: Option<String>,

    #[arg(long = "gas-limit", env = "INPUT_GAS-LIMIT")]
    pub gas_limit: Option<String>,

    /// Amount of ETH to send (flat mode)
    #[arg(long, env = "INPUT_VALUE")]
    pub value: Option<String>,

    /// Comma-separated issue labels, one of them like `bounty $250`
    #[arg(long, env = "INPUT_LABELS")]
    pub labels: Option<String>,

    /// Chainlink ETH/USD aggregator address
    #[arg(long = "contract-address", env = "INPUT_CONTRACT-ADDRESS")]
    pub contract_address: Option<String>,

    /// Aggregator decimals; read from the contract when omitted
    #[arg(long = "contract-decimals", env = "INPUT_CONTRACT-DECIMALS")]
    pub contract_decimals: Option<String>,

    /// Base URL of the GitHub web3 profile directory
    #[arg(long = "identity-endpoint", env = "INPUT_IDENTITY-ENDPOINT")]
    pub identity_endpoint: Option<String>,
}

/// Which way the transaction value is produced; fixed by the entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionMode {
    FlatValue,
    BountyLabelUsd,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ValueSource {
    Flat(U256),
    BountyUsd {
        label: String,
        usd_amount: f64,
        feed: Address,
        decimals: Option<u8>,
    },
}

/// Провалидированная конфигурация одного запуска.
#[derive(Clone, Debug)]
pub struct ActionConfig {
    pub rpc: Option<Url>,
    pub wallet: Option<LocalWallet>,
    pub destination: Destination,
    pub data: Option<Bytes>,
    pub gas_limit: Option<U256>,
    pub value: ValueSource,
    pub identity_endpoint: Url,
}

impl ActionConfig {
    pub fn from_inputs(inputs: &Inputs, mode: ConversionMode) -> ActionResult<Self> {
        Self::from_inputs_with(inputs, mode, |k| env::var(k).ok())
    }

    /// То же, но с явным источником переменных для подстановки в rpc-node.
    pub fn from_inputs_with(
        inputs: &Inputs,
        mode: ConversionMode,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ActionResult<Self> {
        let rpc = match (non_empty(&inputs.network), non_empty(&inputs.infura_key)) {
            (Some(network), Some(key)) => Some(infura_url(network, key)?),
            _ => match non_empty(&inputs.rpc_node) {
                Some(raw) => {
                    let expanded = expand_env_with(raw, &lookup);
                    let url = Url::parse(&expanded)
                        .map_err(|e| ActionError::config(format!("invalid rpc-node: {e}")))?;
                    Some(url)
                }
                None => None,
            },
        };

        let wallet = non_empty(&inputs.wallet_key)
            .map(|k| {
                LocalWallet::from_str(k)
                    .map_err(|_| ActionError::config("wallet-key is not a valid private key"))
            })
            .transpose()?;

        let to = non_empty(&inputs.to).ok_or_else(|| ActionError::config("input `to` is required"))?;
        let destination = Destination::parse(to)?;

        let data = non_empty(&inputs.message).map(|m| Bytes::from(m.as_bytes().to_vec()));

        let gas_limit = non_empty(&inputs.gas_limit)
            .map(|g| parse_u256(g).map_err(|e| ActionError::config(format!("gas-limit: {e}"))))
            .transpose()?;

        let value = match mode {
            ConversionMode::FlatValue => {
                let wei = match non_empty(&inputs.value) {
                    Some(v) => parse_eth_amount(v)
                        .map_err(|e| ActionError::config(format!("invalid value: {e}")))?,
                    None => U256::zero(),
                };
                ValueSource::Flat(wei)
            }
            ConversionMode::BountyLabelUsd => {
                let labels = split_labels(non_empty(&inputs.labels).unwrap_or_default());
                let usd_amount = bounty_usd_from_labels(&labels)?;
                let label = find_bounty_label(&labels).unwrap_or_default().to_string();

                let feed = non_empty(&inputs.contract_address)
                    .ok_or_else(|| ActionError::config("input `contract-address` is required"))?;
                let feed = parse_addr(feed).map_err(ActionError::Config)?;

                let decimals = non_empty(&inputs.contract_decimals)
                    .map(parse_decimals)
                    .transpose()?;

                ValueSource::BountyUsd {
                    label,
                    usd_amount,
                    feed,
                    decimals,
                }
            }
        };

        let needs_rpc = wallet.is_some() || matches!(value, ValueSource::BountyUsd { .. });
        if needs_rpc && rpc.is_none() {
            return Err(ActionError::config(
                "rpc-node (or network + infura-key) is required",
            ));
        }

        let identity_endpoint = non_empty(&inputs.identity_endpoint)
            .unwrap_or(DEFAULT_IDENTITY_ENDPOINT);
        let identity_endpoint = Url::parse(identity_endpoint)
            .map_err(|e| ActionError::config(format!("invalid identity-endpoint: {e}")))?;

        Ok(Self {
            rpc,
            wallet,
            destination,
            data,
            gas_limit,
            value,
            identity_endpoint,
        })
    }
}

fn parse_decimals(raw: &str) -> ActionResult<u8> {
    match raw.parse::<u8>() {
        Ok(d) if d <= MAX_FEED_DECIMALS => Ok(d),
        _ => Err(ActionError::config(format!(
            "contract-decimals must be an integer in 0..={MAX_FEED_DECIMALS}, got `{raw}`"
        ))),
    }
}

/// Пустые строки от Actions считаем отсутствующими.
fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Подстановка ${ENV_VAR} и $ENV_VAR; неизвестные переменные → пустая строка
fn expand_env_with(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                out.push_str(&lookup(&braced[..end]).unwrap_or_default());
                rest = &braced[end + 1..];
                continue;
            }
        }

        let len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        if len == 0 {
            out.push('$');
        } else {
            out.push_str(&lookup(&after[..len]).unwrap_or_default());
        }
        rest = &after[len..];
    }
    out.push_str(rest);
    out
}
