use ethers::prelude::*;
use serde::Serialize;
use std::fmt::Display;
use tracing::{info, warn};

use crate::error::{ActionError, ActionResult};
use crate::identity::{AddressDirectory, Destination, resolve_destination};

/// Транзакция до резолва получателя.
#[derive(Clone, Debug, PartialEq)]
pub struct TxDraft {
    pub to: Destination,
    pub value: U256,
    pub data: Option<Bytes>,
    pub gas_limit: Option<U256>,
}

impl TxDraft {
    pub async fn resolve<D: AddressDirectory>(self, directory: &D) -> ActionResult<TxIntent> {
        let to = resolve_destination(&self.to, directory).await?;
        Ok(TxIntent {
            to,
            value: self.value,
            data: self.data,
            gas_limit: self.gas_limit,
        })
    }
}

/// Assembled, unsigned transaction. Nonce, gas price and chain id are left to
/// the signer middleware.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxIntent {
    pub to: Address,
    pub value: U256,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<U256>,
}

impl TxIntent {
    pub fn to_request(&self) -> TransactionRequest {
        let mut tx = TransactionRequest::new().to(self.to).value(self.value);
        if let Some(data) = &self.data {
            tx = tx.data(data.clone());
        }
        if let Some(gas) = self.gas_limit {
            tx = tx.gas(gas);
        }
        tx
    }
}

fn tx_err(e: impl Display) -> ActionError {
    ActionError::Transaction(e.to_string())
}

/// Подписываем и отправляем, ждём одно подтверждение.
/// Ошибки ethers пробрасываются с исходным текстом.
pub async fn sign_and_send<P>(
    provider: P,
    wallet: LocalWallet,
    intent: &TxIntent,
) -> ActionResult<Option<TransactionReceipt>>
where
    P: Middleware + 'static,
{
    // chain_id берём у ноды, кошелёк подписывает под него
    let client = SignerMiddleware::new_with_provider_chain(provider, wallet)
        .await
        .map_err(tx_err)?;
    let chain_id = client.signer().chain_id();
    let from = client.address();

    info!(chain_id, from = ?from, to = ?intent.to, value = %intent.value, "sending transaction");

    let pending = client
        .send_transaction(intent.to_request(), None)
        .await
        .map_err(tx_err)?;
    let tx_hash = pending.tx_hash();
    info!(tx = ?tx_hash, "transaction sent, waiting for confirmation");

    let receipt = pending.await.map_err(tx_err)?;
    match &receipt {
        Some(r) => info!(
            tx = ?r.transaction_hash,
            block = ?r.block_number,
            status = ?r.status,
            "transaction mined"
        ),
        None => warn!(tx = ?tx_hash, "transaction dropped from mempool"),
    }
    Ok(receipt)
}
