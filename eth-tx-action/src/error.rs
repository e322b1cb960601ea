use thiserror::Error;

use crate::convert::ConvertError;

/// Тип ошибки, по которому вызывающий решает, что делать дальше.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    PriceFeed,
    Resolution,
    Transaction,
    Conversion,
}

#[derive(Error, Debug)]
pub enum ActionError {
    /// Missing or invalid input; raised before any network call.
    #[error("Config error: {0}")]
    Config(String),

    #[error("failed to fetch price from feed {feed}: {reason}")]
    PriceFeed { feed: String, reason: String },

    #[error("Could not resolve \"{identity}\" to an Ethereum address: {reason}")]
    Resolution { identity: String, reason: String },

    /// Ошибка подписи/отправки, текст от ethers без изменений.
    #[error("{0}")]
    Transaction(String),

    #[error(transparent)]
    Conversion(#[from] ConvertError),
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::PriceFeed { .. } => ErrorKind::PriceFeed,
            Self::Resolution { .. } => ErrorKind::Resolution,
            Self::Transaction(_) => ErrorKind::Transaction,
            Self::Conversion(_) => ErrorKind::Conversion,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn price_feed(feed: impl std::fmt::Debug, reason: impl std::fmt::Display) -> Self {
        Self::PriceFeed {
            feed: format!("{feed:?}"),
            reason: reason.to_string(),
        }
    }

    pub fn resolution(identity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            identity: identity.into(),
            reason: reason.into(),
        }
    }
}

pub type ActionResult<T> = Result<T, ActionError>;
