use papertrade_core::{StoreError, TradeError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] papertrade_core::ValidationError),

    #[error(transparent)]
    Trade(#[from] TradeError),

    #[error("ledger error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Trade(error) if error.is_rejection() => 3,
            Self::Trade(_) => 10,
            Self::Store(StoreError::Serialization(_)) => 4,
            Self::Store(_) => 10,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
