use thiserror::Error;

/// Coarse classification used by callers to map a failure onto a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed request, rejected before any storage access.
    Validation,
    /// Well-formed request that the ledger state does not allow.
    Domain,
    /// Storage, rate source or I/O failure.
    Server,
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("user id must be positive integer")]
    NegativeUserId,
    #[error("not supported operation type: {0}")]
    UnsupportedOperationType(i64),
    #[error("amount field is required and must be greater than zero")]
    AmountRequired,
    #[error("sender_id is required")]
    SenderIdRequired,
    #[error("receiver_id is required")]
    ReceiverIdRequired,
    #[error("sender and receiver must be different users")]
    SelfTransfer,
    #[error("limit value must be positive integer")]
    NegativeLimit,

    #[error("not enough money on balance")]
    InsufficientFunds,
    #[error("user does not exist")]
    UserDoesNotExist,
    #[error("sender does not exist")]
    SenderDoesNotExist,
    #[error("receiver does not exist")]
    ReceiverDoesNotExist,
    #[error("currency is not supported: {0}")]
    UnsupportedCurrency(String),
    #[error("operation {0} has already been applied")]
    DuplicateOperation(String),
    #[error("amount is out of the supported range")]
    AmountOverflow,

    #[error("account {0} already exists")]
    DuplicateAccount(i64),
    #[error("account {0} not found")]
    AccountNotFound(i64),
    #[error("storage fault: {0}")]
    StorageFault(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("rate source error: {0}")]
    RateSource(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LedgerError {
    pub fn storage<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::StorageFault(err.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NegativeUserId
            | Self::UnsupportedOperationType(_)
            | Self::AmountRequired
            | Self::SenderIdRequired
            | Self::ReceiverIdRequired
            | Self::SelfTransfer
            | Self::NegativeLimit => ErrorCategory::Validation,
            Self::InsufficientFunds
            | Self::UserDoesNotExist
            | Self::SenderDoesNotExist
            | Self::ReceiverDoesNotExist
            | Self::UnsupportedCurrency(_)
            | Self::DuplicateOperation(_)
            | Self::AmountOverflow => ErrorCategory::Domain,
            Self::DuplicateAccount(_)
            | Self::AccountNotFound(_)
            | Self::StorageFault(_)
            | Self::RateSource(_)
            | Self::CsvError(_)
            | Self::IoError(_) => ErrorCategory::Server,
        }
    }

    pub fn is_client_fault(&self) -> bool {
        self.category() != ErrorCategory::Server
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::storage(err)
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LedgerError {
    fn from(err: rocksdb::Error) -> Self {
        Self::storage(err)
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
