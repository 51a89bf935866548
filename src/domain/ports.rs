use super::account::{Account, Amount, Balance};
use super::currency::ConversionTable;
use super::transaction::TransactionRecord;
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Persistence boundary over the balance and journal tables.
///
/// Every method is one atomic unit of work: it either commits all of its
/// effects or none of them. Mutating methods re-check non-negativity inside
/// the unit, so a caller's earlier read can never lead to an overdraft.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Inserts a zero-balance account, failing with `DuplicateAccount` if present.
    async fn create_account(&self, user_id: i64) -> Result<Account>;

    async fn get_account(&self, user_id: i64) -> Result<Option<Account>>;

    /// Adds `delta` to the balance and appends one journal entry.
    ///
    /// Returns the new balance. A key that was already applied fails with
    /// `DuplicateOperation` and changes nothing.
    async fn apply_delta(
        &self,
        user_id: i64,
        delta: Decimal,
        idempotency_key: Option<String>,
    ) -> Result<Balance>;

    /// Moves `amount` from sender to receiver and appends one `transfer` entry.
    ///
    /// Returns the sender's and receiver's new balances. Equal ids fail with
    /// `SelfTransfer`.
    async fn transfer(
        &self,
        sender_id: i64,
        receiver_id: i64,
        amount: Amount,
        idempotency_key: Option<String>,
    ) -> Result<(Balance, Balance)>;

    /// Reads both parties of a transfer from one consistent view.
    async fn get_accounts_for_transfer(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<(Option<Account>, Option<Account>)>;

    /// Journal entries where the user is sender or receiver, oldest first.
    async fn transactions_for(&self, user_id: i64) -> Result<Vec<TransactionRecord>>;
}

/// Read side of the conversion table.
#[async_trait]
pub trait RateLookup: Send + Sync {
    /// Units of `currency` per base unit, or `UnsupportedCurrency`.
    async fn rate(&self, currency: &str) -> Result<Decimal>;
}

/// Upstream provider of conversion tables.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self) -> Result<ConversionTable>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type RateLookupRef = Arc<dyn RateLookup>;
pub type RateSourceRef = Arc<dyn RateSource>;
