use crate::domain::account::Account;
use crate::domain::currency::BASE_CURRENCY;
use crate::domain::ports::{LedgerStoreBox, RateLookupRef};
use crate::domain::requests::{BalanceUpdate, UpdateBalanceRequest, positive_user_id};
use crate::domain::transaction::BalanceOperation;
use crate::error::{LedgerError, Result};

/// Entry point for every balance-changing and balance-reading request.
///
/// `BalanceEngine` validates requests, decides against the current ledger
/// state and delegates each mutation to one atomic `LedgerStore` call. It holds
/// no mutable state of its own, so a single instance can be shared behind an
/// `Arc` by any number of concurrent tasks.
pub struct BalanceEngine {
    pub(crate) store: LedgerStoreBox,
    rates: RateLookupRef,
}

impl BalanceEngine {
    /// Creates a new `BalanceEngine`.
    ///
    /// # Arguments
    ///
    /// * `store` - The ledger persistence backend.
    /// * `rates` - Conversion lookup used by balance reads.
    pub fn new(store: LedgerStoreBox, rates: RateLookupRef) -> Self {
        Self { store, rates }
    }

    /// Credits or debits a single account, creating it on first touch.
    pub async fn update_balance(&self, request: UpdateBalanceRequest) -> Result<Account> {
        let BalanceUpdate {
            user_id,
            operation,
            amount,
            idempotency_key,
        } = request.validate()?;

        let account = match self.store.get_account(user_id).await? {
            Some(account) => account,
            None => self.open_account(user_id).await?,
        };

        let delta = match operation {
            BalanceOperation::Add => amount.value(),
            BalanceOperation::WriteOff => {
                // Keyed requests leave the funds check to the store, which
                // reports a replay before it looks at the balance.
                if idempotency_key.is_none() && !account.balance.covers(amount) {
                    tracing::debug!(user_id, amount = %amount.value(), "insufficient funds for write-off");
                    return Err(LedgerError::InsufficientFunds);
                }
                -amount.value()
            }
        };

        let balance = self
            .store
            .apply_delta(user_id, delta, idempotency_key)
            .await?;
        tracing::debug!(user_id, %delta, balance = %balance.0, "balance updated");
        Ok(Account::with_balance(user_id, balance))
    }

    /// Reads a balance, converted into `currency` (the base currency when empty).
    pub async fn get_balance(&self, user_id: i64, currency: Option<&str>) -> Result<Account> {
        let user_id = positive_user_id(user_id)?;
        let currency = currency
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .unwrap_or(BASE_CURRENCY);

        let account = self
            .store
            .get_account(user_id)
            .await?
            .ok_or(LedgerError::UserDoesNotExist)?;
        let rate = self.rates.rate(currency).await?;

        Ok(Account::with_balance(user_id, account.balance.convert(rate)?))
    }

    async fn open_account(&self, user_id: i64) -> Result<Account> {
        match self.store.create_account(user_id).await {
            Ok(account) => {
                tracing::info!(user_id, "account created");
                Ok(account)
            }
            // Lost a race with a concurrent first touch; use the winner's row.
            Err(LedgerError::DuplicateAccount(_)) => self
                .store
                .get_account(user_id)
                .await?
                .ok_or(LedgerError::AccountNotFound(user_id)),
            Err(e) => Err(e),
        }
    }
}
