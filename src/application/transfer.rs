use super::engine::BalanceEngine;
use crate::domain::account::Account;
use crate::domain::requests::{Transfer, TransferRequest, TransferResult};
use crate::error::{LedgerError, Result};

impl BalanceEngine {
    /// Moves money between two existing accounts.
    ///
    /// Both accounts are read in one consistent view to report missing
    /// parties; the balances returned are the ones the store committed.
    pub async fn make_transfer(&self, request: TransferRequest) -> Result<TransferResult> {
        let Transfer {
            sender_id,
            receiver_id,
            amount,
            idempotency_key,
        } = request.validate()?;

        let (sender, receiver) = self
            .store
            .get_accounts_for_transfer(sender_id, receiver_id)
            .await?;
        let sender = sender.ok_or(LedgerError::SenderDoesNotExist)?;
        receiver.ok_or(LedgerError::ReceiverDoesNotExist)?;

        // Keyed requests leave the funds check to the store, which reports a
        // replay before it looks at the balance.
        if idempotency_key.is_none() && !sender.balance.covers(amount) {
            tracing::debug!(sender_id, amount = %amount.value(), "insufficient funds for transfer");
            return Err(LedgerError::InsufficientFunds);
        }

        let (sender_balance, receiver_balance) = self
            .store
            .transfer(sender_id, receiver_id, amount, idempotency_key)
            .await?;
        tracing::info!(sender_id, receiver_id, amount = %amount.value(), "transfer committed");

        Ok(TransferResult {
            sender: Account::with_balance(sender_id, sender_balance),
            receiver: Account::with_balance(receiver_id, receiver_balance),
        })
    }
}
