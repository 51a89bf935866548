use crate::domain::account::{Account, Amount, Balance};
use crate::domain::ports::LedgerStore;
use crate::domain::transaction::TransactionRecord;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct Ledger {
    accounts: HashMap<i64, Account>,
    journal: Vec<TransactionRecord>,
    applied_keys: HashSet<String>,
}

impl Ledger {
    fn ensure_fresh_key(&self, key: Option<&String>) -> Result<()> {
        match key {
            Some(key) if self.applied_keys.contains(key) => {
                Err(LedgerError::DuplicateOperation(key.clone()))
            }
            _ => Ok(()),
        }
    }

    fn balance_of(&self, user_id: i64) -> Result<Balance> {
        self.accounts
            .get(&user_id)
            .map(|account| account.balance)
            .ok_or(LedgerError::AccountNotFound(user_id))
    }

    fn append(&mut self, record: TransactionRecord) {
        if let Some(key) = &record.idempotency_key {
            self.applied_keys.insert(key.clone());
        }
        self.journal.push(record);
    }

    fn set_balance(&mut self, user_id: i64, balance: Balance) {
        self.accounts
            .insert(user_id, Account::with_balance(user_id, balance));
    }
}

/// A thread-safe in-memory ledger.
///
/// One mutex guards balances and journal together; holding it for the whole
/// call is what makes each operation atomic. Every check runs before the
/// first write, so a failing call leaves nothing behind.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    ledger: Arc<Mutex<Ledger>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn create_account(&self, user_id: i64) -> Result<Account> {
        let mut ledger = self.ledger.lock().await;
        if ledger.accounts.contains_key(&user_id) {
            return Err(LedgerError::DuplicateAccount(user_id));
        }
        let account = Account::new(user_id);
        ledger.accounts.insert(user_id, account.clone());
        Ok(account)
    }

    async fn get_account(&self, user_id: i64) -> Result<Option<Account>> {
        let ledger = self.ledger.lock().await;
        Ok(ledger.accounts.get(&user_id).cloned())
    }

    async fn apply_delta(
        &self,
        user_id: i64,
        delta: Decimal,
        idempotency_key: Option<String>,
    ) -> Result<Balance> {
        let mut ledger = self.ledger.lock().await;
        ledger.ensure_fresh_key(idempotency_key.as_ref())?;
        let balance = ledger.balance_of(user_id)?.checked_apply(delta)?;
        let record = TransactionRecord::for_delta(user_id, delta, idempotency_key)?;

        ledger.set_balance(user_id, balance);
        ledger.append(record);
        Ok(balance)
    }

    async fn transfer(
        &self,
        sender_id: i64,
        receiver_id: i64,
        amount: Amount,
        idempotency_key: Option<String>,
    ) -> Result<(Balance, Balance)> {
        if sender_id == receiver_id {
            return Err(LedgerError::SelfTransfer);
        }
        let mut ledger = self.ledger.lock().await;
        ledger.ensure_fresh_key(idempotency_key.as_ref())?;
        let sender = ledger.balance_of(sender_id)?.debit(amount)?;
        let receiver = ledger.balance_of(receiver_id)?.credit(amount)?;

        ledger.set_balance(sender_id, sender);
        ledger.set_balance(receiver_id, receiver);
        ledger.append(TransactionRecord::transfer(
            sender_id,
            receiver_id,
            amount,
            idempotency_key,
        ));
        Ok((sender, receiver))
    }

    async fn get_accounts_for_transfer(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<(Option<Account>, Option<Account>)> {
        let ledger = self.ledger.lock().await;
        Ok((
            ledger.accounts.get(&sender_id).cloned(),
            ledger.accounts.get(&receiver_id).cloned(),
        ))
    }

    async fn transactions_for(&self, user_id: i64) -> Result<Vec<TransactionRecord>> {
        let ledger = self.ledger.lock().await;
        Ok(ledger
            .journal
            .iter()
            .filter(|record| record.involves(user_id))
            .cloned()
            .collect())
    }
}
