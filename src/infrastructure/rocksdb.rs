use crate::domain::account::{Account, Amount, Balance};
use crate::domain::ports::LedgerStore;
use crate::domain::transaction::TransactionRecord;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Column Family for account balances, keyed by big-endian user id.
pub const CF_BALANCES: &str = "balances";
/// Column Family for the journal, keyed by big-endian sequence number.
pub const CF_TRANSACTIONS: &str = "transactions";
/// Column Family mapping idempotency keys to the journal sequence they produced.
pub const CF_OPERATIONS: &str = "operations";

/// A persistent ledger backed by RocksDB.
///
/// Writers are serialized by `write_lock`; each mutation commits as a single
/// `WriteBatch`, so balances, journal and idempotency index move together.
/// `Clone` shares the underlying `Arc<DB>` and lock.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
    next_seq: Arc<AtomicU64>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Creates the column families on first use and resumes the journal
    /// sequence after the last stored entry.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_BALANCES, CF_TRANSACTIONS, CF_OPERATIONS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        let next_seq = {
            let cf = cf_handle(&db, CF_TRANSACTIONS)?;
            match db.iterator_cf(cf, IteratorMode::End).next() {
                Some(item) => decode_seq(&item?.0)? + 1,
                None => 0,
            }
        };
        tracing::debug!(next_seq, "opened rocksdb ledger");

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
            next_seq: Arc::new(AtomicU64::new(next_seq)),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        cf_handle(&self.db, name)
    }

    fn read_account(&self, user_id: i64) -> Result<Option<Account>> {
        let cf = self.cf(CF_BALANCES)?;
        match self.db.get_cf(cf, user_id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn existing_balance(&self, user_id: i64) -> Result<Balance> {
        self.read_account(user_id)?
            .map(|account| account.balance)
            .ok_or(LedgerError::AccountNotFound(user_id))
    }

    fn ensure_fresh_key(&self, key: Option<&String>) -> Result<()> {
        if let Some(key) = key {
            let cf = self.cf(CF_OPERATIONS)?;
            if self.db.get_pinned_cf(cf, key.as_bytes())?.is_some() {
                return Err(LedgerError::DuplicateOperation(key.clone()));
            }
        }
        Ok(())
    }

    fn put_account(&self, batch: &mut WriteBatch, account: &Account) -> Result<()> {
        let cf = self.cf(CF_BALANCES)?;
        batch.put_cf(cf, account.user_id.to_be_bytes(), serde_json::to_vec(account)?);
        Ok(())
    }

    fn put_record(&self, batch: &mut WriteBatch, record: &TransactionRecord) -> Result<()> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst).to_be_bytes();
        batch.put_cf(self.cf(CF_TRANSACTIONS)?, seq, serde_json::to_vec(record)?);
        if let Some(key) = &record.idempotency_key {
            batch.put_cf(self.cf(CF_OPERATIONS)?, key.as_bytes(), seq);
        }
        Ok(())
    }

    fn commit(&self, batch: WriteBatch) -> Result<()> {
        self.db.write(batch)?;
        Ok(())
    }

    fn apply_delta_locked(
        &self,
        user_id: i64,
        delta: Decimal,
        idempotency_key: Option<String>,
    ) -> Result<Balance> {
        self.ensure_fresh_key(idempotency_key.as_ref())?;
        let balance = self.existing_balance(user_id)?.checked_apply(delta)?;
        let record = TransactionRecord::for_delta(user_id, delta, idempotency_key)?;

        let mut batch = WriteBatch::default();
        self.put_account(&mut batch, &Account::with_balance(user_id, balance))?;
        self.put_record(&mut batch, &record)?;
        self.commit(batch)?;
        Ok(balance)
    }

    fn transfer_locked(
        &self,
        sender_id: i64,
        receiver_id: i64,
        amount: Amount,
        idempotency_key: Option<String>,
    ) -> Result<(Balance, Balance)> {
        self.ensure_fresh_key(idempotency_key.as_ref())?;
        let sender = self.existing_balance(sender_id)?.debit(amount)?;
        let receiver = self.existing_balance(receiver_id)?.credit(amount)?;
        let record = TransactionRecord::transfer(sender_id, receiver_id, amount, idempotency_key);

        let mut batch = WriteBatch::default();
        self.put_account(&mut batch, &Account::with_balance(sender_id, sender))?;
        self.put_account(&mut batch, &Account::with_balance(receiver_id, receiver))?;
        self.put_record(&mut batch, &record)?;
        self.commit(batch)?;
        Ok((sender, receiver))
    }

    fn accounts_snapshot(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<(Option<Account>, Option<Account>)> {
        let cf = self.cf(CF_BALANCES)?;
        let snapshot = self.db.snapshot();
        let read = |user_id: i64| -> Result<Option<Account>> {
            match snapshot.get_cf(cf, user_id.to_be_bytes())? {
                Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
                None => Ok(None),
            }
        };
        Ok((read(sender_id)?, read(receiver_id)?))
    }

    fn scan_journal(&self, user_id: i64) -> Result<Vec<TransactionRecord>> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let record: TransactionRecord = serde_json::from_slice(&value)?;
            if record.involves(user_id) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

fn cf_handle<'a>(db: &'a DB, name: &str) -> Result<&'a ColumnFamily> {
    db.cf_handle(name)
        .ok_or_else(|| LedgerError::storage(format!("{name} column family not found")))
}

fn decode_seq(key: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = key
        .try_into()
        .map_err(|_| LedgerError::storage("malformed journal key"))?;
    Ok(u64::from_be_bytes(bytes))
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn create_account(&self, user_id: i64) -> Result<Account> {
        let _guard = self.write_lock.lock().await;
        if self.read_account(user_id)?.is_some() {
            return Err(LedgerError::DuplicateAccount(user_id));
        }
        let account = Account::new(user_id);
        let mut batch = WriteBatch::default();
        self.put_account(&mut batch, &account)?;
        self.commit(batch)?;
        Ok(account)
    }

    async fn get_account(&self, user_id: i64) -> Result<Option<Account>> {
        self.read_account(user_id)
    }

    async fn apply_delta(
        &self,
        user_id: i64,
        delta: Decimal,
        idempotency_key: Option<String>,
    ) -> Result<Balance> {
        let _guard = self.write_lock.lock().await;
        self.apply_delta_locked(user_id, delta, idempotency_key)
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
        let _guard = self.write_lock.lock().await;
        self.transfer_locked(sender_id, receiver_id, amount, idempotency_key)
    }

    async fn get_accounts_for_transfer(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> Result<(Option<Account>, Option<Account>)> {
        self.accounts_snapshot(sender_id, receiver_id)
    }

    async fn transactions_for(&self, user_id: i64) -> Result<Vec<TransactionRecord>> {
        self.scan_journal(user_id)
    }
}
