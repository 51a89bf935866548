use super::engine::BalanceEngine;
use crate::domain::requests::positive_user_id;
use crate::domain::transaction::{TransactionQuery, TransactionRecord};
use crate::error::{LedgerError, Result};
use std::cmp::Reverse;

impl BalanceEngine {
    /// Returns a user's statement, filtered and ordered per `query`.
    pub async fn user_transactions(
        &self,
        user_id: i64,
        query: TransactionQuery,
    ) -> Result<Vec<TransactionRecord>> {
        let user_id = positive_user_id(user_id)?;
        let limit = match query.limit {
            Some(limit) if limit < 0 => return Err(LedgerError::NegativeLimit),
            Some(0) | None => None,
            Some(limit) => Some(usize::try_from(limit).unwrap_or(usize::MAX)),
        };

        if self.store.get_account(user_id).await?.is_none() {
            return Err(LedgerError::UserDoesNotExist);
        }

        let mut records = self.store.transactions_for(user_id).await?;
        if let Some(until) = query.until {
            records.retain(|record| record.created_at <= until);
        }

        match (query.order_by_amount, query.order_by_date) {
            (true, true) => {
                records.sort_by_key(|r| (Reverse(r.amount), Reverse(r.created_at)))
            }
            (true, false) => records.sort_by_key(|r| Reverse(r.amount)),
            (false, true) => records.sort_by_key(|r| Reverse(r.created_at)),
            (false, false) => {}
        }

        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }
}
