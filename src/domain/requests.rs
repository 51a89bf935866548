//! Caller-facing DTOs and their validated forms.
//!
//! Validation happens here, before anything reaches storage.

use super::account::{Account, Amount};
use super::transaction::BalanceOperation;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBalanceRequest {
    pub user_id: i64,
    /// `0` credits the account, `1` writes money off.
    pub operation_type: i64,
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// An `UpdateBalanceRequest` that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceUpdate {
    pub user_id: i64,
    pub operation: BalanceOperation,
    pub amount: Amount,
    pub idempotency_key: Option<String>,
}

impl UpdateBalanceRequest {
    pub fn new(user_id: i64, operation: BalanceOperation, amount: Decimal) -> Self {
        Self {
            user_id,
            operation_type: operation.code(),
            amount: Some(amount),
            idempotency_key: None,
        }
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    pub fn validate(self) -> Result<BalanceUpdate> {
        let user_id = positive_user_id(self.user_id)?;
        let operation = BalanceOperation::try_from(self.operation_type)?;
        let amount = Amount::required(self.amount)?;
        Ok(BalanceUpdate {
            user_id,
            operation,
            amount,
            idempotency_key: self.idempotency_key,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransferRequest {
    pub sender_id: Option<i64>,
    pub receiver_id: Option<i64>,
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub amount: Amount,
    pub idempotency_key: Option<String>,
}

impl TransferRequest {
    pub fn new(sender_id: i64, receiver_id: i64, amount: Decimal) -> Self {
        Self {
            sender_id: Some(sender_id),
            receiver_id: Some(receiver_id),
            amount: Some(amount),
            idempotency_key: None,
        }
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    pub fn validate(self) -> Result<Transfer> {
        // A zero id is what an omitted JSON field decodes to upstream.
        let sender_id = self
            .sender_id
            .filter(|id| *id != 0)
            .ok_or(LedgerError::SenderIdRequired)?;
        let receiver_id = self
            .receiver_id
            .filter(|id| *id != 0)
            .ok_or(LedgerError::ReceiverIdRequired)?;
        let amount = Amount::required(self.amount)?;
        if sender_id == receiver_id {
            return Err(LedgerError::SelfTransfer);
        }
        Ok(Transfer {
            sender_id,
            receiver_id,
            amount,
            idempotency_key: self.idempotency_key,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferResult {
    pub sender: Account,
    pub receiver: Account,
}

pub(crate) fn positive_user_id(user_id: i64) -> Result<i64> {
    if user_id > 0 {
        Ok(user_id)
    } else {
        Err(LedgerError::NegativeUserId)
    }
}
