use super::account::Amount;
use super::currency::BASE_CURRENCY;
use crate::error::LedgerError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of a journal entry.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Add,
    WriteOff,
    Transfer,
}

/// The two single-account mutations a caller may request.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BalanceOperation {
    Add,
    WriteOff,
}

impl BalanceOperation {
    pub const ADD_CODE: i64 = 0;
    pub const WRITE_OFF_CODE: i64 = 1;

    pub fn code(self) -> i64 {
        match self {
            Self::Add => Self::ADD_CODE,
            Self::WriteOff => Self::WRITE_OFF_CODE,
        }
    }
}

impl TryFrom<i64> for BalanceOperation {
    type Error = LedgerError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            Self::ADD_CODE => Ok(Self::Add),
            Self::WRITE_OFF_CODE => Ok(Self::WriteOff),
            other => Err(LedgerError::UnsupportedOperationType(other)),
        }
    }
}

/// An immutable journal entry, written in the same atomic unit as the balance
/// change it describes.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TransactionRecord {
    pub operation_kind: OperationKind,
    pub sender: i64,
    pub receiver: Option<i64>,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl TransactionRecord {
    /// Builds the entry for a signed single-account delta.
    ///
    /// The sign picks the kind; the stored amount is always the absolute value.
    pub fn for_delta(
        user_id: i64,
        delta: Decimal,
        idempotency_key: Option<String>,
    ) -> Result<Self, LedgerError> {
        let operation_kind = if delta.is_sign_negative() {
            OperationKind::WriteOff
        } else {
            OperationKind::Add
        };
        Ok(Self {
            operation_kind,
            sender: user_id,
            receiver: None,
            amount: Amount::new(delta.abs())?,
            created_at: Utc::now(),
            idempotency_key,
        })
    }

    pub fn transfer(
        sender: i64,
        receiver: i64,
        amount: Amount,
        idempotency_key: Option<String>,
    ) -> Self {
        Self {
            operation_kind: OperationKind::Transfer,
            sender,
            receiver: Some(receiver),
            amount,
            created_at: Utc::now(),
            idempotency_key,
        }
    }

    pub fn involves(&self, user_id: i64) -> bool {
        self.sender == user_id || self.receiver == Some(user_id)
    }

    /// Human readable line as seen from `user_id`'s statement.
    pub fn description_for(&self, user_id: i64) -> String {
        let amount = self.amount.value().round_dp(2);
        match (self.operation_kind, self.receiver) {
            (OperationKind::Add, _) => format!("Add {amount:.2}{BASE_CURRENCY}"),
            (OperationKind::WriteOff, _) => format!("Write off {amount:.2}{BASE_CURRENCY}"),
            (OperationKind::Transfer, Some(receiver)) if self.sender == user_id => {
                format!("Sent {amount:.2}{BASE_CURRENCY} to user {receiver}")
            }
            (OperationKind::Transfer, _) => {
                format!("Received {amount:.2}{BASE_CURRENCY} from user {}", self.sender)
            }
        }
    }
}

/// Filters for a user's statement.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TransactionQuery {
    /// Maximum number of entries; absent or zero means no limit.
    #[serde(default)]
    pub limit: Option<i64>,
    /// Only entries created at or before this instant.
    #[serde(default)]
    pub until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order_by_amount: bool,
    #[serde(default)]
    pub order_by_date: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_operation_codes() {
        assert_eq!(BalanceOperation::try_from(0).unwrap(), BalanceOperation::Add);
        assert_eq!(
            BalanceOperation::try_from(1).unwrap(),
            BalanceOperation::WriteOff
        );
        assert!(matches!(
            BalanceOperation::try_from(2),
            Err(LedgerError::UnsupportedOperationType(2))
        ));
        assert!(matches!(
            BalanceOperation::try_from(-1),
            Err(LedgerError::UnsupportedOperationType(-1))
        ));
    }

    #[test]
    fn test_delta_record_uses_absolute_amount() {
        let record = TransactionRecord::for_delta(1, dec!(-25.5), None).unwrap();
        assert_eq!(record.operation_kind, OperationKind::WriteOff);
        assert_eq!(record.amount.value(), dec!(25.5));
        assert_eq!(record.receiver, None);

        let record = TransactionRecord::for_delta(1, dec!(3), None).unwrap();
        assert_eq!(record.operation_kind, OperationKind::Add);

        assert!(TransactionRecord::for_delta(1, dec!(0), None).is_err());
    }

    #[test]
    fn test_descriptions() {
        let amount = Amount::new(dec!(500)).unwrap();
        let record = TransactionRecord::transfer(1, 2, amount, None);
        assert_eq!(record.description_for(1), "Sent 500.00RUB to user 2");
        assert_eq!(record.description_for(2), "Received 500.00RUB from user 1");
        assert!(record.involves(1) && record.involves(2) && !record.involves(3));

        let record = TransactionRecord::for_delta(1, dec!(-5), None).unwrap();
        assert_eq!(record.description_for(1), "Write off 5.00RUB");
    }

    #[test]
    fn test_record_json_shape() {
        let record = TransactionRecord::for_delta(4, dec!(10), None).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["operation_kind"], "add");
        assert_eq!(json["sender"], 4);
        assert!(json.get("idempotency_key").is_none());
    }
}
