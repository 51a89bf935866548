use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary value in the base currency.
///
/// Wraps `rust_decimal::Decimal` so balances never go through floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// A strictly positive amount carried by a credit, debit or transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::AmountRequired)
        }
    }

    /// Validates an optional request field; absent and non-positive values are
    /// both reported as a missing amount.
    pub fn required(value: Option<Decimal>) -> Result<Self, LedgerError> {
        value.ok_or(LedgerError::AmountRequired).and_then(Self::new)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn covers(&self, amount: Amount) -> bool {
        self.0 >= amount.0
    }

    /// Applies a signed delta, refusing to go below zero or past the decimal range.
    pub fn checked_apply(self, delta: Decimal) -> Result<Self, LedgerError> {
        let next = self
            .0
            .checked_add(delta)
            .map(Self)
            .ok_or(LedgerError::AmountOverflow)?;
        if next.is_negative() {
            Err(LedgerError::InsufficientFunds)
        } else {
            Ok(next)
        }
    }

    pub fn credit(self, amount: Amount) -> Result<Self, LedgerError> {
        self.checked_apply(amount.0)
    }

    pub fn debit(self, amount: Amount) -> Result<Self, LedgerError> {
        self.checked_apply(-amount.0)
    }

    /// Expresses the balance in another currency given "units per base unit".
    pub fn convert(self, rate: Decimal) -> Result<Self, LedgerError> {
        self.0
            .checked_mul(rate)
            .map(Self)
            .ok_or(LedgerError::AmountOverflow)
    }
}

/// A user's balance record.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Account {
    pub user_id: i64,
    pub balance: Balance,
}

impl Account {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            balance: Balance::ZERO,
        }
    }

    pub fn with_balance(user_id: i64, balance: Balance) -> Self {
        Self { user_id, balance }
    }
}
