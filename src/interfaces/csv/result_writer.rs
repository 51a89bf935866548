use crate::domain::account::Account;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    op: &'a str,
    user_id: i64,
    balance: Decimal,
}

/// Writes one CSV row per account touched by a command.
pub struct ResultWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ResultWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Balances are normalised so `500.0` prints as `500`.
    pub fn write(&mut self, op: &str, account: &Account) -> Result<()> {
        self.writer.serialize(ResultRow {
            op,
            user_id: account.user_id,
            balance: account.balance.value().normalize(),
        })?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
