use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Add,
    WriteOff,
    Transfer,
    Balance,
}

/// One row of a batch file.
///
/// `user` is the acted-on account (the sender for transfers); `counterparty`
/// is only read by transfers and `currency` only by balance queries.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct LedgerCommand {
    pub op: CommandKind,
    pub user: i64,
    #[serde(default)]
    pub counterparty: Option<i64>,
    /// Parsed from the field text so large or long-fraction amounts stay exact.
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

/// Reads ledger commands from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<LedgerCommand>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes commands, so
    /// large batches are streamed rather than loaded whole.
    pub fn commands(self) -> impl Iterator<Item = Result<LedgerCommand>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "op, user, counterparty, amount, currency, key\n\
                    add, 1, , 100.50, , k1\n\
                    transfer, 1, 2, 20, , \n\
                    balance, 2, , , USD, ";
        let reader = CommandReader::new(data.as_bytes());
        let results: Vec<Result<LedgerCommand>> = reader.commands().collect();

        assert_eq!(results.len(), 3);
        let add = results[0].as_ref().unwrap();
        assert_eq!(add.op, CommandKind::Add);
        assert_eq!(add.amount, Some(dec!(100.50)));
        assert_eq!(add.key.as_deref(), Some("k1"));
        assert_eq!(add.counterparty, None);

        let transfer = results[1].as_ref().unwrap();
        assert_eq!(transfer.counterparty, Some(2));
        assert_eq!(transfer.key, None);

        let balance = results[2].as_ref().unwrap();
        assert_eq!(balance.op, CommandKind::Balance);
        assert_eq!(balance.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_reader_keeps_amounts_exact() {
        let data = "op,user,counterparty,amount,currency,key\n\
                    add,1,,79228162514264337593543950335,,\n\
                    add,1,,0.1000000000000000000000000001,,\n\
                    add,1,,,,\n\
                    add,1,,twelve,,";
        let results: Vec<Result<LedgerCommand>> =
            CommandReader::new(data.as_bytes()).commands().collect();

        assert_eq!(results[0].as_ref().unwrap().amount, Some(Decimal::MAX));
        assert_eq!(
            results[1].as_ref().unwrap().amount,
            Some(dec!(0.1000000000000000000000000001))
        );
        assert_eq!(results[2].as_ref().unwrap().amount, None);
        assert!(results[3].is_err());
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "op, user, counterparty, amount, currency, key\n\
                    refund, 1, , 1.0, , \n\
                    add, abc, , 1.0, , ";
        let reader = CommandReader::new(data.as_bytes());
        let results: Vec<Result<LedgerCommand>> = reader.commands().collect();

        assert!(results[0].is_err());
        assert!(results[1].is_err());
    }
}
