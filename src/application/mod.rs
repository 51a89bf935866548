//! Application layer containing the balance-mutation logic.
//!
//! `BalanceEngine` is the single entry point for credits, debits, transfers,
//! balance reads and statements. Its behaviour is split across files by
//! concern; all of them delegate atomicity to the `LedgerStore` port.

pub mod engine;
pub mod history;
pub mod rates;
pub mod transfer;
