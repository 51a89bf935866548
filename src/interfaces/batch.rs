use super::csv::command_reader::{CommandKind, LedgerCommand};
use super::csv::result_writer::ResultWriter;
use crate::application::engine::BalanceEngine;
use crate::domain::requests::{TransferRequest, UpdateBalanceRequest};
use crate::domain::transaction::BalanceOperation;
use crate::error::{LedgerError, Result};
use std::io::Write;

/// Outcome counters for a processed batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub applied: usize,
    pub rejected: usize,
}

/// Runs one command and writes the touched accounts.
///
/// Command failures are returned to the caller; only failures of the output
/// sink itself abort the batch.
pub async fn run_command<W: Write>(
    engine: &BalanceEngine,
    command: LedgerCommand,
    out: &mut ResultWriter<W>,
) -> Result<()> {
    match command.op {
        CommandKind::Add | CommandKind::WriteOff => {
            let operation = if command.op == CommandKind::Add {
                BalanceOperation::Add
            } else {
                BalanceOperation::WriteOff
            };
            let request = UpdateBalanceRequest {
                user_id: command.user,
                operation_type: operation.code(),
                amount: command.amount,
                idempotency_key: command.key,
            };
            let account = engine.update_balance(request).await?;
            out.write(op_name(command.op), &account)
        }
        CommandKind::Transfer => {
            let request = TransferRequest {
                sender_id: Some(command.user),
                receiver_id: command.counterparty,
                amount: command.amount,
                idempotency_key: command.key,
            };
            let result = engine.make_transfer(request).await?;
            out.write("transfer", &result.sender)?;
            out.write("transfer", &result.receiver)
        }
        CommandKind::Balance => {
            let account = engine
                .get_balance(command.user, command.currency.as_deref())
                .await?;
            out.write("balance", &account)
        }
    }
}

/// Processes a stream of commands in order, reporting per-command failures to
/// stderr and continuing with the next one.
pub async fn run_batch<I, W>(
    engine: &BalanceEngine,
    commands: I,
    out: &mut ResultWriter<W>,
) -> Result<BatchSummary>
where
    I: IntoIterator<Item = Result<LedgerCommand>>,
    W: Write,
{
    let mut summary = BatchSummary::default();
    for (line, command) in commands.into_iter().enumerate() {
        let command = match command {
            Ok(command) => command,
            Err(e) => {
                eprintln!("Error reading command: {}", e);
                summary.rejected += 1;
                continue;
            }
        };

        match run_command(engine, command, out).await {
            Ok(()) => summary.applied += 1,
            Err(e @ (LedgerError::CsvError(_) | LedgerError::IoError(_))) => return Err(e),
            Err(e) => {
                if e.is_client_fault() {
                    tracing::debug!(line = line + 1, category = ?e.category(), "command rejected: {}", e);
                } else {
                    tracing::error!(line = line + 1, error = %e, "command failed");
                }
                eprintln!("Error processing command: {}", e);
                summary.rejected += 1;
            }
        }
    }
    out.flush()?;
    Ok(summary)
}

fn op_name(kind: CommandKind) -> &'static str {
    match kind {
        CommandKind::Add => "add",
        CommandKind::WriteOff => "write_off",
        CommandKind::Transfer => "transfer",
        CommandKind::Balance => "balance",
    }
}
