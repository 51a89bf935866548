use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

#[test]
fn test_malformed_csv_handling() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op, user, counterparty, amount, currency, key").unwrap();
    // Valid credit
    writeln!(file, "add, 1, , 1.0, , ").unwrap();
    // Unknown operation
    writeln!(file, "refund, 1, , 1.0, , ").unwrap();
    // Missing amount
    writeln!(file, "add, 1, , , , ").unwrap();
    // Valid credit again
    writeln!(file, "add, 1, , 2.0, , ").unwrap();

    let mut cmd = Command::new(cargo_bin!("balance-ledger"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading command"))
        .stderr(predicate::str::contains(
            "amount field is required and must be greater than zero",
        ))
        .stdout(predicate::str::contains("add,1,3"));
}

#[test]
fn test_invalid_data_types() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op, user, counterparty, amount, currency, key").unwrap();
    // Text in amount field
    writeln!(file, "add, 1, , not_a_number, , ").unwrap();
    // Non-integer user id
    writeln!(file, "add, abc, , 1.0, , ").unwrap();
    // Valid credit
    writeln!(file, "add, 1, , 5.0, , ").unwrap();

    let mut cmd = Command::new(cargo_bin!("balance-ledger"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading command"))
        .stdout(predicate::str::contains("add,1,5"));
}

#[test]
fn test_rejected_commands_do_not_change_balances() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op, user, counterparty, amount, currency, key").unwrap();
    writeln!(file, "add, 1, , 100, , ").unwrap();
    writeln!(file, "add, -1, , 100, , ").unwrap();
    writeln!(file, "write_off, 1, , 100.01, , ").unwrap();
    writeln!(file, "transfer, 1, 99, 10, , ").unwrap();
    writeln!(file, "transfer, 99, 1, 10, , ").unwrap();
    writeln!(file, "transfer, 1, 1, 10, , ").unwrap();
    writeln!(file, "transfer, 1, , 10, , ").unwrap();
    writeln!(file, "balance, 1, , , , ").unwrap();

    let mut cmd = Command::new(cargo_bin!("balance-ledger"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("user id must be positive integer"))
        .stderr(predicate::str::contains("not enough money on balance"))
        .stderr(predicate::str::contains("receiver does not exist"))
        .stderr(predicate::str::contains("sender does not exist"))
        .stderr(predicate::str::contains("sender and receiver must be different users"))
        .stderr(predicate::str::contains("receiver_id is required"))
        .stdout(predicate::str::contains("balance,1,100"))
        .stdout(predicate::str::contains("transfer").not());
}

#[test]
fn test_replayed_key_is_applied_once() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op, user, counterparty, amount, currency, key").unwrap();
    writeln!(file, "add, 1, , 100, , deposit-1").unwrap();
    writeln!(file, "add, 1, , 100, , deposit-1").unwrap();
    writeln!(file, "balance, 1, , , , ").unwrap();

    let mut cmd = Command::new(cargo_bin!("balance-ledger"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains(
            "operation deposit-1 has already been applied",
        ))
        .stdout(predicate::str::contains("balance,1,100"));
}

#[test]
fn test_replayed_write_off_after_drain_reports_duplicate() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op, user, counterparty, amount, currency, key").unwrap();
    writeln!(file, "add, 1, , 100, , ").unwrap();
    writeln!(file, "write_off, 1, , 60, , w1").unwrap();
    writeln!(file, "write_off, 1, , 60, , w1").unwrap();
    writeln!(file, "balance, 1, , , , ").unwrap();

    let mut cmd = Command::new(cargo_bin!("balance-ledger"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("operation w1 has already been applied"))
        .stderr(predicate::str::contains("not enough money on balance").not())
        .stdout(predicate::str::contains("balance,1,40"));
}
