use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

#[test]
fn test_boundary_numerical_values() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op,user,counterparty,amount,currency,key").unwrap();
    // i64::MAX user id
    writeln!(file, "add,9223372036854775807,,1000000000.0000,,").unwrap();

    let mut cmd = Command::new(cargo_bin!("balance-ledger"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("op,user_id,balance"))
        .stdout(predicate::str::contains(
            "add,9223372036854775807,1000000000",
        ));
}

#[test]
fn test_extreme_decimal_precision() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op,user,counterparty,amount,currency,key").unwrap();
    writeln!(file, "add,1,,0.0001,,").unwrap();
    writeln!(file, "add,1,,0.0001,,").unwrap();
    writeln!(file, "write_off,1,,0.0002,,").unwrap();
    writeln!(file, "write_off,1,,0.0001,,").unwrap();

    let mut cmd = Command::new(cargo_bin!("balance-ledger"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("add,1,0.0002"))
        .stdout(predicate::str::contains("write_off,1,0\n"))
        .stderr(predicate::str::contains("not enough money on balance"));
}

#[test]
fn test_balance_past_decimal_range_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op,user,counterparty,amount,currency,key").unwrap();
    writeln!(file, "add,1,,79228162514264337593543950335,,").unwrap();
    writeln!(file, "add,1,,79228162514264337593543950335,,").unwrap();
    writeln!(file, "add,2,,1,,").unwrap();
    writeln!(file, "transfer,2,1,1,,").unwrap();
    writeln!(file, "balance,2,,,,").unwrap();

    let mut cmd = Command::new(cargo_bin!("balance-ledger"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "add,1,79228162514264337593543950335",
        ))
        .stdout(predicate::str::contains("balance,2,1\n"))
        .stdout(predicate::str::contains("transfer").not())
        .stderr(predicate::str::contains(
            "amount is out of the supported range",
        ));
}
