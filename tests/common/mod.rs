use std::fs::File;
use std::io::Error;
use std::path::Path;

/// Writes `rows` credits of 1.0 spread round-robin over `users` accounts,
/// followed by one balance query per account.
pub fn generate_csv(path: &Path, rows: usize, users: i64) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["op", "user", "counterparty", "amount", "currency", "key"])?;

    for i in 0..rows {
        let user = (i as i64 % users) + 1;
        wtr.write_record(["add", &user.to_string(), "", "1.0", "", ""])?;
    }
    for user in 1..=users {
        wtr.write_record(["balance", &user.to_string(), "", "", "", ""])?;
    }

    wtr.flush()?;
    Ok(())
}
