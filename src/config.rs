use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, from command-line flags with environment fallbacks.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Input commands CSV file
    pub input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "LEDGER_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// URL serving `{"rates": {...}}` conversion tables.
    #[arg(long, env = "LEDGER_RATES_URL", conflicts_with = "rates_file")]
    pub rates_url: Option<String>,

    /// Local JSON file with the same shape as the rates URL.
    #[arg(long, env = "LEDGER_RATES_FILE")]
    pub rates_file: Option<PathBuf>,

    /// Seconds between conversion table refreshes.
    #[arg(long, env = "LEDGER_RATES_REFRESH_SECS", default_value_t = 86_400)]
    pub refresh_interval_secs: u64,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, env = "LEDGER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, env = "LEDGER_LOG_JSON")]
    pub log_json: bool,
}

impl Config {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["balance-ledger", "commands.csv"]).unwrap();
        assert_eq!(config.input, PathBuf::from("commands.csv"));
        assert_eq!(config.refresh_interval(), Duration::from_secs(86_400));
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
    }

    #[test]
    fn test_rate_sources_are_exclusive() {
        let result = Config::try_parse_from([
            "balance-ledger",
            "commands.csv",
            "--rates-url",
            "http://localhost/rates",
            "--rates-file",
            "rates.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = Config::try_parse_from([
            "balance-ledger",
            "commands.csv",
            "--refresh-interval-secs",
            "0",
        ])
        .unwrap();
        assert_eq!(config.refresh_interval(), Duration::from_secs(1));
    }
}
