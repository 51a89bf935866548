use balance_ledger::application::engine::BalanceEngine;
use balance_ledger::application::rates::{RateCache, RateRefresher};
use balance_ledger::config::Config;
use balance_ledger::domain::ports::{LedgerStoreBox, RateSourceRef};
use balance_ledger::infrastructure::in_memory::InMemoryLedgerStore;
use balance_ledger::infrastructure::rates::{FileRateSource, HttpRateSource};
use balance_ledger::interfaces::batch::run_batch;
use balance_ledger::interfaces::csv::command_reader::CommandReader;
use balance_ledger::interfaces::csv::result_writer::ResultWriter;
use balance_ledger::telemetry;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::sync::Arc;

#[cfg(feature = "storage-rocksdb")]
fn open_store(config: &Config) -> Result<LedgerStoreBox> {
    use balance_ledger::infrastructure::rocksdb::RocksDBStore;

    match &config.db_path {
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            tracing::info!(path = %path.display(), "using rocksdb storage");
            Ok(Box::new(store))
        }
        None => Ok(Box::new(InMemoryLedgerStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(config: &Config) -> Result<LedgerStoreBox> {
    if config.db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Box::new(InMemoryLedgerStore::new()))
}

fn rate_source(config: &Config) -> Option<RateSourceRef> {
    if let Some(url) = &config.rates_url {
        return Some(Arc::new(HttpRateSource::new(url.clone())));
    }
    config
        .rates_file
        .as_ref()
        .map(|path| Arc::new(FileRateSource::new(path.clone())) as RateSourceRef)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    telemetry::init(&config.log_level, config.log_json);

    let store = open_store(&config)?;
    let rates = Arc::new(RateCache::new());

    // Without a loaded table every non-base read would fail, so a broken
    // source at startup is fatal; later refresh failures are only logged.
    let refresher = match rate_source(&config) {
        Some(source) => {
            rates.refresh(source.as_ref()).await.into_diagnostic()?;
            Some(RateRefresher::new(rates.clone(), source, config.refresh_interval()).start())
        }
        None => None,
    };

    let engine = BalanceEngine::new(store, rates);

    let file = File::open(&config.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    let stdout = io::stdout();
    let mut writer = ResultWriter::new(stdout.lock());
    let outcome = run_batch(&engine, reader.commands(), &mut writer).await;

    if let Some(refresher) = refresher {
        refresher.stop().await;
    }

    let summary = outcome.into_diagnostic()?;
    tracing::info!(
        applied = summary.applied,
        rejected = summary.rejected,
        "batch finished"
    );
    Ok(())
}
