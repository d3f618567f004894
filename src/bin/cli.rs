//! LedgerKV CLI
//!
//! Runs a single command against a log file.

use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ledgerkv::config::DEFAULT_MAX_RECORD_SIZE;
use ledgerkv::{Config, LedgerError, LedgerStore, RecordScanner};
use tracing_subscriber::{fmt, EnvFilter};

/// LedgerKV CLI
#[derive(Parser, Debug)]
#[command(name = "ledgerkv")]
#[command(about = "Log-structured key-value store")]
#[command(version)]
struct Args {
    /// Log file path
    #[arg(short, long, default_value = "./ledgerkv_data/ledger.log")]
    path: String,

    /// Maximum key + value size in bytes
    #[arg(short, long, default_value_t = DEFAULT_MAX_RECORD_SIZE)]
    max_record_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Scan the whole log and report what it holds
    Verify,
}

fn main() -> ExitCode {
    // Initialize tracing/logging (stderr, so values on stdout stay clean)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,ledgerkv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .storage_path(&args.path)
        .max_record_size(args.max_record_size)
        .build();

    match run(config, args.command) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: Config, command: Commands) -> ledgerkv::Result<ExitCode> {
    let code = match command {
        Commands::Verify => return verify(&config.storage_path, config.max_record_size),
        Commands::Get { key } => {
            let store = LedgerStore::open(config)?;
            let result = store.get(key.as_bytes());
            store.close()?;

            match result {
                Ok(value) => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&value)?;
                    stdout.write_all(b"\n")?;
                    ExitCode::SUCCESS
                }
                Err(e) if e.is_not_found() => {
                    eprintln!("(not found)");
                    ExitCode::FAILURE
                }
                Err(e) => return Err(e),
            }
        }
        Commands::Set { key, value } => {
            let store = LedgerStore::open(config)?;
            store.write(key.as_bytes(), value.as_bytes())?;
            store.close()?;
            println!("OK");
            ExitCode::SUCCESS
        }
        Commands::Del { key } => {
            let store = LedgerStore::open(config)?;
            store.delete(key.as_bytes())?;
            store.close()?;
            println!("OK");
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}

/// Scan the log without building a store, stopping at the first bad record
fn verify(path: &Path, max_record_size: usize) -> ledgerkv::Result<ExitCode> {
    let file = File::open(path).map_err(|source| LedgerError::OpenFile {
        path: path.to_path_buf(),
        source,
    })?;

    let mut scanner = RecordScanner::new(file, max_record_size);
    let mut records = 0u64;
    let mut tombstones = 0u64;
    let mut keys = HashSet::new();

    while let Some(item) = scanner.next_with_offset() {
        match item {
            Ok((_, record)) => {
                records += 1;
                if record.is_tombstone() {
                    tombstones += 1;
                }
                keys.insert(record.key().to_vec());
            }
            Err(e) => {
                println!(
                    "FAILED at offset {} after {} records: {}",
                    scanner.position(),
                    records,
                    e
                );
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    println!(
        "OK: {} records ({} tombstones), {} distinct keys, {} bytes",
        records,
        tombstones,
        keys.len(),
        scanner.position()
    );
    Ok(ExitCode::SUCCESS)
}
