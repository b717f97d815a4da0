//! tornlog CLI
//!
//! Write, damage, verify and recover log files from the command line.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tornlog::testing::cut_tail;
use tornlog::wal::DEFAULT_MAX_RECORD_SIZE;
use tornlog::{LogConfig, LogError, LogFile, RecoveryReport, ScanResult, SyncStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// tornlog
#[derive(Parser, Debug)]
#[command(name = "tornlog")]
#[command(about = "Append-only record log with torn-tail crash recovery")]
#[command(version)]
struct Args {
    /// Largest payload accepted and trusted, in bytes
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_RECORD_SIZE)]
    max_record_size: u32,

    /// When to fsync after appends
    #[arg(long, global = true, value_enum, default_value = "every-write")]
    sync: SyncArg,

    /// Appends per fsync with `--sync every-n`
    #[arg(long, global = true, default_value = "100")]
    sync_every: usize,

    /// Take an exclusive advisory lock on the log file
    #[arg(long, global = true)]
    lock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append COUNT records of deterministic payloads
    Write {
        file: PathBuf,
        count: u64,
        payload_bytes: usize,
    },

    /// Cut bytes from the end of the file to simulate a torn write
    Corrupt { file: PathBuf, bytes_to_cut: u64 },

    /// Scan the log and truncate any torn tail
    Recover { file: PathBuf },

    /// Scan the log without modifying it
    Verify { file: PathBuf },

    /// Write, cut half of the last record, then recover
    Demo {
        file: PathBuf,
        count: u64,
        payload_bytes: usize,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SyncArg {
    Flush,
    EveryWrite,
    EveryN,
}

/// Exit status for usage errors and missing files
const EXIT_USAGE: u8 = 2;

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tornlog=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let sync_strategy = match args.sync {
        SyncArg::Flush => SyncStrategy::Flush,
        SyncArg::EveryWrite => SyncStrategy::EveryWrite,
        SyncArg::EveryN => SyncStrategy::EveryNEntries {
            count: args.sync_every,
        },
    };

    let config = match LogConfig::builder()
        .max_record_size(args.max_record_size)
        .sync_strategy(sync_strategy)
        .advisory_lock(args.lock)
        .build()
    {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let outcome = match args.command {
        Commands::Write {
            file,
            count,
            payload_bytes,
        } => write(&file, config, count, payload_bytes),
        Commands::Corrupt { file, bytes_to_cut } => {
            require_file(&file).and_then(|_| corrupt(&file, bytes_to_cut))
        }
        Commands::Recover { file } => require_file(&file).and_then(|_| recover(&file, config)),
        Commands::Verify { file } => require_file(&file).and_then(|_| verify(&file, config)),
        Commands::Demo {
            file,
            count,
            payload_bytes,
        } => demo(&file, config, count, payload_bytes),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage(msg)) => {
            tracing::error!("{}", msg);
            ExitCode::from(EXIT_USAGE)
        }
        Err(CliError::Log(e)) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug)]
enum CliError {
    Usage(String),
    Log(LogError),
}

impl From<LogError> for CliError {
    fn from(e: LogError) -> Self {
        CliError::Log(e)
    }
}

type CliResult = std::result::Result<(), CliError>;

fn require_file(path: &Path) -> CliResult {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::Usage(format!("file not found: {}", path.display())))
    }
}

/// Payload `i`: byte `j` is `(i + j) & 0xFF`
fn fill_payload(buf: &mut [u8], i: u64) {
    for (j, b) in buf.iter_mut().enumerate() {
        *b = (i.wrapping_add(j as u64) & 0xFF) as u8;
    }
}

fn write(path: &Path, config: LogConfig, count: u64, payload_bytes: usize) -> CliResult {
    let mut log = LogFile::open(path, config)?;
    let mut payload = vec![0u8; payload_bytes];

    for i in 0..count {
        fill_payload(&mut payload, i);
        if let Err(e) = log.append(&payload) {
            tracing::error!(record = i, "write failed");
            return Err(e.into());
        }
    }
    log.sync()?;

    println!("[write] wrote {} entries, bytes={}", count, log.len());
    Ok(())
}

fn corrupt(path: &Path, bytes_to_cut: u64) -> CliResult {
    let (old_size, new_size) = cut_tail(path, bytes_to_cut)?;
    println!(
        "[corrupt] truncated {} bytes: {} -> {}",
        old_size - new_size,
        old_size,
        new_size
    );
    Ok(())
}

fn recover(path: &Path, config: LogConfig) -> CliResult {
    // Recovery is explicit here so the report can be printed
    let config = LogConfig {
        recover_on_open: false,
        ..config
    };
    let mut log = LogFile::open(path, config)?;
    report_recovery(log.recover())
}

/// Print the outcome of a recovery and pass any error through unchanged
fn report_recovery(outcome: tornlog::Result<RecoveryReport>) -> CliResult {
    match outcome {
        Ok(report) => {
            print_recovery(&report);
            Ok(())
        }
        Err(e) => {
            if let LogError::TruncateFailed { scan, .. } = &e {
                print_scan(scan);
                println!("[recover] truncate failed; file may still have a torn tail");
            }
            Err(e.into())
        }
    }
}

fn verify(path: &Path, config: LogConfig) -> CliResult {
    let config = LogConfig {
        recover_on_open: false,
        ..config
    };
    let mut log = LogFile::open(path, config)?;
    let scan = log.scan()?;
    print_scan(&scan);
    Ok(())
}

fn demo(path: &Path, config: LogConfig, count: u64, payload_bytes: usize) -> CliResult {
    write(path, config.clone(), count, payload_bytes)?;
    corrupt(path, (payload_bytes / 2 + 6) as u64)?;
    recover(path, config)
}

fn print_scan(scan: &ScanResult) {
    println!(
        "[scan] {} good entries, logical end at {} of {} bytes",
        scan.good_record_count, scan.last_good_offset, scan.file_size
    );
    match scan.stop_reason {
        None => println!("[scan] CLEAN"),
        Some(reason) => println!("[scan] stopped at offset {}: {}", scan.last_good_offset, reason),
    }
}

fn print_recovery(report: &RecoveryReport) {
    print_scan(&report.scan);
    if report.was_truncated() {
        println!(
            "[recover] truncated {} bytes; size now {}",
            report.bytes_removed, report.scan.last_good_offset
        );
        println!(
            "[recover] OK: Recovered {} entries, no parse error.",
            report.scan.good_record_count
        );
    } else {
        println!("[recover] CLEAN (no action needed)");
    }
}
