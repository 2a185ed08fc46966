use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use tablebench_core::{RunConfig, WorkloadKind};
use tablebench_memstore::BackendVersion;

fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("duration cannot be empty (expected e.g. 60, 10s, 250ms, 1m)".to_string());
    }

    let number_end = s
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map_or(s.len(), |(idx, _)| idx);

    if number_end == 0 {
        return Err(format!(
            "invalid duration '{s}' (expected e.g. 60, 10s, 250ms, 1m)"
        ));
    }

    let (number_str, unit_str) = s.split_at(number_end);
    let value: u64 = number_str
        .parse()
        .map_err(|_| format!("invalid duration '{s}' (expected e.g. 60, 10s, 250ms, 1m)"))?;

    let unit = unit_str.trim();
    match unit {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => Ok(Duration::from_secs(value)),
        "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => {
            Ok(Duration::from_millis(value))
        }
        "m" | "min" | "mins" | "minute" | "minutes" => {
            let secs = value
                .checked_mul(60)
                .ok_or_else(|| format!("duration '{s}' is too large"))?;
            Ok(Duration::from_secs(secs))
        }
        "h" | "hr" | "hrs" | "hour" | "hours" => {
            let secs = value
                .checked_mul(60)
                .and_then(|v| v.checked_mul(60))
                .ok_or_else(|| format!("duration '{s}' is too large"))?;
            Ok(Duration::from_secs(secs))
        }
        _ => Err(format!(
            "invalid duration '{s}' (expected e.g. 60, 10s, 250ms, 1m)"
        )),
    }
}

fn parse_workload(input: &str) -> Result<WorkloadKind, String> {
    input.trim().parse().map_err(|_| {
        format!("unknown workload '{input}' (expected one of: load, read, multiread, react)")
    })
}

fn parse_backend_version(input: &str) -> Result<BackendVersion, String> {
    input
        .trim()
        .parse()
        .map_err(|_| format!("unknown backend version '{input}' (expected v1 or v2)"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned metric table.
    HumanReadable,
    /// One JSON summary object on stdout.
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "tablebench",
    author,
    version,
    args_override_self = true,
    about = "Load generator and latency meter for key-value table stores",
    long_about = "tablebench loads deterministic synthetic records into a table store and measures point-read latency under configurable concurrency.\n\nEvery record is a pure function of its index, so reads are verified against the record that was written without keeping any state between runs.",
    after_help = "Examples:\n  tablebench run memory://local load --rc 100000 --threads 4\n  tablebench run memory://local read --rc 100000 --threads 8 --duration 30s\n  tablebench run memory://local react --threads 64 --output json\n  tablebench batch runs.txt memory://local --rc 10000"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one workload and print its metrics
    #[command(args_override_self = true)]
    Run(RunArgs),

    /// Run every line of a batch script and print the selected metrics as CSV
    #[command(
        long_about = "Run a batch script.\n\nThe first line lists the metric names to export, separated by `;`. Every following non-empty line holds extra flags for one run, appended to the flags given on the command line."
    )]
    Batch(BatchArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Backend endpoint (e.g. memory://local)
    pub endpoint: String,

    /// Workload to run: load, read, multiread or react
    #[arg(default_value = "read", value_parser = parse_workload)]
    pub workload: WorkloadKind,

    #[command(flatten)]
    pub options: RunOptions,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Args)]
pub struct RunOptions {
    /// Worker threads (lanes for the reactive workload)
    #[arg(short = 't', long, default_value_t = 1)]
    pub threads: usize,

    #[arg(long, default_value = "app_record")]
    pub table_name: String,

    /// Records loaded by `load` and addressed by reads
    #[arg(long, visible_alias = "rc", default_value_t = 1_000_000)]
    pub record_count: u64,

    /// Payload size in bytes
    #[arg(long, default_value_t = 2000)]
    pub record_size: usize,

    /// Records per bulk upsert
    #[arg(long, default_value_t = 500)]
    pub batch_size: usize,

    /// Read test duration (e.g. 60, 10s, 1m); a bare number is seconds
    #[arg(long, visible_alias = "td", value_parser = parse_duration, default_value = "120s")]
    pub duration: Duration,

    /// Skip opening and closing sessions before measuring
    #[arg(long)]
    pub disable_warmup: bool,

    /// Backend client version
    #[arg(long, value_parser = parse_backend_version, default_value = "v2")]
    pub backend_version: BackendVersion,

    /// Shorthand for `--backend-version v1`
    #[arg(long)]
    pub use_sdk_v1: bool,

    /// Latency injected into every bundled-backend call (e.g. 2ms)
    #[arg(long, value_parser = parse_duration)]
    pub backend_latency: Option<Duration>,

    /// Pool size of the reactive workload (default: available parallelism)
    #[arg(long)]
    pub reactive_threads: Option<usize>,

    /// How long worker pools wait for in-flight tasks on shutdown
    #[arg(long, value_parser = parse_duration, default_value = "60s")]
    pub shutdown_grace: Duration,
}

impl RunOptions {
    pub fn run_config(&self, endpoint: &str) -> RunConfig {
        RunConfig {
            endpoint: endpoint.to_string(),
            table_name: self.table_name.clone(),
            threads: self.threads,
            record_count: self.record_count,
            record_size: self.record_size,
            batch_size: self.batch_size,
            duration: self.duration,
            warmup: !self.disable_warmup,
            reactive_threads: self.reactive_threads,
            shutdown_grace: self.shutdown_grace,
        }
    }

    pub fn backend_version(&self) -> BackendVersion {
        if self.use_sdk_v1 {
            BackendVersion::V1
        } else {
            self.backend_version
        }
    }
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Batch script: metric names on the first line, one run per following line
    pub script: PathBuf,

    /// Backend endpoint shared by every run
    pub endpoint: String,

    /// Flags applied to every run, before the script line's own flags
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    pub flags: Vec<String>,
}
