//! Run configuration: environment variables overridden by command-line flags.

use std::path::PathBuf;

use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use chainclassify_pipeline::{ClassifierParams, PipelineConfig};
use clap::Args;

/// Flags for `chainclassify run`. Each one falls back to its environment
/// variable when not given on the command line.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// JSON-RPC endpoint
    #[arg(long, env = "POLYGON_POS_URL")]
    pub rpc_url: Option<String>,

    /// CSV file with a "Transaction Hash" column
    #[arg(long, env = "TRANSACTIONS_CSV_PATH")]
    pub transactions: Option<PathBuf>,

    /// Contract interface description (JSON ABI)
    #[arg(long, env = "ABI_JSON_PATH")]
    pub abi: Option<PathBuf>,

    /// Concurrent workers
    #[arg(long, env = "MAX_WORKERS", default_value_t = 5)]
    pub workers: usize,

    /// Classification mode: privado | civic
    #[arg(long, env = "CLASSIFY_MODE", default_value = "privado")]
    pub mode: String,

    /// Contract address used instead of each transaction's `to`
    #[arg(long, env = "TARGET_ADDRESS")]
    pub target_address: Option<String>,

    /// Keep only rows whose "Method" column equals this value
    #[arg(long, default_value = "Transit State")]
    pub method: String,

    /// Process every row regardless of the "Method" column
    #[arg(long, conflicts_with = "method")]
    pub all_methods: bool,

    /// Directory for result files
    #[arg(long, default_value = "results")]
    pub results_dir: PathBuf,

    /// Per-transaction network timeout, seconds
    #[arg(long, default_value_t = 60)]
    pub item_timeout_secs: u64,

    /// Per-request HTTP timeout, seconds
    #[arg(long, default_value_t = 30)]
    pub request_timeout_secs: u64,
}

/// Validated, immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rpc_url: String,
    pub transactions: PathBuf,
    pub abi: PathBuf,
    pub method_filter: Option<String>,
    pub results_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Resolve and check everything needed before any work starts.
    pub fn from_args(args: RunArgs) -> Result<Self> {
        let mut missing = Vec::new();
        if args.rpc_url.as_deref().map_or(true, str::is_empty) {
            missing.push("POLYGON_POS_URL (--rpc-url)");
        }
        if args.transactions.is_none() {
            missing.push("TRANSACTIONS_CSV_PATH (--transactions)");
        }
        if args.abi.is_none() {
            missing.push("ABI_JSON_PATH (--abi)");
        }
        let (Some(rpc_url), Some(transactions), Some(abi)) = (args.rpc_url, args.transactions, args.abi)
        else {
            bail!("missing configuration: {}", missing.join(", "));
        };
        if !missing.is_empty() {
            bail!("missing configuration: {}", missing.join(", "));
        }

        let target_address = args
            .target_address
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<Address>().with_context(|| format!("invalid TARGET_ADDRESS '{s}'")))
            .transpose()?;

        let pipeline = PipelineConfig {
            mode: args.mode,
            workers: args.workers,
            target_address,
            item_timeout_secs: args.item_timeout_secs,
            classifier: ClassifierParams::default(),
        };
        pipeline.validate().context("invalid pipeline configuration")?;

        Ok(Self {
            rpc_url,
            transactions,
            abi,
            method_filter: (!args.all_methods).then_some(args.method),
            results_dir: args.results_dir,
            request_timeout_secs: args.request_timeout_secs,
            pipeline,
        })
    }
}
