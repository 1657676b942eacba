//! ChainClassify CLI.
//!
//! # Commands
//! ```text
//! chainclassify run         [--rpc-url <url>] [--transactions <csv>] [--abi <json>] [--mode privado|civic]
//! chainclassify decode-call --calldata <hex> --abi <path.json> [--json]
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chainclassify_evm::{decode_call, InterfaceRegistry};
use chainclassify_pipeline::Pipeline;
use chainclassify_rpc::{EvmRpcClient, HttpClientConfig, HttpRpcClient};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

mod config;
mod input;
mod logging;
mod output;

use config::{AppConfig, RunArgs};
use logging::{init_tracing, LogConfig};

#[derive(Parser)]
#[command(
    name = "chainclassify",
    about = "Classify Polygon PoS transactions by decoding call data and receipt logs",
    long_about = "
ChainClassify CLI: fetch each transaction in a CSV export, decode it against a
contract ABI and classify it (privado: genesis state transitions, civic: mints).

ENVIRONMENT VARIABLES:
  POLYGON_POS_URL          JSON-RPC endpoint
  TRANSACTIONS_CSV_PATH    CSV export with a \"Transaction Hash\" column
  ABI_JSON_PATH            Contract ABI (JSON)
  MAX_WORKERS              Concurrent workers (default 5)
  CLASSIFY_MODE            privado | civic
  TARGET_ADDRESS           Contract address override
  RUST_LOG                 Log filter directives
",
    version
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every transaction in the input CSV and write result files
    Run(RunArgs),

    /// Decode function call data using an ABI JSON file
    #[command(name = "decode-call")]
    DecodeCall {
        /// Raw call data (0x-prefixed hex)
        #[arg(long)]
        calldata: String,
        /// Path to the ABI JSON file
        #[arg(long)]
        abi: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log = LogConfig {
        json: cli.log_json,
        ..LogConfig::default()
    };
    init_tracing(&log.verbose(cli.verbose));

    match cli.command {
        Commands::Run(args) => cmd_run(AppConfig::from_args(args)?).await,
        Commands::DecodeCall { calldata, abi, json } => cmd_decode_call(&calldata, &abi, json),
    }
}

// ─── Command implementations ─────────────────────────────────────────────────

fn load_registry(path: &Path) -> Result<InterfaceRegistry> {
    let abi_json = std::fs::read_to_string(path)
        .with_context(|| format!("read ABI file '{}'", path.display()))?;
    let registry = InterfaceRegistry::from_json(&abi_json)
        .with_context(|| format!("invalid interface description '{}'", path.display()))?;
    info!(
        functions = registry.function_count(),
        events = registry.event_count(),
        "loaded interface"
    );
    Ok(registry)
}

async fn cmd_run(config: AppConfig) -> Result<()> {
    let input = input::read_hashes(&config.transactions, config.method_filter.as_deref())?;
    info!(
        rows = input.rows,
        matched = input.matched,
        distinct = input.hashes.len(),
        filter = config.method_filter.as_deref().unwrap_or("<none>"),
        "loaded transactions"
    );

    let registry = Arc::new(load_registry(&config.abi)?);

    let transport = HttpRpcClient::new(
        config.rpc_url.clone(),
        HttpClientConfig {
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        },
    )
    .context("create HTTP client")?;
    let client = Arc::new(EvmRpcClient::new(Arc::new(transport)));
    info!(url = %client.url(), "using RPC endpoint");

    let mode = config.pipeline.mode.clone();
    let pipeline = Pipeline::new(client, registry, config.pipeline.clone())
        .context("invalid pipeline configuration")?
        .with_progress(|done: usize, total: usize| debug!(done, total, "progress"));

    let report = pipeline.run(input.hashes).await;

    let run_ts = chrono::Utc::now().timestamp();
    let files = output::write_all(&report, &config.results_dir, run_ts)?;

    println!();
    output::print_summary(&report.summary(), &mode);
    println!("Results saved to {}", files.results_csv.display());
    Ok(())
}

fn cmd_decode_call(calldata: &str, abi_path: &str, as_json: bool) -> Result<()> {
    let registry = load_registry(Path::new(abi_path))?;

    let bytes = hex::decode(calldata.strip_prefix("0x").unwrap_or(calldata))
        .context("invalid calldata hex")?;

    let decoded = decode_call(&bytes, &registry)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
    } else {
        println!("Function:  {}", decoded.function_name);
        println!("Signature: {}", decoded.signature);
        println!("Selector:  {}", decoded.selector_hex());
        println!("Inputs:");
        for (name, val) in &decoded.params {
            println!("  {}: {}", name, val);
        }
    }
    Ok(())
}
