//! Result files and the console summary.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chainclassify_pipeline::{ClassificationResult, Report, ReportSummary, TimelinePoint};
use chrono::DateTime;

const RESULT_COLUMNS: [&str; 16] = [
    "tx_hash",
    "timestamp",
    "datetime",
    "mode",
    "function_name",
    "params",
    "is_genesis_transition",
    "is_mint",
    "recipient",
    "token_id",
    "mint_count",
    "note",
    "success",
    "error_kind",
    "error_message",
    "identity_id",
];

/// Paths of everything one run wrote.
#[derive(Debug, Clone)]
pub struct WrittenFiles {
    pub results_csv: PathBuf,
    pub results_json: PathBuf,
    pub genesis_timeline: PathBuf,
    pub mint_timeline: PathBuf,
    pub identity_frequency: PathBuf,
}

/// Write all result files into `dir`, each name prefixed with `run_ts`.
pub fn write_all(report: &Report, dir: &Path, run_ts: i64) -> Result<WrittenFiles> {
    std::fs::create_dir_all(dir).with_context(|| format!("create results dir '{}'", dir.display()))?;

    let files = WrittenFiles {
        results_csv: dir.join(format!("{run_ts}_analytics_results.csv")),
        results_json: dir.join(format!("{run_ts}_analytics_results.json")),
        genesis_timeline: dir.join(format!("{run_ts}_genesis_timeline.csv")),
        mint_timeline: dir.join(format!("{run_ts}_mint_timeline.csv")),
        identity_frequency: dir.join(format!("{run_ts}_identity_frequency.csv")),
    };
    let sorted = report.sorted_by_timestamp();

    write_file(&files.results_csv, &results_csv(&sorted)?)?;
    write_file(&files.results_json, &serde_json::to_string_pretty(&sorted)?)?;
    write_file(&files.genesis_timeline, &timeline_csv(&report.genesis_timeline()))?;
    write_file(&files.mint_timeline, &timeline_csv(&report.mint_timeline()))?;
    write_file(
        &files.identity_frequency,
        &frequency_csv(&report.param_frequency("transitState", "id")),
    )?;
    Ok(files)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("write '{}'", path.display()))?;
    tracing::info!(path = %path.display(), "wrote results");
    Ok(())
}

pub fn results_csv(results: &[&ClassificationResult]) -> Result<String> {
    let mut out = RESULT_COLUMNS.join(",");
    out.push('\n');
    for r in results {
        let params = match &r.params {
            Some(p) => serde_json::to_string(p)?,
            None => String::new(),
        };
        let identity = r.params.as_ref().and_then(|p| p.get("id")).map(|v| v.to_string());
        let row = [
            r.tx_hash.clone(),
            opt(r.timestamp),
            r.timestamp.and_then(iso_datetime).unwrap_or_default(),
            r.mode.clone(),
            r.function_name.clone().unwrap_or_default(),
            params,
            opt(r.is_genesis_transition),
            opt(r.is_mint),
            r.recipient.clone().unwrap_or_default(),
            opt(r.token_id),
            opt(r.mint_count),
            r.note.clone().unwrap_or_default(),
            r.success.to_string(),
            opt(r.error.as_ref().map(|e| e.kind)),
            r.error.as_ref().map(|e| e.message.clone()).unwrap_or_default(),
            identity.unwrap_or_default(),
        ];
        let escaped: Vec<_> = row.iter().map(|f| escape(f)).collect();
        out.push_str(&escaped.join(","));
        out.push('\n');
    }
    Ok(out)
}

pub fn timeline_csv(points: &[TimelinePoint]) -> String {
    let mut out = String::from("timestamp,datetime,cumulative\n");
    for p in points {
        let _ = writeln!(
            out,
            "{},{},{}",
            p.timestamp,
            iso_datetime(p.timestamp).unwrap_or_default(),
            p.cumulative
        );
    }
    out
}

/// Identity ids by how many successful state transitions they made.
pub fn frequency_csv(counts: &[(String, usize)]) -> String {
    let mut out = String::from("identity_id,count\n");
    for (value, count) in counts {
        let _ = writeln!(out, "{},{count}", escape(value));
    }
    out
}

pub fn print_summary(summary: &ReportSummary, mode: &str) {
    println!("Processed {} transactions.", summary.total);
    println!("Successfully classified: {}", summary.successful);
    println!("Failed:                  {}", summary.failed);
    match mode {
        "civic" => println!("Mint transactions:       {}", summary.mints),
        _ => println!("Genesis transitions:     {}", summary.genesis_transitions),
    }
}

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

fn iso_datetime(ts: u64) -> Option<String> {
    let secs = i64::try_from(ts).ok()?;
    DateTime::from_timestamp(secs, 0).map(|dt| dt.to_rfc3339())
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
