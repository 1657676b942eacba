//! Transaction-hash input from a CSV export.
//!
//! Only what block-explorer exports need: a header row, comma separators,
//! double-quoted fields with `""` escapes. Quoted fields may not span lines.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};

pub const HASH_COLUMN: &str = "Transaction Hash";
pub const METHOD_COLUMN: &str = "Method";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashInput {
    /// Data rows in the file
    pub rows: usize,
    /// Rows left after the method filter
    pub matched: usize,
    /// Distinct hashes in first-seen order
    pub hashes: Vec<String>,
}

pub fn read_hashes(path: &Path, method_filter: Option<&str>) -> Result<HashInput> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read transactions CSV '{}'", path.display()))?;
    parse_hashes(&text, method_filter).with_context(|| format!("parse '{}'", path.display()))
}

pub fn parse_hashes(text: &str, method_filter: Option<&str>) -> Result<HashInput> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = match lines.next() {
        Some(h) => split_record(h.trim_start_matches('\u{feff}'))?,
        None => bail!("CSV is empty"),
    };

    let column = |name: &str| header.iter().position(|h| h.trim() == name);
    let Some(hash_idx) = column(HASH_COLUMN) else {
        bail!("CSV has no '{HASH_COLUMN}' column");
    };
    let method_idx = match method_filter {
        Some(_) => match column(METHOD_COLUMN) {
            Some(i) => Some(i),
            None => bail!("CSV has no '{METHOD_COLUMN}' column"),
        },
        None => None,
    };

    let mut rows = 0;
    let mut matched = 0;
    let mut seen = HashSet::new();
    let mut hashes = Vec::new();
    for (n, line) in lines.enumerate() {
        rows += 1;
        let record = split_record(line).with_context(|| format!("row {}", n + 2))?;
        if let (Some(filter), Some(i)) = (method_filter, method_idx) {
            if record.get(i).map(|m| m.trim()) != Some(filter) {
                continue;
            }
        }
        matched += 1;
        let Some(hash) = record.get(hash_idx).map(|h| h.trim()).filter(|h| !h.is_empty()) else {
            continue;
        };
        if seen.insert(hash.to_string()) {
            hashes.push(hash.to_string());
        }
    }

    Ok(HashInput { rows, matched, hashes })
}

fn split_record(line: &str) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.trim_end_matches('\r').chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            ('"', true) => quoted = false,
            ('"', false) if field.is_empty() => quoted = true,
            (',', false) => fields.push(std::mem::take(&mut field)),
            (c, _) => field.push(c),
        }
    }
    if quoted {
        bail!("unterminated quoted field");
    }
    fields.push(field);
    Ok(fields)
}
