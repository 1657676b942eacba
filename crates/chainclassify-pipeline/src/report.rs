//! Aggregated run results and the analytics derived from them.

use std::collections::HashMap;

use serde::Serialize;

use crate::result::ClassificationResult;

/// One result per transaction hash.
///
/// Inserting a hash that is already present replaces the earlier result.
/// Iteration order is unspecified; use [`Report::sorted_by_timestamp`] when
/// time order matters.
#[derive(Debug, Clone, Default)]
pub struct Report {
    entries: HashMap<String, ClassificationResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub genesis_transitions: usize,
    pub mints: usize,
}

/// A point on a cumulative count series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub timestamp: u64,
    pub cumulative: usize,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `result` under its hash, returning the result it replaced.
    pub fn insert(&mut self, result: ClassificationResult) -> Option<ClassificationResult> {
        self.entries.insert(result.tx_hash.clone(), result)
    }

    pub fn get(&self, hash: &str) -> Option<&ClassificationResult> {
        self.entries.get(hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassificationResult> {
        self.entries.values()
    }

    pub fn summary(&self) -> ReportSummary {
        self.iter().fold(ReportSummary::default(), |mut s, r| {
            s.total += 1;
            if r.success {
                s.successful += 1;
            } else {
                s.failed += 1;
            }
            s.genesis_transitions += r.is_genesis() as usize;
            s.mints += r.is_mint() as usize;
            s
        })
    }

    /// All entries, timestamped ones ascending first, then those without a
    /// timestamp. Ties break on hash so the order is deterministic.
    pub fn sorted_by_timestamp(&self) -> Vec<&ClassificationResult> {
        let mut out: Vec<_> = self.iter().collect();
        out.sort_by(|a, b| {
            let key = |r: &ClassificationResult| (r.timestamp.is_none(), r.timestamp);
            key(a).cmp(&key(b)).then_with(|| a.tx_hash.cmp(&b.tx_hash))
        });
        out
    }

    /// Cumulative count of genesis transitions over time.
    pub fn genesis_timeline(&self) -> Vec<TimelinePoint> {
        self.timeline(ClassificationResult::is_genesis)
    }

    /// Cumulative count of mint transactions over time.
    pub fn mint_timeline(&self) -> Vec<TimelinePoint> {
        self.timeline(ClassificationResult::is_mint)
    }

    fn timeline(&self, pred: impl Fn(&ClassificationResult) -> bool) -> Vec<TimelinePoint> {
        let mut cumulative = 0;
        self.sorted_by_timestamp()
            .into_iter()
            .filter(|r| pred(*r))
            .filter_map(|r| {
                let timestamp = r.timestamp?;
                cumulative += 1;
                Some(TimelinePoint { timestamp, cumulative })
            })
            .collect()
    }

    /// How often each value of `param` occurs in successful calls to
    /// `function`, most frequent first (ties by value).
    pub fn param_frequency(&self, function: &str, param: &str) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for r in self.iter().filter(|r| r.success && r.function_name.as_deref() == Some(function)) {
            if let Some(v) = r.params.as_ref().and_then(|p| p.get(param)) {
                *counts.entry(v.to_string()).or_default() += 1;
            }
        }
        let mut out: Vec<_> = counts.into_iter().collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out
    }
}

impl FromIterator<ClassificationResult> for Report {
    fn from_iter<I: IntoIterator<Item = ClassificationResult>>(iter: I) -> Self {
        let mut report = Report::new();
        for r in iter {
            report.insert(r);
        }
        report
    }
}
