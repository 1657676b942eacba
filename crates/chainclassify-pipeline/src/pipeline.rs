//! `Pipeline` — bounded-concurrency fetch, classify and aggregate.

use std::sync::Arc;
use std::time::Duration;

use chainclassify_core::TransactionContext;
use chainclassify_evm::InterfaceRegistry;
use chainclassify_rpc::{BlockchainClient, TransportError};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::classifier::{classifier_for, Mode};
use crate::config::{ConfigError, PipelineConfig};
use crate::error::ClassifyError;
use crate::report::Report;
use crate::result::ClassificationResult;

/// Called once per completed item with `(completed, total)`.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, completed: usize, total: usize);
}

/// Blanket impl so closures can be used as progress callbacks.
impl<F: Fn(usize, usize) + Send + Sync> ProgressCallback for F {
    fn on_progress(&self, completed: usize, total: usize) {
        self(completed, total)
    }
}

/// Runs every submitted hash to exactly one [`ClassificationResult`].
///
/// The registry, configuration and client are shared read-only by all
/// in-flight items; only the [`Report`] is written, and only from the
/// collecting loop.
pub struct Pipeline {
    client: Arc<dyn BlockchainClient>,
    registry: Arc<InterfaceRegistry>,
    config: Arc<PipelineConfig>,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl Pipeline {
    pub fn new(
        client: Arc<dyn BlockchainClient>,
        registry: Arc<InterfaceRegistry>,
        config: PipelineConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            client,
            registry,
            config: Arc::new(config),
            progress: None,
        })
    }

    pub fn with_progress(mut self, cb: impl ProgressCallback + 'static) -> Self {
        self.progress = Some(Arc::new(cb));
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process all `hashes` with at most `workers` items in flight.
    ///
    /// Completion order is arbitrary. A hash submitted twice yields one
    /// report entry holding whichever result finished last.
    pub async fn run<I>(&self, hashes: I) -> Report
    where
        I: IntoIterator<Item = String>,
    {
        let hashes: Vec<String> = hashes.into_iter().collect();
        let total = hashes.len();
        info!(
            total,
            workers = self.config.workers,
            mode = %self.config.mode,
            "pipeline started"
        );

        let mut results = stream::iter(hashes)
            .map(|hash| self.process(hash))
            .buffer_unordered(self.config.workers);

        let mut report = Report::new();
        let mut completed = 0usize;
        while let Some(result) = results.next().await {
            completed += 1;
            debug!(completed, total, hash = %result.tx_hash, success = result.success, "item complete");
            if let Some(cb) = &self.progress {
                cb.on_progress(completed, total);
            }
            report.insert(result);
        }

        let summary = report.summary();
        info!(
            total = summary.total,
            successful = summary.successful,
            failed = summary.failed,
            "pipeline complete"
        );
        report
    }

    /// Fetch, classify and wrap any failure for a single hash.
    pub async fn process(&self, hash: String) -> ClassificationResult {
        let mode = match self.config.mode.parse::<Mode>() {
            Ok(mode) => mode,
            Err(e) => return self.fail(hash, None, e),
        };

        let limit = Duration::from_secs(self.config.item_timeout_secs);
        let mut timestamp = None;
        let fetched = tokio::time::timeout(limit, self.fetch_context(&hash, mode, &mut timestamp)).await;

        let ctx = match fetched {
            Ok(Ok(ctx)) => ctx,
            Ok(Err(e)) => return self.fail(hash, timestamp, e),
            Err(_) => {
                let e = ClassifyError::Network(TransportError::Timeout {
                    ms: limit.as_millis() as u64,
                });
                return self.fail(hash, timestamp, e);
            }
        };

        let result = classifier_for(mode).classify(&ctx, &self.registry, &self.config.classifier);
        if let Some(err) = &result.error {
            warn!(hash = %hash, kind = %err.kind, error = %err.message, "classification failed");
        }
        result
    }

    /// Network phase: transaction, block timestamp, target, receipt.
    ///
    /// `timestamp` is filled in as soon as it is known, so failures after
    /// the block fetch still report it.
    async fn fetch_context(
        &self,
        hash: &str,
        mode: Mode,
        timestamp: &mut Option<u64>,
    ) -> Result<TransactionContext, ClassifyError> {
        let tx = self
            .client
            .get_transaction(hash)
            .await?
            .ok_or_else(|| ClassifyError::NotFound { hash: hash.to_string() })?;

        let block_number = tx
            .block_number
            .ok_or_else(|| ClassifyError::PendingTransaction { hash: hash.to_string() })?;

        let block = self
            .client
            .get_block(block_number)
            .await?
            .ok_or(ClassifyError::MissingTimestamp { block: block_number })?;
        *timestamp = Some(block.timestamp);

        let target = self
            .config
            .target_address
            .or(tx.to)
            .ok_or_else(|| ClassifyError::AddressUnavailable { hash: hash.to_string() })?;

        let mut ctx = TransactionContext::new(hash, tx.input, target).with_timestamp(block.timestamp);

        if mode.needs_receipt() {
            let receipt = self
                .client
                .get_transaction_receipt(hash)
                .await?
                .ok_or_else(|| ClassifyError::NotFound { hash: hash.to_string() })?;
            ctx = ctx.with_logs(receipt.logs);
        }
        Ok(ctx)
    }

    fn fail(&self, hash: String, timestamp: Option<u64>, err: ClassifyError) -> ClassificationResult {
        warn!(hash = %hash, kind = %err.kind(), error = %err, "item failed");
        ClassificationResult::failed(hash, self.config.mode.as_str(), timestamp, &err)
    }
}
