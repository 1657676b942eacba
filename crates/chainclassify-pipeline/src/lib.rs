//! chainclassify-pipeline — classify a batch of transactions concurrently.
//!
//! A [`Pipeline`] fans hashes out over a bounded pool of workers. Each worker
//! fetches the transaction context through a [`BlockchainClient`], hands it
//! to the [`Classifier`] for the configured [`Mode`], and returns exactly one
//! [`ClassificationResult`]. Results are merged into a [`Report`] keyed by
//! hash; per-item failures never abort sibling items.
//!
//! [`BlockchainClient`]: chainclassify_rpc::BlockchainClient

pub mod classifier;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod result;

pub use classifier::{classifier_for, classify, CivicClassifier, Classifier, Mode, PrivadoClassifier};
pub use config::{ClassifierParams, ConfigError, PipelineConfig};
pub use error::{ClassifyError, ItemFailure};
pub use pipeline::{Pipeline, ProgressCallback};
pub use report::{Report, ReportSummary, TimelinePoint};
pub use result::ClassificationResult;
