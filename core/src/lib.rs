//! Transcript accuracy metrics for speech recognition output.
//!
//! Compares a reference transcript against a recognizer hypothesis and
//! reports word error rate and related ratios, all derived from a
//! minimum-edit-distance alignment of the two word sequences.

pub mod align;
pub use align::{
    char_operation_counts, edit_ops, operation_counts, EditKind, EditOp, OperationCounts,
};

pub mod normalize;
pub use normalize::{FoldingNormalizer, Normalizer, Transcript, WordNormalizer, DEFAULT_NORMALIZER};

pub mod metrics;
pub use metrics::{
    all_metrics, all_metrics_map, mer, wcr, wer, wil, wip, wrr, MetricError, MetricReport, Scorer,
};
