//! Word error rate and related transcript accuracy ratios.
//!
//! Every ratio is plain arithmetic over the operation counts of one
//! alignment; the error cases are the denominators that can be empty.

use crate::align::{char_operation_counts, operation_counts, OperationCounts};
use crate::normalize::{Normalizer, Transcript, DEFAULT_NORMALIZER};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors for metric ratios whose denominator is empty.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricError {
    #[error("reference transcript is empty")]
    EmptyReference,
    #[error("hypothesis transcript is empty")]
    EmptyHypothesis,
    #[error("reference and hypothesis are both empty")]
    EmptyPair,
}

/// All six ratios for one reference/hypothesis pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    pub wer: f64,
    pub wrr: f64,
    pub mer: f64,
    pub wip: f64,
    pub wil: f64,
    pub wcr: f64,
}

impl MetricReport {
    /// Fixed presentation order: wer, wrr, mer, wip, wil, wcr.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.wer, self.wrr, self.mer, self.wip, self.wil, self.wcr]
    }

    /// Map keyed by lowercase metric abbreviation.
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("wer", self.wer),
            ("wrr", self.wrr),
            ("mer", self.mer),
            ("wip", self.wip),
            ("wil", self.wil),
            ("wcr", self.wcr),
        ])
    }
}

/// Computes metrics over a reference/hypothesis pair.
///
/// Holds the normalization applied to each side. `Scorer::default()` uses
/// [`crate::WordNormalizer`] for both; callers may inject a different
/// [`Normalizer`] per side.
#[derive(Clone, Copy)]
pub struct Scorer<'a> {
    pub reference_normalizer: &'a dyn Normalizer,
    pub hypothesis_normalizer: &'a dyn Normalizer,
}

impl Default for Scorer<'static> {
    fn default() -> Self {
        Scorer {
            reference_normalizer: &DEFAULT_NORMALIZER,
            hypothesis_normalizer: &DEFAULT_NORMALIZER,
        }
    }
}

impl<'a> Scorer<'a> {
    /// One word-level alignment pass; returns counts plus both token
    /// sequence lengths.
    fn word_counts(
        &self,
        reference: &Transcript,
        hypothesis: &Transcript,
    ) -> (OperationCounts, usize, usize) {
        let ref_tokens = self.reference_normalizer.tokens(reference);
        let hyp_tokens = self.hypothesis_normalizer.tokens(hypothesis);
        let counts = operation_counts(&ref_tokens, &hyp_tokens);
        (counts, ref_tokens.len(), hyp_tokens.len())
    }

    /// Word error rate: (S + D + I) / reference length.
    pub fn wer(&self, reference: &Transcript, hypothesis: &Transcript) -> Result<f64, MetricError> {
        let (counts, ref_len, _) = self.word_counts(reference, hypothesis);
        ratio_wer(&counts, ref_len)
    }

    /// Word recognition rate: 1 - WER.
    pub fn wrr(&self, reference: &Transcript, hypothesis: &Transcript) -> Result<f64, MetricError> {
        Ok(1.0 - self.wer(reference, hypothesis)?)
    }

    /// Match error rate: (S + D + I) / (H + S + D + I).
    pub fn mer(&self, reference: &Transcript, hypothesis: &Transcript) -> Result<f64, MetricError> {
        let (counts, _, _) = self.word_counts(reference, hypothesis);
        ratio_mer(&counts)
    }

    /// Word information preserved.
    ///
    /// Computed with the same ratio as [`Scorer::mer`]; kept that way so
    /// scores line up with reports produced by the scoring pipeline this
    /// library replaces.
    pub fn wip(&self, reference: &Transcript, hypothesis: &Transcript) -> Result<f64, MetricError> {
        self.mer(reference, hypothesis)
    }

    /// Word information lost: 1 - (H/N) * (H / (H + S + I)).
    pub fn wil(&self, reference: &Transcript, hypothesis: &Transcript) -> Result<f64, MetricError> {
        let (counts, ref_len, _) = self.word_counts(reference, hypothesis);
        ratio_wil(&counts, ref_len)
    }

    /// Word correctly recognized: (hyp length - D - S) / (H + S + D).
    ///
    /// Scored over the raw character sequences rather than word tokens,
    /// matching the pipeline this library replaces. Can leave [0, 1].
    pub fn wcr(&self, reference: &Transcript, hypothesis: &Transcript) -> Result<f64, MetricError> {
        let ref_text = reference.as_text();
        let hyp_text = hypothesis.as_text();
        let counts = char_operation_counts(&ref_text, &hyp_text);
        ratio_wcr(&counts, hyp_text.chars().count())
    }

    /// All six metrics from one word-level alignment pass (plus the
    /// character-level pass WCR requires).
    pub fn report(
        &self,
        reference: &Transcript,
        hypothesis: &Transcript,
    ) -> Result<MetricReport, MetricError> {
        let (counts, ref_len, hyp_len) = self.word_counts(reference, hypothesis);
        log::debug!(
            "alignment: hits={} sub={} del={} ins={} (ref_words={} hyp_words={})",
            counts.hits,
            counts.substitutions,
            counts.deletions,
            counts.insertions,
            ref_len,
            hyp_len
        );
        let wer = ratio_wer(&counts, ref_len)?;
        let mer = ratio_mer(&counts)?;
        let wil = ratio_wil(&counts, ref_len)?;

        let ref_text = reference.as_text();
        let hyp_text = hypothesis.as_text();
        let char_counts = char_operation_counts(&ref_text, &hyp_text);
        let wcr = ratio_wcr(&char_counts, hyp_text.chars().count())?;

        Ok(MetricReport {
            wer,
            wrr: 1.0 - wer,
            mer,
            wip: mer,
            wil,
            wcr,
        })
    }

    /// The six metrics in fixed order: wer, wrr, mer, wip, wil, wcr.
    pub fn all_metrics(
        &self,
        reference: &Transcript,
        hypothesis: &Transcript,
    ) -> Result<Vec<f64>, MetricError> {
        Ok(self.report(reference, hypothesis)?.to_vec())
    }

    /// The six metrics keyed by lowercase abbreviation.
    pub fn all_metrics_map(
        &self,
        reference: &Transcript,
        hypothesis: &Transcript,
    ) -> Result<BTreeMap<&'static str, f64>, MetricError> {
        Ok(self.report(reference, hypothesis)?.to_map())
    }
}

fn ratio_wer(counts: &OperationCounts, ref_len: usize) -> Result<f64, MetricError> {
    if ref_len == 0 {
        return Err(MetricError::EmptyReference);
    }
    Ok(counts.edits() as f64 / ref_len as f64)
}

fn ratio_mer(counts: &OperationCounts) -> Result<f64, MetricError> {
    let total = counts.total();
    if total == 0 {
        return Err(MetricError::EmptyPair);
    }
    Ok(counts.edits() as f64 / total as f64)
}

fn ratio_wil(counts: &OperationCounts, ref_len: usize) -> Result<f64, MetricError> {
    if ref_len == 0 {
        return Err(MetricError::EmptyReference);
    }
    let aligned_hyp = counts.hits + counts.substitutions + counts.insertions;
    if aligned_hyp == 0 {
        return Err(MetricError::EmptyHypothesis);
    }
    let hits = counts.hits as f64;
    Ok(1.0 - (hits / ref_len as f64) * (hits / aligned_hyp as f64))
}

fn ratio_wcr(counts: &OperationCounts, hyp_chars: usize) -> Result<f64, MetricError> {
    let aligned_ref = counts.hits + counts.substitutions + counts.deletions;
    if aligned_ref == 0 {
        return Err(MetricError::EmptyReference);
    }
    Ok((hyp_chars as f64 - counts.deletions as f64 - counts.substitutions as f64)
        / aligned_ref as f64)
}

/// Word error rate with default normalization on both sides.
pub fn wer(
    reference: impl Into<Transcript>,
    hypothesis: impl Into<Transcript>,
) -> Result<f64, MetricError> {
    Scorer::default().wer(&reference.into(), &hypothesis.into())
}

/// Word recognition rate with default normalization on both sides.
pub fn wrr(
    reference: impl Into<Transcript>,
    hypothesis: impl Into<Transcript>,
) -> Result<f64, MetricError> {
    Scorer::default().wrr(&reference.into(), &hypothesis.into())
}

/// Match error rate with default normalization on both sides.
pub fn mer(
    reference: impl Into<Transcript>,
    hypothesis: impl Into<Transcript>,
) -> Result<f64, MetricError> {
    Scorer::default().mer(&reference.into(), &hypothesis.into())
}

/// Word information preserved with default normalization on both sides.
pub fn wip(
    reference: impl Into<Transcript>,
    hypothesis: impl Into<Transcript>,
) -> Result<f64, MetricError> {
    Scorer::default().wip(&reference.into(), &hypothesis.into())
}

/// Word information lost with default normalization on both sides.
pub fn wil(
    reference: impl Into<Transcript>,
    hypothesis: impl Into<Transcript>,
) -> Result<f64, MetricError> {
    Scorer::default().wil(&reference.into(), &hypothesis.into())
}

/// Word correctly recognized over raw character sequences.
pub fn wcr(
    reference: impl Into<Transcript>,
    hypothesis: impl Into<Transcript>,
) -> Result<f64, MetricError> {
    Scorer::default().wcr(&reference.into(), &hypothesis.into())
}

/// All six metrics in fixed order: wer, wrr, mer, wip, wil, wcr.
pub fn all_metrics(
    reference: impl Into<Transcript>,
    hypothesis: impl Into<Transcript>,
) -> Result<Vec<f64>, MetricError> {
    Scorer::default().all_metrics(&reference.into(), &hypothesis.into())
}

/// All six metrics keyed by lowercase abbreviation.
pub fn all_metrics_map(
    reference: impl Into<Transcript>,
    hypothesis: impl Into<Transcript>,
) -> Result<BTreeMap<&'static str, f64>, MetricError> {
    Scorer::default().all_metrics_map(&reference.into(), &hypothesis.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::FoldingNormalizer;

    #[test]
    fn test_wer_identical() {
        assert_eq!(wer("a b c", "a b c").unwrap(), 0.0);
        assert_eq!(wrr("a b c", "a b c").unwrap(), 1.0);
    }

    #[test]
    fn test_wer_insertion() {
        assert_eq!(wer("hello world", "hello there world").unwrap(), 0.5);
        assert_eq!(wrr("hello world", "hello there world").unwrap(), 0.5);
    }

    #[test]
    fn test_wer_not_symmetric() {
        let forward = wer("a b c", "a x c d").unwrap();
        let reverse = wer("a x c d", "a b c").unwrap();
        assert!((forward - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(reverse, 0.5);
        assert_ne!(forward, reverse);
    }

    #[test]
    fn test_empty_reference_fails() {
        assert_eq!(wer("", "anything"), Err(MetricError::EmptyReference));
        assert_eq!(wrr("", "anything"), Err(MetricError::EmptyReference));
        assert_eq!(wil("", "anything"), Err(MetricError::EmptyReference));
        assert_eq!(wcr("", "anything"), Err(MetricError::EmptyReference));
    }

    #[test]
    fn test_empty_pair_fails() {
        assert_eq!(mer("", ""), Err(MetricError::EmptyPair));
        assert_eq!(wip("", ""), Err(MetricError::EmptyPair));
    }

    #[test]
    fn test_empty_hypothesis() {
        // Every reference word is a deletion; WER is defined, WIL is not.
        assert_eq!(wer("a b", "").unwrap(), 1.0);
        assert_eq!(wil("a b", ""), Err(MetricError::EmptyHypothesis));
    }

    #[test]
    fn test_mer_and_wip_alias() {
        let m = mer("hello world", "hello there world").unwrap();
        let p = wip("hello world", "hello there world").unwrap();
        assert_eq!(m, p);
        assert!((m - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_wil_value() {
        // H=2, N=2, H+S+I=3 -> 1 - (2/2)*(2/3) = 1/3.
        let v = wil("hello world", "hello there world").unwrap();
        assert!((v - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_wcr_values() {
        assert_eq!(wcr("abc", "abc").unwrap(), 1.0);
        // chars: ref "ab", hyp "ad" -> S=1, D=0, H=1; (2 - 0 - 1) / 2.
        assert_eq!(wcr("ab", "ad").unwrap(), 0.5);
        // Insertions inflate the numerator past the denominator.
        assert!(wcr("ab", "ab extra").unwrap() > 1.0);
    }

    #[test]
    fn test_wcr_ignores_word_normalization() {
        // Same tokens, different raw spacing: word metrics agree, the
        // character-level ratio does not.
        assert_eq!(wer("a  b", "a b").unwrap(), 0.0);
        assert!(wcr("a  b", "a b").unwrap() < 1.0);
    }

    #[test]
    fn test_sentence_input() {
        let reference = Transcript::from(&["hello there", "big world"][..]);
        let hypothesis = Transcript::from("hello there big world");
        let scorer = Scorer::default();
        assert_eq!(scorer.wer(&reference, &hypothesis).unwrap(), 0.0);
    }

    #[test]
    fn test_normalizer_injection_per_side() {
        let scorer = Scorer {
            reference_normalizer: &FoldingNormalizer,
            hypothesis_normalizer: &FoldingNormalizer,
        };
        let reference = Transcript::from("Hello, World!");
        let hypothesis = Transcript::from("hello world");
        assert_eq!(scorer.wer(&reference, &hypothesis).unwrap(), 0.0);
        // The default scorer sees the punctuation.
        assert!(Scorer::default().wer(&reference, &hypothesis).unwrap() > 0.0);
    }

    #[test]
    fn test_report_errors_propagate() {
        assert_eq!(
            Scorer::default().report(&"".into(), &"x".into()),
            Err(MetricError::EmptyReference)
        );
        assert_eq!(
            Scorer::default().report(&"a b".into(), &"".into()),
            Err(MetricError::EmptyHypothesis)
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            MetricError::EmptyReference.to_string(),
            "reference transcript is empty"
        );
    }
}
