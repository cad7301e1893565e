mod dataset;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use asr_metrics::{
    operation_counts, FoldingNormalizer, MetricError, MetricReport, Scorer, Transcript,
};
use dataset::UtterancePair;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Reference transcript file: `UTTERANCE-ID TEXT` lines, or plain text with --plain.
    #[arg(long, requires = "hypothesis", conflicts_with = "dataset")]
    reference: Option<PathBuf>,

    /// Hypothesis transcript file in the same format as --reference.
    #[arg(long, requires = "reference", conflicts_with = "dataset")]
    hypothesis: Option<PathBuf>,

    /// Directory scanned recursively for `*.ref.trans.txt` / `*.hyp.trans.txt` pairs.
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Treat --reference/--hypothesis as plain text, one utterance per file.
    #[arg(long)]
    plain: bool,

    /// Output directory for results + summary (default: target/asr_score).
    #[arg(long, default_value = "target/asr_score")]
    out_dir: PathBuf,

    /// Lowercase and strip punctuation on both sides before scoring.
    #[arg(long)]
    fold: bool,

    /// Optional aggregate WER threshold for pass/fail.
    #[arg(long)]
    wer_threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
struct UtteranceScore {
    id: String,
    reference: String,
    hypothesis: String,
    status: String, // ok | empty_ref | empty_hyp | missing_hyp
    edits: usize,
    ref_words: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    wer: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<MetricReport>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct Summary {
    total: usize,
    ok: usize,
    failures: usize,
    empty_ref: usize,
    empty_hyp: usize,
    missing_hyp: usize,
    aggregate_wer: f64,
    sum_edits: usize,
    sum_ref_words: usize,
    generated_at: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create out dir {}", args.out_dir.display()))?;

    let (pairs, unmatched) = collect_pairs(&args)?;
    if !unmatched.is_empty() {
        eprintln!(
            "[asr_score] warning: {} hypothesis ids without a reference entry: {}",
            unmatched.len(),
            unmatched.join(",")
        );
    }
    let pairs_path = args.out_dir.join("pairs.jsonl");
    dataset::write_pairs_jsonl(&pairs_path, &pairs)?;
    eprintln!(
        "[asr_score] pairs: {} entries -> {}",
        pairs.len(),
        pairs_path.display()
    );

    let folding = FoldingNormalizer;
    let scorer = if args.fold {
        Scorer {
            reference_normalizer: &folding,
            hypothesis_normalizer: &folding,
        }
    } else {
        Scorer::default()
    };

    let results: Vec<UtteranceScore> = pairs.iter().map(|p| score_pair(&scorer, p)).collect();

    let results_path = args.out_dir.join("results.jsonl");
    write_results_jsonl(&results_path, &results)?;

    let summary = summarize(&results);
    let summary_path = args.out_dir.join("summary.json");
    std::fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;

    print_summary_table(&summary, &results, args.wer_threshold);

    if let Some(th) = args.wer_threshold {
        if summary.aggregate_wer > th {
            anyhow::bail!(
                "aggregate WER {:.4} exceeds threshold {:.4}",
                summary.aggregate_wer,
                th
            );
        }
    }

    Ok(())
}

fn collect_pairs(args: &Args) -> anyhow::Result<(Vec<UtterancePair>, Vec<String>)> {
    if let Some(root) = &args.dataset {
        if args.plain {
            anyhow::bail!("--plain only applies to --reference/--hypothesis files");
        }
        let mut pairs = Vec::new();
        let mut unmatched = Vec::new();
        let found = dataset::discover_dataset(root)?;
        eprintln!(
            "[asr_score] dataset: {} transcript pairs under {}",
            found.len(),
            root.display()
        );
        for (ref_path, hyp_path) in found {
            let refs = dataset::parse_transcript_file(&ref_path)?;
            let hyps = dataset::parse_transcript_file(&hyp_path)?;
            let (mut file_pairs, mut file_unmatched) = dataset::join_pairs(refs, hyps);
            pairs.append(&mut file_pairs);
            unmatched.append(&mut file_unmatched);
        }
        pairs.sort_by(|a, b| a.id.cmp(&b.id));
        return Ok((pairs, unmatched));
    }

    let (reference, hypothesis) = match (&args.reference, &args.hypothesis) {
        (Some(r), Some(h)) => (r, h),
        _ => anyhow::bail!("Provide --reference and --hypothesis, or --dataset"),
    };

    if args.plain {
        let (id, ref_text) = dataset::read_plain_file(reference)?;
        let (_, hyp_text) = dataset::read_plain_file(hypothesis)?;
        return Ok((
            vec![UtterancePair {
                id,
                reference: ref_text,
                hypothesis: Some(hyp_text),
            }],
            Vec::new(),
        ));
    }

    let refs = dataset::parse_transcript_file(reference)?;
    let hyps = dataset::parse_transcript_file(hypothesis)?;
    let (pairs, unmatched) = dataset::join_pairs(refs, hyps);
    Ok((pairs, unmatched))
}

fn status_for(err: MetricError) -> &'static str {
    match err {
        MetricError::EmptyReference | MetricError::EmptyPair => "empty_ref",
        MetricError::EmptyHypothesis => "empty_hyp",
    }
}

fn score_pair(scorer: &Scorer, pair: &UtterancePair) -> UtteranceScore {
    let Some(hyp_text) = pair.hypothesis.as_deref() else {
        return UtteranceScore {
            id: pair.id.clone(),
            reference: pair.reference.clone(),
            hypothesis: String::new(),
            status: "missing_hyp".to_string(),
            edits: 0,
            ref_words: 0,
            wer: None,
            metrics: None,
            error: Some("no hypothesis entry for this utterance id".to_string()),
        };
    };

    let reference = Transcript::from(pair.reference.as_str());
    let hypothesis = Transcript::from(hyp_text);
    let ref_tokens = scorer.reference_normalizer.tokens(&reference);
    let hyp_tokens = scorer.hypothesis_normalizer.tokens(&hypothesis);
    let counts = operation_counts(&ref_tokens, &hyp_tokens);
    let wer = if ref_tokens.is_empty() {
        None
    } else {
        Some(counts.edits() as f64 / ref_tokens.len() as f64)
    };

    let (status, metrics, error) = match scorer.report(&reference, &hypothesis) {
        Ok(report) => ("ok", Some(report), None),
        Err(e) => (status_for(e), None, Some(e.to_string())),
    };

    UtteranceScore {
        id: pair.id.clone(),
        reference: pair.reference.clone(),
        hypothesis: hyp_text.to_string(),
        status: status.to_string(),
        edits: counts.edits(),
        ref_words: ref_tokens.len(),
        wer,
        metrics,
        error,
    }
}

fn write_results_jsonl(path: &Path, results: &[UtteranceScore]) -> anyhow::Result<()> {
    let mut out = String::new();
    for r in results {
        out.push_str(&serde_json::to_string(r)?);
        out.push('\n');
    }
    std::fs::write(path, out).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn summarize(results: &[UtteranceScore]) -> Summary {
    let total = results.len();
    let mut by_status: BTreeMap<&str, usize> = BTreeMap::new();
    let mut sum_edits = 0usize;
    let mut sum_ref_words = 0usize;

    for r in results {
        *by_status.entry(r.status.as_str()).or_default() += 1;
        sum_edits += r.edits;
        sum_ref_words += r.ref_words;
    }
    let ok = by_status.get("ok").copied().unwrap_or(0);
    let aggregate_wer = if sum_ref_words == 0 {
        0.0
    } else {
        sum_edits as f64 / sum_ref_words as f64
    };

    Summary {
        total,
        ok,
        failures: total - ok,
        empty_ref: by_status.get("empty_ref").copied().unwrap_or(0),
        empty_hyp: by_status.get("empty_hyp").copied().unwrap_or(0),
        missing_hyp: by_status.get("missing_hyp").copied().unwrap_or(0),
        aggregate_wer,
        sum_edits,
        sum_ref_words,
        generated_at: Local::now().to_rfc3339(),
    }
}

fn print_summary_table(summary: &Summary, results: &[UtteranceScore], threshold: Option<f64>) {
    eprintln!();
    eprintln!("=== ASR Score Summary ===");
    eprintln!("total       : {}", summary.total);
    eprintln!("ok          : {}", summary.ok);
    eprintln!("failures    : {}", summary.failures);
    eprintln!("empty_ref   : {}", summary.empty_ref);
    eprintln!("empty_hyp   : {}", summary.empty_hyp);
    eprintln!("missing_hyp : {}", summary.missing_hyp);
    eprintln!(
        "agg WER     : {:.4} (edits={} / ref_words={})",
        summary.aggregate_wer, summary.sum_edits, summary.sum_ref_words
    );
    if let Some(t) = threshold {
        eprintln!("threshold   : {:.4}", t);
    }

    // Worst 10 by WER, skipping utterances with no defined WER.
    let mut worst = results
        .iter()
        .filter_map(|r| r.wer.map(|w| (r, w)))
        .collect::<Vec<_>>();
    worst.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    eprintln!();
    eprintln!("worst_wer:");
    for (r, w) in worst.into_iter().take(10) {
        eprintln!("  {:>8.4}  {}  ({})", w, r.id, r.status);
    }
}
