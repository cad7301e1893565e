use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One reference/hypothesis pair keyed by utterance id. `hypothesis` is
/// `None` when the hypothesis file had no entry for the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtterancePair {
    pub id: String,
    pub reference: String,
    pub hypothesis: Option<String>,
}

/// Parse a keyed transcript file: one `UTTERANCE-ID TEXT` entry per line.
///
/// Blank lines are skipped. Text may be empty (a recognizer can emit
/// nothing for an utterance); duplicate ids are rejected.
pub fn parse_transcript_file(path: &Path) -> anyhow::Result<BTreeMap<String, String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcript file {}", path.display()))?;
    let mut map = BTreeMap::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut it = line.split_whitespace();
        let id = it
            .next()
            .ok_or_else(|| anyhow::anyhow!("Invalid transcript line {}: empty", lineno + 1))?
            .to_string();
        let rest = it.collect::<Vec<_>>().join(" ");
        if map.insert(id.clone(), rest).is_some() {
            anyhow::bail!(
                "Duplicate utterance id {} at line {} in {}",
                id,
                lineno + 1,
                path.display()
            );
        }
    }
    Ok(map)
}

/// Load a plain-text file as one utterance keyed by the file stem.
pub fn read_plain_file(path: &Path) -> anyhow::Result<(String, String)> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid filename: {}", path.display()))?
        .to_string();
    Ok((id, text))
}

/// Join reference and hypothesis maps on utterance id. The reference side
/// drives; returns the pairs plus any hypothesis ids with no reference.
pub fn join_pairs(
    references: BTreeMap<String, String>,
    mut hypotheses: BTreeMap<String, String>,
) -> (Vec<UtterancePair>, Vec<String>) {
    let mut pairs = Vec::with_capacity(references.len());
    for (id, reference) in references {
        let hypothesis = hypotheses.remove(&id);
        pairs.push(UtterancePair {
            id,
            reference,
            hypothesis,
        });
    }
    let unmatched = hypotheses.into_keys().collect();
    (pairs, unmatched)
}

pub fn write_pairs_jsonl(path: &Path, pairs: &[UtterancePair]) -> anyhow::Result<()> {
    let mut out = String::new();
    for p in pairs {
        out.push_str(&serde_json::to_string(p)?);
        out.push('\n');
    }
    fs::write(path, out).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn hyp_path_for_ref(ref_path: &Path) -> Option<PathBuf> {
    let name = ref_path.file_name()?.to_str()?;
    let stem = name.strip_suffix(".ref.trans.txt")?;
    Some(ref_path.with_file_name(format!("{stem}.hyp.trans.txt")))
}

/// Recursively find `*.ref.trans.txt` files and their `*.hyp.trans.txt`
/// siblings under `root`.
pub fn discover_dataset(root: &Path) -> anyhow::Result<Vec<(PathBuf, PathBuf)>> {
    let mut found = Vec::new();
    for ent in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !ent.file_type().is_file() {
            continue;
        }
        let ref_path = ent.path();
        let Some(hyp_path) = hyp_path_for_ref(ref_path) else {
            continue;
        };
        if !hyp_path.exists() {
            anyhow::bail!(
                "Missing hypothesis transcript for {} (expected {})",
                ref_path.display(),
                hyp_path.display()
            );
        }
        found.push((ref_path.to_path_buf(), hyp_path));
    }
    if found.is_empty() {
        anyhow::bail!("No *.ref.trans.txt files found under {}", root.display());
    }
    found.sort();
    Ok(found)
}
