//! Minimum-edit-distance alignment between two token sequences.
//!
//! Works over any `PartialEq` token type; the metric layer uses it for
//! word tokens and for raw character sequences.

/// Kind of a single-token edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Substitute,
    Delete,
    Insert,
}

/// One edit step, with the positions it touches in the source and
/// destination sequences. For a deletion `dest_pos` is the insertion
/// point in the destination; for an insertion `source_pos` is the gap in
/// the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOp {
    pub kind: EditKind,
    pub source_pos: usize,
    pub dest_pos: usize,
}

/// Operation totals from one alignment.
///
/// `hits + substitutions + deletions` equals the source length and
/// `hits + substitutions + insertions` equals the destination length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationCounts {
    pub hits: usize,
    pub substitutions: usize,
    pub deletions: usize,
    pub insertions: usize,
}

impl OperationCounts {
    /// Error operations alone: substitutions + deletions + insertions.
    pub fn edits(&self) -> usize {
        self.substitutions + self.deletions + self.insertions
    }

    /// All aligned operations, hits included.
    pub fn total(&self) -> usize {
        self.hits + self.edits()
    }

    fn from_ops(source_len: usize, ops: &[EditOp]) -> Self {
        let substitutions = ops.iter().filter(|op| op.kind == EditKind::Substitute).count();
        let deletions = ops.iter().filter(|op| op.kind == EditKind::Delete).count();
        let insertions = ops.iter().filter(|op| op.kind == EditKind::Insert).count();
        OperationCounts {
            hits: source_len - substitutions - deletions,
            substitutions,
            deletions,
            insertions,
        }
    }
}

/// Minimum-cost edit operations transforming `source` into `dest`.
///
/// Classical DP table with unit cost per operation. When several
/// alignments tie on cost, backtracking prefers a match, then a
/// substitution, then a deletion, then an insertion, so the reported ops
/// are deterministic. Matches are not reported.
pub fn edit_ops<T: PartialEq>(source: &[T], dest: &[T]) -> Vec<EditOp> {
    let m = source.len();
    let n = dest.len();
    let mut dist = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in dist.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in dist[0].iter_mut().enumerate() {
        *cell = j;
    }
    for i in 1..=m {
        for j in 1..=n {
            dist[i][j] = if source[i - 1] == dest[j - 1] {
                dist[i - 1][j - 1]
            } else {
                1 + dist[i - 1][j - 1].min(dist[i - 1][j]).min(dist[i][j - 1])
            };
        }
    }

    // Walk back from the far corner; ops come out reversed.
    let mut ops = Vec::with_capacity(dist[m][n]);
    let (mut i, mut j) = (m, n);
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && source[i - 1] == dest[j - 1] && dist[i][j] == dist[i - 1][j - 1] {
            i -= 1;
            j -= 1;
        } else if i > 0 && j > 0 && dist[i][j] == dist[i - 1][j - 1] + 1 {
            ops.push(EditOp {
                kind: EditKind::Substitute,
                source_pos: i - 1,
                dest_pos: j - 1,
            });
            i -= 1;
            j -= 1;
        } else if i > 0 && dist[i][j] == dist[i - 1][j] + 1 {
            ops.push(EditOp {
                kind: EditKind::Delete,
                source_pos: i - 1,
                dest_pos: j,
            });
            i -= 1;
        } else {
            ops.push(EditOp {
                kind: EditKind::Insert,
                source_pos: i,
                dest_pos: j - 1,
            });
            j -= 1;
        }
    }
    ops.reverse();
    ops
}

/// Operation counts for transforming `source` into `dest`.
pub fn operation_counts<T: PartialEq>(source: &[T], dest: &[T]) -> OperationCounts {
    OperationCounts::from_ops(source.len(), &edit_ops(source, dest))
}

/// Operation counts over raw, un-tokenized text, character by character.
pub fn char_operation_counts(source: &str, dest: &str) -> OperationCounts {
    let source: Vec<char> = source.chars().collect();
    let dest: Vec<char> = dest.chars().collect();
    operation_counts(&source, &dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(source: &[&str], dest: &[&str]) -> OperationCounts {
        operation_counts(source, dest)
    }

    fn assert_invariants(source: &[&str], dest: &[&str]) {
        let c = counts(source, dest);
        assert_eq!(c.hits + c.substitutions + c.deletions, source.len());
        assert_eq!(c.hits + c.substitutions + c.insertions, dest.len());
    }

    #[test]
    fn test_identical() {
        let c = counts(&["a", "b", "c"], &["a", "b", "c"]);
        assert_eq!(
            c,
            OperationCounts {
                hits: 3,
                substitutions: 0,
                deletions: 0,
                insertions: 0
            }
        );
        assert_eq!(c.edits(), 0);
    }

    #[test]
    fn test_empty_source_is_all_insertions() {
        let c = counts(&[], &["x", "y"]);
        assert_eq!(
            c,
            OperationCounts {
                hits: 0,
                substitutions: 0,
                deletions: 0,
                insertions: 2
            }
        );
    }

    #[test]
    fn test_empty_dest_is_all_deletions() {
        let c = counts(&["x", "y"], &[]);
        assert_eq!(
            c,
            OperationCounts {
                hits: 0,
                substitutions: 0,
                deletions: 2,
                insertions: 0
            }
        );
    }

    #[test]
    fn test_both_empty() {
        assert_eq!(counts(&[], &[]), OperationCounts::default());
    }

    #[test]
    fn test_single_insertion() {
        let c = counts(&["hello", "world"], &["hello", "there", "world"]);
        assert_eq!(c.hits, 2);
        assert_eq!(c.insertions, 1);
        assert_eq!(c.substitutions, 0);
        assert_eq!(c.deletions, 0);
    }

    #[test]
    fn test_substitution_and_insertion() {
        let c = counts(&["a", "b", "c"], &["a", "x", "c", "d"]);
        assert_eq!(c.hits, 2);
        assert_eq!(c.substitutions, 1);
        assert_eq!(c.insertions, 1);
        assert_eq!(c.deletions, 0);
    }

    #[test]
    fn test_invariants_hold() {
        assert_invariants(&[], &[]);
        assert_invariants(&["a"], &[]);
        assert_invariants(&[], &["a"]);
        assert_invariants(&["a", "b", "c", "d"], &["a", "b", "x", "d"]);
        assert_invariants(&["a", "a", "a"], &["a"]);
        assert_invariants(&["x", "y"], &["y", "x"]);
        assert_invariants(&["the", "quick", "fox"], &["quick", "brown", "fox", "jumps"]);
    }

    #[test]
    fn test_op_positions() {
        let ops = edit_ops(&["a", "b", "c"], &["a", "x", "c", "d"]);
        assert_eq!(
            ops,
            vec![
                EditOp {
                    kind: EditKind::Substitute,
                    source_pos: 1,
                    dest_pos: 1
                },
                EditOp {
                    kind: EditKind::Insert,
                    source_pos: 3,
                    dest_pos: 3
                },
            ]
        );
    }

    #[test]
    fn test_tie_break_is_stable() {
        // "ab" -> "ba" costs 2 either as two substitutions or as a
        // delete/insert pair; the backtrack must pick the same shape
        // every time.
        let first = edit_ops(&["a", "b"], &["b", "a"]);
        for _ in 0..10 {
            assert_eq!(edit_ops(&["a", "b"], &["b", "a"]), first);
        }
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_char_counts() {
        let c = char_operation_counts("ab", "ad");
        assert_eq!(
            c,
            OperationCounts {
                hits: 1,
                substitutions: 1,
                deletions: 0,
                insertions: 0
            }
        );
        assert_eq!(char_operation_counts("", "").total(), 0);
    }

    #[test]
    fn test_char_counts_multibyte() {
        // Alignment is per character, not per byte.
        let c = char_operation_counts("café", "cafe");
        assert_eq!(c.hits, 3);
        assert_eq!(c.substitutions, 1);
    }
}
