//! Transcript input and word normalization.

/// Raw transcript input: either one string of text or a list of sentences
/// that are scored as a single utterance stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcript {
    Text(String),
    Sentences(Vec<String>),
}

impl Transcript {
    /// Flatten to a single text string (sentences joined by one space).
    pub fn as_text(&self) -> String {
        match self {
            Transcript::Text(s) => s.clone(),
            Transcript::Sentences(list) => list.join(" "),
        }
    }
}

impl From<&str> for Transcript {
    fn from(s: &str) -> Self {
        Transcript::Text(s.to_string())
    }
}

impl From<String> for Transcript {
    fn from(s: String) -> Self {
        Transcript::Text(s)
    }
}

impl From<Vec<String>> for Transcript {
    fn from(sentences: Vec<String>) -> Self {
        Transcript::Sentences(sentences)
    }
}

impl From<&[&str]> for Transcript {
    fn from(sentences: &[&str]) -> Self {
        Transcript::Sentences(sentences.iter().map(|s| s.to_string()).collect())
    }
}

/// Turns raw transcript text into comparable word tokens.
///
/// Implementations are injected per side into [`crate::Scorer`]; the
/// default is [`WordNormalizer`].
pub trait Normalizer {
    fn tokens(&self, transcript: &Transcript) -> Vec<String>;
}

/// Default normalization: collapse repeated whitespace, trim, split into
/// words, drop empty tokens. Whitespace splitting does all four in one
/// pass and is idempotent.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordNormalizer;

impl Normalizer for WordNormalizer {
    fn tokens(&self, transcript: &Transcript) -> Vec<String> {
        match transcript {
            Transcript::Text(s) => split_words(s),
            Transcript::Sentences(list) => list.iter().flat_map(|s| split_words(s)).collect(),
        }
    }
}

/// Folding normalization: lowercase, drop everything that is not ASCII
/// alphanumeric or an apostrophe, then split into words. Useful when the
/// reference and hypothesis disagree on casing or punctuation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FoldingNormalizer;

impl Normalizer for FoldingNormalizer {
    fn tokens(&self, transcript: &Transcript) -> Vec<String> {
        WordNormalizer
            .tokens(transcript)
            .iter()
            .map(|w| fold_word(w))
            .filter(|w| !w.is_empty())
            .collect()
    }
}

/// Shared default instance. Immutable; safe to read from any thread.
pub static DEFAULT_NORMALIZER: WordNormalizer = WordNormalizer;

fn split_words(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

fn fold_word(w: &str) -> String {
    w.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '\'')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
