use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type TermId = u32;

/// One candidate resume: a stable identifier, an optional category label, and
/// the raw text. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub category: Option<String>,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), category: None, text: text.into() }
    }
}

/// One ranking result row.
#[derive(Debug, Clone, Serialize)]
pub struct Scored {
    pub doc: Document,
    pub score: f32,
}

/// IDF variant. Affects ranking order only through ties, but is part of the
/// scoring contract and therefore explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdfFormula {
    /// ln((1 + n) / (1 + df)) + 1. Never zero, tolerant of terms that appear
    /// in every document.
    #[default]
    Smooth,
    /// ln(n / df) + 1.
    Standard,
}

impl IdfFormula {
    pub fn compute(self, num_docs: u32, df: u32) -> f32 {
        let n = num_docs as f32;
        let df = df.max(1) as f32;
        match self {
            IdfFormula::Smooth => ((1.0 + n) / (1.0 + df)).ln() + 1.0,
            IdfFormula::Standard => (n / df).ln() + 1.0,
        }
    }
}

/// How documents with equal scores are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Keep the relative corpus order (stable sort).
    #[default]
    InputOrder,
    /// Ascending lexicographic document id.
    DocId,
}

/// Ranking configuration. `Default` matches the reference behavior:
/// unigrams + bigrams, builtin English stopwords, smooth IDF, stable
/// input-order ties.
#[derive(Debug, Clone)]
pub struct RankConfig {
    /// Inclusive (min, max) n-gram sizes.
    pub ngram_range: (usize, usize),
    /// Replacement stopword set; `None` selects the builtin English list.
    pub stop_words: Option<HashSet<String>>,
    pub idf: IdfFormula,
    pub tie_break: TieBreak,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            ngram_range: (1, 2),
            stop_words: None,
            idf: IdfFormula::Smooth,
            tie_break: TieBreak::InputOrder,
        }
    }
}
