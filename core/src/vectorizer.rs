use crate::error::RankError;
use crate::tokenizer::{ngrams, tokenize};
use crate::types::{RankConfig, TermId};
use std::collections::HashMap;

/// Term-to-index mapping for one ranking invocation, with per-term document
/// frequencies. Ids are dense and contiguous from 0, assigned in
/// first-appearance order across the input texts.
#[derive(Debug, Default)]
pub struct Vocabulary {
    map: HashMap<String, TermId>,
    df: Vec<u32>,
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn id(&self, term: &str) -> Option<TermId> {
        self.map.get(term).copied()
    }

    pub fn df(&self, term_id: TermId) -> u32 {
        self.df.get(term_id as usize).copied().unwrap_or(0)
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, TermId)> {
        self.map.iter().map(|(t, id)| (t.as_str(), *id))
    }

    fn intern(&mut self, term: String) -> TermId {
        let next = self.map.len() as TermId;
        *self.map.entry(term).or_insert_with(|| {
            self.df.push(0);
            next
        })
    }
}

/// Sparse weight vector over one shared vocabulary. Entries are sorted by
/// term id; absent terms have implicit weight 0. Unit L2 norm unless the
/// source text had no extractable terms (then empty).
#[derive(Debug, Clone)]
pub struct SparseVec {
    pub dim: usize,
    pub entries: Vec<(TermId, f32)>,
}

impl SparseVec {
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }
}

/// The fitted vector space: all input vectors (query last) plus the
/// vocabulary, which is exposed for diagnostics only.
#[derive(Debug)]
pub struct VectorSpace {
    pub vocabulary: Vocabulary,
    pub vectors: Vec<SparseVec>,
}

/// Builds a shared-vocabulary TF-IDF vector space from raw texts. The last
/// text is the query; it contributes to the vocabulary and to document
/// frequencies exactly like a corpus document, so a term unique to the query
/// is still representable.
pub struct Vectorizer<'a> {
    config: &'a RankConfig,
}

impl<'a> Vectorizer<'a> {
    pub fn new(config: &'a RankConfig) -> Self {
        Self { config }
    }

    /// Vectorize `texts` (N corpus documents followed by the query) into
    /// unit-normalized TF-IDF vectors over one vocabulary.
    ///
    /// Deterministic: identical texts in identical order produce identical
    /// vectors. Fails only on structural problems (fewer than two texts, or
    /// a degenerate n-gram range); empty texts produce zero vectors.
    pub fn fit_transform(&self, texts: &[&str]) -> Result<VectorSpace, RankError> {
        if texts.len() < 2 {
            return Err(RankError::InvalidInput(format!(
                "need at least one corpus document and a query, got {} text(s)",
                texts.len()
            )));
        }
        let (min_n, max_n) = self.config.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(RankError::InvalidInput(format!(
                "invalid ngram range ({min_n}, {max_n})"
            )));
        }

        let stop_words = self.config.stop_words.as_ref();
        let num_docs = texts.len() as u32;

        // First pass: build the vocabulary and raw per-document term counts.
        let mut vocabulary = Vocabulary::default();
        let mut counts: Vec<HashMap<TermId, u32>> = Vec::with_capacity(texts.len());
        for text in texts {
            let tokens = tokenize(text, stop_words);
            let mut tf: HashMap<TermId, u32> = HashMap::new();
            for term in ngrams(&tokens, min_n, max_n) {
                let tid = vocabulary.intern(term);
                *tf.entry(tid).or_insert(0) += 1;
            }
            for &tid in tf.keys() {
                vocabulary.df[tid as usize] += 1;
            }
            counts.push(tf);
        }

        let dim = vocabulary.len();
        tracing::debug!(num_docs, vocab = dim, "fitted vocabulary");

        // Second pass: weight and normalize.
        let mut vectors = Vec::with_capacity(counts.len());
        for tf in counts {
            let mut entries: Vec<(TermId, f32)> = tf
                .into_iter()
                .map(|(tid, count)| {
                    let idf = self.config.idf.compute(num_docs, vocabulary.df[tid as usize]);
                    (tid, count as f32 * idf)
                })
                .collect();
            entries.sort_by_key(|&(tid, _)| tid);

            let mut vec = SparseVec { dim, entries };
            let norm = vec.norm();
            if norm > 0.0 {
                for (_, w) in vec.entries.iter_mut() {
                    *w /= norm;
                }
            }
            vectors.push(vec);
        }

        Ok(VectorSpace { vocabulary, vectors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IdfFormula;

    fn fit(texts: &[&str]) -> VectorSpace {
        let config = RankConfig::default();
        Vectorizer::new(&config).fit_transform(texts).unwrap()
    }

    #[test]
    fn rejects_fewer_than_two_texts() {
        let config = RankConfig::default();
        let err = Vectorizer::new(&config).fit_transform(&["only one"]).unwrap_err();
        assert!(matches!(err, RankError::InvalidInput(_)));
    }

    #[test]
    fn rejects_zero_ngram_min() {
        let config = RankConfig { ngram_range: (0, 2), ..Default::default() };
        let err = Vectorizer::new(&config).fit_transform(&["a b", "c"]).unwrap_err();
        assert!(matches!(err, RankError::InvalidInput(_)));
    }

    #[test]
    fn vocabulary_ids_are_dense_and_contiguous() {
        let space = fit(&["python developer", "java developer", "python"]);
        let mut ids: Vec<TermId> = space.vocabulary.terms().map(|(_, id)| id).collect();
        ids.sort_unstable();
        let expected: Vec<TermId> = (0..space.vocabulary.len() as TermId).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn query_terms_enter_vocabulary() {
        let space = fit(&["watercolor painting", "sql engineer"]);
        // last text is the query; its terms must be representable
        assert!(space.vocabulary.id("sql").is_some());
        assert!(space.vocabulary.id("sql engineer").is_some());
    }

    #[test]
    fn vectors_are_unit_length() {
        let space = fit(&["python java sql developer", "python sql"]);
        for v in &space.vectors {
            assert!((v.norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn stopword_only_text_is_zero_vector() {
        let space = fit(&["the and of but", "java"]);
        assert!(space.vectors[0].is_zero());
        assert!(!space.vectors[1].is_zero());
    }

    #[test]
    fn empty_text_is_zero_vector_not_error() {
        let space = fit(&["", "java"]);
        assert!(space.vectors[0].is_zero());
        assert_eq!(space.vectors[0].dim, space.vectors[1].dim);
    }

    #[test]
    fn df_counts_documents_not_occurrences() {
        let space = fit(&["rust rust rust", "rust", "go"]);
        let rust = space.vocabulary.id("rust").unwrap();
        assert_eq!(space.vocabulary.df(rust), 2);
    }

    #[test]
    fn smooth_idf_matches_formula() {
        // n = 3 docs, df("shared") = 3, df("rare") = 1
        let n = 3.0f32;
        let expected_shared = ((1.0 + n) / (1.0 + 3.0)).ln() + 1.0;
        let expected_rare = ((1.0 + n) / (1.0 + 1.0)).ln() + 1.0;
        assert!((IdfFormula::Smooth.compute(3, 3) - expected_shared).abs() < 1e-6);
        assert!((IdfFormula::Smooth.compute(3, 1) - expected_rare).abs() < 1e-6);
        // rare terms weigh more
        assert!(expected_rare > expected_shared);
    }

    #[test]
    fn deterministic_across_runs() {
        let texts = ["python java sql", "java kotlin", "python sql"];
        let a = fit(&texts);
        let b = fit(&texts);
        assert_eq!(a.vocabulary.len(), b.vocabulary.len());
        for (va, vb) in a.vectors.iter().zip(&b.vectors) {
            assert_eq!(va.entries, vb.entries);
        }
    }
}
