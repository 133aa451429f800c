//! Resume ranking core: a TF-IDF vector space over a resume corpus plus one
//! job-description query, scored by cosine similarity into a stable
//! descending order.
//!
//! Everything is rebuilt per invocation. The query text contributes to the
//! vocabulary and to document frequencies, so vectors and IDF values are
//! never shared across queries; concurrent callers each fit their own space
//! from a corpus snapshot.

pub mod corpus;
pub mod error;
pub mod ranker;
pub mod tokenizer;
pub mod types;
pub mod vectorizer;

pub use corpus::{load_corpus, CorpusCache};
pub use error::RankError;
pub use types::{Document, IdfFormula, RankConfig, Scored, TermId, TieBreak};
pub use vectorizer::{SparseVec, VectorSpace, Vectorizer, Vocabulary};

/// Rank every corpus document against the query, best match first.
///
/// The result always covers the full corpus; top-K truncation is the
/// caller's concern. Ties are broken per `config.tie_break` (relative corpus
/// order by default). An empty-string query is valid and produces an
/// all-zero ranking in corpus order; an empty corpus is `InvalidInput`.
pub fn rank(
    corpus: &[Document],
    query: &str,
    config: &RankConfig,
) -> Result<Vec<Scored>, RankError> {
    if corpus.is_empty() {
        return Err(RankError::InvalidInput("corpus is empty".into()));
    }

    let mut texts: Vec<&str> = corpus.iter().map(|d| d.text.as_str()).collect();
    texts.push(query);

    let space = Vectorizer::new(config).fit_transform(&texts)?;
    let (query_vec, doc_vecs) = space
        .vectors
        .split_last()
        .ok_or_else(|| RankError::InvalidInput("vectorizer produced no vectors".into()))?;

    let scores = ranker::score_all(doc_vecs, query_vec)?;
    let mut order = ranker::order_by_score(&scores);
    if config.tie_break == TieBreak::DocId {
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| corpus[a].id.cmp(&corpus[b].id))
        });
    }

    tracing::debug!(
        docs = corpus.len(),
        vocab = space.vocabulary.len(),
        "ranked corpus against query"
    );

    Ok(order
        .into_iter()
        .map(|i| Scored { doc: corpus[i].clone(), score: scores[i] })
        .collect())
}
