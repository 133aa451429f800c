use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use screener_core::{rank, CorpusCache, Document, RankConfig, RankError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Deserialize)]
pub struct RankParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    /// Comma-separated category allow-list, matched case-insensitively.
    pub category: Option<String>,
}
fn default_k() -> usize {
    10
}

#[derive(Serialize)]
pub struct RankResponse {
    pub query: String,
    pub took_s: f64,
    pub total: usize,
    pub results: Vec<RankHit>,
}

#[derive(Serialize)]
pub struct RankHit {
    pub id: String,
    pub category: Option<String>,
    pub score: f32,
    pub snippet: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CorpusCache>,
    pub admin_token: Option<String>,
}

pub fn build_app(corpus_path: String) -> Result<Router> {
    // The corpus is loaded lazily on the first request and cached until an
    // explicit reload or process restart.
    let cache = Arc::new(CorpusCache::new(&corpus_path));
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let app_state = AppState { cache, admin_token };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/rank", get(rank_handler))
        .route("/corpus/reload", post(corpus_reload))
        .with_state(app_state)
        .layer(cors);
    Ok(app)
}

pub async fn rank_handler(
    State(state): State<AppState>,
    Query(params): Query<RankParams>,
) -> Result<Json<RankResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let corpus = state
        .cache
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("corpus load failed: {e}")))?;

    // Category filtering is a presentation concern; it happens before the
    // ranking core ever sees the corpus.
    let filtered: Vec<Document> = match &params.category {
        Some(list) => {
            let allowed: Vec<String> = list
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
            corpus
                .iter()
                .filter(|d| {
                    d.category
                        .as_deref()
                        .map(|c| allowed.iter().any(|a| a == &c.to_uppercase()))
                        .unwrap_or(false)
                })
                .cloned()
                .collect()
        }
        None => corpus.as_ref().clone(),
    };

    let ranked = rank(&filtered, &params.q, &RankConfig::default()).map_err(|e| match e {
        RankError::InvalidInput(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        RankError::DimensionMismatch { .. } => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    })?;

    let raw_terms: Vec<String> = params.q.split_whitespace().map(|s| s.to_string()).collect();
    let k = params.k.max(1).min(100);
    let total = ranked.len();
    let results: Vec<RankHit> = ranked
        .into_iter()
        .take(k)
        .map(|s| {
            let snippet = snippet_from_text(&s.doc.text, &raw_terms);
            RankHit { id: s.doc.id, category: s.doc.category, score: s.score, snippet }
        })
        .collect();

    Ok(Json(RankResponse {
        query: params.q,
        took_s: start.elapsed().as_secs_f64(),
        total,
        results,
    }))
}

async fn corpus_reload(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let docs = state
        .cache
        .reload()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("reload failed: {e}")))?;
    tracing::info!(docs = docs.len(), "corpus reloaded");
    Ok(Json(serde_json::json!({ "docs": docs.len() })))
}

fn authorize(state: &AppState, headers: &axum::http::HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

/// A short window of resume text around the first case-insensitive
/// occurrence of any raw query term, with matches wrapped in <em> tags.
/// Falls back to a text prefix when nothing matches.
fn snippet_from_text(text: &str, raw_terms: &[String]) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let mut first_idx: Option<usize> = None;
    for term in raw_terms {
        if term.trim().is_empty() {
            continue;
        }
        if let Some(pos) = find_case_insensitive(text, term) {
            first_idx = Some(pos);
            break;
        }
    }
    let snippet = match first_idx {
        Some(idx) => {
            let mut start = idx.saturating_sub(100);
            while !text.is_char_boundary(start) {
                start -= 1;
            }
            let mut end = (idx + 200).min(text.len());
            while !text.is_char_boundary(end) {
                end += 1;
            }
            text[start..end].to_string()
        }
        None => text.chars().take(200).collect(),
    };
    Some(highlight_terms(&snippet, raw_terms))
}

fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.to_lowercase();
    let n = needle.to_lowercase();
    h.find(&n)
}

fn highlight_terms(snippet: &str, terms: &[String]) -> String {
    let mut s = snippet.to_string();
    for t in terms {
        if t.trim().is_empty() {
            continue;
        }
        let Ok(pat) = regex::RegexBuilder::new(&regex::escape(t)).case_insensitive(true).build()
        else {
            continue;
        };
        s = pat
            .replace_all(&s, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0]))
            .to_string();
    }
    s
}
