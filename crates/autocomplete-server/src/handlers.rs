use std::sync::Arc;

use autocomplete_index::{AutocompleteError, TermIndex, parse_limit, parse_prefix};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_K: i64 = 10;

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<TermIndex>,
    pub max_k: usize,
    pub disable_cache: bool,
}

#[derive(Deserialize)]
pub struct MatchesQuery {
    pub prefix: Option<String>,
    pub k: Option<i64>,
}

#[derive(Deserialize)]
pub struct TopQuery {
    pub prefix: Option<String>,
}

#[derive(Deserialize)]
pub struct WeightQuery {
    pub word: Option<String>,
}

#[derive(Serialize)]
struct ScoredWord {
    word: String,
    weight: f64,
}

#[derive(Serialize)]
pub struct MatchesResponse {
    prefix: String,
    k: usize,
    total: usize,
    items: Vec<ScoredWord>,
}

#[derive(Serialize)]
pub struct TopResponse {
    prefix: String,
    word: Option<String>,
}

#[derive(Serialize)]
pub struct WeightResponse {
    word: String,
    weight: f64,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/matches", get(matches))
        .route("/v1/top", get(top))
        .route("/v1/weight", get(weight))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn matches(
    State(state): State<AppState>,
    params: Result<Query<MatchesQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let prefix = parse_prefix(params.prefix.as_deref())?;
    let k = parse_limit(params.k.unwrap_or(DEFAULT_K))?.min(state.max_k);

    let total = state.index.count_matches(prefix);
    let items = state
        .index
        .top_terms(prefix, k)
        .into_iter()
        .map(|term| ScoredWord {
            word: term.word().to_owned(),
            weight: term.weight(),
        })
        .collect();

    let response = MatchesResponse {
        prefix: prefix.to_owned(),
        k,
        total,
        items,
    };
    Ok(cacheable(&state, Json(response)))
}

async fn top(
    State(state): State<AppState>,
    params: Result<Query<TopQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let prefix = parse_prefix(params.prefix.as_deref())?;
    let response = TopResponse {
        prefix: prefix.to_owned(),
        word: state.index.top_match(prefix).map(str::to_owned),
    };
    Ok(cacheable(&state, Json(response)))
}

async fn weight(
    State(state): State<AppState>,
    params: Result<Query<WeightQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let word = params
        .word
        .ok_or(AutocompleteError::NullArgument("word"))?;
    let response = WeightResponse {
        weight: state.index.weight_of(&word),
        word,
    };
    Ok(cacheable(&state, Json(response)))
}

fn cacheable(state: &AppState, body: impl IntoResponse) -> Response {
    if state.disable_cache {
        return body.into_response();
    }
    (
        [(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=300"),
        )],
        body,
    )
        .into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl From<AutocompleteError> for ApiError {
    fn from(err: AutocompleteError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// Malformed query strings (`k=abc`, out-of-range `k`) answer in the same
/// JSON shape as the other caller errors.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}
