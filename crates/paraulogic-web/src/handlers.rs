use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use paraulogic_core::{LetterSet, WordIndex, parse_required, solve};

/// Letters in a puzzle ring, center letter included.
pub const MAX_LETTERS: usize = 7;
const DEFAULT_PAGE_SIZE: usize = 200;

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<WordIndex>,
    pub max_page_size: usize,
    pub disable_cache: bool,
}

#[derive(Deserialize)]
pub struct SolveQuery {
    #[serde(default)]
    pub letters: String,
    pub required: String,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Serialize)]
pub struct SolveResponse {
    letters: String,
    required: char,
    page: usize,
    page_size: usize,
    total: usize,
    has_more: bool,
    words: Vec<String>,
    affixes: BTreeMap<String, Vec<String>>,
    lines: Vec<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(frontend))
        .route("/robots.txt", get(robots))
        .route("/healthz", get(healthz))
        .route("/v1/solve", get(solve_puzzle))
        .route("/v1/stats", get(stats))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn robots(State(state): State<AppState>) -> Response {
    const BODY: &str = "User-agent: *\nDisallow: /";
    if state.disable_cache {
        return BODY.into_response();
    }
    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            ),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=86400, immutable"),
            ),
        ],
        BODY,
    )
        .into_response()
}

async fn frontend(State(state): State<AppState>) -> Response {
    let html = Html(index_html());
    with_cache(&state, "public, max-age=3600, immutable", html)
}

async fn stats(State(state): State<AppState>) -> Response {
    with_cache(&state, "public, max-age=300", Json(state.index.stats()))
}

async fn solve_puzzle(
    State(state): State<AppState>,
    params: Result<Query<SolveQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let required = parse_required(&params.required)
        .map_err(|e| ApiError::bad_request(format!("required: {e}")))?;
    let mut letters: LetterSet = params
        .letters
        .parse()
        .map_err(|e| ApiError::bad_request(format!("letters: {e}")))?;
    letters.insert(required);
    if letters.len() > MAX_LETTERS {
        return Err(ApiError::bad_request(format!(
            "letters must be at most {MAX_LETTERS} distinct letters including the required one"
        )));
    }

    let page = params.page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::bad_request("page must be >= 1"));
    }
    let mut page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err(ApiError::bad_request("page_size must be >= 1"));
    }
    if page_size > state.max_page_size {
        page_size = state.max_page_size;
    }

    let query = paraulogic_core::Query::new(letters, Some(required));
    let mut solution = solve(&state.index, &query);
    let total = solution.len();
    debug!("{} / {required}: {total} words", query.allowed);

    let offset = page.saturating_sub(1).saturating_mul(page_size);
    let words: Vec<String> = solution
        .words
        .iter()
        .skip(offset)
        .take(page_size)
        .cloned()
        .collect();
    let lines = words.iter().map(|w| solution.display_line(w)).collect();
    let affixes = words
        .iter()
        .map(|w| {
            let usable = solution.affixes.remove(w).unwrap_or_default();
            (w.clone(), usable)
        })
        .collect();
    let has_more = offset + words.len() < total;

    let response = SolveResponse {
        letters: query.allowed.to_string(),
        required,
        page,
        page_size,
        total,
        has_more,
        words,
        affixes,
        lines,
    };

    Ok(with_cache(&state, "public, max-age=300", Json(response)))
}

fn with_cache<T: IntoResponse>(state: &AppState, policy: &'static str, body: T) -> Response {
    if state.disable_cache {
        return body.into_response();
    }
    (
        [(header::CACHE_CONTROL, HeaderValue::from_static(policy))],
        body,
    )
        .into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
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

const BASE_HTML: &str = include_str!("../templates/base.html");
const STYLE_HTML: &str = include_str!("../templates/style.html");
const SOLVER_BODY_HTML: &str = include_str!("../templates/solver_body.html");
const SOLVER_SCRIPT: &str = include_str!("../templates/solver_script.js");

fn render_page(title: &str, body: &str, script: &str) -> String {
    BASE_HTML
        .replace("{{title}}", title)
        .replace("{{style}}", STYLE_HTML)
        .replace("{{body}}", body)
        .replace("{{scripts}}", &format!(r#"<script>{script}</script>"#))
        .replace("__MAX_LETTERS__", &MAX_LETTERS.to_string())
}

fn index_html() -> String {
    render_page("Solucionador del Paraulògic", SOLVER_BODY_HTML, SOLVER_SCRIPT)
}
