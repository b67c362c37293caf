#![cfg(test)]

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use formu::store::{MemoryCorpus, MemoryPayroll};
use tower::ServiceExt;

use super::config::ServerConfig;
use super::error::ApiError;
use super::handlers::{self, RangeQuery, SearchQuery};
use super::state::AppState;
use super::{build_index, create_app};

fn test_state() -> AppState {
    let corpus = Arc::new(MemoryCorpus::new(vec![
        MemoryCorpus::concept("A", "%CALC0100%+%INFO0100%", ""),
        MemoryCorpus::concept("B", "%CALC0100%", ""),
        MemoryCorpus::concept("0100", "%SC02000300%", ""),
    ]));
    let payroll = Arc::new(MemoryPayroll::default());
    let state = AppState::from_parts(corpus, payroll, 60);
    state.index.build().expect("index build");
    state
}

#[tokio::test]
async fn detail_of_known_code_succeeds() {
    let state = test_state();
    let response = handlers::concept_detail(State(state), Path("A".to_string())).await;
    let detail = response.expect("known code").0;
    assert_eq!(detail.summary.code, "A");
    assert_eq!(detail.forward_dependencies, vec!["0100"]);
}

#[tokio::test]
async fn detail_of_unknown_code_is_not_found() {
    let state = test_state();
    let response = handlers::concept_detail(State(state), Path("ZZ".to_string())).await;
    assert!(matches!(response, Err(ApiError::NotFound)));
}

#[tokio::test]
async fn dependents_of_unknown_code_is_an_empty_ok() {
    let state = test_state();
    let response = handlers::concept_dependents(State(state), Path("ZZ".to_string())).await;
    assert!(response.0.is_empty());
}

#[tokio::test]
async fn dependents_reach_through_the_index() {
    let state = test_state();
    let response = handlers::concept_dependents(State(state), Path("0100".to_string())).await;
    assert_eq!(response.0, vec!["A", "B"]);
}

#[tokio::test]
async fn range_with_non_numeric_endpoints_is_a_bad_request() {
    let state = test_state();
    let response = handlers::range_listing(
        State(state),
        Path(("abc".to_string(), "0100".to_string())),
        Query(RangeQuery {
            tipo_rango: "SC".to_string(),
        }),
    )
    .await;
    assert!(matches!(response, Err(ApiError::BadRequest(_))));
}

#[tokio::test]
async fn search_under_two_characters_is_an_empty_ok() {
    let state = test_state();
    let response = handlers::search_concepts(
        State(state),
        Query(SearchQuery {
            q: "a".to_string(),
        }),
    )
    .await;
    assert!(response.expect("200").0.is_empty());
}

#[tokio::test]
async fn refresh_returns_ready_stats() {
    let state = test_state();
    let response = handlers::refresh_cache(State(state)).await;
    assert!(response.0.ready);
    assert!(response.0.entries > 0);
}

#[tokio::test]
async fn refresh_with_unreachable_corpus_still_succeeds() {
    let corpus = Arc::new(MemoryCorpus::new(vec![MemoryCorpus::concept(
        "A",
        "%CALC0100%",
        "",
    )]));
    let state = AppState::from_parts(corpus.clone(), Arc::new(MemoryPayroll::default()), 60);
    state.index.build().expect("first build");

    corpus.set_failing(true);
    let response = handlers::refresh_cache(State(state.clone())).await;

    // The previous snapshot is retained and its stats are returned.
    assert!(response.0.ready);
    assert_eq!(response.0.direct_entries, 1);

    let dependents = handlers::concept_dependents(State(state), Path("0100".to_string())).await;
    assert_eq!(dependents.0, vec!["A"]);
}

#[test]
fn error_mapping_matches_the_contract() {
    assert_eq!(
        ApiError::NotFound.into_response().status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        ApiError::BadRequest("bad".to_string())
            .into_response()
            .status(),
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn router_serves_the_documented_paths() {
    let state = test_state();
    build_index(state.index.clone()).await.expect("build");
    let app = create_app(state, &ServerConfig::default());

    for (path, expected) in [
        ("/health", StatusCode::OK),
        ("/api/conceptos", StatusCode::OK),
        ("/api/conceptos/buscar?q=conc", StatusCode::OK),
        ("/api/conceptos/A", StatusCode::OK),
        ("/api/conceptos/ZZ", StatusCode::NOT_FOUND),
        ("/api/conceptos/A/dependencias", StatusCode::OK),
        ("/api/conceptos/A/dependientes", StatusCode::OK),
        ("/api/conceptos/rango/0050/0100?tipoRango=SC", StatusCode::OK),
        ("/api/conceptos/rango/xx/0100", StatusCode::BAD_REQUEST),
        ("/api/conceptos/cache/stats", StatusCode::OK),
        ("/api/liquidacion?anio=2025&mes=6", StatusCode::OK),
        ("/api/liquidacion/tipos", StatusCode::OK),
        ("/api/liquidacion/anios", StatusCode::OK),
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(path)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), expected, "GET {path}");
    }
}
