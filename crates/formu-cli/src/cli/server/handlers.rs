//! HTTP request handlers.
//!
//! Thin translations from the HTTP surface onto the services: extract and
//! validate parameters, call the service, map the result. All endpoints are
//! read-only except the cache refresh.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use formu::index::IndexStats;
use formu::{ConceptDetail, ConceptSummary, PayrollTotal, RangeListing};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResult};
use super::state::AppState;

/// Query parameters for concept search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Search text; under two characters the search returns nothing.
    pub q: String,
}

/// Query parameters for range listings.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// Range prefix driving the definitive/transitory filter.
    #[serde(rename = "tipoRango", default)]
    pub tipo_rango: String,
}

/// Query parameters for payroll aggregation.
#[derive(Debug, Deserialize)]
pub struct PayrollQuery {
    /// Liquidation year; defaults to the current year.
    pub anio: Option<i32>,
    /// Liquidation month; defaults to the current month.
    pub mes: Option<i32>,
    /// Liquidation type code; defaults to `"0"`.
    pub tipo: Option<String>,
    /// Employee file number; omitted sums across all employees.
    pub legajo: Option<String>,
}

/// Query parameters naming just a period.
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    /// Liquidation year; defaults to the current year.
    pub anio: Option<i32>,
    /// Liquidation month; defaults to the current month.
    pub mes: Option<i32>,
}

/// Health probe payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Fixed `"healthy"` marker.
    pub status: &'static str,
    /// Current index statistics.
    pub index: IndexStats,
}

/// `GET /api/conceptos`
pub async fn list_concepts(State(state): State<AppState>) -> ApiResult<Json<Vec<ConceptSummary>>> {
    Ok(Json(state.concepts.list().await?))
}

/// `GET /api/conceptos/buscar?q=`
pub async fn search_concepts(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<ConceptSummary>>> {
    Ok(Json(state.concepts.search(&query.q).await?))
}

/// `GET /api/conceptos/{code}`
pub async fn concept_detail(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<ConceptDetail>> {
    state
        .concepts
        .detail(&code)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// `POST /api/conceptos/batch`
pub async fn concept_batch(
    State(state): State<AppState>,
    Json(codes): Json<Vec<String>>,
) -> ApiResult<Json<Vec<ConceptDetail>>> {
    Ok(Json(state.concepts.batch(&codes).await?))
}

/// `GET /api/conceptos/rango/{lo}/{hi}?tipoRango=`
pub async fn range_listing(
    State(state): State<AppState>,
    Path((lo, hi)): Path<(String, String)>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<RangeListing>> {
    if lo.parse::<i64>().is_err() || hi.parse::<i64>().is_err() {
        return Err(ApiError::BadRequest(
            "range endpoints must be numeric concept codes".to_string(),
        ));
    }
    Ok(Json(
        state
            .concepts
            .range_listing(&query.tipo_rango, &lo, &hi)
            .await?,
    ))
}

/// `GET /api/conceptos/{code}/dependencias`
pub async fn concept_dependencies(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    state
        .concepts
        .detail(&code)
        .await?
        .map(|detail| Json(detail.forward_dependencies))
        .ok_or(ApiError::NotFound)
}

/// `GET /api/conceptos/{code}/dependientes`
///
/// Unknown codes simply have no dependents: always 200.
pub async fn concept_dependents(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Json<Vec<String>> {
    Json(state.concepts.dependents(&code))
}

/// `POST /api/conceptos/cache/refresh`
///
/// Always 200: a failed rebuild keeps the previous snapshot and the
/// retained stats are returned.
pub async fn refresh_cache(State(state): State<AppState>) -> Json<IndexStats> {
    Json(state.concepts.refresh_index().await)
}

/// `GET /api/conceptos/cache/stats`
pub async fn cache_stats(State(state): State<AppState>) -> Json<IndexStats> {
    Json(state.concepts.index_stats())
}

/// `GET /api/liquidacion?anio=&mes=&tipo=&legajo=`
pub async fn payroll_totals(
    State(state): State<AppState>,
    Query(query): Query<PayrollQuery>,
) -> ApiResult<Json<BTreeMap<String, PayrollTotal>>> {
    Ok(Json(
        state
            .payroll
            .totals(query.anio, query.mes, query.tipo, query.legajo)
            .await?,
    ))
}

/// `GET /api/liquidacion/tipos`
pub async fn liquidation_types(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.payroll.liquidation_types().await?))
}

/// `GET /api/liquidacion/legajos?anio=&mes=`
pub async fn payroll_employees(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.payroll.employees(query.anio, query.mes).await?))
}

/// `GET /api/liquidacion/anios`
pub async fn payroll_years(State(state): State<AppState>) -> Json<Vec<i32>> {
    Json(state.payroll.years())
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        index: state.index.stats(),
    })
}
