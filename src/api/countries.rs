/// Country information endpoints backed by the upstream country API
use crate::{
    context::AppContext,
    countries::{compare_populations, Comparison, CountryRecord},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

/// Build country routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/countries/search/:name", get(search_country))
        .route("/countries/compare", get(compare_countries))
}

#[derive(Debug, Deserialize)]
struct CompareQuery {
    country1: Option<String>,
    country2: Option<String>,
}

/// Search for a single country
async fn search_country(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
) -> ApiResult<Json<CountryRecord>> {
    let record = ctx.countries.lookup(&name).await.into_result(&name)?;
    Ok(Json(record))
}

/// Compare two countries by population
async fn compare_countries(
    State(ctx): State<AppContext>,
    Query(query): Query<CompareQuery>,
) -> ApiResult<Json<Comparison>> {
    let country1 = required_param(query.country1, "country1")?;
    let country2 = required_param(query.country2, "country2")?;

    let data1 = ctx.countries.lookup(&country1).await.into_result(&country1)?;
    let data2 = ctx.countries.lookup(&country2).await.into_result(&country2)?;

    Ok(Json(compare_populations(data1, data2)))
}

fn required_param(value: Option<String>, name: &str) -> ApiResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::Validation(format!("Missing query parameter: {}", name)))
}
