use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::extract::{JsonBody, QueryParams};
use crate::{
    error::AppError,
    models::trip::{NewTrip, TripStatus},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/trips",
            get(list_trips).post(create_trip).delete(delete_trips),
        )
        .route("/trips/total-distance", get(total_distance))
        .route("/trips/counts", get(trip_counts))
        .route("/trips/top-locations", get(top_locations))
        .route("/trips/refresh-statuses", post(refresh_statuses))
        .route("/emissions", get(emissions))
        .route("/ecoscore", get(ecoscore))
        .route("/emissions-by-mode", get(emissions_by_mode))
        .route("/line-chart-data", get(line_chart_data))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    status: Option<String>,
}

async fn list_trips(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let status = match query.status.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(raw.parse::<TripStatus>()?),
        _ => None,
    };
    let trips = state.trips.list_trips(status).await?;
    Ok(Json(trips))
}

async fn create_trip(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewTrip>,
) -> Result<impl IntoResponse, AppError> {
    let trip = state.trips.create_trip(input).await?;
    Ok((StatusCode::CREATED, Json(trip)))
}

async fn delete_trips(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.trips.delete_all_trips().await?;
    Ok(Json(json!({ "message": "All trips deleted successfully" })))
}

async fn refresh_statuses(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let updated = state.trips.refresh_statuses().await?;
    Ok(Json(json!({ "updated": updated })))
}

async fn emissions(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.trips.emissions_summary().await?))
}

async fn ecoscore(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let score = state.trips.average_eco_score().await?;
    Ok(Json(json!({ "ecoscore": score })))
}

async fn total_distance(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let distance = state.trips.total_distance().await?;
    Ok(Json(json!({ "totalDistance": distance })))
}

async fn trip_counts(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.trips.status_counts().await?))
}

#[derive(Debug, Deserialize)]
struct TopLocationsQuery {
    limit: Option<usize>,
}

async fn top_locations(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<TopLocationsQuery>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.trips.location_visit_counts(query.limit).await?))
}

async fn emissions_by_mode(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.trips.emissions_by_mode().await?))
}

async fn line_chart_data(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.trips.eco_score_series().await?))
}
