//! Water-point catalog handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use watermap_core::{PointId, WaterPoint, WaterPointDraft};
use watermap_store::{PointFilter, Store};

use crate::auth::AdminAuth;
use crate::error::ApiError;
use crate::state::AppState;

fn default_limit() -> i64 {
    100
}

/// Offset/limit pagination parameters.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    /// Rows to skip.
    #[serde(default)]
    pub offset: i64,
    /// Maximum rows to return.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// Catalog search parameters.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Case-insensitive substring matched against name/description/address.
    pub query: Option<String>,
    /// Exact point category label.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Exact city name.
    pub city: Option<String>,
    /// Exact region name.
    pub region: Option<String>,
    /// Inclusive lower bound on rating.
    pub min_rating: Option<f64>,
    /// Rows to skip.
    #[serde(default)]
    pub offset: i64,
    /// Maximum rows to return.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// List water points with pagination.
pub async fn list_points(
    State(state): State<Arc<AppState>>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<WaterPoint>>, ApiError> {
    let points = state.store.list_points(page.offset, page.limit).await?;
    Ok(Json(points))
}

/// Search water points by substring, exact filters, and minimum rating.
pub async fn search_points(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<WaterPoint>>, ApiError> {
    let filter = PointFilter {
        query: params.query,
        kind: params.kind,
        city: params.city,
        region: params.region,
        min_rating: params.min_rating,
        offset: params.offset,
        limit: params.limit,
    };

    let points = state.store.search_points(&filter).await?;
    Ok(Json(points))
}

/// Fetch one water point by id.
pub async fn get_point(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PointId>,
) -> Result<Json<WaterPoint>, ApiError> {
    let point = state
        .store
        .get_point(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("water point not found: {id}")))?;

    Ok(Json(point))
}

/// Create a new water point.
pub async fn create_point(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
    Json(draft): Json<WaterPointDraft>,
) -> Result<Json<WaterPoint>, ApiError> {
    let point = state.store.create_point(&draft).await?;

    tracing::info!(
        point_id = %point.id,
        name = %point.name,
        admin = %admin.username,
        "Water point created"
    );

    Ok(Json(point))
}

/// Fully replace a water point's fields.
pub async fn update_point(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
    Path(id): Path<PointId>,
    Json(draft): Json<WaterPointDraft>,
) -> Result<Json<WaterPoint>, ApiError> {
    let point = state.store.update_point(id, &draft).await?;

    tracing::info!(point_id = %id, admin = %admin.username, "Water point updated");

    Ok(Json(point))
}

/// Delete a water point.
pub async fn delete_point(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
    Path(id): Path<PointId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.delete_point(id).await?;

    tracing::info!(point_id = %id, admin = %admin.username, "Water point deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}
