use crate::config::AppConfig;
use crate::details::CollisionDetails;
use crate::error::AnalyticsError;
use crate::grid;
use crate::index::PointIndex;
use crate::types::{GridCell, PointRecord, ViewportAggregate};
use crate::viewport::{self, Viewport};
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

pub struct AppState {
    pub points: Vec<PointRecord>,
    pub index: PointIndex,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig, points: Vec<PointRecord>) -> Self {
        info!("Building spatial index for {} records...", points.len());
        let index = PointIndex::build(&points);
        info!("Spatial index built with {} located points", index.len());
        Self {
            points,
            index,
            config,
        }
    }
}

#[derive(Deserialize)]
pub struct GridParams {
    cell_size: Option<f64>,
}

#[derive(Deserialize)]
pub struct SummaryParams {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
    top_n: Option<usize>,
}

#[derive(Deserialize)]
pub struct PickParams {
    lon: f64,
    lat: f64,
}

pub struct ApiError(AnalyticsError);

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AnalyticsError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .route("/api/grid", get(grid_handler))
        .route("/api/summary", get(summary_handler))
        .route("/api/collision", get(collision_handler))
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: AppConfig, points: Vec<PointRecord>) -> Result<()> {
    let port = config.server.port;
    let state = Arc::new(AppState::new(config, points));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn grid_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GridParams>,
) -> Result<Json<Vec<GridCell>>, ApiError> {
    let cell_size = params.cell_size.unwrap_or(state.config.grid.cell_size);
    let cells = grid::aggregate(&state.points, cell_size)?;
    Ok(Json(cells))
}

async fn summary_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<ViewportAggregate>, ApiError> {
    let dashboard = &state.config.dashboard;
    let bounds = Viewport::new(params.west, params.south, params.east, params.north);
    let summary = viewport::summarize_indexed(
        &state.index,
        &state.points,
        &bounds,
        &dashboard.category_fields,
        params.top_n.unwrap_or(dashboard.top_n),
    )?;
    Ok(Json(summary))
}

async fn collision_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PickParams>,
) -> Json<Option<CollisionDetails>> {
    let picked = state
        .index
        .nearest(params.lon, params.lat, state.config.server.pick_radius)
        .and_then(|i| state.points.get(i))
        .map(CollisionDetails::from_record);

    Json(picked)
}
