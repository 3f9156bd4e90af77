// HTTP request handlers
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub hours: Option<i32>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List all points of sale
pub async fn list_points_of_sale(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.point_of_sale_service.list_points_of_sale().await {
        Ok(points_of_sale) => Json(points_of_sale).into_response(),
        Err(e) => {
            tracing::error!("Error fetching points of sale: {:#}", e);
            // Return empty list on error
            Json(Vec::<crate::domain::point_of_sale::PointOfSale>::new()).into_response()
        }
    }
}

/// Run an evaluation pass and return the dashboard snapshot
pub async fn get_dashboard(
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let hours = query.hours.unwrap_or(6);
    let client = state.engine_settings.client.as_deref();

    match state.dashboard_service.evaluate(hours, client).await {
        Ok(Some(dashboard)) => Json(dashboard.as_ref().clone()).into_response(),
        // Superseded by a newer pass; serve whatever that pass committed.
        Ok(None) => match state.dashboard_service.latest().await {
            Some(dashboard) => Json(dashboard.as_ref().clone()).into_response(),
            None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        },
        Err(e) => {
            tracing::error!("Evaluation pass failed: {:#}", e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}
