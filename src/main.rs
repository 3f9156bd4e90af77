// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::application::dashboard_service::DashboardService;
use crate::application::point_of_sale_service::PointOfSaleService;
use crate::infrastructure::config::{load_engine_config, load_upstream_config};
use crate::infrastructure::http_repository::HttpReadingRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{get_dashboard, health_check, list_points_of_sale};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let upstream_config = load_upstream_config()?;
    let engine_config = load_engine_config()?;
    let engine_settings = engine_config.engine;

    // Create repository (infrastructure layer)
    let repository = Arc::new(HttpReadingRepository::new(
        upstream_config.upstream.host,
        upstream_config.upstream.token,
    ));

    // Create services (application layer)
    let point_of_sale_service = PointOfSaleService::new(repository.clone());
    let dashboard_service = DashboardService::new(
        repository.clone(),
        engine_settings.inference.build(),
        engine_settings.staleness_ms,
    );

    // Create application state
    let state = Arc::new(AppState {
        point_of_sale_service,
        dashboard_service,
        engine_settings,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/points-of-sale", get(list_points_of_sale))
        .route("/dashboard", get(get_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = "0.0.0.0:8080".parse().unwrap();
    println!("Starting waterpoint-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
