// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! UniMark API Server
//!
//! Geofenced attendance: faculty open coded sessions, students check in from
//! inside the session area.

use chrono::Utc;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unimark::{
    config::{Config, StorageBackend},
    db::{seed::seed_demo_data, AttendanceStore, FirestoreDb, MemoryStore},
    services::credentials::hash_password,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        backend = ?config.storage_backend,
        "Starting UniMark API"
    );

    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            serve(config, MemoryStore::new()).await
        }
        StorageBackend::Firestore => {
            let db = FirestoreDb::new(&config.gcp_project_id).await?;
            serve(config, db).await
        }
    }
}

async fn serve<S: AttendanceStore>(
    config: Config,
    store: S,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.seed_demo_data {
        if let Some(password) = &config.demo_password {
            let hash = hash_password(password, &config.password_pepper)?;
            seed_demo_data(&store, &hash, Utc::now()).await?;
        }
    }

    let port = config.port;
    let state = Arc::new(AppState::new(config, Arc::new(store)));

    // Build router
    let app = unimark::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("unimark=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
