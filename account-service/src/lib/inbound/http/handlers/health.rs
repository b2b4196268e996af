use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiSuccess;
use crate::inbound::http::router::AppState;

const DATABASE_PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Liveness report. Always answers 200; the body carries the verdict.
pub async fn health(State(state): State<AppState>) -> ApiSuccess<HealthData> {
    let database = match tokio::time::timeout(DATABASE_PING_TIMEOUT, state.health_probe.ping()).await
    {
        Ok(Ok(())) => "healthy",
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Database health check failed");
            "unhealthy"
        }
        Err(_) => {
            tracing::warn!(
                timeout_secs = DATABASE_PING_TIMEOUT.as_secs(),
                "Database health check timed out"
            );
            "timeout"
        }
    };

    let status = if database == "healthy" {
        "healthy"
    } else {
        "unhealthy"
    };

    ApiSuccess::new(
        StatusCode::OK,
        HealthData {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: state.environment.as_str().to_string(),
            database: database.to_string(),
        },
    )
}

/// Readiness report; answers as soon as the router is serving.
pub async fn ready() -> ApiSuccess<ReadyData> {
    ApiSuccess::new(
        StatusCode::OK,
        ReadyData {
            status: "ready".to_string(),
        },
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub database: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadyData {
    pub status: String,
}
