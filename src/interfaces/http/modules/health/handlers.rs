//! Health check handler

use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::infrastructure::database::ping;

pub const DATABASE_CHECK: &str = "Base de dados padrão.";

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    pub db: DatabaseConnection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// One checked dependency
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckEntry {
    pub check: String,
    pub error_message: Option<String>,
    pub status: HealthStatus,
    pub duration_ms: u64,
}

/// Aggregate report; unhealthy if any entry is
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status_application: HealthStatus,
    pub health_checks: Vec<HealthCheckEntry>,
}

#[utoipa::path(
    get,
    path = "/application/healthcheck",
    tag = "Health",
    responses(
        (status = 200, description = "All checks healthy", body = HealthReport),
        (status = 503, description = "At least one check failed", body = HealthReport)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthReport>) {
    let started = Instant::now();
    let database = match ping(&state.db).await {
        Ok(()) => HealthCheckEntry {
            check: DATABASE_CHECK.to_string(),
            error_message: None,
            status: HealthStatus::Healthy,
            duration_ms: started.elapsed().as_millis() as u64,
        },
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            HealthCheckEntry {
                check: DATABASE_CHECK.to_string(),
                error_message: Some(e.to_string()),
                status: HealthStatus::Unhealthy,
                duration_ms: started.elapsed().as_millis() as u64,
            }
        }
    };

    let checks = vec![database];
    let overall = if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy
    };
    let http_status = match overall {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        http_status,
        Json(HealthReport {
            status_application: overall,
            health_checks: checks,
        }),
    )
}
