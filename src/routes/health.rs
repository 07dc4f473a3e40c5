use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::error;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DbStatusResponse {
    pub status: &'static str,
    pub backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// 500 when the user store does not answer.
pub async fn db_status(
    State(state): State<AppState>,
) -> Result<Json<DbStatusResponse>, (StatusCode, Json<DbStatusResponse>)> {
    let backend = state.store.backend();
    match state.store.ping().await {
        Ok(()) => Ok(Json(DbStatusResponse {
            status: "connected",
            backend,
            message: None,
        })),
        Err(e) => {
            error!(error = ?e, backend, "store ping failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DbStatusResponse {
                    status: "error",
                    backend,
                    message: Some("Database unavailable".into()),
                }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_ok() {
        let Json(body) = health().await;
        assert_eq!(body.status, "ok");
        assert!(!body.version.is_empty());
    }

    #[tokio::test]
    async fn test_db_status_with_memory_store() {
        let Json(body) = db_status(State(AppState::fake())).await.unwrap();
        assert_eq!(body.status, "connected");
        assert_eq!(body.backend, "memory");
    }
}
