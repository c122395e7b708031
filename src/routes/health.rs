use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub form: FormHealth,
    pub csrf: String,
}

#[derive(Serialize)]
pub struct FormHealth {
    pub name: String,
    pub fields: usize,
}

/// GET /health — liveness plus a summary of what the service was built with.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            form: FormHealth {
                name: state.form.name.to_string(),
                fields: state.form.fields.len(),
            },
            csrf: if state.csrf_enabled {
                "enabled".to_string()
            } else {
                "disabled".to_string()
            },
        },
    })
}
