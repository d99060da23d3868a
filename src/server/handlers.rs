use crate::diagnosis::{diagnose, Diagnosis};
use crate::server::state::AppState;
use crate::server::ServiceError;

use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Deserialize)]
pub struct DiagnoseRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct SymptomsResponse {
    pub symptoms: Vec<String>,
}

pub async fn diagnose_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Diagnosis>, ServiceError> {
    let request: DiagnoseRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("Rejected request body: {}", e);
        ServiceError::BadRequest("Invalid JSON body".to_string())
    })?;

    let message = request
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ServiceError::BadRequest("No message provided".to_string()))?;

    // inference is CPU bound, keep it off the async workers
    let diagnosis = tokio::task::spawn_blocking(move || diagnose(&message, &state.kb, &state.network))
        .await
        .map_err(|e| {
            tracing::error!("Diagnosis task failed: {}", e);
            ServiceError::InternalError(e.to_string())
        })?
        .map_err(|e| {
            tracing::error!("Diagnosis failed: {}", e);
            ServiceError::InternalError(e.to_string())
        })?;

    Ok(Json(diagnosis))
}

pub async fn symptoms_handler(State(state): State<AppState>) -> Json<SymptomsResponse> {
    Json(SymptomsResponse {
        symptoms: state.kb.sorted_symptoms(),
    })
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
