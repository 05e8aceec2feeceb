//! Server write endpoint.
//!
//! `POST /api/submit` inserts one `{name, age}` document using the service
//! credentials. The body is parsed by hand so that malformed JSON gets the
//! same error body as every other failure.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use profile_hub_core::age_from_f64;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::AppState;

/// Request body. `age` may be a JSON number or a numeric string.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub name: String,
    pub age: Value,
}

/// Success body.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
}

/// Error body.
#[derive(Debug, Serialize)]
pub struct SubmitError {
    pub error: &'static str,
}

impl IntoResponse for SubmitError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

const SAVE_FAILED: SubmitError = SubmitError {
    error: "Error saving data",
};

/// Interpret the submitted age as a non-negative whole number.
fn parse_age(age: &Value) -> Option<u32> {
    match age {
        Value::Number(n) => match n.as_u64() {
            Some(n) => u32::try_from(n).ok(),
            None => n.as_f64().and_then(age_from_f64),
        },
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Insert a name and age with service credentials.
///
/// # Route
///
/// `POST /api/submit`
pub async fn submit(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmitResponse>, SubmitError> {
    let request: SubmitRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "rejected malformed submit body");
        SAVE_FAILED
    })?;

    let Some(age) = parse_age(&request.age) else {
        tracing::warn!(age = %request.age, "rejected submit with invalid age");
        return Err(SAVE_FAILED);
    };

    match state.records().submit(request.name, age).await {
        Ok(id) => {
            tracing::info!(id = %id, "saved submitted profile");
            Ok(Json(SubmitResponse { success: true }))
        }
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "failed to save submitted profile");
            Err(SAVE_FAILED)
        }
    }
}
