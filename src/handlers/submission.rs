use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::VerifiedOwner;
use crate::services::submission;
use crate::AppState;

/// Payload fields a save must carry as non-empty strings
const REQUIRED_FIELDS: [&str; 6] = [
    "name",
    "category",
    "description",
    "bannerImage",
    "ownerName",
    "ownerPhone",
];

/// GET /api/submission - the owner's current submission, or null
pub async fn get(
    State(state): State<AppState>,
    Extension(owner): Extension<VerifiedOwner>,
) -> Result<Json<Value>, ApiError> {
    let row = submission::fetch_current(state.store.as_ref(), &owner.email).await?;
    Ok(Json(json!({ "submission": row })))
}

/// POST/PUT /api/submission - create-or-replace the owner's submission
pub async fn save(
    State(state): State<AppState>,
    Extension(owner): Extension<VerifiedOwner>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(payload) = body.map_err(|rejection| ApiError::invalid_json(rejection.body_text()))?;

    let missing = missing_fields(&payload);
    if !missing.is_empty() {
        return Err(ApiError::missing_fields(missing));
    }

    let saved = submission::save(state.store.as_ref(), &owner.email, payload).await?;
    Ok(Json(json!({ "ok": true, "submission": saved })))
}

/// DELETE /api/submission - remove every row for the owner
pub async fn delete(
    State(state): State<AppState>,
    Extension(owner): Extension<VerifiedOwner>,
) -> Result<Json<Value>, ApiError> {
    let deleted = submission::delete_all(state.store.as_ref(), &owner.email).await?;
    Ok(Json(json!({ "ok": true, "deleted": deleted })))
}

/// Required fields absent or blank in the payload, in declaration order.
fn missing_fields(payload: &Value) -> Vec<String> {
    REQUIRED_FIELDS
        .iter()
        .filter(|field| {
            !matches!(
                payload.get(**field).and_then(Value::as_str),
                Some(s) if !s.trim().is_empty()
            )
        })
        .map(|field| (*field).to_string())
        .collect()
}
