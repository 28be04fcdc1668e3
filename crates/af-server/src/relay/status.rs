use af_core::verification::{StatusResponse, StoreRequest};
use af_core::UserId;
use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::Json;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::params::{first_of, parse_query};
use super::{RelayError, RelayState};

fn user_id_from(query: Option<&str>) -> Result<UserId, RelayError> {
    first_of(&parse_query(query), &["user_id"])
        .map(UserId::from)
        .ok_or_else(|| RelayError::BadRequest("user_id is required".into()))
}

/// `GET`: hands out the pending record, if any, and forgets it.
pub(super) async fn take_status(
    State(state): State<RelayState>,
    RawQuery(query): RawQuery,
) -> Result<Json<StatusResponse>, RelayError> {
    let user_id = user_id_from(query.as_deref())?;
    let response = match state.store.take(&user_id).await {
        Some(record) => {
            info!(user_id = %user_id, "Verification record handed out");
            StatusResponse::found(record)
        }
        None => {
            debug!(user_id = %user_id, "No verification record pending");
            StatusResponse::empty()
        }
    };
    Ok(Json(response))
}

/// `POST`: stores `{aadhaarData, isFailed}` for the user, replacing any
/// record still pending.
pub(super) async fn store_status(
    State(state): State<RelayState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Json<Value>, RelayError> {
    let user_id = user_id_from(query.as_deref())?;
    let request: StoreRequest = serde_json::from_slice(&body)
        .map_err(|err| RelayError::BadRequest(format!("Invalid request body: {err}")))?;
    let is_failed = request.is_failed;
    let record = request
        .into_record()
        .ok_or_else(|| RelayError::BadRequest("aadhaarData is required".into()))?;

    state.store.put(&user_id, record).await;
    info!(user_id = %user_id, is_failed, "Verification record stored");

    Ok(Json(json!({
        "success": true,
        "message": "Verification data stored",
    })))
}
