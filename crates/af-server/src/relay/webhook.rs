//! DigiLocker authorization callback.
//!
//! Reached as a browser redirect (`GET`, answered with a small HTML page) or
//! a server callback (`POST`, answered with JSON). Either way the outcome
//! ends up as a status record for the polling client.

use af_core::verification::StoreRequest;
use af_core::{AadhaarOutcome, FailureReason, UserId};
use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{debug, info, info_span, warn, Instrument};

use super::params::{first_of, merge_body, parse_query, redacted_headers, Params};
use super::RelayState;

const REQUEST_ID_KEYS: &[&str] = &[
    "requestId",
    "requestid",
    "requistID",
    "requistId",
    "reqid",
    "request_id",
    "state",
];
const STATUS_KEYS: &[&str] = &["status", "confirmAuthorization"];
const USER_ID_KEYS: &[&str] = &["user_id", "userId"];

const AUTHORIZATION_FAILED: &str = "DigiLocker authorization failed";
const FETCH_FAILED: &str = "Failed to fetch Aadhaar details from DigiLocker";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Html,
    Json,
}

#[derive(Debug, PartialEq, Eq)]
enum Callback {
    MissingRequestId,
    MissingUserId,
    Denied,
    FetchFailed(String),
    Verified,
}

pub(super) async fn callback_get(
    State(state): State<RelayState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let params = parse_query(query.as_deref());
    handle(&state, Reply::Html, None, params, &headers).await
}

pub(super) async fn callback_get_for_user(
    State(state): State<RelayState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let params = parse_query(query.as_deref());
    handle(&state, Reply::Html, Some(user_id), params, &headers).await
}

pub(super) async fn callback_post(
    State(state): State<RelayState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let mut params = parse_query(query.as_deref());
    merge_body(&mut params, &body);
    handle(&state, Reply::Json, None, params, &headers).await
}

pub(super) async fn callback_post_for_user(
    State(state): State<RelayState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let mut params = parse_query(query.as_deref());
    merge_body(&mut params, &body);
    handle(&state, Reply::Json, Some(user_id), params, &headers).await
}

async fn handle(
    state: &RelayState,
    reply: Reply,
    path_user: Option<String>,
    params: Params,
    headers: &HeaderMap,
) -> Response {
    let span = info_span!("relay.webhook", ?reply);

    async {
        debug!(
            headers = ?redacted_headers(headers),
            keys = ?params.keys().collect::<Vec<_>>(),
            "DigiLocker callback received"
        );
        let outcome = process(state, path_user, &params).await;
        render(reply, outcome)
    }
    .instrument(span)
    .await
}

async fn process(state: &RelayState, path_user: Option<String>, params: &Params) -> Callback {
    let Some(request_id) = first_of(params, REQUEST_ID_KEYS) else {
        warn!("Callback without request id");
        return Callback::MissingRequestId;
    };
    let user_id = path_user
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .or_else(|| first_of(params, USER_ID_KEYS));
    let Some(user_id) = user_id.map(UserId::from) else {
        warn!("Callback without user id");
        return Callback::MissingUserId;
    };

    // An explicit "false" is a denial; no status at all means DigiLocker
    // only sent the request id, which it does on success.
    let denied = first_of(params, STATUS_KEYS).is_some_and(|s| s.eq_ignore_ascii_case("false"));
    if denied {
        info!(user_id = %user_id, "DigiLocker authorization denied");
        store_failure(state, &user_id, FailureReason::AuthorizationFailed, AUTHORIZATION_FAILED).await;
        return Callback::Denied;
    }

    match state.digilocker.fetch_eaadhaar(&request_id).await {
        Ok(identity) => {
            let (record, _) = AadhaarOutcome::Verified(identity).to_status_record();
            state.store.put(&user_id, record).await;
            info!(user_id = %user_id, "Aadhaar details stored");
            Callback::Verified
        }
        Err(err) => {
            warn!(user_id = %user_id, error = %err, "Fetching e-Aadhaar failed");
            store_failure(state, &user_id, FailureReason::VerificationFailed, FETCH_FAILED).await;
            Callback::FetchFailed(err.user_message(FETCH_FAILED))
        }
    }
}

async fn store_failure(state: &RelayState, user_id: &UserId, reason: FailureReason, message: &str) {
    let (record, _) = AadhaarOutcome::Failed(reason, Some(message.to_string())).to_status_record();
    let request = StoreRequest {
        aadhaar_data: Some(record),
        is_failed: true,
    };
    if let Some(record) = request.into_record() {
        state.store.put(user_id, record).await;
    }
}

fn render(reply: Reply, outcome: Callback) -> Response {
    match reply {
        Reply::Json => render_json(outcome),
        Reply::Html => render_html(outcome),
    }
}

fn render_json(outcome: Callback) -> Response {
    let (status, body) = match outcome {
        Callback::MissingRequestId => (
            StatusCode::BAD_REQUEST,
            json!({ "success": false, "error": "Missing required field: requestId" }),
        ),
        Callback::MissingUserId => (
            StatusCode::BAD_REQUEST,
            json!({ "success": false, "error": "Missing required parameter: user_id" }),
        ),
        Callback::Denied => (
            StatusCode::OK,
            json!({
                "success": false,
                "error": AUTHORIZATION_FAILED,
                "message": "Authorization was cancelled or failed. Please try again.",
            }),
        ),
        Callback::FetchFailed(message) => (
            StatusCode::OK,
            json!({
                "success": false,
                "error": "Failed to fetch Aadhaar details",
                "message": message,
            }),
        ),
        Callback::Verified => (
            StatusCode::OK,
            json!({ "success": true, "message": "Aadhaar details fetched and stored" }),
        ),
    };
    (status, Json(body)).into_response()
}

fn render_html(outcome: Callback) -> Response {
    let (status, title, detail) = match outcome {
        Callback::MissingRequestId => (
            StatusCode::BAD_REQUEST,
            "Missing requestId",
            "DigiLocker did not provide a requestId.".to_string(),
        ),
        Callback::MissingUserId => (
            StatusCode::BAD_REQUEST,
            "Missing user_id",
            "Callback did not include user_id query param.".to_string(),
        ),
        Callback::Denied => (
            StatusCode::OK,
            "Authorization Failed",
            "DigiLocker authorization was cancelled or failed. Please try again.".to_string(),
        ),
        Callback::FetchFailed(message) => (
            StatusCode::OK,
            "Verification Failed",
            format!("Could not retrieve Aadhaar details from DigiLocker. Error: {message}"),
        ),
        Callback::Verified => (
            StatusCode::OK,
            "Verification Complete",
            "You can close this window and return to the auction.".to_string(),
        ),
    };
    let page = format!(
        "<html><body><h1>{}</h1><p>{}</p></body></html>",
        escape_html(title),
        escape_html(&detail)
    );
    (status, Html(page)).into_response()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
