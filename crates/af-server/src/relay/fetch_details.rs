use af_core::ports::ApiError;
use af_core::AadhaarIdentity;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::params::{first_of, parse_query};
use super::{RelayError, RelayState};

/// `GET ?requestId=&userId=`: fetches the e-Aadhaar for a request id on
/// behalf of the browser, in DigiLocker's own response shape.
pub(super) async fn fetch_aadhaar_details(
    State(state): State<RelayState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Value>, RelayError> {
    let params = parse_query(query.as_deref());
    let request_id = first_of(&params, &["requestId"])
        .ok_or_else(|| RelayError::BadRequest("Missing or invalid requestId".into()))?;
    let user_id = first_of(&params, &["userId"])
        .ok_or_else(|| RelayError::BadRequest("Missing or invalid userId".into()))?;

    match state.digilocker.fetch_eaadhaar(&request_id).await {
        Ok(identity) => {
            info!(user_id = %user_id, "Aadhaar details fetched");
            Ok(Json(json!({
                "status": true,
                "statusCode": 200,
                "data": digilocker_shape(&identity),
            })))
        }
        Err(ApiError::Rejected(message)) => {
            info!(user_id = %user_id, %message, "DigiLocker rejected the request");
            Ok(Json(json!({
                "status": false,
                "success": false,
                "message": message,
            })))
        }
        Err(ApiError::Status { status, .. }) => {
            warn!(user_id = %user_id, status, "DigiLocker returned an error status");
            Err(RelayError::Upstream(
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            ))
        }
        Err(err) => {
            warn!(user_id = %user_id, error = %err, "Fetching Aadhaar details failed");
            Err(RelayError::Internal("Failed to fetch Aadhaar details".into()))
        }
    }
}

fn digilocker_shape(identity: &AadhaarIdentity) -> Value {
    json!({
        "userName": identity.name,
        "maskedAadhaarNo": identity.aadhaar_number,
        "DOB": identity.dob,
        "gender": identity.gender,
        "address": identity.address,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_reads_back_as_the_same_identity() {
        let identity = AadhaarIdentity {
            name: "Asha Rao".into(),
            aadhaar_number: "xxxx1234".into(),
            dob: Some("01-01-1990".into()),
            gender: None,
            address: json!({ "dist": "Pune" }),
        };
        assert_eq!(AadhaarIdentity::from_value(&digilocker_shape(&identity)), identity);
    }
}
