use af_core::ports::ApiError;
use reqwest::Response;
use serde_json::Value;

const MAX_ERROR_BODY: usize = 512;

pub(crate) fn transport(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Transport("request timed out".to_string())
    } else {
        ApiError::Transport(err.to_string())
    }
}

/// Reads a JSON body. Non-2xx statuses and non-JSON bodies are errors.
pub(crate) async fn read_json(response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    let body = response.text().await.map_err(transport)?;

    if !status.is_success() {
        let mut body = body;
        if body.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            body.truncate(cut);
        }
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))
}

/// Turns an explicit `success: false` into [`ApiError::Rejected`].
pub(crate) fn require_success(body: Value) -> Result<Value, ApiError> {
    if body.get("success").and_then(Value::as_bool) != Some(false) {
        return Ok(body);
    }
    let message = ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();
    Err(ApiError::Rejected(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_false_is_rejected_with_message() {
        let err = require_success(json!({ "success": false, "message": "OTP expired" })).unwrap_err();
        assert_eq!(err, ApiError::Rejected("OTP expired".into()));

        let err = require_success(json!({ "success": false, "error": "Bid too low" })).unwrap_err();
        assert_eq!(err, ApiError::Rejected("Bid too low".into()));
    }

    #[test]
    fn bodies_without_flag_pass() {
        assert!(require_success(json!([1, 2])).is_ok());
        assert!(require_success(json!({ "success": true })).is_ok());
    }
}
