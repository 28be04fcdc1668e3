use std::time::Duration;

use af_core::config::KycServicesConfig;
use af_core::ports::{ApiError, DigiLockerPort, PanDetails, PanLookupPort};
use af_core::AadhaarIdentity;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::response::{read_json, require_success, transport};

const PAN_DETAILS: &str = "pan_details";
const DIGILOCKER: &str = "digilockeraadhaardetails";

/// Client for the third-party PAN lookup and DigiLocker services.
///
/// Both speak form-encoded POSTs authenticated with the service token, and
/// identify the calling merchant with `user_id = client_user_id`.
pub struct HttpKycServices {
    client: Client,
    base_url: String,
    client_user_id: String,
    auth_token: String,
}

impl HttpKycServices {
    pub fn new(config: &KycServicesConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("build kyc services http client failed")?;
        if config.auth_token.is_empty() {
            warn!("KYC services token is empty; PAN and DigiLocker calls will be rejected");
        }
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_user_id: config.client_user_id.clone(),
            auth_token: config.auth_token.clone(),
        })
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<Value, ApiError> {
        debug!(path, "POST form");
        let mut fields = vec![("user_id", self.client_user_id.as_str())];
        fields.extend_from_slice(form);

        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .header(AUTHORIZATION, format!("Bearer {}", self.auth_token))
            .form(&fields)
            .send()
            .await
            .map_err(transport)?;
        require_success(read_json(response).await?)
    }
}

#[async_trait]
impl PanLookupPort for HttpKycServices {
    #[instrument(skip_all)]
    async fn lookup(&self, pan: &str) -> Result<PanDetails, ApiError> {
        let raw = self.post_form(PAN_DETAILS, &[("pan_number", pan)]).await?;
        let name = ["data", "result"]
            .iter()
            .filter_map(|key| raw.get(*key))
            .chain(std::iter::once(&raw))
            .find_map(|v| v.get("name").and_then(Value::as_str))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        Ok(PanDetails { name, raw })
    }
}

#[async_trait]
impl DigiLockerPort for HttpKycServices {
    #[instrument(skip(self))]
    async fn create_authorization_url(&self, callback_url: &str) -> Result<String, ApiError> {
        let body = self
            .post_form(
                DIGILOCKER,
                &[("task", "createurl"), ("callbackurl", callback_url)],
            )
            .await?;
        body.get("data")
            .and_then(|data| data.get("url"))
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::Decode("DigiLocker returned no authorization url".into()))
    }

    #[instrument(skip(self))]
    async fn fetch_eaadhaar(&self, request_id: &str) -> Result<AadhaarIdentity, ApiError> {
        let body = self
            .post_form(
                DIGILOCKER,
                &[("task", "getEaadhaar"), ("requistID", request_id)],
            )
            .await?;

        let data = body.get("data").filter(|d| d.is_object());
        match data {
            Some(data) if is_truthy(body.get("status")) => Ok(AadhaarIdentity::from_value(data)),
            _ => Err(ApiError::Rejected(
                body.get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Invalid response from DigiLocker API")
                    .to_string(),
            )),
        }
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_i64() != Some(0),
        Some(Value::String(s)) => !matches!(s.to_ascii_lowercase().as_str(), "" | "false" | "0"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn services(server: &Server) -> HttpKycServices {
        HttpKycServices::new(&KycServicesConfig {
            base_url: format!("{}/", server.url()),
            client_user_id: "merchant-1".into(),
            auth_token: "svc-token".into(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn pan_lookup_posts_form_and_reads_name() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/pan_details")
            .match_header("authorization", "Bearer svc-token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("pan_number".into(), "ABCDE1234F".into()),
                Matcher::UrlEncoded("user_id".into(), "merchant-1".into()),
            ]))
            .with_body(r#"{"status":true,"data":{"name":" ASHA RAO "}}"#)
            .create_async()
            .await;

        let details = services(&server).lookup("ABCDE1234F").await.unwrap();

        assert_eq!(details.name.as_deref(), Some("ASHA RAO"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn pan_lookup_without_name_is_not_an_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/pan_details")
            .with_body(r#"{"status":true,"data":{}}"#)
            .create_async()
            .await;

        let details = services(&server).lookup("ABCDE1234F").await.unwrap();
        assert_eq!(details.name, None);
    }

    #[tokio::test]
    async fn createurl_returns_data_url() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/digilockeraadhaardetails")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("task".into(), "createurl".into()),
                Matcher::UrlEncoded(
                    "callbackurl".into(),
                    "http://relay/api/verify-aadhaar-webhook?user_id=7".into(),
                ),
            ]))
            .with_body(r#"{"status":true,"data":{"url":"https://digilocker/authorize?x=1"}}"#)
            .create_async()
            .await;

        let url = services(&server)
            .create_authorization_url("http://relay/api/verify-aadhaar-webhook?user_id=7")
            .await
            .unwrap();
        assert_eq!(url, "https://digilocker/authorize?x=1");
    }

    #[tokio::test]
    async fn get_eaadhaar_maps_identity() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/digilockeraadhaardetails")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("task".into(), "getEaadhaar".into()),
                Matcher::UrlEncoded("requistID".into(), "req-9".into()),
            ]))
            .with_body(
                r#"{"status":true,"statusCode":200,"data":{"userName":"Asha Rao","maskedAadhaarNo":"xxxxxxxx1234","DOB":"01-01-1990","gender":"F"}}"#,
            )
            .create_async()
            .await;

        let identity = services(&server).fetch_eaadhaar("req-9").await.unwrap();
        assert_eq!(identity.name, "Asha Rao");
        assert_eq!(identity.aadhaar_number, "xxxxxxxx1234");
        assert_eq!(identity.dob.as_deref(), Some("01-01-1990"));
    }

    #[tokio::test]
    async fn get_eaadhaar_without_status_is_rejected() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/digilockeraadhaardetails")
            .with_body(r#"{"status":false,"message":"Request expired"}"#)
            .create_async()
            .await;

        let err = services(&server).fetch_eaadhaar("req-9").await.unwrap_err();
        assert_eq!(err, ApiError::Rejected("Request expired".into()));
    }

    #[test]
    fn truthiness_of_status_field() {
        assert!(is_truthy(Some(&Value::Bool(true))));
        assert!(is_truthy(Some(&serde_json::json!("true"))));
        assert!(!is_truthy(Some(&serde_json::json!("false"))));
        assert!(!is_truthy(Some(&serde_json::json!(0))));
        assert!(!is_truthy(None));
    }
}
