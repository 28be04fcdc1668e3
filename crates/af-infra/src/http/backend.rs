use std::sync::Arc;
use std::time::Duration;

use af_core::bid::BidRequest;
use af_core::config::ApiConfig;
use af_core::enquiry::{EnquiryRequest, UpdateUserRequest};
use af_core::listings::ListingsQuery;
use af_core::ports::{AccessTokenPort, ApiError, BackendApiPort};
use af_core::{DocumentFile, ItemId, UserId};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::response::{read_json, require_success, transport};

/// `reqwest` gateway to the storefront REST API.
///
/// The bearer token is read from the [`AccessTokenPort`] on every request, so
/// a login or logout takes effect immediately.
pub struct HttpBackendApi {
    client: Client,
    base_url: String,
    tokens: Arc<dyn AccessTokenPort>,
}

impl HttpBackendApi {
    pub fn new(config: &ApiConfig, tokens: Arc<dyn AccessTokenPort>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build backend http client failed")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.access_token().await {
            Some(token) if !token.is_empty() => {
                request.header(AUTHORIZATION, format!("bearer {token}"))
            }
            _ => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = self
            .authorize(request)
            .await
            .send()
            .await
            .map_err(transport)?;
        require_success(read_json(response).await?)
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        debug!(path, "GET");
        self.send(self.client.get(self.url(path)).query(query)).await
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<Value, ApiError> {
        debug!(path, "POST");
        self.send(self.client.post(self.url(path)).query(query).json(body))
            .await
    }
}

#[async_trait]
impl BackendApiPort for HttpBackendApi {
    #[instrument(skip(self, phone))]
    async fn send_otp(&self, phone: &str) -> Result<Value, ApiError> {
        self.post("auth/send-otp", &[], &json!({ "phone": phone }))
            .await
    }

    #[instrument(skip(self, phone, otp))]
    async fn login(&self, phone: &str, otp: &str) -> Result<Value, ApiError> {
        let body = json!({
            "login_type": "otpLogin",
            "role": "buyer",
            "otp_code": otp,
            "phone": phone,
        });
        self.post("auth/login", &[], &body).await
    }

    #[instrument(skip(self), fields(page = query.page))]
    async fn fetch_listings(&self, query: &ListingsQuery) -> Result<Value, ApiError> {
        self.get("home/1/details", &query.to_query_pairs()).await
    }

    #[instrument(skip(self))]
    async fn fetch_item_details(&self, item_id: &ItemId) -> Result<Value, ApiError> {
        self.get(&format!("auctions/item-details/{item_id}"), &[])
            .await
    }

    #[instrument(skip(self))]
    async fn fetch_filters_data(&self) -> Result<Value, ApiError> {
        self.get("home/filters-data", &[]).await
    }

    #[instrument(skip(self, request), fields(item_id = %request.item_id))]
    async fn submit_enquiry(&self, request: &EnquiryRequest) -> Result<Value, ApiError> {
        self.post("auctions/submit-enquiry", &[], request).await
    }

    #[instrument(skip(self, request), fields(user_id = %request.id))]
    async fn update_user(&self, request: &UpdateUserRequest) -> Result<Value, ApiError> {
        self.post("users/update-user", &[], request).await
    }

    #[instrument(skip(self, request), fields(item_id = %request.item_id))]
    async fn place_bid(&self, user_id: &UserId, request: &BidRequest) -> Result<Value, ApiError> {
        self.post(
            "auctions/bid",
            &[("user_id", user_id.to_string())],
            request,
        )
        .await
    }

    #[instrument(skip(self, file), fields(file = %file.file_name, size = file.len()))]
    async fn upload_file(&self, user_id: &UserId, file: &DocumentFile) -> Result<String, ApiError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        let request = self
            .client
            .post(self.url("auctions/upload-file"))
            .query(&[("user_id", user_id.to_string())])
            .multipart(Form::new().part("file", part));

        let body = self.send(request).await?;
        file_reference(&body)
            .ok_or_else(|| ApiError::Decode("upload response carries no file reference".into()))
    }
}

/// The stored file reference: `result` as a string, or a `url` under
/// `result` / `data`.
fn file_reference(body: &Value) -> Option<String> {
    match body.get("result") {
        Some(Value::String(reference)) if !reference.is_empty() => Some(reference.clone()),
        _ => ["result", "data"].iter().find_map(|key| {
            body.get(*key)
                .and_then(|v| v.get("url").or_else(|| v.get("file_url")))
                .and_then(Value::as_str)
                .map(str::to_string)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_core::listings::ListingFilters;
    use af_core::AuctionStatus;
    use mockito::{Matcher, Server};

    struct StaticToken(Option<&'static str>);

    #[async_trait]
    impl AccessTokenPort for StaticToken {
        async fn access_token(&self) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    fn api(server: &Server, token: Option<&'static str>) -> HttpBackendApi {
        let config = ApiConfig {
            base_url: format!("{}/", server.url()),
            timeout_secs: 5,
        };
        HttpBackendApi::new(&config, Arc::new(StaticToken(token))).unwrap()
    }

    #[tokio::test]
    async fn login_posts_otp_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/login")
            .match_body(Matcher::Json(json!({
                "login_type": "otpLogin",
                "role": "buyer",
                "otp_code": "123456",
                "phone": "9999999999"
            })))
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"result":{}}"#)
            .create_async()
            .await;

        api(&server, None)
            .login("9999999999", "123456")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn listings_send_bearer_token_and_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/home/1/details")
            .match_header("authorization", "bearer tok-1")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("item_status".into(), "2".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
                Matcher::UrlEncoded("records".into(), "21".into()),
            ]))
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;

        let query = ListingsQuery::new(1, 21)
            .with_status(AuctionStatus::Live)
            .with_filters(ListingFilters::default());
        api(&server, Some("tok-1"))
            .fetch_listings(&query)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn success_false_becomes_rejected() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auctions/bid")
            .match_query(Matcher::UrlEncoded("user_id".into(), "7".into()))
            .with_body(r#"{"success":false,"message":"Bid must exceed current bid"}"#)
            .create_async()
            .await;

        let request = BidRequest {
            item_id: ItemId::from("1"),
            auction_id: None,
            bid_amount: 100,
        };
        let err = api(&server, Some("t"))
            .place_bid(&UserId::from("7"), &request)
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::Rejected("Bid must exceed current bid".into()));
    }

    #[tokio::test]
    async fn server_error_and_bad_json_are_distinguished() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/home/filters-data")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;
        server
            .mock("GET", "/auctions/item-details/3")
            .with_body("<html>")
            .create_async()
            .await;
        let api = api(&server, None);

        assert_eq!(
            api.fetch_filters_data().await.unwrap_err(),
            ApiError::Status {
                status: 503,
                body: "unavailable".into()
            }
        );
        assert!(matches!(
            api.fetch_item_details(&ItemId::from("3")).await.unwrap_err(),
            ApiError::Decode(_)
        ));
    }

    #[tokio::test]
    async fn upload_returns_file_reference() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auctions/upload-file")
            .match_query(Matcher::UrlEncoded("user_id".into(), "7".into()))
            .match_header(
                "content-type",
                Matcher::Regex("multipart/form-data".into()),
            )
            .with_body(r#"{"success":true,"result":"kyc/7/pan.pdf"}"#)
            .create_async()
            .await;

        let file = DocumentFile::new("pan.pdf", "application/pdf", b"%PDF-1.4".to_vec());
        let reference = api(&server, Some("t"))
            .upload_file(&UserId::from("7"), &file)
            .await
            .unwrap();

        assert_eq!(reference, "kyc/7/pan.pdf");
    }

    #[test]
    fn file_reference_accepts_nested_url() {
        assert_eq!(
            file_reference(&json!({ "data": { "url": "https://cdn/x.pdf" } })).as_deref(),
            Some("https://cdn/x.pdf")
        );
        assert_eq!(file_reference(&json!({ "success": true })), None);
    }
}
