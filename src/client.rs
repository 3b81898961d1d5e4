//! Typed access to the individual Venmo endpoints.
//!
//! [`VenmoClient`] is stateless: each method performs one HTTP exchange through
//! the configured [`Transport`], normalizes the response and decodes the part
//! of it that callers consume. Session state (cached identity, limited-account
//! flag) lives one level up in [`crate::session::VenmoSession`].
//!
//! ## Endpoints
//!
//! | Method                                     | Request                                   |
//! |--------------------------------------------|-------------------------------------------|
//! | [`VenmoClient::account`]                   | `GET /account`                            |
//! | [`VenmoClient::stories`]                   | `GET /stories/target-or-actor/{user_id}`  |
//! | [`VenmoClient::user`]                      | `GET /users/{user_id}`                    |
//! | [`VenmoClient::create_transfer`]           | `POST /payments`                          |
//! | [`VenmoClient::wallet`]                    | GraphQL `getUserFundingInstruments`       |
//! | [`VenmoClient::available_identities`]      | GraphQL `Identity`                        |
//!
//! ## Example
//!
//! ```rust,no_run
//! use venmo_rs::client::VenmoClient;
//! use venmo_types::config::VenmoConfig;
//!
//! # async fn run() -> Result<(), venmo_rs::VenmoError> {
//! let client = VenmoClient::try_new(&VenmoConfig::new("ACCESS_TOKEN"))?;
//! let identity = client.account().await?;
//! println!("{:?}", identity.balance("example")?);
//! # Ok(())
//! # }
//! ```

use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue, USER_AGENT};
use http::{HeaderMap, Method};
use std::fmt::Display;
use std::sync::Arc;
use url::Url;
use venmo_types::config::VenmoConfig;
use venmo_types::proto::graphql::{AvailableIdentity, GraphQlRequest};
use venmo_types::proto::wallet::FundingInstrument;
use venmo_types::proto::{IdentitySnapshot, TransferRequest, UserProfile, extract};

use crate::error::VenmoError;
use crate::normalize::{normalize_response, reject_graphql_errors};
use crate::transport::{ReqwestTransport, Transport, TransportRequest};
use crate::user_agent::resolve_user_agent;

#[cfg(feature = "telemetry")]
use tracing::{Span, instrument};

/// A client for one authenticated Venmo account.
#[derive(Clone)]
pub struct VenmoClient {
    /// REST base URL, always ending with `/`
    api_base: Url,
    /// GraphQL endpoint
    graphql_url: Url,
    /// Authorization, content type and user agent, sent with every request
    headers: HeaderMap,
    /// The network collaborator
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for VenmoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VenmoClient")
            .field("api_base", &self.api_base.as_str())
            .field("graphql_url", &self.graphql_url.as_str())
            .field("user_agent", &self.user_agent())
            .finish_non_exhaustive()
    }
}

impl VenmoClient {
    /// Builds a client that talks through a default [`ReqwestTransport`],
    /// honouring the configured timeout.
    pub fn try_new(config: &VenmoConfig) -> Result<Self, VenmoError> {
        let mut transport = ReqwestTransport::new();
        if let Some(timeout) = config.timeout {
            transport = transport.with_timeout(timeout);
        }
        Self::with_transport(config, Arc::new(transport))
    }

    /// Builds a client that sends every request through `transport`.
    pub fn with_transport(
        config: &VenmoConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, VenmoError> {
        let api_base = config.api_base();
        if api_base.cannot_be_a_base() {
            return Err(VenmoError::UrlParse {
                context: "API base URL cannot have path segments",
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }
        let user_agent = resolve_user_agent(config.user_agent.as_deref());
        let headers = auth_headers(&config.access_token, &user_agent)?;
        Ok(Self {
            api_base,
            graphql_url: config.graphql_url.clone(),
            headers,
            transport,
        })
    }

    /// Returns the REST base URL used by this client.
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Returns the GraphQL endpoint used by this client.
    pub fn graphql_url(&self) -> &Url {
        &self.graphql_url
    }

    /// Returns the headers sent with each request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the `User-Agent` this client presents.
    pub fn user_agent(&self) -> Option<&str> {
        self.headers.get(USER_AGENT).and_then(|v| v.to_str().ok())
    }

    /// Sends a `GET /account` request.
    pub async fn account(&self) -> Result<IdentitySnapshot, VenmoError> {
        let url = self.endpoint(&["account"]);
        let body = self.get_json(url, "GET /account").await?;
        Ok(IdentitySnapshot::new(body))
    }

    /// Sends a `GET /stories/target-or-actor/{user_id}` request and returns the
    /// transaction feed as-is.
    pub async fn stories(&self, user_id: &str) -> Result<serde_json::Value, VenmoError> {
        let url = self.endpoint(&["stories", "target-or-actor", user_id]);
        self.get_json(url, "GET /stories/target-or-actor/{user_id}")
            .await
    }

    /// Sends a `GET /users/{user_id}` request. `user_id` may be a username or
    /// an internal id.
    pub async fn user(&self, user_id: &str) -> Result<UserProfile, VenmoError> {
        let url = self.endpoint(&["users", user_id]);
        let body = self.get_json(url, "GET /users/{user_id}").await?;
        Ok(UserProfile::new(body))
    }

    /// Sends a `POST /payments` request.
    ///
    /// Every call that reaches the server creates a transfer; nothing here
    /// deduplicates or retries.
    pub async fn create_transfer(
        &self,
        transfer: &TransferRequest,
    ) -> Result<serde_json::Value, VenmoError> {
        let url = self.endpoint(&["payments"]);
        self.post_json(url, "POST /payments", transfer).await
    }

    /// Fetches the wallet through GraphQL. Always hits the network.
    pub async fn wallet(&self) -> Result<Vec<FundingInstrument>, VenmoError> {
        let body = self
            .graphql("GraphQL getUserFundingInstruments", &GraphQlRequest::wallet())
            .await?;
        Ok(extract(&body, "data.profile.wallet", "get_payment_methods")?)
    }

    /// Fetches the identities (personal and business) this token can act as.
    pub async fn available_identities(&self) -> Result<Vec<AvailableIdentity>, VenmoError> {
        let body = self
            .graphql("GraphQL Identity", &GraphQlRequest::identity())
            .await?;
        Ok(extract(&body, "data.profile.availableIdentities", "get_handle")?)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        // `with_transport` rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn graphql(
        &self,
        context: &'static str,
        request: &GraphQlRequest,
    ) -> Result<serde_json::Value, VenmoError> {
        let body = self
            .post_json(self.graphql_url.clone(), context, request)
            .await?;
        reject_graphql_errors(http::StatusCode::OK, body)
    }

    /// GET helper: sends, normalizes, records the outcome.
    ///
    /// `context` is a human-readable identifier used in tracing and error messages (e.g. `"GET /account"`).
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "venmo.client.get", skip(self, url), fields(otel.status_code = tracing::field::Empty, error.message = tracing::field::Empty), err)
    )]
    async fn get_json(
        &self,
        url: Url,
        context: &'static str,
    ) -> Result<serde_json::Value, VenmoError> {
        self.send(Method::GET, url, context, None).await
    }

    /// POST helper: serializes `payload` as the JSON body, then behaves like [`Self::get_json`].
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "venmo.client.post", skip(self, url, payload), fields(otel.status_code = tracing::field::Empty, error.message = tracing::field::Empty), err)
    )]
    async fn post_json<T>(
        &self,
        url: Url,
        context: &'static str,
        payload: &T,
    ) -> Result<serde_json::Value, VenmoError>
    where
        T: serde::Serialize + ?Sized,
    {
        let body = serde_json::to_value(payload)
            .map_err(|source| VenmoError::Encode { context, source })?;
        self.send(Method::POST, url, context, Some(body)).await
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        context: &'static str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, VenmoError> {
        let request = TransportRequest {
            method,
            url,
            headers: self.headers.clone(),
            body,
        };
        let result = match self.transport.request(request).await {
            Ok(response) => normalize_response(response),
            Err(source) => Err(VenmoError::Transport { context, source }),
        };
        record_result_on_span(&result);
        result
    }
}

fn auth_headers(access_token: &str, user_agent: &str) -> Result<HeaderMap, VenmoError> {
    let mut authorization = HeaderValue::from_str(&format!("Bearer {}", access_token)).map_err(
        |source| VenmoError::InvalidHeader {
            context: "Authorization",
            source,
        },
    )?;
    authorization.set_sensitive(true);
    let user_agent = HeaderValue::from_str(user_agent).map_err(|source| {
        VenmoError::InvalidHeader {
            context: "User-Agent",
            source,
        }
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, user_agent);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(AUTHORIZATION, authorization);
    Ok(headers)
}

/// Records the outcome of a request on the current tracing span.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: Display>(result: &Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
        }
    }
}

/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R, E: Display>(_result: &Result<R, E>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;
    use serde_json::json;
    use venmo_types::Decimal;
    use venmo_types::proto::Audience;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> VenmoConfig {
        VenmoConfig::new("test-token")
            .with_api_url(format!("{}/v1", server.uri()).parse().unwrap())
            .with_graphql_url(format!("{}/graphql", server.uri()).parse().unwrap())
            .with_user_agent("venmo-rs-test")
    }

    #[tokio::test]
    async fn test_account_sends_auth_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/account"))
            .and(header("authorization", "Bearer test-token"))
            .and(header("content-type", "application/json"))
            .and(header("user-agent", "venmo-rs-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "user": { "id": "u1" }, "balance": "3.50", "is_limited_account": false }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = VenmoClient::try_new(&test_config(&server)).unwrap();
        let identity = client.account().await.unwrap();
        assert_eq!(identity.user_id("test").unwrap(), "u1");
        assert_eq!(identity.balance("test").unwrap().value(), Decimal::new(350, 2));
    }

    #[tokio::test]
    async fn test_user_id_is_a_single_path_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/users/Jane-Doe-7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "id": "987" } })))
            .expect(1)
            .mount(&server)
            .await;

        let client = VenmoClient::try_new(&test_config(&server)).unwrap();
        let user = client.user("Jane-Doe-7").await.unwrap();
        assert_eq!(user.id("test").unwrap(), "987");
        assert_eq!(
            client.endpoint(&["users", "a/b"]).path(),
            "/v1/users/a%2Fb"
        );
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/account"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "Invalid access token", "code": 261 }
            })))
            .mount(&server)
            .await;

        let client = VenmoClient::try_new(&test_config(&server)).unwrap();
        let err = client.account().await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(err.to_string(), "Venmo: Invalid access token");
        assert_eq!(err.status(), Some(http::StatusCode::UNAUTHORIZED));
        assert_eq!(err.code(), Some("261"));
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/users/nobody"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "Resource not found.", "code": 283 }
            })))
            .mount(&server)
            .await;

        let client = VenmoClient::try_new(&test_config(&server)).unwrap();
        let err = client.user("nobody").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_server_error_embeds_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/stories/target-or-actor/u1"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": { "message": "Internal error" }
            })))
            .mount(&server)
            .await;

        let client = VenmoClient::try_new(&test_config(&server)).unwrap();
        let err = client.stories("u1").await.unwrap_err();
        assert_eq!(err.to_string(), "Internal error (HTTP 500)");
        assert_eq!(err.code(), Some("500"));
    }

    #[tokio::test]
    async fn test_wallet_decodes_instruments() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({ "query": venmo_types::proto::graphql::WALLET_QUERY })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "profile": { "wallet": [
                    { "id": "BAL", "roles": { "peerPayments": "primary" }, "metadata": { "availableBalance": { "value": 20 } } },
                    { "id": "BANK", "roles": { "peerPayments": "backup" } }
                ] } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = VenmoClient::try_new(&test_config(&server)).unwrap();
        let wallet = client.wallet().await.unwrap();
        assert_eq!(wallet.len(), 2);
        assert_eq!(wallet[0].available_balance(), Some(Decimal::from(20)));
    }

    #[tokio::test]
    async fn test_wallet_missing_path_is_extraction_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "profile": {} } })))
            .mount(&server)
            .await;

        let client = VenmoClient::try_new(&test_config(&server)).unwrap();
        match client.wallet().await.unwrap_err() {
            VenmoError::Extraction(err) => {
                assert_eq!(err.operation(), "get_payment_methods");
                assert_eq!(err.path(), "data.profile.wallet");
            }
            other => panic!("expected extraction error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_graphql_errors_surface_as_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({ "operationName": "Identity", "variables": {} })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{ "message": "Token lacks scope" }]
            })))
            .mount(&server)
            .await;

        let client = VenmoClient::try_new(&test_config(&server)).unwrap();
        let err = client.available_identities().await.unwrap_err();
        assert!(matches!(
            err,
            VenmoError::Api {
                kind: ApiErrorKind::GraphQl,
                ..
            }
        ));
        assert_eq!(err.to_string(), "Token lacks scope");
    }

    #[tokio::test]
    async fn test_create_transfer_posts_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payments"))
            .and(body_partial_json(json!({
                "funding_source_id": "fs1",
                "user_id": "r1",
                "audience": "public",
                "note": "tacos"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "payment": { "id": "p1" } } })))
            .expect(1)
            .mount(&server)
            .await;

        let client = VenmoClient::try_new(&test_config(&server)).unwrap();
        let transfer = TransferRequest::payment(
            "fs1".to_string(),
            "r1".to_string(),
            Decimal::from(5),
            "tacos".to_string(),
            Audience::Public,
        );
        let response = client.create_transfer(&transfer).await.unwrap();
        assert_eq!(response["data"]["payment"]["id"], "p1");
    }

    #[tokio::test]
    async fn test_transport_failure_is_distinct() {
        // Nothing listens on port 1.
        let config = VenmoConfig::new("t").with_api_url("http://127.0.0.1:1/v1".parse().unwrap());
        let client = VenmoClient::try_new(&config).unwrap();
        let err = client.account().await.unwrap_err();
        assert!(matches!(err, VenmoError::Transport { context: "GET /account", .. }));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_random_user_agent_when_not_configured() {
        let client = VenmoClient::try_new(&VenmoConfig::new("t")).unwrap();
        let user_agent = client.user_agent().unwrap();
        assert!(user_agent.starts_with("Mozilla/5.0"));
        assert!(client.headers().get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn test_invalid_token_characters_rejected() {
        let err = VenmoClient::try_new(&VenmoConfig::new("bad\ntoken")).unwrap_err();
        assert!(matches!(err, VenmoError::InvalidHeader { context: "Authorization", .. }));
    }
}
