//! Relay HTTP Client
//!
//! A small, typed HTTP client for the CircleCI v2 API endpoints Relay needs:
//! triggering a pipeline and listing a pipeline's workflows.
//!
//! # Example
//!
//! ```no_run
//! use relay_client::CircleClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), relay_client::ClientError> {
//!     let client = CircleClient::new("circleci.com", "my-token", "octocat");
//!
//!     let page = client.list_workflows("5034460f-c7c4-4c43-9457-de07e2029e7b", None).await?;
//!     for workflow in page.items {
//!         println!("{}: {}", workflow.name, workflow.status);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod pipelines;
mod workflows;

// Re-export commonly used types
pub use error::{ClientError, Result};

use std::fmt;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Host used when none is configured
pub const DEFAULT_HOST: &str = "circleci.com";

const TOKEN_HEADER: &str = "Circle-Token";
const ATTRIBUTION_LOGIN_HEADER: &str = "x-attribution-login";
const ATTRIBUTION_ACTOR_ID_HEADER: &str = "x-attribution-actor-id";

/// HTTP client for the CircleCI v2 API
///
/// Every request carries the API token and the attribution headers naming
/// the actor that caused the trigger.
#[derive(Clone)]
pub struct CircleClient {
    /// API base URL (e.g., "https://circleci.com/api/v2")
    base_url: String,
    /// Personal or project API token
    token: String,
    /// Login reported in the attribution headers
    actor: String,
    /// HTTP client instance
    client: Client,
}

impl CircleClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `host` - API host. A bare hostname (e.g. "circleci.com") is reached
    ///   over https; a value with an explicit `http://` or `https://` scheme is
    ///   used as is.
    /// * `token` - API token sent in the `Circle-Token` header
    /// * `actor` - Login sent in the attribution headers
    ///
    /// # Example
    /// ```
    /// use relay_client::CircleClient;
    ///
    /// let client = CircleClient::new("circleci.com", "token", "octocat");
    /// assert_eq!(client.base_url(), "https://circleci.com/api/v2");
    /// ```
    pub fn new(host: &str, token: impl Into<String>, actor: impl Into<String>) -> Self {
        Self::with_client(host, token, actor, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        host: &str,
        token: impl Into<String>,
        actor: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            base_url: api_base_url(host),
            token: token.into(),
            actor: actor.into(),
            client,
        }
    }

    /// Get the API base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a request with the auth and attribution headers applied
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(ATTRIBUTION_LOGIN_HEADER, &self.actor)
            .header(ATTRIBUTION_ACTOR_ID_HEADER, &self.actor)
            .header(TOKEN_HEADER, &self.token)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let body = self.response_body(response).await?;
        debug!("API response: {}", body);

        parse_body(&body)
    }

    /// Read the raw body of a successful response
    async fn response_body(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response.text().await?)
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
}

impl fmt::Debug for CircleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircleClient")
            .field("base_url", &self.base_url)
            .field("actor", &self.actor)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Turns a configured host into the v2 API base URL
pub fn api_base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    let host = if host.is_empty() { DEFAULT_HOST } else { host };

    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}/api/v2", host)
    } else {
        format!("https://{}/api/v2", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CircleClient::new("circleci.com", "token", "octocat");
        assert_eq!(client.base_url(), "https://circleci.com/api/v2");
    }

    #[test]
    fn test_base_url_from_host() {
        assert_eq!(api_base_url("circleci.example.org"), "https://circleci.example.org/api/v2");
        assert_eq!(api_base_url("circleci.com/"), "https://circleci.com/api/v2");
        assert_eq!(api_base_url("http://localhost:8080"), "http://localhost:8080/api/v2");
        assert_eq!(api_base_url("https://ci.internal/"), "https://ci.internal/api/v2");
        assert_eq!(api_base_url(""), "https://circleci.com/api/v2");
    }

    #[test]
    fn test_client_with_custom_client() {
        let client = CircleClient::with_client("circleci.com", "token", "octocat", Client::new());
        assert_eq!(client.base_url(), "https://circleci.com/api/v2");
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = CircleClient::new("circleci.com", "super-secret", "octocat");
        let debug = format!("{:?}", client);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_request_carries_auth_headers() {
        let client = CircleClient::new("circleci.com", "secret", "octocat");
        let request = client
            .request(Method::GET, "https://circleci.com/api/v2/me")
            .build()
            .unwrap();

        let headers = request.headers();
        assert_eq!(headers["Circle-Token"], "secret");
        assert_eq!(headers["x-attribution-login"], "octocat");
        assert_eq!(headers["x-attribution-actor-id"], "octocat");
        assert_eq!(headers["content-type"], "application/json");
    }
}
