//! Client configuration.
//!
//! [`VenmoConfig`] carries the bearer token, the endpoint URLs and the
//! transport knobs a `venmo_rs::VenmoSession` is built from. It can be
//! assembled in code:
//!
//! ```rust
//! use venmo_types::config::VenmoConfig;
//! use std::time::Duration;
//!
//! let config = VenmoConfig::new("ACCESS_TOKEN")
//!     .with_user_agent("my-app/1.0")
//!     .with_timeout(Duration::from_secs(10));
//! assert_eq!(config.api_url.as_str(), "https://api.venmo.com/v1/");
//! ```
//!
//! or deserialized, in which case the token may reference an environment
//! variable so it stays out of the file:
//!
//! ```json
//! {
//!   "access_token": "$VENMO_ACCESS_TOKEN",
//!   "user_agent": "my-app/1.0",
//!   "timeout_secs": 10
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Default REST base URL. Endpoint paths are joined onto it.
pub const DEFAULT_API_URL: &str = "https://api.venmo.com/v1/";
/// Default GraphQL endpoint.
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.venmo.com/graphql";

/// Configuration for a single authenticated Venmo account.
#[derive(Clone, Deserialize)]
pub struct VenmoConfig {
    /// Bearer token placed in the `Authorization` header. Never logged.
    pub access_token: LiteralOrEnv<String>,
    /// Base URL for the REST endpoints (`/account`, `/users/{id}`, ...).
    #[serde(default = "default_api_url")]
    pub api_url: Url,
    /// URL of the GraphQL endpoint.
    #[serde(default = "default_graphql_url")]
    pub graphql_url: Url,
    /// `User-Agent` header value.
    ///
    /// When `None`, a desktop browser user agent is picked at random once per
    /// session and reused for every request of that session.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Per-request timeout applied by the default reqwest transport.
    /// Custom transports own their own deadline policy and ignore this.
    #[serde(
        default,
        rename = "timeout_secs",
        deserialize_with = "deserialize_timeout_secs"
    )]
    pub timeout: Option<Duration>,
}

impl VenmoConfig {
    /// Creates a configuration with default endpoints, a random user agent
    /// and no timeout.
    pub fn new<S: Into<String>>(access_token: S) -> Self {
        Self {
            access_token: LiteralOrEnv::from_literal(access_token.into()),
            api_url: default_api_url(),
            graphql_url: default_graphql_url(),
            user_agent: None,
            timeout: None,
        }
    }

    /// Overrides the REST base URL. A trailing slash is added when missing so
    /// that endpoint paths join below it instead of replacing its last segment.
    pub fn with_api_url(mut self, api_url: Url) -> Self {
        self.api_url = with_trailing_slash(api_url);
        self
    }

    /// Overrides the GraphQL endpoint URL.
    pub fn with_graphql_url(mut self, graphql_url: Url) -> Self {
        self.graphql_url = graphql_url;
        self
    }

    /// Pins the `User-Agent` header instead of picking a random one.
    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets a per-request timeout for the default transport.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The REST base URL, guaranteed to end with `/`.
    pub fn api_base(&self) -> Url {
        with_trailing_slash(self.api_url.clone())
    }
}

impl fmt::Debug for VenmoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VenmoConfig")
            .field("access_token", &"<redacted>")
            .field("api_url", &self.api_url.as_str())
            .field("graphql_url", &self.graphql_url.as_str())
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn default_api_url() -> Url {
    Url::parse(DEFAULT_API_URL).expect("DEFAULT_API_URL is a valid URL")
}

fn default_graphql_url() -> Url {
    Url::parse(DEFAULT_GRAPHQL_URL).expect("DEFAULT_GRAPHQL_URL is a valid URL")
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn deserialize_timeout_secs<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = Option::<u64>::deserialize(deserializer)?;
    Ok(secs.map(Duration::from_secs))
}

// ============================================================================
// Environment Variable Resolution
// ============================================================================

/// A transparent wrapper that resolves environment variables during deserialization.
///
/// Accepts a literal (`"abc123"`), a simple reference (`"$VENMO_ACCESS_TOKEN"`)
/// or a braced reference (`"${VENMO_ACCESS_TOKEN}"`). Deref gives access to the
/// resolved value.
#[derive(Clone, PartialEq, Eq)]
pub struct LiteralOrEnv<T>(T);

impl<T> LiteralOrEnv<T> {
    pub fn from_literal(value: T) -> Self {
        Self(value)
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }

    /// Returns the variable name if `s` is written as `$VAR` or `${VAR}`.
    fn env_var_name(s: &str) -> Option<&str> {
        if let Some(braced) = s.strip_prefix("${").and_then(|r| r.strip_suffix('}')) {
            Some(braced)
        } else {
            let name = s.strip_prefix('$')?;
            let valid = !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_');
            valid.then_some(name)
        }
    }
}

impl<T> Deref for LiteralOrEnv<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Values resolved through this wrapper are usually secrets.
impl<T> fmt::Debug for LiteralOrEnv<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LiteralOrEnv(<redacted>)")
    }
}

impl<'de, T> Deserialize<'de> for LiteralOrEnv<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let value = match Self::env_var_name(&s) {
            Some(var_name) => std::env::var(var_name).map_err(|_| {
                serde::de::Error::custom(format!(
                    "Environment variable '{}' not found (referenced as '{}')",
                    var_name, s
                ))
            })?,
            None => s,
        };
        let parsed = value
            .parse::<T>()
            .map_err(|e| serde::de::Error::custom(format!("Failed to parse value: {}", e)))?;
        Ok(LiteralOrEnv(parsed))
    }
}

impl<T: Serialize> Serialize for LiteralOrEnv<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_applied_when_fields_missing() {
        let config: VenmoConfig =
            serde_json::from_value(json!({ "access_token": "literal-token" })).unwrap();
        assert_eq!(*config.access_token, "literal-token");
        assert_eq!(config.api_url.as_str(), DEFAULT_API_URL);
        assert_eq!(config.graphql_url.as_str(), DEFAULT_GRAPHQL_URL);
        assert!(config.user_agent.is_none());
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_token_resolved_from_braced_env_var() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("VENMO_TYPES_TEST_TOKEN_BRACED", "from-env") };
        let config: VenmoConfig = serde_json::from_value(json!({
            "access_token": "${VENMO_TYPES_TEST_TOKEN_BRACED}",
            "timeout_secs": 7
        }))
        .unwrap();
        assert_eq!(*config.access_token, "from-env");
        assert_eq!(config.timeout, Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_missing_env_var_is_an_error() {
        let result: Result<VenmoConfig, _> = serde_json::from_value(json!({
            "access_token": "$VENMO_TYPES_TEST_TOKEN_DEFINITELY_UNSET"
        }));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("VENMO_TYPES_TEST_TOKEN_DEFINITELY_UNSET"));
    }

    #[test]
    fn test_dollar_inside_literal_is_not_a_reference() {
        assert_eq!(LiteralOrEnv::<String>::env_var_name("ab$c"), None);
        assert_eq!(LiteralOrEnv::<String>::env_var_name("$not-a-var"), None);
        assert_eq!(LiteralOrEnv::<String>::env_var_name("$"), None);
        assert_eq!(LiteralOrEnv::<String>::env_var_name("$TOKEN_1"), Some("TOKEN_1"));
    }

    #[test]
    fn test_api_url_gets_trailing_slash() {
        let config = VenmoConfig::new("t").with_api_url(Url::parse("http://localhost:9000/v1").unwrap());
        assert_eq!(config.api_url.as_str(), "http://localhost:9000/v1/");
        assert_eq!(
            config.api_base().join("account").unwrap().as_str(),
            "http://localhost:9000/v1/account"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = VenmoConfig::new("super-secret");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
