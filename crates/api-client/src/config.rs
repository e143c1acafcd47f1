//! Configuration for the Shopfront API client
//!
//! Supports environment-based configuration with builder-style overrides.
//! The base URL is normalized once here; its *presence* is checked per
//! request, so a client may be constructed before configuration is known.

use std::env;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Boxed future returned by a token resolver
pub type TokenFuture = Pin<Box<dyn Future<Output = Option<String>> + Send>>;

/// Source of the bearer token attached to outgoing requests
///
/// Either a fixed string or a zero-argument resolver invoked once per
/// request, immediately before header assembly. The resolver form supports
/// tokens that rotate or are fetched lazily.
#[derive(Clone)]
pub enum TokenSource {
    /// A static token
    Static(String),
    /// A per-request resolver
    Resolver(Arc<dyn Fn() -> TokenFuture + Send + Sync>),
}

impl TokenSource {
    /// A fixed token value
    pub fn fixed(token: impl Into<String>) -> Self {
        Self::Static(token.into())
    }

    /// A per-request resolver; `None` or an empty string means "no token"
    pub fn resolver<F, Fut>(resolve: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<String>> + Send + 'static,
    {
        Self::Resolver(Arc::new(move || Box::pin(resolve())))
    }

    /// Resolve the token for one request; empty tokens resolve to `None`
    pub async fn resolve(&self) -> Option<String> {
        let token = match self {
            Self::Static(token) => Some(token.clone()),
            Self::Resolver(resolve) => resolve().await,
        };
        token.filter(|token| !token.is_empty())
    }
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(_) => f.write_str("TokenSource::Static(***)"),
            Self::Resolver(_) => f.write_str("TokenSource::Resolver"),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Option<String>,
    /// Bearer token source, if any
    pub token: Option<TokenSource>,
    /// Request timeout applied by the default HTTP transport
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Create an empty configuration (no base URL, no token)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `SHOPFRONT_API_URL`: CMS base URL
    /// - `SHOPFRONT_API_TOKEN`: static bearer token
    /// - `SHOPFRONT_TIMEOUT_SECS`: transport timeout in seconds
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("SHOPFRONT_API_URL")
            .ok()
            .and_then(|url| normalize_base_url(&url));

        let token = env::var("SHOPFRONT_API_TOKEN")
            .ok()
            .filter(|token| !token.is_empty())
            .map(TokenSource::Static);

        let timeout = env::var("SHOPFRONT_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        Self {
            base_url,
            token,
            timeout,
        }
    }

    /// The normalized base URL, if configured
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Builder-style method to set the base URL (normalized here once)
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(&url.into());
        self
    }

    /// Builder-style method to set a static token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(TokenSource::fixed(token));
        self
    }

    /// Builder-style method to set a token resolver
    #[must_use]
    pub fn with_token_source(mut self, source: TokenSource) -> Self {
        self.token = Some(source);
        self
    }

    /// Builder-style method to set the transport timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Trim whitespace and trailing slashes; blank input means "not configured"
fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let config = ClientConfig::new().with_base_url("  https://cms.example.com//  ");
        assert_eq!(config.base_url(), Some("https://cms.example.com"));
    }

    #[test]
    fn test_blank_base_url_is_absent() {
        let config = ClientConfig::new().with_base_url("   ");
        assert_eq!(config.base_url(), None);

        let config = ClientConfig::new().with_base_url("///");
        assert_eq!(config.base_url(), None);
    }

    #[test]
    fn test_default_config_has_no_base_url() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url(), None);
        assert!(config.token.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_static_token_resolution() {
        let token = TokenSource::fixed("secret");
        assert_eq!(token.resolve().await, Some("secret".to_string()));

        let empty = TokenSource::fixed("");
        assert_eq!(empty.resolve().await, None);
    }

    #[tokio::test]
    async fn test_resolver_token_resolution() {
        let token = TokenSource::resolver(|| async { Some("rotated".to_string()) });
        assert_eq!(token.resolve().await, Some("rotated".to_string()));

        let none = TokenSource::resolver(|| async { None });
        assert_eq!(none.resolve().await, None);
    }
}
