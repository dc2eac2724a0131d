//! HTTP client configuration.

use std::time::Duration;

use tether_core::{ApiUrl, DEFAULT_RENEWAL_TIMEOUT};

use crate::http::endpoints::{LOGIN, REFRESH, SIGNUP};

/// Configuration for [`HttpApi`](crate::HttpApi).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tether_core::ApiUrl;
/// use tether_http::HttpConfig;
///
/// let config = HttpConfig::new(ApiUrl::new("https://example.com/api").unwrap())
///     .with_refresh_path("auth/token/refresh/")
///     .with_request_timeout(Some(Duration::from_secs(10)));
/// assert_eq!(config.refresh_path, "auth/token/refresh/");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL every request path is joined onto.
    pub base_url: ApiUrl,
    /// Path of the login endpoint.
    pub login_path: String,
    /// Path of the signup endpoint.
    pub signup_path: String,
    /// Path of the token renewal endpoint.
    pub refresh_path: String,
    /// Per-request timeout; `None` leaves requests unbounded.
    pub request_timeout: Option<Duration>,
    /// Bound on each renewal exchange; `None` waits indefinitely.
    pub renewal_timeout: Option<Duration>,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl HttpConfig {
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            login_path: LOGIN.to_string(),
            signup_path: SIGNUP.to_string(),
            refresh_path: REFRESH.to_string(),
            request_timeout: None,
            renewal_timeout: Some(DEFAULT_RENEWAL_TIMEOUT),
            user_agent: concat!("tether/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_signup_path(mut self, path: impl Into<String>) -> Self {
        self.signup_path = path.into();
        self
    }

    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_renewal_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.renewal_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
