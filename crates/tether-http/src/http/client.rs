//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use tracing::{debug, instrument, trace};

use tether_core::error::{Error, InvalidInputError, StatusError, TransportError};
use tether_core::{AccessToken, ApiUrl, Method, Request, Response, Result, Transport};

use super::endpoints::ErrorResponse;
use crate::config::HttpConfig;

/// Map a reqwest failure onto the transport taxonomy.
pub(crate) fn map_reqwest(err: reqwest::Error, timeout_ms: u64) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout {
            duration_ms: timeout_ms,
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else if err.is_decode() || err.is_body() {
        TransportError::Body {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}

/// HTTP transport for the remote API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: ApiUrl,
    timeout_ms: u64,
}

impl HttpTransport {
    /// Create a transport for the configured API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed (for
    /// example, TLS backend initialization fails).
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| TransportError::Http {
            message: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            timeout_ms: config
                .request_timeout
                .map(|t| t.as_millis() as u64)
                .unwrap_or(0),
        })
    }

    /// Returns the API base URL this transport sends to.
    pub fn base_url(&self) -> &ApiUrl {
        &self.base_url
    }

    fn build(&self, request: &Request, token: Option<&AccessToken>) -> Result<reqwest::RequestBuilder> {
        let url = self.base_url.endpoint(request.path());
        let method = match request.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &url);

        let options = request.options();
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }

        for (name, value) in &options.headers {
            let header = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                InvalidInputError::Header {
                    name: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            // The client owns the Authorization header.
            if header == reqwest::header::AUTHORIZATION {
                continue;
            }
            let value = HeaderValue::from_str(value).map_err(|e| InvalidInputError::Header {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            builder = builder.header(header, value);
        }

        if let Some(token) = token {
            builder = builder.bearer_auth(token.as_str());
        }

        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        Ok(builder)
    }

    /// Turn a response into a [`Response`] or a [`StatusError`].
    async fn handle_response(&self, response: reqwest::Response) -> Result<Response> {
        let status = response.status();
        trace!(status = %status, "HTTP response");

        if !status.is_success() {
            return Err(Error::Status(Self::parse_error_response(response).await));
        }

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_reqwest(e, self.timeout_ms))?;

        Ok(Response {
            status: status.as_u16(),
            headers,
            body: body.to_vec(),
        })
    }

    /// Parse an error response body, best effort.
    async fn parse_error_response(response: reqwest::Response) -> StatusError {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>().await {
            Ok(body) => StatusError::new(status, body.code, body.detail),
            Err(_) => StatusError::new(status, None, None),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request, token), fields(method = %request.method(), path = request.path()))]
    async fn send(&self, request: &Request, token: Option<&AccessToken>) -> Result<Response> {
        debug!(
            authenticated = token.is_some(),
            retried = request.is_retried(),
            "HTTP request"
        );
        trace!(body = ?request.body(), "request body");

        let response = self
            .build(request, token)?
            .send()
            .await
            .map_err(|e| map_reqwest(e, self.timeout_ms))?;

        self.handle_response(response).await
    }
}
