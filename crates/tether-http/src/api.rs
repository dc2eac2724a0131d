//! HTTP-backed authentication and client wiring.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use tether_core::error::{AuthError, Error};
use tether_core::{
    AccessToken, ApiUrl, CredentialPair, CredentialStore, Credentials, RefreshToken,
    RenewalExchange, Request, RequestClient, Result, Transport,
};

use crate::config::HttpConfig;
use crate::http::client::HttpTransport;
use crate::http::endpoints::{PasswordRequest, RefreshRequest, TokenResponse};

/// The remote API reached over HTTP.
///
/// Provides the unauthenticated calls (login, signup, token renewal) and
/// builds the [`RequestClient`] used for everything else.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tether_core::{ApiUrl, Credentials, MemoryStore};
/// use tether_http::{HttpApi, HttpConfig};
///
/// # async fn example() -> tether_core::Result<()> {
/// let api = HttpApi::new(HttpConfig::new(ApiUrl::new("https://example.com/api")?))?;
/// let client = api.connect(Arc::new(MemoryStore::new()));
///
/// let pair = api.login(&Credentials::new("parent@example.com", "secret")).await?;
/// client.set_credentials(&pair)?;
///
/// let children: serde_json::Value = client.get_json("/children/").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpApi {
    config: Arc<HttpConfig>,
    transport: Arc<HttpTransport>,
}

impl HttpApi {
    pub fn new(config: HttpConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    pub fn base_url(&self) -> &ApiUrl {
        &self.config.base_url
    }

    /// Build a request client that stores credentials in `store`.
    pub fn connect(&self, store: Arc<dyn CredentialStore>) -> RequestClient {
        RequestClient::builder(self.transport.clone(), Arc::new(self.clone()), store)
            .renewal_timeout(self.config.renewal_timeout)
            .build()
    }

    /// Exchange email and password for a credential pair.
    ///
    /// # Errors
    ///
    /// A 400 or 401 answer is reported as [`AuthError::InvalidCredentials`].
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<CredentialPair> {
        info!("Logging in");

        let request = Request::post(self.config.login_path.as_str()).with_body(&PasswordRequest {
            email: credentials.email(),
            password: credentials.password(),
        })?;

        let response = match self.transport.send(&request, None).await {
            Ok(response) => response,
            Err(Error::Status(status)) if matches!(status.status, 400 | 401) => {
                debug!(%status, "Login rejected");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(err) => return Err(err),
        };

        let tokens: TokenResponse = response.json()?;
        debug!(refreshable = tokens.refresh.is_some(), "Logged in");

        Ok(CredentialPair {
            access_token: AccessToken::new(tokens.access),
            refresh_token: tokens.refresh.map(RefreshToken::new),
        })
    }

    /// Create an account. Does not log in.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn signup(&self, credentials: &Credentials) -> Result<()> {
        info!("Creating account");

        let request = Request::post(self.config.signup_path.as_str()).with_body(&PasswordRequest {
            email: credentials.email(),
            password: credentials.password(),
        })?;

        self.transport.send(&request, None).await?;
        Ok(())
    }
}

#[async_trait]
impl RenewalExchange for HttpApi {
    #[instrument(skip_all)]
    async fn renew(&self, refresh_token: &RefreshToken) -> Result<CredentialPair> {
        debug!("Exchanging refresh token");

        let request = Request::post(self.config.refresh_path.as_str()).with_body(&RefreshRequest {
            refresh: refresh_token.as_str(),
        })?;

        let tokens: TokenResponse = self.transport.send(&request, None).await?.json()?;

        Ok(CredentialPair {
            access_token: AccessToken::new(tokens.access),
            // Servers that do not rotate refresh tokens omit it.
            refresh_token: Some(
                tokens
                    .refresh
                    .map(RefreshToken::new)
                    .unwrap_or_else(|| refresh_token.clone()),
            ),
        })
    }
}
