//! Access tokens and the token source seam.
//!
//! Signing in is owned by an external OAuth client (browser redirect flow).
//! The rest of the crate only needs an [`AccessToken`], obtained through a
//! [`TokenSource`]. [`AuthConfig`] carries the settings that OAuth client is
//! created with.

use std::fmt;
use std::future::Future;

use thiserror::Error;

/// OAuth scope requested for the Mesh Export API.
pub const DEFAULT_SCOPE: &str = "itwin-platform";

/// Redirect URI used when none is configured.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/";

const BEARER: &str = "Bearer";

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token is available from the source.
    #[error("no access token available: {0}")]
    Unavailable(String),
}

/// Bearer access token.
///
/// Holds the token either with its scheme (`Bearer eyJ...`, as returned by
/// the browser authorization client) or bare. The value never appears in
/// `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    /// Value for the `Authorization` header, always with a scheme.
    pub fn header_value(&self) -> String {
        if self.scheme().is_some() {
            self.0.clone()
        } else {
            format!("Bearer {}", self.0)
        }
    }

    /// The token without its scheme prefix.
    ///
    /// Renderers that take a raw platform token (Cesium's
    /// `ITwinPlatform.defaultAccessToken`) want this form.
    pub fn bare(&self) -> &str {
        match self.scheme() {
            Some(scheme) => self.0[scheme.len()..].trim_start(),
            None => &self.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bare().is_empty()
    }

    fn scheme(&self) -> Option<&str> {
        let scheme = self.0.get(..BEARER.len())?;
        let rest = &self.0[BEARER.len()..];
        let separated = rest.is_empty() || rest.starts_with(char::is_whitespace);
        (scheme.eq_ignore_ascii_case(BEARER) && separated).then_some(scheme)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Source of access tokens.
pub trait TokenSource: Send + Sync {
    /// Returns a token valid for the next requests.
    fn access_token(&self) -> impl Future<Output = Result<AccessToken, AuthError>> + Send;
}

/// Token source serving a token obtained out of band.
#[derive(Debug, Clone)]
pub struct StaticTokenSource {
    token: AccessToken,
}

impl StaticTokenSource {
    pub fn new(token: AccessToken) -> Self {
        Self { token }
    }
}

impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        if self.token.is_empty() {
            return Err(AuthError::Unavailable("token is empty".to_string()));
        }
        Ok(self.token.clone())
    }
}

/// Settings of the OAuth client that signs the user in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Identity server, e.g. `https://qa-ims.bentley.com`.
    pub authority: String,
    pub client_id: String,
    pub scope: String,
    pub redirect_uri: String,
}

impl AuthConfig {
    /// Creates a config for the identity server matching an API prefix.
    pub fn new(api_prefix: &str, client_id: impl Into<String>) -> Self {
        Self {
            authority: format!("https://{}ims.bentley.com", api_prefix),
            client_id: client_id.into(),
            scope: DEFAULT_SCOPE.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
        }
    }
}
