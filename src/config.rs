use std::fmt::Debug;
use std::fmt::Formatter;

use crate::utils::Redact;

/// Config carries all the configuration for signing requests against Kong's
/// `hmac-auth` plugin.
///
/// Every field is optional at this level. Required fields are checked and
/// defaults are filled in when the config is bound into a
/// [`Signer`](crate::Signer).
#[derive(Clone, Default)]
pub struct Config {
    /// The consumer username advertised in the `Authorization` header.
    ///
    /// Required.
    pub username: Option<String>,
    /// The shared secret the HMAC is keyed with.
    ///
    /// Required.
    pub secret: Option<String>,
    /// Identifier of the HMAC algorithm, like `hmac-sha256`.
    ///
    /// Defaults to `hmac-sha256`.
    pub algorithm: Option<String>,
    /// Names of the components to sign, in signing order.
    ///
    /// Defaults to `date`, `request-line`, `digest`.
    pub headers: Option<Vec<String>>,
    /// Identifier of the charset used to encode the secret and the string
    /// to sign, like `utf-8`.
    ///
    /// Defaults to `utf-8`.
    pub charset: Option<String>,
}

impl Config {
    /// Create a new Config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Set algorithm.
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = Some(algorithm.into());
        self
    }

    /// Set the component names to sign.
    pub fn with_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = Some(headers.into_iter().map(Into::into).collect());
        self
    }

    /// Set charset.
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("secret", &self.secret.as_ref().map(Redact::from))
            .field("algorithm", &self.algorithm)
            .field("headers", &self.headers)
            .field("charset", &self.charset)
            .finish()
    }
}
