// Use built-in library
use std::env;
use std::fmt;

use crate::client::{ClientError, ClientResult};

pub const TOKEN_ENV_VAR: &str = "SPOTIFY_ACCESS_TOKEN";

/// Bearer credential used to authorize every request.
///
/// Obtaining and refreshing the token happens outside this crate; a client is
/// built around one credential and keeps it for its whole life.
#[derive(Clone, PartialEq)]
pub struct SpotifyCredentials {
    access_token: String,
}

impl SpotifyCredentials {
    #[must_use]
    pub fn new(access_token: &str) -> Self {
        Self {
            access_token: access_token.trim().to_owned(),
        }
    }

    /// Reads the token from `SPOTIFY_ACCESS_TOKEN`.
    pub fn from_env() -> ClientResult<Self> {
        let token = env::var(TOKEN_ENV_VAR)
            .map_err(|_| ClientError::InvalidConfig(format!("{} is not set", TOKEN_ENV_VAR)))?;
        let credentials = Self::new(&token);
        credentials.validate()?;
        Ok(credentials)
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.access_token.is_empty() {
            Err(ClientError::InvalidConfig("access token is empty".to_owned()))
        } else {
            Ok(())
        }
    }
}

// Keep tokens out of logs.
impl fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("access_token", &"<redacted>")
            .finish()
    }
}
