//! Secret values read from the environment.
//!
//! A [`Secret`] never prints its contents through `Debug` or `Display`, so it
//! can be passed through code that logs freely. The raw value is only
//! available through [`Secret::expose`].

use std::fmt;

const REDACTED: &str = "[REDACTED]";

/// Environment variable holding the GitHub OAuth client id.
pub const CLIENT_ID_VAR: &str = "GITHUB_CLIENT_ID";
/// Environment variable holding the GitHub OAuth client secret.
pub const CLIENT_SECRET_VAR: &str = "GITHUB_CLIENT_SECRET";

#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

/// The OAuth client pair written into the notebook server config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: Secret,
    pub client_secret: Secret,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: Secret::new(client_id),
            client_secret: Secret::new(client_secret),
        }
    }

    /// Builds the pair from a variable lookup; `None` unless both are set.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = lookup(CLIENT_ID_VAR)?;
        let client_secret = lookup(CLIENT_SECRET_VAR)?;
        Some(Self::new(client_id, client_secret))
    }

    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}
