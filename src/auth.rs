use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SESSION_COOKIE_KEY: &str = "_gitlab_session";
pub const DEFAULT_CSRF_TOKEN_KEY: &str = "authenticity_token";

/// A GitLab credential string.
///
/// The value never shows up in `Debug` output so options and services can be
/// logged freely.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Session-cookie authentication, mirroring a logged-in browser session.
///
/// Both `session_cookie_value` and `csrf_token_value` must be non-empty for
/// this mode to be used. Missing keys fall back to GitLab's defaults.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NativeAuth {
    #[serde(default)]
    pub session_cookie_key: Option<String>,
    #[serde(default)]
    pub session_cookie_value: String,
    #[serde(default)]
    pub csrf_token_key: Option<String>,
    #[serde(default)]
    pub csrf_token_value: String,
}

impl NativeAuth {
    pub fn new(session_cookie_value: impl Into<String>, csrf_token_value: impl Into<String>) -> Self {
        Self {
            session_cookie_key: None,
            session_cookie_value: session_cookie_value.into(),
            csrf_token_key: None,
            csrf_token_value: csrf_token_value.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.session_cookie_value.is_empty() && !self.csrf_token_value.is_empty()
    }
}

impl fmt::Debug for NativeAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeAuth")
            .field("session_cookie_key", &self.session_cookie_key)
            .field("csrf_token_key", &self.csrf_token_key)
            .finish_non_exhaustive()
    }
}

/// The single credential mode a service authenticates with.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    OAuth(Token),
    JobToken(Token),
    PrivateToken(Token),
    NativeAuth {
        session_cookie_key: String,
        session_cookie_value: String,
        csrf_token_key: String,
        csrf_token_value: String,
    },
    None,
}

impl AuthMode {
    /// Picks the first usable credential in the order
    /// OAuth > job token > private token > native auth.
    ///
    /// Empty tokens are treated as absent, and native auth only counts when
    /// both the session cookie and the CSRF token are set.
    pub fn resolve(
        oauth_token: Option<&Token>,
        job_token: Option<&Token>,
        token: Option<&Token>,
        native_auth: Option<&NativeAuth>,
    ) -> Self {
        let present = |t: Option<&Token>| t.filter(|t| !t.is_empty()).cloned();

        if let Some(t) = present(oauth_token) {
            return Self::OAuth(t);
        }
        if let Some(t) = present(job_token) {
            return Self::JobToken(t);
        }
        if let Some(t) = present(token) {
            return Self::PrivateToken(t);
        }

        match native_auth {
            Some(native) if native.is_complete() => Self::NativeAuth {
                session_cookie_key: native
                    .session_cookie_key
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SESSION_COOKIE_KEY.to_owned()),
                session_cookie_value: native.session_cookie_value.clone(),
                csrf_token_key: native
                    .csrf_token_key
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CSRF_TOKEN_KEY.to_owned()),
                csrf_token_value: native.csrf_token_value.clone(),
            },
            _ => Self::None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::OAuth(_) => "oauth",
            Self::JobToken(_) => "job-token",
            Self::PrivateToken(_) => "private-token",
            Self::NativeAuth { .. } => "native-auth",
            Self::None => "none",
        }
    }
}

impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthMode({})", self.kind())
    }
}
