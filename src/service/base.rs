use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::auth::AuthMode;
use crate::casing::camelize_keys;
use crate::error::{GitbeakerError, Result};
use crate::requester::Requester;

use super::headers::{to_header_map, HeaderSet, Headers};
use super::options::ServiceOptions;

pub const USER_AGENT: &str = "gitbeaker";
pub const COOKIE_PREFIX: &str = "cookie: ";

/// The immutable request context every GitLab resource wrapper is built on.
///
/// Holds the resolved base URL, the headers for the selected credential mode
/// and the injected requester. Nothing changes after construction.
#[derive(Clone, Serialize)]
pub struct BaseService {
    url: String,
    #[serde(skip)]
    requester: Arc<dyn Requester>,
    request_timeout: u64,
    headers: Headers,
    camelize: bool,
    reject_unauthorized: bool,
    additional_body: Map<String, Value>,
    #[serde(skip)]
    auth_mode: AuthMode,
}

impl BaseService {
    /// Builds the context from `options`.
    ///
    /// # Errors
    ///
    /// Returns [`GitbeakerError::MissingRequester`] when no requester was
    /// injected. Every other field falls back to its default.
    pub fn new(options: ServiceOptions) -> Result<Self> {
        let ServiceOptions {
            oauth_token,
            token,
            job_token,
            native_auth,
            host,
            url,
            version,
            reject_unauthorized,
            camelize,
            requester,
            request_timeout,
            profile_token,
            profile_mode,
            sudo,
        } = options;

        let requester = requester.ok_or(GitbeakerError::MissingRequester)?;

        let version = format!("v{version}");
        let url = [host.as_str(), "api", version.as_str(), url.as_str()].join("/");

        let mut headers = HeaderSet::new();
        headers.insert("user-agent", USER_AGENT);
        let mut additional_body = Map::new();

        let auth_mode = AuthMode::resolve(
            oauth_token.as_ref(),
            job_token.as_ref(),
            token.as_ref(),
            native_auth.as_ref(),
        );
        debug!("Resolved auth mode '{}' for {url}", auth_mode.kind());

        match &auth_mode {
            AuthMode::OAuth(t) => {
                headers.insert("authorization", format!("Bearer {}", t.as_str()));
            }
            AuthMode::JobToken(t) => {
                headers.insert("job-token", t.as_str());
            }
            AuthMode::PrivateToken(t) => {
                headers.insert("private-token", t.as_str());
            }
            AuthMode::NativeAuth {
                session_cookie_key,
                session_cookie_value,
                csrf_token_key,
                csrf_token_value,
            } => {
                // Some instances read the CSRF token from the body, others from the header.
                additional_body.insert(
                    csrf_token_key.clone(),
                    Value::String(csrf_token_value.clone()),
                );
                headers.insert("X-CSRF-Token", csrf_token_value.as_str());
                headers.append(
                    "cookie",
                    COOKIE_PREFIX,
                    &format!("{session_cookie_key}={session_cookie_value}; "),
                );
            }
            AuthMode::None => {}
        }

        if let Some(profile_token) = profile_token.filter(|t| !t.is_empty()) {
            headers.insert("X-Profile-Token", profile_token);
            headers.insert("X-Profile-Mode", profile_mode.as_str());
        }

        if let Some(sudo) = sudo.filter(|s| s.is_set()) {
            headers.insert("Sudo", sudo.to_string());
        }

        Ok(Self {
            url,
            requester,
            request_timeout,
            headers: headers.finish(),
            camelize,
            reject_unauthorized,
            additional_body,
            auth_mode,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requester(&self) -> &Arc<dyn Requester> {
        &self.requester
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout)
    }

    pub fn request_timeout_ms(&self) -> u64 {
        self.request_timeout
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn camelize(&self) -> bool {
        self.camelize
    }

    pub fn reject_unauthorized(&self) -> bool {
        self.reject_unauthorized
    }

    pub fn additional_body(&self) -> &Map<String, Value> {
        &self.additional_body
    }

    pub fn auth_mode(&self) -> &AuthMode {
        &self.auth_mode
    }

    /// Headers as a `reqwest` header map, for reqwest-backed request handlers.
    ///
    /// # Errors
    ///
    /// Returns [`GitbeakerError::InvalidHeader`] if a credential contains
    /// characters that are not allowed in header values.
    pub fn header_map(&self) -> Result<HeaderMap> {
        to_header_map(&self.headers)
    }

    /// Applies the service's response key convention to a decoded body.
    pub fn process_response_body(&self, body: Value) -> Value {
        if self.camelize {
            camelize_keys(body)
        } else {
            body
        }
    }
}

impl PartialEq for BaseService {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
            && Arc::ptr_eq(&self.requester, &other.requester)
            && self.request_timeout == other.request_timeout
            && self.headers == other.headers
            && self.camelize == other.camelize
            && self.reject_unauthorized == other.reject_unauthorized
            && self.additional_body == other.additional_body
            && self.auth_mode == other.auth_mode
    }
}

impl fmt::Debug for BaseService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseService")
            .field("url", &self.url)
            .field("request_timeout", &self.request_timeout)
            .field("header_names", &self.headers.keys().collect::<Vec<_>>())
            .field("camelize", &self.camelize)
            .field("reject_unauthorized", &self.reject_unauthorized)
            .field("auth_mode", &self.auth_mode)
            .finish_non_exhaustive()
    }
}
