use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::{NativeAuth, Token};
use crate::requester::Requester;

pub const DEFAULT_HOST: &str = "https://gitlab.com";
pub const DEFAULT_API_VERSION: u32 = 4;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 300_000;

/// Server-side profiling mode requested through `X-Profile-Mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileMode {
    #[default]
    Execution,
    Memory,
}

impl ProfileMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Execution => "execution",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for ProfileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User to impersonate, by numeric id or username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sudo {
    Id(u64),
    Username(String),
}

impl Sudo {
    /// Numeric ids always count; usernames only when non-empty.
    pub fn is_set(&self) -> bool {
        match self {
            Self::Id(_) => true,
            Self::Username(name) => !name.is_empty(),
        }
    }
}

impl fmt::Display for Sudo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Username(name) => f.write_str(name),
        }
    }
}

impl From<u64> for Sudo {
    fn from(value: u64) -> Self {
        Self::Id(value)
    }
}

impl From<&str> for Sudo {
    fn from(value: &str) -> Self {
        Self::Username(value.to_owned())
    }
}

impl From<String> for Sudo {
    fn from(value: String) -> Self {
        Self::Username(value)
    }
}

/// Everything needed to build a [`BaseService`](super::BaseService).
///
/// Every field except `requester` can come from a configuration file; the
/// requester is injected in code.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServiceOptions {
    #[serde(default)]
    pub oauth_token: Option<Token>,

    #[serde(default)]
    pub token: Option<Token>,

    #[serde(default)]
    pub job_token: Option<Token>,

    #[serde(default)]
    pub native_auth: Option<NativeAuth>,

    /// GitLab instance origin
    #[serde(default = "default_host")]
    pub host: String,

    /// Path appended after `api/v{version}`
    #[serde(default)]
    pub url: String,

    /// API version, 3 or 4
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_true")]
    pub reject_unauthorized: bool,

    /// Camelize response keys
    #[serde(default)]
    pub camelize: bool,

    #[serde(skip)]
    pub requester: Option<Arc<dyn Requester>>,

    /// Request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    #[serde(default)]
    pub profile_token: Option<String>,

    #[serde(default)]
    pub profile_mode: ProfileMode,

    #[serde(default)]
    pub sudo: Option<Sudo>,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            oauth_token: None,
            token: None,
            job_token: None,
            native_auth: None,
            host: default_host(),
            url: String::new(),
            version: default_version(),
            reject_unauthorized: true,
            camelize: false,
            requester: None,
            request_timeout: default_request_timeout(),
            profile_token: None,
            profile_mode: ProfileMode::default(),
            sudo: None,
        }
    }
}

impl fmt::Debug for ServiceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceOptions")
            .field("oauth_token", &self.oauth_token)
            .field("token", &self.token)
            .field("job_token", &self.job_token)
            .field("native_auth", &self.native_auth)
            .field("host", &self.host)
            .field("url", &self.url)
            .field("version", &self.version)
            .field("reject_unauthorized", &self.reject_unauthorized)
            .field("camelize", &self.camelize)
            .field("requester", &self.requester.as_ref().map(|_| "<requester>"))
            .field("request_timeout", &self.request_timeout)
            .field("profile_token", &self.profile_token.as_ref().map(|_| "***"))
            .field("profile_mode", &self.profile_mode)
            .field("sudo", &self.sudo)
            .finish()
    }
}

impl ServiceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_requester(mut self, requester: Arc<dyn Requester>) -> Self {
        self.requester = Some(requester);
        self
    }

    pub fn with_oauth_token(mut self, token: impl Into<Token>) -> Self {
        self.oauth_token = Some(token.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<Token>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_job_token(mut self, token: impl Into<Token>) -> Self {
        self.job_token = Some(token.into());
        self
    }

    pub fn with_native_auth(mut self, native_auth: NativeAuth) -> Self {
        self.native_auth = Some(native_auth);
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_reject_unauthorized(mut self, reject: bool) -> Self {
        self.reject_unauthorized = reject;
        self
    }

    pub fn with_camelize(mut self, camelize: bool) -> Self {
        self.camelize = camelize;
        self
    }

    pub fn with_request_timeout(mut self, millis: u64) -> Self {
        self.request_timeout = millis;
        self
    }

    pub fn with_profile(mut self, token: impl Into<String>, mode: ProfileMode) -> Self {
        self.profile_token = Some(token.into());
        self.profile_mode = mode;
        self
    }

    pub fn with_sudo(mut self, sudo: impl Into<Sudo>) -> Self {
        self.sudo = Some(sudo.into());
        self
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_version() -> u32 {
    DEFAULT_API_VERSION
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}
