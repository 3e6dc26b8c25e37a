//! The transport seam.
//!
//! A [`BaseService`] never talks to the network. It holds an injected
//! [`Requester`], and request wrappers call through it. [`HandlerRequester`]
//! adapts any [`RequestHandler`] into a requester by preparing the request
//! options first, so transports only ever see fully resolved requests.

mod dry_run;
mod options;

use std::fmt;
use std::str::FromStr;

use futures::future::BoxFuture;
use futures::FutureExt;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GitbeakerError, Result};
use crate::service::{BaseService, Sudo};

pub use dry_run::DryRunHandler;
pub use options::{default_options_handler, format_query, RequestOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Stream,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Stream => "stream",
        }
    }

    /// Whether the method modifies server state.
    pub fn is_mutating(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Delete)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = GitbeakerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            "put" => Ok(Self::Put),
            "delete" => Ok(Self::Delete),
            "stream" => Ok(Self::Stream),
            other => Err(GitbeakerError::Config(format!(
                "Unsupported request method '{other}'"
            ))),
        }
    }
}

/// Per-request inputs supplied by a resource wrapper.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    pub body: Option<Value>,
    pub query: Option<Value>,
    pub sudo: Option<Sudo>,
}

impl RequestParams {
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_sudo(mut self, sudo: impl Into<Sudo>) -> Self {
        self.sudo = Some(sudo.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequesterResponse {
    pub status: u16,
    pub headers: IndexMap<String, String>,
    pub body: Value,
}

/// Performs GitLab API calls on behalf of a [`BaseService`].
pub trait Requester: Send + Sync {
    fn request<'a>(
        &'a self,
        service: &'a BaseService,
        method: Method,
        endpoint: &'a str,
        params: RequestParams,
    ) -> BoxFuture<'a, Result<RequesterResponse>>;

    fn get<'a>(
        &'a self,
        service: &'a BaseService,
        endpoint: &'a str,
        params: RequestParams,
    ) -> BoxFuture<'a, Result<RequesterResponse>> {
        self.request(service, Method::Get, endpoint, params)
    }

    fn post<'a>(
        &'a self,
        service: &'a BaseService,
        endpoint: &'a str,
        params: RequestParams,
    ) -> BoxFuture<'a, Result<RequesterResponse>> {
        self.request(service, Method::Post, endpoint, params)
    }

    fn put<'a>(
        &'a self,
        service: &'a BaseService,
        endpoint: &'a str,
        params: RequestParams,
    ) -> BoxFuture<'a, Result<RequesterResponse>> {
        self.request(service, Method::Put, endpoint, params)
    }

    fn delete<'a>(
        &'a self,
        service: &'a BaseService,
        endpoint: &'a str,
        params: RequestParams,
    ) -> BoxFuture<'a, Result<RequesterResponse>> {
        self.request(service, Method::Delete, endpoint, params)
    }

    fn stream<'a>(
        &'a self,
        service: &'a BaseService,
        endpoint: &'a str,
        params: RequestParams,
    ) -> BoxFuture<'a, Result<RequesterResponse>> {
        self.request(service, Method::Stream, endpoint, params)
    }
}

/// Sends a fully prepared request. This is where a real HTTP client plugs in.
pub trait RequestHandler: Send + Sync {
    fn handle<'a>(
        &'a self,
        endpoint: &'a str,
        options: RequestOptions,
    ) -> BoxFuture<'a, Result<RequesterResponse>>;
}

/// A [`Requester`] that prepares options with [`default_options_handler`]
/// and hands them to a [`RequestHandler`].
pub struct HandlerRequester<H> {
    handler: H,
}

impl<H: RequestHandler> HandlerRequester<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl<H: RequestHandler> Requester for HandlerRequester<H> {
    fn request<'a>(
        &'a self,
        service: &'a BaseService,
        method: Method,
        endpoint: &'a str,
        params: RequestParams,
    ) -> BoxFuture<'a, Result<RequesterResponse>> {
        async move {
            let options = default_options_handler(service, method, params)?;
            self.handler.handle(endpoint, options).await
        }
        .boxed()
    }
}
