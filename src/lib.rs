//! Foundations for GitLab API clients.
//!
//! [`BaseService`] turns a [`ServiceOptions`] record into the immutable
//! request context that resource wrappers share: the API base URL, the
//! headers for exactly one credential mode, profiling and sudo directives,
//! and the injected [`Requester`] that performs the actual calls.

pub mod auth;
pub mod casing;
pub mod config;
pub mod error;
pub mod requester;
pub mod service;

pub use auth::{AuthMode, NativeAuth, Token};
pub use error::{GitbeakerError, Result};
pub use requester::{
    DryRunHandler, HandlerRequester, Method, RequestHandler, RequestOptions, RequestParams,
    Requester, RequesterResponse,
};
pub use service::{BaseService, ProfileMode, ServiceOptions, Sudo};
