mod base;
pub(crate) mod headers;
mod options;

#[cfg(test)]
mod tests;

pub use base::{BaseService, COOKIE_PREFIX, USER_AGENT};
pub use headers::{HeaderSet, Headers};
pub use options::{
    ProfileMode, ServiceOptions, Sudo, DEFAULT_API_VERSION, DEFAULT_HOST,
    DEFAULT_REQUEST_TIMEOUT_MS,
};
