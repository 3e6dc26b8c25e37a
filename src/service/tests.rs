use std::sync::Arc;
use std::time::Duration;

use futures::future::{self, BoxFuture};
use futures::FutureExt;
use serde_json::{json, Value};

use super::*;
use crate::auth::{AuthMode, NativeAuth};
use crate::error::{GitbeakerError, Result};
use crate::requester::{Method, RequestParams, Requester, RequesterResponse};

/// Requester that is stored but never called.
struct NullRequester;

impl Requester for NullRequester {
    fn request<'a>(
        &'a self,
        _service: &'a BaseService,
        _method: Method,
        _endpoint: &'a str,
        _params: RequestParams,
    ) -> BoxFuture<'a, Result<RequesterResponse>> {
        future::ready(Err(GitbeakerError::Config(
            "requests are not sent in these tests".to_string(),
        )))
        .boxed()
    }
}

fn options() -> ServiceOptions {
    ServiceOptions::new().with_requester(Arc::new(NullRequester))
}

fn header_names(service: &BaseService) -> Vec<&str> {
    service.headers().keys().map(String::as_str).collect()
}

#[test]
fn test_missing_requester_fails() {
    let err = BaseService::new(ServiceOptions::new().with_token("glpat")).unwrap_err();

    assert!(matches!(err, GitbeakerError::MissingRequester));
    assert_eq!(err.to_string(), "Requester must be passed");
}

#[test]
fn test_defaults() {
    let service = BaseService::new(options()).unwrap();

    assert_eq!(service.url(), "https://gitlab.com/api/v4/");
    assert_eq!(header_names(&service), vec!["user-agent"]);
    assert_eq!(service.headers()["user-agent"], "gitbeaker");
    assert_eq!(service.request_timeout(), Duration::from_millis(300_000));
    assert!(service.reject_unauthorized());
    assert!(!service.camelize());
    assert!(service.additional_body().is_empty());
    assert_eq!(service.auth_mode(), &AuthMode::None);
}

#[test]
fn test_url_composition() {
    let service = BaseService::new(
        options()
            .with_host("https://gitlab.com")
            .with_url("projects")
            .with_version(4),
    )
    .unwrap();

    assert_eq!(service.url(), "https://gitlab.com/api/v4/projects");
}

#[test]
fn test_url_is_not_validated() {
    let service = BaseService::new(options().with_host("not a host").with_version(7)).unwrap();

    assert_eq!(service.url(), "not a host/api/v7/");
}

#[test]
fn test_oauth_takes_precedence_over_all_credentials() {
    let service = BaseService::new(
        options()
            .with_oauth_token("oauth")
            .with_job_token("job")
            .with_token("private")
            .with_native_auth(NativeAuth::new("session", "csrf")),
    )
    .unwrap();

    assert_eq!(header_names(&service), vec!["user-agent", "authorization"]);
    assert_eq!(service.headers()["authorization"], "Bearer oauth");
    assert!(service.additional_body().is_empty());
}

#[test]
fn test_job_token_beats_private_token() {
    let service = BaseService::new(options().with_job_token("job").with_token("private")).unwrap();

    assert_eq!(header_names(&service), vec!["user-agent", "job-token"]);
    assert_eq!(service.headers()["job-token"], "job");
}

#[test]
fn test_private_token() {
    let service = BaseService::new(options().with_token("glpat-abc")).unwrap();

    assert_eq!(service.headers()["private-token"], "glpat-abc");
    assert_eq!(service.auth_mode().kind(), "private-token");
}

#[test]
fn test_native_auth_sets_cookie_and_csrf() {
    let service = BaseService::new(
        options().with_native_auth(NativeAuth::new("session-value", "csrf-value")),
    )
    .unwrap();

    assert_eq!(
        service.headers()["cookie"],
        "cookie: _gitlab_session=session-value; "
    );
    assert_eq!(service.headers()["X-CSRF-Token"], "csrf-value");
    assert_eq!(
        Value::Object(service.additional_body().clone()),
        json!({ "authenticity_token": "csrf-value" })
    );
}

#[test]
fn test_native_auth_custom_keys() {
    let native = NativeAuth {
        session_cookie_key: Some("my_session".to_string()),
        session_cookie_value: "s".to_string(),
        csrf_token_key: Some("csrf_field".to_string()),
        csrf_token_value: "c".to_string(),
    };

    let service = BaseService::new(options().with_native_auth(native)).unwrap();

    assert_eq!(service.headers()["cookie"], "cookie: my_session=s; ");
    assert_eq!(service.additional_body()["csrf_field"], "c");
}

#[test]
fn test_native_auth_needs_session_cookie() {
    let service =
        BaseService::new(options().with_native_auth(NativeAuth::new("", "csrf-value"))).unwrap();

    assert_eq!(header_names(&service), vec!["user-agent"]);
    assert!(service.additional_body().is_empty());
}

#[test]
fn test_profiling_headers_default_mode() {
    let mut opts = options();
    opts.profile_token = Some("abc".to_string());

    let service = BaseService::new(opts).unwrap();

    assert_eq!(service.headers()["X-Profile-Token"], "abc");
    assert_eq!(service.headers()["X-Profile-Mode"], "execution");
}

#[test]
fn test_profiling_memory_mode() {
    let service = BaseService::new(options().with_profile("abc", ProfileMode::Memory)).unwrap();

    assert_eq!(service.headers()["X-Profile-Mode"], "memory");
}

#[test]
fn test_sudo_header() {
    let numeric = BaseService::new(options().with_sudo(42u64)).unwrap();
    let named = BaseService::new(options().with_sudo("root")).unwrap();
    let empty = BaseService::new(options().with_sudo("")).unwrap();
    let absent = BaseService::new(options()).unwrap();

    assert_eq!(numeric.headers()["Sudo"], "42");
    assert_eq!(named.headers()["Sudo"], "root");
    assert!(!empty.headers().contains_key("Sudo"));
    assert!(!absent.headers().contains_key("Sudo"));
}

#[test]
fn test_full_header_order() {
    let service = BaseService::new(
        options()
            .with_token("private")
            .with_profile("prof", ProfileMode::Execution)
            .with_sudo(7u64),
    )
    .unwrap();

    assert_eq!(
        header_names(&service),
        vec![
            "user-agent",
            "private-token",
            "X-Profile-Token",
            "X-Profile-Mode",
            "Sudo"
        ]
    );
}

#[test]
fn test_building_twice_is_structurally_equal() {
    let opts = options().with_token("private").with_sudo(3u64);

    let first = BaseService::new(opts.clone()).unwrap();
    let second = BaseService::new(opts).unwrap();

    assert_eq!(first, second);
    assert!(!std::ptr::eq(first.headers(), second.headers()));
}

#[test]
fn test_flags_are_carried() {
    let service = BaseService::new(
        options()
            .with_camelize(true)
            .with_reject_unauthorized(false)
            .with_request_timeout(5_000),
    )
    .unwrap();

    assert!(service.camelize());
    assert!(!service.reject_unauthorized());
    assert_eq!(service.request_timeout_ms(), 5_000);
}

#[test]
fn test_process_response_body_respects_camelize() {
    let plain = BaseService::new(options()).unwrap();
    let camel = BaseService::new(options().with_camelize(true)).unwrap();
    let body = json!({ "web_url": "https://gitlab.com", "star_count": 3 });

    assert_eq!(plain.process_response_body(body.clone()), body);
    assert_eq!(
        camel.process_response_body(body),
        json!({ "webUrl": "https://gitlab.com", "starCount": 3 })
    );
}

#[test]
fn test_header_map_conversion() {
    let service = BaseService::new(options().with_oauth_token("oauth")).unwrap();

    let map = service.header_map().unwrap();

    assert_eq!(map.get("authorization").unwrap(), "Bearer oauth");
    assert_eq!(map.len(), 2);
}

#[test]
fn test_serialized_context_skips_requester() {
    let service = BaseService::new(options().with_token("private")).unwrap();

    let value = serde_json::to_value(&service).unwrap();

    assert_eq!(value["url"], "https://gitlab.com/api/v4/");
    assert_eq!(value["headers"]["private-token"], "private");
    assert!(value.get("requester").is_none());
}
