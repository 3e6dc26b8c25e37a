use reqwest::header::HeaderMap;
use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

use crate::casing::decamelize_keys;
use crate::error::Result;
use crate::service::headers::{to_header_map, Headers};
use crate::service::BaseService;

use super::{Method, RequestParams};

/// A request with every service-level and per-request setting resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestOptions {
    pub method: Method,
    pub prefix_url: String,
    pub headers: Headers,
    pub timeout_ms: u64,
    pub search_params: String,
    pub body: Option<String>,
    pub reject_unauthorized: bool,
}

impl RequestOptions {
    /// Full request URL for `endpoint`, including the query string.
    pub fn full_url(&self, endpoint: &str) -> String {
        let mut url = format!(
            "{}/{}",
            self.prefix_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        if !self.search_params.is_empty() {
            url.push('?');
            url.push_str(&self.search_params);
        }
        url
    }

    pub fn header_map(&self) -> Result<HeaderMap> {
        to_header_map(&self.headers)
    }
}

/// Merges a service's context with per-request parameters.
///
/// Object and array bodies are decamelized and JSON encoded; object bodies
/// also receive the service's additional body fields, with request keys
/// taking precedence. Mutating requests without a body carry the additional
/// body on its own so session-authenticated calls still send their CSRF
/// token.
///
/// # Errors
///
/// Returns an error if the body cannot be serialized.
pub fn default_options_handler(
    service: &BaseService,
    method: Method,
    params: RequestParams,
) -> Result<RequestOptions> {
    let RequestParams { body, query, sudo } = params;

    let mut headers = service.headers().clone();

    if let Some(sudo) = sudo.filter(|s| s.is_set()) {
        headers.insert("sudo".to_string(), sudo.to_string());
    }

    let body = match body {
        Some(Value::Object(fields)) => {
            let mut merged = service.additional_body().clone();
            if let Value::Object(fields) = decamelize_keys(Value::Object(fields)) {
                merged.extend(fields);
            }
            headers.insert("content-type".to_string(), "application/json".to_string());
            Some(serde_json::to_string(&Value::Object(merged))?)
        }
        Some(Value::Array(items)) => {
            headers.insert("content-type".to_string(), "application/json".to_string());
            Some(serde_json::to_string(&decamelize_keys(Value::Array(items)))?)
        }
        Some(Value::String(raw)) => Some(raw),
        Some(Value::Null) | None
            if method.is_mutating() && !service.additional_body().is_empty() =>
        {
            headers.insert("content-type".to_string(), "application/json".to_string());
            Some(serde_json::to_string(service.additional_body())?)
        }
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    };

    let search_params = query
        .map(|q| format_query(&decamelize_keys(q)))
        .unwrap_or_default();

    Ok(RequestOptions {
        method,
        prefix_url: service.url().to_string(),
        headers,
        timeout_ms: service.request_timeout_ms(),
        search_params,
        body,
        reject_unauthorized: service.reject_unauthorized(),
    })
}

/// Encodes a query object, using brackets for arrays (`a[]=1&a[]=2`) and
/// nested objects (`a[b]=c`). Null values are dropped; non-object queries
/// produce an empty string.
pub fn format_query(query: &Value) -> String {
    let Value::Object(fields) = query else {
        return String::new();
    };

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in fields {
        append_pairs(&mut serializer, key, value);
    }
    serializer.finish()
}

fn append_pairs(serializer: &mut form_urlencoded::Serializer<'_, String>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            let key = format!("{key}[]");
            for item in items {
                append_pairs(serializer, &key, item);
            }
        }
        Value::Object(fields) => {
            for (sub, v) in fields {
                append_pairs(serializer, &format!("{key}[{sub}]"), v);
            }
        }
        Value::String(s) => {
            serializer.append_pair(key, s);
        }
        other => {
            serializer.append_pair(key, &other.to_string());
        }
    }
}
