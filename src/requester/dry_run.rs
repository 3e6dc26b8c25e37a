use futures::future::{self, BoxFuture};
use futures::FutureExt;
use log::info;
use serde_json::json;

use crate::error::{GitbeakerError, Result};

use super::{RequestHandler, RequestOptions, RequesterResponse};

/// A handler that never touches the network.
///
/// Responds with `200` and echoes the prepared request back as the body,
/// which makes it handy for inspecting what would be sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunHandler;

impl RequestHandler for DryRunHandler {
    fn handle<'a>(
        &'a self,
        endpoint: &'a str,
        options: RequestOptions,
    ) -> BoxFuture<'a, Result<RequesterResponse>> {
        let url = options.full_url(endpoint);
        info!("[dry-run] {} {url}", options.method.as_str().to_uppercase());

        let response = serde_json::to_value(&options).map(|prepared| RequesterResponse {
            status: 200,
            headers: options.headers.clone(),
            body: json!({ "url": url, "request": prepared }),
        });

        future::ready(response.map_err(GitbeakerError::from)).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requester::{HandlerRequester, RequestParams};
    use crate::service::{BaseService, ServiceOptions};
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_dry_run_echoes_request() {
        let service = BaseService::new(
            ServiceOptions::new()
                .with_requester(Arc::new(HandlerRequester::new(DryRunHandler)))
                .with_oauth_token("oauth"),
        )
        .unwrap();

        let response = tokio_test::block_on(service.requester().get(
            &service,
            "projects",
            RequestParams::default().with_query(json!({ "search": "beaker" })),
        ))
        .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.headers["authorization"], "Bearer oauth");
        assert_eq!(
            response.body["url"],
            "https://gitlab.com/api/v4/projects?search=beaker"
        );
        assert_eq!(response.body["request"]["method"], "get");
        assert_eq!(response.body["request"]["timeout_ms"], 300_000);
    }
}
