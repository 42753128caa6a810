//! Sends a [`RestRequest`] and normalizes the response.

use crate::client::RestClient;
use crate::error::RestResult;
use crate::monitor::RequestContext;
use crate::request::RestRequest;
use crate::response::{self, RestResponse};
use std::time::Instant;

/// Issue exactly one HTTP request.
///
/// Transport failures are returned as `Err`; every HTTP status, including
/// errors, resolves to a [`RestResponse`].
pub(crate) async fn execute(client: &RestClient, request: RestRequest) -> RestResult<RestResponse> {
    let RestRequest {
        table,
        operation,
        mode,
        method,
        url,
        headers,
        body,
    } = request;

    let ctx = RequestContext {
        table,
        operation,
        mode,
        method: method.clone(),
        url: url.to_string(),
    };
    tracing::debug!(
        target: "pgrest.executor",
        table = %ctx.table,
        method = %ctx.method,
        operation = ?ctx.operation,
        mode = ?ctx.mode,
        url = %ctx.url,
        "sending request"
    );
    if let Some(hook) = client.hook() {
        hook.before_request(&ctx);
    }

    let mut builder = client.http().request(method, url).headers(headers);
    if let Some(body) = body {
        builder = builder.body(body);
    }

    let start = Instant::now();
    let sent = match builder.send().await {
        Ok(resp) => {
            let status = resp.status();
            resp.bytes().await.map(|bytes| (status, bytes))
        }
        Err(e) => Err(e),
    };
    let (status, bytes) = match sent {
        Ok(ok) => ok,
        Err(e) => {
            if let Some(hook) = client.hook() {
                hook.on_transport_error(&ctx, &e);
            }
            return Err(e.into());
        }
    };
    let elapsed = start.elapsed();

    tracing::debug!(
        target: "pgrest.executor",
        table = %ctx.table,
        method = %ctx.method,
        status = status.as_u16(),
        body_len = bytes.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "request completed"
    );
    if let Some(hook) = client.hook() {
        hook.after_response(&ctx, status, elapsed);
    }

    Ok(response::decode(mode, status, &bytes))
}
