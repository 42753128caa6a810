//! Request hooks.
//!
//! A [`RequestHook`] attached to a [`RestClient`](crate::RestClient) sees every
//! request before it is sent and every completed exchange afterwards.
//!
//! ```ignore
//! use pgrest::{RestClient, TracingRequestHook};
//! use tracing::Level;
//!
//! let client = RestClient::from_env()?
//!     .with_hook(TracingRequestHook::new().level(Level::INFO).max_url_length(120));
//! ```

use crate::qb::{Operation, SingleRowMode};
use reqwest::{Method, StatusCode};
use std::time::Duration;
use tracing::Level;

/// What a hook knows about a request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub table: String,
    pub operation: Operation,
    pub mode: SingleRowMode,
    pub method: Method,
    /// Full URL including the encoded filters. Never contains credentials.
    pub url: String,
}

/// Lifecycle callbacks for requests.
pub trait RequestHook: Send + Sync {
    /// Called right before the request is sent.
    fn before_request(&self, _ctx: &RequestContext) {}

    /// Called once a response status and body have been received.
    fn after_response(&self, _ctx: &RequestContext, _status: StatusCode, _elapsed: Duration) {}

    /// Called when the request failed below the HTTP layer.
    fn on_transport_error(&self, _ctx: &RequestContext, _error: &reqwest::Error) {}
}

fn truncate_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// A `tracing`-based hook that logs each request and its outcome.
#[derive(Debug, Clone)]
pub struct TracingRequestHook {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long URLs (in bytes). `None` means no truncation.
    pub max_url_length: Option<usize>,
}

impl Default for TracingRequestHook {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_url_length: Some(200),
        }
    }
}

impl TracingRequestHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum URL length to display.
    pub fn max_url_length(mut self, len: usize) -> Self {
        self.max_url_length = Some(len);
        self
    }

    /// Disable URL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_url_length = None;
        self
    }

    fn truncate_url(&self, url: &str) -> String {
        match self.max_url_length {
            Some(max) if url.len() > max => format!("{}...", truncate_bytes(url, max)),
            _ => url.to_string(),
        }
    }
}

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN => tracing::warn!($($field)*),
            Level::INFO => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

impl RequestHook for TracingRequestHook {
    fn before_request(&self, ctx: &RequestContext) {
        let url = self.truncate_url(&ctx.url);
        emit_at_level!(
            self.level,
            target: "pgrest.request",
            table = %ctx.table,
            operation = ?ctx.operation,
            mode = ?ctx.mode,
            method = %ctx.method,
            url = %url,
            "sending request"
        );
    }

    fn after_response(&self, ctx: &RequestContext, status: StatusCode, elapsed: Duration) {
        emit_at_level!(
            self.level,
            target: "pgrest.request",
            table = %ctx.table,
            method = %ctx.method,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "response received"
        );
    }

    fn on_transport_error(&self, ctx: &RequestContext, error: &reqwest::Error) {
        tracing::warn!(
            target: "pgrest.request",
            table = %ctx.table,
            method = %ctx.method,
            timeout = error.is_timeout(),
            connect = error.is_connect(),
            error = %error,
            "request failed"
        );
    }
}
