//! Normalized responses.
//!
//! Every `execute()` resolves to a [`RestResponse`]; protocol failures are a
//! variant, not an `Err`.

use crate::error::RestError;
use crate::qb::SingleRowMode;
use reqwest::StatusCode;
use serde_json::Value;

/// Store-reported failure, normalized from whatever body shape came back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestFailure {
    /// HTTP status code.
    pub status: u16,
    /// Best available message, or `REST error (<status>)`.
    pub message: String,
    /// PostgREST / Postgres error code, e.g. `23505` or `PGRST116`.
    pub code: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl RestFailure {
    /// Build a failure from a status and an (optional) parsed body.
    ///
    /// The message is taken from `message`, then `error`, then falls back to
    /// a generic status-coded text.
    pub fn from_body(status: u16, body: Option<&Value>) -> Self {
        let field = |name: &str| body.and_then(|b| b.get(name)).and_then(text_of);
        let message = field("message")
            .or_else(|| field("error"))
            .unwrap_or_else(|| format!("REST error ({status})"));
        Self {
            status,
            message,
            code: field("code"),
            details: field("details"),
            hint: field("hint"),
        }
    }

    /// Lift into a [`RestError::Api`].
    pub fn into_error(self) -> RestError {
        RestError::Api {
            status: self.status,
            message: self.message,
        }
    }
}

impl std::fmt::Display for RestFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Result of one executed request.
#[derive(Debug, Clone, PartialEq)]
pub enum RestResponse {
    /// Bulk result (no single-row negotiation).
    Rows(Vec<Value>),
    /// One row under `single()` / `maybe_single()`.
    Row(Value),
    /// No row: `maybe_single()` matched nothing, or the body was empty.
    EmptyRow,
    /// Non-success status.
    Failure(RestFailure),
}

impl RestResponse {
    pub fn is_failure(&self) -> bool {
        matches!(self, RestResponse::Failure(_))
    }

    pub fn error(&self) -> Option<&RestFailure> {
        match self {
            RestResponse::Failure(failure) => Some(failure),
            _ => None,
        }
    }

    /// The single row, if this is a `Row`.
    pub fn row(&self) -> Option<&Value> {
        match self {
            RestResponse::Row(row) => Some(row),
            _ => None,
        }
    }

    /// The rows, if this is a `Rows`.
    pub fn rows(&self) -> Option<&[Value]> {
        match self {
            RestResponse::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// `{data, error}` view: at most one side is `Some`.
    pub fn into_parts(self) -> (Option<Value>, Option<RestFailure>) {
        match self {
            RestResponse::Rows(rows) => (Some(Value::Array(rows)), None),
            RestResponse::Row(row) => (Some(row), None),
            RestResponse::EmptyRow => (None, None),
            RestResponse::Failure(failure) => (None, Some(failure)),
        }
    }

    /// Data on success, [`RestError::Api`] on failure.
    pub fn into_result(self) -> Result<Option<Value>, RestError> {
        match self.into_parts() {
            (_, Some(failure)) => Err(failure.into_error()),
            (data, None) => Ok(data),
        }
    }
}

/// Decode a raw response according to the single-row mode.
pub(crate) fn decode(mode: SingleRowMode, status: StatusCode, body: &[u8]) -> RestResponse {
    if mode == SingleRowMode::Maybe && status == StatusCode::NOT_ACCEPTABLE {
        return RestResponse::EmptyRow;
    }

    let json = parse_body(body);

    if !status.is_success() {
        return RestResponse::Failure(RestFailure::from_body(status.as_u16(), json.as_ref()));
    }

    match (mode, json) {
        (SingleRowMode::None, Some(Value::Array(rows))) => RestResponse::Rows(rows),
        (SingleRowMode::None, None | Some(Value::Null)) => RestResponse::Rows(Vec::new()),
        (SingleRowMode::None, Some(other)) => RestResponse::Rows(vec![other]),
        (_, None | Some(Value::Null)) => RestResponse::EmptyRow,
        (_, Some(row)) => RestResponse::Row(row),
    }
}

/// Parse a non-empty body as JSON; unparsable bodies yield `None`.
fn parse_body(body: &[u8]) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(body).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maybe_mode_406_is_empty_row() {
        let resp = decode(SingleRowMode::Maybe, StatusCode::NOT_ACCEPTABLE, b"{}");
        assert_eq!(resp, RestResponse::EmptyRow);
        assert_eq!(resp.into_parts(), (None, None));
    }

    #[test]
    fn strict_mode_406_is_failure() {
        let body = br#"{"code":"PGRST116","details":"The result contains 0 rows","hint":null,"message":"JSON object requested, multiple (or no) rows returned"}"#;
        let resp = decode(SingleRowMode::Strict, StatusCode::NOT_ACCEPTABLE, body);
        let failure = resp.error().cloned().unwrap();
        assert_eq!(failure.status, 406);
        assert_eq!(
            failure.message,
            "JSON object requested, multiple (or no) rows returned"
        );
        assert_eq!(failure.code.as_deref(), Some("PGRST116"));
        assert_eq!(failure.hint, None);
    }

    #[test]
    fn failure_message_fallbacks() {
        let resp = decode(SingleRowMode::None, StatusCode::UNAUTHORIZED, br#"{"error":"bad jwt"}"#);
        assert_eq!(resp.error().unwrap().message, "bad jwt");

        let resp = decode(SingleRowMode::None, StatusCode::BAD_GATEWAY, b"<html>oops</html>");
        assert_eq!(resp.error().unwrap().message, "REST error (502)");

        let resp = decode(SingleRowMode::None, StatusCode::INTERNAL_SERVER_ERROR, b"");
        assert_eq!(resp.error().unwrap().message, "REST error (500)");
    }

    #[test]
    fn unparsable_success_body_is_null_data() {
        let resp = decode(SingleRowMode::Strict, StatusCode::OK, b"not json");
        assert_eq!(resp, RestResponse::EmptyRow);

        let resp = decode(SingleRowMode::None, StatusCode::OK, b"not json");
        assert_eq!(resp, RestResponse::Rows(vec![]));
    }

    #[test]
    fn success_shapes_follow_mode() {
        let resp = decode(SingleRowMode::None, StatusCode::OK, br#"[{"id":1},{"id":2}]"#);
        assert_eq!(resp.rows().map(<[Value]>::len), Some(2));

        let resp = decode(SingleRowMode::Strict, StatusCode::CREATED, br#"{"id":1,"name":"A"}"#);
        assert_eq!(resp.row(), Some(&json!({"id": 1, "name": "A"})));
    }

    #[test]
    fn into_result_lifts_failure() {
        let resp = RestResponse::Failure(RestFailure::from_body(409, Some(&json!({"message": "dup"}))));
        let err = resp.into_result().unwrap_err();
        assert_eq!(err.status(), Some(409));
    }
}
