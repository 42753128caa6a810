//! Single-row negotiation, fixed in the builder's type.
//!
//! A builder starts as `QueryBuilder<Many>`. `single()` and `maybe_single()`
//! switch the marker type, which fixes both the `Accept` header and the shape
//! returned by [`QueryBuilder::fetch`](crate::QueryBuilder::fetch).

use crate::error::{RestError, RestResult};
use crate::response::RestResponse;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Media type asking PostgREST for a single JSON object instead of an array.
pub const SINGLE_OBJECT_MEDIA_TYPE: &str = "application/vnd.pgrst.object+json";

/// Runtime view of the negotiation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SingleRowMode {
    /// Array response.
    #[default]
    None,
    /// Zero or one row; zero rows is success with no data.
    Maybe,
    /// Exactly one row; zero rows is a failure.
    Strict,
}

impl SingleRowMode {
    /// `Accept` header value for this mode, if any.
    pub fn accept_header(self) -> Option<&'static str> {
        match self {
            SingleRowMode::None => None,
            SingleRowMode::Maybe | SingleRowMode::Strict => Some(SINGLE_OBJECT_MEDIA_TYPE),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Many {}
    impl Sealed for super::MaybeSingle {}
    impl Sealed for super::Single {}
}

/// Marker trait implemented by [`Many`], [`MaybeSingle`] and [`Single`].
pub trait RowMode: sealed::Sealed + Send + Sync + 'static {
    const MODE: SingleRowMode;

    /// Natural typed shape: `Vec<T>`, `Option<T>` or `T`.
    type Output<T>;

    /// Convert a response into the typed shape, turning failures into errors.
    fn extract<T: DeserializeOwned>(response: RestResponse) -> RestResult<Self::Output<T>>;
}

/// Bulk mode (default).
#[derive(Debug, Clone, Copy)]
pub struct Many;

/// Zero-or-one row mode.
#[derive(Debug, Clone, Copy)]
pub struct MaybeSingle;

/// Exactly-one row mode.
#[derive(Debug, Clone, Copy)]
pub struct Single;

fn from_value<T: DeserializeOwned>(value: Value) -> RestResult<T> {
    serde_json::from_value(value).map_err(|e| RestError::decode(e.to_string()))
}

impl RowMode for Many {
    const MODE: SingleRowMode = SingleRowMode::None;
    type Output<T> = Vec<T>;

    fn extract<T: DeserializeOwned>(response: RestResponse) -> RestResult<Vec<T>> {
        match response {
            RestResponse::Rows(rows) => rows.into_iter().map(from_value).collect(),
            RestResponse::Row(row) => Ok(vec![from_value(row)?]),
            RestResponse::EmptyRow => Ok(Vec::new()),
            RestResponse::Failure(failure) => Err(failure.into_error()),
        }
    }
}

impl RowMode for MaybeSingle {
    const MODE: SingleRowMode = SingleRowMode::Maybe;
    type Output<T> = Option<T>;

    fn extract<T: DeserializeOwned>(response: RestResponse) -> RestResult<Option<T>> {
        match response {
            RestResponse::Row(row) => from_value(row).map(Some),
            RestResponse::EmptyRow => Ok(None),
            RestResponse::Rows(rows) => Err(RestError::decode(format!(
                "expected at most one row, got an array of {}",
                rows.len()
            ))),
            RestResponse::Failure(failure) => Err(failure.into_error()),
        }
    }
}

impl RowMode for Single {
    const MODE: SingleRowMode = SingleRowMode::Strict;
    type Output<T> = T;

    fn extract<T: DeserializeOwned>(response: RestResponse) -> RestResult<T> {
        match response {
            RestResponse::Row(row) => from_value(row),
            RestResponse::EmptyRow => Err(RestError::decode("expected exactly one row, got none")),
            RestResponse::Rows(rows) => Err(RestError::decode(format!(
                "expected exactly one row, got an array of {}",
                rows.len()
            ))),
            RestResponse::Failure(failure) => Err(failure.into_error()),
        }
    }
}
