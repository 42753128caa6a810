//! Convenient imports for typical `pgrest` usage.
//!
//! ```ignore
//! use pgrest::prelude::*;
//! ```

pub use crate::{
    IsValue, Predicate, QueryBuilder, RestClient, RestConfig, RestError, RestFailure,
    RestResponse, RestResult,
};
