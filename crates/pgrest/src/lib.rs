//! # pgrest
//!
//! A fluent client for PostgREST-style REST APIs (e.g. Supabase's `/rest/v1`).
//!
//! ## Features
//!
//! - **One chain, one request**: filters, projection and mutation compile into a
//!   single HTTP call; nothing is batched, cached or pooled
//! - **Mode in the type**: `single()` / `maybe_single()` change the builder's
//!   type, which fixes content negotiation and the decoded shape
//! - **Normalized results**: every HTTP status resolves to a [`RestResponse`];
//!   only transport errors are `Err`
//! - **Quoted filter values**: list items and structured OR predicates are
//!   quoted when they contain filter syntax
//! - **Atomic upsert**: `upsert().on_conflict(..)` instead of check-then-insert
//!
//! ## Example
//!
//! ```ignore
//! use pgrest::{RestClient, RestResponse};
//!
//! let client = RestClient::from_env()?;
//!
//! match client
//!     .from("crm_lead_state")
//!     .select("*")
//!     .eq("contact_id", contact_id)
//!     .maybe_single()
//!     .execute()
//!     .await?
//! {
//!     RestResponse::Row(lead) => println!("{lead}"),
//!     RestResponse::EmptyRow => println!("no lead yet"),
//!     RestResponse::Failure(f) => eprintln!("{}", f.message),
//!     RestResponse::Rows(_) => unreachable!(),
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
mod executor;
pub mod monitor;
pub mod qb;
pub mod request;
pub mod response;

pub use client::RestClient;
pub use config::RestConfig;
pub use error::{RestError, RestResult};
pub use monitor::{RequestContext, RequestHook, TracingRequestHook};
pub use qb::{
    FilterSet, IsValue, Many, MaybeSingle, Operation, Operator, Predicate, QueryBuilder, RowMode,
    Single, SingleRowMode,
};
pub use request::RestRequest;
pub use response::{RestFailure, RestResponse};

pub mod prelude;
