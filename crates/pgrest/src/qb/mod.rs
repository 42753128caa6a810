//! Query builder for PostgREST tables.
//!
//! A chain of calls on a [`QueryBuilder`] compiles into exactly one HTTP
//! request:
//!
//! ```ignore
//! // GET /rest/v1/crm_contacts?select=id,name&active=eq.true&order=name.asc&limit=10
//! let rows = client
//!     .from("crm_contacts")
//!     .select("id,name")
//!     .eq("active", true)
//!     .order("name")
//!     .limit(10)
//!     .execute()
//!     .await?;
//!
//! // POST with Prefer: return=representation and a single-object Accept header
//! let note: Note = client
//!     .from("crm_notes")
//!     .insert(&new_note)
//!     .select("*")
//!     .single()
//!     .fetch()
//!     .await?;
//! ```

mod builder;
pub mod filter;
mod mode;

pub use builder::{Operation, QueryBuilder};
pub use filter::{FilterSet, IsValue, Operator, Predicate};
pub use mode::{Many, MaybeSingle, RowMode, SINGLE_OBJECT_MEDIA_TYPE, Single, SingleRowMode};

#[cfg(test)]
mod tests;
