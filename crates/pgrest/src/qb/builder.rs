//! The fluent query builder.

use crate::client::RestClient;
use crate::error::{RestError, RestResult};
use crate::executor;
use crate::qb::filter::{
    self, FilterSet, IsValue, LIMIT_KEY, ON_CONFLICT_KEY, OR_KEY, ORDER_KEY, Operator, Predicate,
    SELECT_KEY,
};
use crate::qb::mode::{Many, MaybeSingle, RowMode, Single, SingleRowMode};
use crate::request::RestRequest;
use crate::response::RestResponse;
use reqwest::Method;
use reqwest::header::{ACCEPT, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;
use std::marker::PhantomData;

const PREFER: &str = "prefer";
const RETURN_REPRESENTATION: &str = "return=representation";
const MERGE_DUPLICATES: &str = "resolution=merge-duplicates,return=representation";

/// What a builder will do when executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    #[default]
    Select,
    Insert,
    Update,
    /// Insert, or merge into the row that conflicts on `on_conflict`.
    Upsert,
}

impl Operation {
    pub fn method(self) -> Method {
        match self {
            Operation::Select => Method::GET,
            Operation::Insert | Operation::Upsert => Method::POST,
            Operation::Update => Method::PATCH,
        }
    }

    /// `Prefer` header value sent with this operation.
    pub fn prefer(self) -> Option<&'static str> {
        match self {
            Operation::Select => None,
            Operation::Insert | Operation::Update => Some(RETURN_REPRESENTATION),
            Operation::Upsert => Some(MERGE_DUPLICATES),
        }
    }

    pub fn is_mutation(self) -> bool {
        !matches!(self, Operation::Select)
    }
}

/// Chainable builder for one request against one table.
///
/// Every method consumes the builder and returns the updated value; the
/// builder is finally consumed by [`execute`](Self::execute) or
/// [`fetch`](Self::fetch). Filters are keyed by column, so a second filter on
/// the same column replaces the first.
#[derive(Debug, Clone)]
pub struct QueryBuilder<M: RowMode = Many> {
    client: RestClient,
    table: String,
    operation: Operation,
    payload: Option<Value>,
    filters: FilterSet,
    /// Build error, reported at execution
    build_error: Option<String>,
    _mode: PhantomData<M>,
}

impl QueryBuilder<Many> {
    pub(crate) fn new(client: RestClient, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
            operation: Operation::Select,
            payload: None,
            filters: FilterSet::new(),
            build_error: None,
            _mode: PhantomData,
        }
    }
}

impl<M: RowMode> QueryBuilder<M> {
    // ==================== Accessors ====================

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn mode(&self) -> SingleRowMode {
        M::MODE
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Encoded filters as set so far (without the `select` default).
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    // ==================== Projection & mutations ====================

    /// Set the projection, e.g. `"id,name"` or `"*, crm_pipeline_stages(*)"`.
    pub fn select(mut self, columns: &str) -> Self {
        self.filters.set(SELECT_KEY, columns);
        self
    }

    /// Insert one record or an array of records.
    pub fn insert<T: Serialize>(self, payload: T) -> Self {
        self.mutation(Operation::Insert, payload)
    }

    /// Update the rows matched by the filters.
    pub fn update<T: Serialize>(self, payload: T) -> Self {
        self.mutation(Operation::Update, payload)
    }

    /// Insert, merging into existing rows on a unique-key conflict.
    ///
    /// The store resolves the conflict atomically. Pair with
    /// [`on_conflict`](Self::on_conflict) when the conflict target is not the
    /// primary key.
    pub fn upsert<T: Serialize>(self, payload: T) -> Self {
        self.mutation(Operation::Upsert, payload)
    }

    /// Columns of the unique constraint an upsert resolves against.
    pub fn on_conflict(mut self, columns: &str) -> Self {
        self.filters.set(ON_CONFLICT_KEY, columns);
        self
    }

    fn mutation<T: Serialize>(mut self, operation: Operation, payload: T) -> Self {
        if self.operation.is_mutation() && self.operation != operation {
            tracing::warn!(
                target: "pgrest.qb",
                table = %self.table,
                previous = ?self.operation,
                next = ?operation,
                "mutating call replaces an earlier one on the same builder"
            );
        }
        self.operation = operation;
        match serde_json::to_value(payload) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => {
                self.payload = Some(value);
                self.build_error = None;
            }
            Ok(other) => {
                self.payload = None;
                self.build_error = Some(format!(
                    "payload must serialize to a JSON object or array, got {other}"
                ));
            }
            Err(e) => {
                self.payload = None;
                self.build_error = Some(e.to_string());
            }
        }
        self
    }

    // ==================== Filters ====================

    /// column = value
    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.filters.set(column, filter::encode_eq(value));
        self
    }

    /// column = value, only when `value` is `Some`.
    pub fn eq_opt<T: Display>(self, column: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.eq(column, value),
            None => self,
        }
    }

    /// column <> value
    pub fn neq(self, column: &str, value: impl Display) -> Self {
        self.compare(column, Operator::Neq, value)
    }

    /// column > value
    pub fn gt(self, column: &str, value: impl Display) -> Self {
        self.compare(column, Operator::Gt, value)
    }

    /// column >= value
    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.compare(column, Operator::Gte, value)
    }

    /// column < value
    pub fn lt(self, column: &str, value: impl Display) -> Self {
        self.compare(column, Operator::Lt, value)
    }

    /// column <= value
    pub fn lte(self, column: &str, value: impl Display) -> Self {
        self.compare(column, Operator::Lte, value)
    }

    /// column LIKE pattern (`*` or `%` as wildcard)
    pub fn like(self, column: &str, pattern: impl Display) -> Self {
        self.compare(column, Operator::Like, pattern)
    }

    /// column ILIKE pattern
    pub fn ilike(self, column: &str, pattern: impl Display) -> Self {
        self.compare(column, Operator::Ilike, pattern)
    }

    fn compare(mut self, column: &str, op: Operator, value: impl Display) -> Self {
        self.filters.set(column, filter::encode_compare(op, value));
        self
    }

    /// column IS NULL / TRUE / FALSE
    pub fn is(mut self, column: &str, value: IsValue) -> Self {
        self.filters.set(column, filter::encode_is(value));
        self
    }

    /// column IN (items)
    pub fn in_list<I>(mut self, column: &str, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.filters.set(column, filter::encode_in(items));
        self
    }

    /// Array column contains every item: `cs.{a,b}`.
    pub fn contains<I>(mut self, column: &str, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.filters.set(column, filter::encode_contains(items));
        self
    }

    /// OR group from a pre-formatted PostgREST expression, e.g.
    /// `"owner_user_id.eq.7,owner_user_id.is.null"`.
    ///
    /// The expression is sent verbatim, with no escaping. Values that come
    /// from user input belong in [`or_where`](Self::or_where) instead.
    pub fn or(mut self, expression: &str) -> Self {
        self.filters.set(OR_KEY, filter::encode_or(expression));
        self
    }

    /// OR group from structured predicates, with values quoted as needed.
    pub fn or_where(mut self, predicates: &[Predicate]) -> Self {
        self.filters.set(OR_KEY, filter::encode_or_predicates(predicates));
        self
    }

    // ==================== Ordering & limit ====================

    /// Ascending order on `column`.
    pub fn order(self, column: &str) -> Self {
        self.order_by(column, true)
    }

    /// Descending order on `column`.
    pub fn order_desc(self, column: &str) -> Self {
        self.order_by(column, false)
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.filters.set(ORDER_KEY, filter::encode_order(column, ascending));
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.filters.set(LIMIT_KEY, filter::encode_limit(n));
        self
    }

    // ==================== Single-row negotiation ====================

    /// Expect zero or one row; zero rows resolves to `EmptyRow`.
    pub fn maybe_single(self) -> QueryBuilder<MaybeSingle> {
        self.with_mode()
    }

    /// Expect exactly one row; zero rows resolves to a `Failure`.
    pub fn single(self) -> QueryBuilder<Single> {
        self.with_mode()
    }

    fn with_mode<N: RowMode>(self) -> QueryBuilder<N> {
        QueryBuilder {
            client: self.client,
            table: self.table,
            operation: self.operation,
            payload: self.payload,
            filters: self.filters,
            build_error: self.build_error,
            _mode: PhantomData,
        }
    }

    // ==================== Build & execute ====================

    /// Validate builder state before execution.
    pub fn validate(&self) -> RestResult<()> {
        if let Some(err) = &self.build_error {
            return Err(RestError::Serialization(err.clone()));
        }
        if self.table.is_empty() {
            return Err(RestError::config("table name is empty"));
        }
        Ok(())
    }

    /// Compile the chain into the request that [`execute`](Self::execute) sends.
    pub fn build_request(&self) -> RestResult<RestRequest> {
        self.validate()?;

        let mut filters = self.filters.clone();
        filters.set_default(SELECT_KEY, "*");

        let mut url = self.client.table_url(&self.table)?;
        url.set_query(Some(&filters.to_query_string()));

        let mut headers = self.client.standard_headers();
        if let Some(prefer) = self.operation.prefer() {
            headers.insert(PREFER, HeaderValue::from_static(prefer));
        }
        if let Some(accept) = M::MODE.accept_header() {
            headers.insert(ACCEPT, HeaderValue::from_static(accept));
        }

        let body = if self.operation.is_mutation() {
            let payload = self.payload.as_ref().unwrap_or(&Value::Null);
            Some(serde_json::to_string(payload)?)
        } else {
            None
        };

        Ok(RestRequest {
            table: self.table.clone(),
            operation: self.operation,
            mode: M::MODE,
            method: self.operation.method(),
            url,
            headers,
            body,
        })
    }

    /// Send the request and normalize the response.
    ///
    /// HTTP failures come back as [`RestResponse::Failure`]; only transport
    /// errors and invalid builder state are `Err`.
    pub async fn execute(self) -> RestResult<RestResponse> {
        let request = self.build_request()?;
        executor::execute(&self.client, request).await
    }

    /// Execute and decode into the mode's natural shape:
    /// `Vec<T>` by default, `Option<T>` after `maybe_single()`, `T` after
    /// `single()`. Failures become [`RestError::Api`].
    pub async fn fetch<T: DeserializeOwned>(self) -> RestResult<M::Output<T>> {
        let response = self.execute().await?;
        M::extract(response)
    }
}
