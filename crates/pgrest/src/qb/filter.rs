//! PostgREST filter encoding.
//!
//! Every function here is pure string construction. Filters are stored in a
//! [`FilterSet`] keyed by column name (or one of the reserved keys), and the
//! last write for a key wins.
//!
//! List items (`contains`, `in_list`) and [`Predicate`] values are quoted when
//! they contain a character PostgREST treats as syntax, so a value such as
//! `"a,b"` stays one item. The raw OR form ([`encode_or`]) is the exception:
//! it takes a caller-formatted expression and does no escaping.

use std::borrow::Cow;
use std::fmt::Display;

/// Reserved key holding the projection.
pub const SELECT_KEY: &str = "select";
/// Reserved key holding the ordering.
pub const ORDER_KEY: &str = "order";
/// Reserved key holding the row limit.
pub const LIMIT_KEY: &str = "limit";
/// Reserved key holding an OR group.
pub const OR_KEY: &str = "or";
/// Reserved key holding the upsert conflict target.
pub const ON_CONFLICT_KEY: &str = "on_conflict";

/// Whether `key` is one of the reserved (non-column) keys.
pub fn is_reserved_key(key: &str) -> bool {
    matches!(key, SELECT_KEY | ORDER_KEY | LIMIT_KEY | OR_KEY | ON_CONFLICT_KEY)
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    Ilike,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Like => "like",
            Operator::Ilike => "ilike",
        }
    }
}

/// Right-hand side of an `is` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsValue {
    Null,
    True,
    False,
}

impl IsValue {
    pub fn as_str(self) -> &'static str {
        match self {
            IsValue::Null => "null",
            IsValue::True => "true",
            IsValue::False => "false",
        }
    }
}

// ==================== Encoders ====================

/// `eq.<value>`
pub fn encode_eq(value: impl Display) -> String {
    encode_compare(Operator::Eq, value)
}

/// `<op>.<value>`
pub fn encode_compare(op: Operator, value: impl Display) -> String {
    format!("{}.{}", op.as_str(), value)
}

/// `is.<null|true|false>`
pub fn encode_is(value: IsValue) -> String {
    format!("is.{}", value.as_str())
}

/// `(<expression>)`, with the expression taken verbatim.
pub fn encode_or(expression: &str) -> String {
    format!("({expression})")
}

/// `(<p1>,<p2>,...)` from structured predicates.
pub fn encode_or_predicates(predicates: &[Predicate]) -> String {
    let parts: Vec<String> = predicates.iter().map(Predicate::render).collect();
    format!("({})", parts.join(","))
}

/// `cs.{<item>,<item>}`. An empty list encodes as `cs.{}`.
pub fn encode_contains<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    format!("cs.{{{}}}", join_items(items))
}

/// `in.(<item>,<item>)`
pub fn encode_in<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    format!("in.({})", join_items(items))
}

/// `<column>.asc` or `<column>.desc`
pub fn encode_order(column: &str, ascending: bool) -> String {
    format!("{}.{}", column, if ascending { "asc" } else { "desc" })
}

/// The limit as a decimal string.
pub fn encode_limit(n: u64) -> String {
    n.to_string()
}

fn join_items<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    items
        .into_iter()
        .map(|item| quote_item(&item.to_string()).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

fn is_reserved_char(c: char) -> bool {
    matches!(c, ',' | '(' | ')' | '{' | '}' | '"' | '\\') || c.is_whitespace()
}

/// Double-quote a list item or predicate value if it contains filter syntax.
///
/// Inside quotes, `"` and `\` are backslash-escaped. Empty strings are quoted
/// so they survive as an element.
pub fn quote_item(item: &str) -> Cow<'_, str> {
    if !item.is_empty() && !item.chars().any(is_reserved_char) {
        return Cow::Borrowed(item);
    }
    let mut out = String::with_capacity(item.len() + 2);
    out.push('"');
    for c in item.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    Cow::Owned(out)
}

// ==================== Predicate ====================

#[derive(Debug, Clone, PartialEq, Eq)]
enum PredicateOp {
    Compare(Operator, String),
    Is(IsValue),
    In(Vec<String>),
    Contains(Vec<String>),
}

/// A single `column.op.value` term for an OR group.
///
/// ```ignore
/// use pgrest::Predicate;
///
/// let q = client.from("crm_contacts").or_where(&[
///     Predicate::eq("owner_user_id", user_id),
///     Predicate::is("owner_user_id", IsValue::Null),
/// ]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    column: String,
    negated: bool,
    op: PredicateOp,
}

impl Predicate {
    fn compare(column: impl Into<String>, op: Operator, value: impl Display) -> Self {
        Self {
            column: column.into(),
            negated: false,
            op: PredicateOp::Compare(op, value.to_string()),
        }
    }

    /// column = value
    pub fn eq(column: impl Into<String>, value: impl Display) -> Self {
        Self::compare(column, Operator::Eq, value)
    }

    /// column <> value
    pub fn neq(column: impl Into<String>, value: impl Display) -> Self {
        Self::compare(column, Operator::Neq, value)
    }

    /// column > value
    pub fn gt(column: impl Into<String>, value: impl Display) -> Self {
        Self::compare(column, Operator::Gt, value)
    }

    /// column >= value
    pub fn gte(column: impl Into<String>, value: impl Display) -> Self {
        Self::compare(column, Operator::Gte, value)
    }

    /// column < value
    pub fn lt(column: impl Into<String>, value: impl Display) -> Self {
        Self::compare(column, Operator::Lt, value)
    }

    /// column <= value
    pub fn lte(column: impl Into<String>, value: impl Display) -> Self {
        Self::compare(column, Operator::Lte, value)
    }

    /// column LIKE pattern
    pub fn like(column: impl Into<String>, pattern: impl Display) -> Self {
        Self::compare(column, Operator::Like, pattern)
    }

    /// column ILIKE pattern
    pub fn ilike(column: impl Into<String>, pattern: impl Display) -> Self {
        Self::compare(column, Operator::Ilike, pattern)
    }

    /// column IS value
    pub fn is(column: impl Into<String>, value: IsValue) -> Self {
        Self {
            column: column.into(),
            negated: false,
            op: PredicateOp::Is(value),
        }
    }

    /// column IN (items)
    pub fn in_list<I>(column: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        Self {
            column: column.into(),
            negated: false,
            op: PredicateOp::In(items.into_iter().map(|i| i.to_string()).collect()),
        }
    }

    /// column @> {items}
    pub fn contains<I>(column: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        Self {
            column: column.into(),
            negated: false,
            op: PredicateOp::Contains(items.into_iter().map(|i| i.to_string()).collect()),
        }
    }

    /// Negate this predicate (`column.not.op.value`).
    pub fn not(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Render as `column.[not.]op.value`.
    pub fn render(&self) -> String {
        let not = if self.negated { "not." } else { "" };
        let rhs = match &self.op {
            PredicateOp::Compare(op, value) => format!("{}.{}", op.as_str(), quote_item(value)),
            PredicateOp::Is(value) => encode_is(*value),
            PredicateOp::In(items) => encode_in(items),
            PredicateOp::Contains(items) => encode_contains(items),
        };
        format!("{}.{}{}", self.column, not, rhs)
    }
}

// ==================== FilterSet ====================

/// Ordered key/value query parameters with last-write-wins per key.
///
/// Overwriting a key keeps its original position, the same way
/// `URLSearchParams.set` behaves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    entries: Vec<(String, String)>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the value for `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Set `key` only if it has no value yet.
    pub fn set_default(&mut self, key: &str, value: &str) {
        if !self.contains_key(key) {
            self.entries.push((key.to_string(), value.to_string()));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Column filters only (reserved keys skipped).
    pub fn column_filters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(k, _)| !is_reserved_key(k))
    }

    /// `application/x-www-form-urlencoded` serialization.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.entries {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }
}
