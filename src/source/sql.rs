//! SQL query adapter
//!
//! Compiles the predicate and ordering IR into a parameterised Postgres
//! `SELECT` with sea-query:
//! - Contains becomes `LIKE '%needle%'` with the needle's wildcards escaped
//! - negation is `NOT COALESCE(p, FALSE)` so rows with NULL satisfy it, as in memory
//! - ascending orders put NULL first, descending last
//!
//! Every value, including LIMIT and OFFSET, is bound as a placeholder.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_query::{
    Alias, Asterisk, Condition, Expr, Func, NullOrdering, Order, PostgresQueryBuilder, Query,
    QueryStatementWriter, SimpleExpr, Value,
};
use serde::Serialize;

use super::QuerySource;
use crate::ordering::OrderKey;
use crate::predicate::{CompareOp, Predicate};
use crate::request::SortDirection;
use crate::value::FieldValue;

/// A typed bind parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SqlParam {
    Null,
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Timestamp(NaiveDateTime),
}

/// Values this adapter never binds read as Null.
impl From<Value> for SqlParam {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(Some(b)) => SqlParam::Bool(b),
            Value::BigInt(Some(i)) => SqlParam::Int(i),
            Value::BigUnsigned(Some(n)) => SqlParam::Int(i64::try_from(n).unwrap_or(i64::MAX)),
            Value::Double(Some(f)) => SqlParam::Float(f),
            Value::String(Some(s)) => SqlParam::Text(*s),
            Value::Decimal(Some(d)) => SqlParam::Decimal(*d),
            Value::ChronoDateTime(Some(d)) => SqlParam::Timestamp(*d),
            _ => SqlParam::Null,
        }
    }
}

/// Compiled statement text and its binds, in placeholder order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// A composable SELECT over one table
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    table: String,
    columns: Vec<String>,
    predicate: Predicate,
    order: Vec<OrderKey>,
    offset: usize,
    limit: Option<usize>,
}

impl SqlQuery {
    /// `SELECT *` over `table`
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            predicate: Predicate::Always,
            order: Vec::new(),
            offset: 0,
            limit: None,
        }
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn order(&self) -> &[OrderKey] {
        &self.order
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Renders the statement.
    pub fn to_sql(&self) -> SqlStatement {
        let mut select = Query::select();

        if self.columns.is_empty() {
            select.column(Asterisk);
        } else {
            select.columns(self.columns.iter().map(|c| Alias::new(c.as_str())));
        }
        select.from(Alias::new(self.table.as_str()));

        if !self.predicate.is_always() {
            select.cond_where(condition(&self.predicate));
        }

        for key in &self.order {
            let (order, nulls) = match key.direction {
                SortDirection::Ascending => (Order::Asc, NullOrdering::First),
                SortDirection::Descending => (Order::Desc, NullOrdering::Last),
            };
            select.order_by_with_nulls(Alias::new(key.field.as_str()), order, nulls);
        }

        if let Some(limit) = self.limit {
            select.limit(limit as u64);
        }
        if self.offset > 0 {
            select.offset(self.offset as u64);
        }

        let (sql, values) = select.build(PostgresQueryBuilder);
        SqlStatement {
            sql,
            params: values.0.into_iter().map(SqlParam::from).collect(),
        }
    }
}

impl QuerySource for SqlQuery {
    /// Successive filters are ANDed.
    fn filter(mut self, predicate: Predicate) -> Self {
        let current = std::mem::replace(&mut self.predicate, Predicate::Always);
        self.predicate = current.and(predicate);
        self
    }

    /// Replaces any previous ordering.
    fn order_by(mut self, keys: Vec<OrderKey>) -> Self {
        self.order = keys;
        self
    }

    /// Skipping inside an existing limit shrinks the limit.
    fn skip(mut self, count: usize) -> Self {
        self.offset += count;
        self.limit = self.limit.map(|limit| limit.saturating_sub(count));
        self
    }

    fn take(mut self, count: usize) -> Self {
        self.limit = Some(self.limit.map_or(count, |limit| limit.min(count)));
        self
    }
}

/* ---------- Predicate -> Condition ---------- */

fn condition(predicate: &Predicate) -> Condition {
    match predicate {
        Predicate::And(parts) => parts
            .iter()
            .fold(Condition::all(), |cond, p| cond.add(condition(p))),
        Predicate::Or(parts) => parts
            .iter()
            .fold(Condition::any(), |cond, p| cond.add(condition(p))),
        p => Condition::all().add(expr(p)),
    }
}

fn expr(predicate: &Predicate) -> SimpleExpr {
    match predicate {
        Predicate::Always => Expr::cust("TRUE"),
        Predicate::Never => Expr::cust("FALSE"),
        Predicate::Compare {
            field, op, value, ..
        } => {
            let col = Expr::col(Alias::new(field.as_str()));
            let value = bind_value(value);
            match op {
                CompareOp::Eq => col.eq(value),
                CompareOp::Gt => col.gt(value),
                CompareOp::Ge => col.gte(value),
                CompareOp::Lt => col.lt(value),
            }
        }
        Predicate::Contains { field, needle } => {
            Expr::col(Alias::new(field.as_str())).like(like_contains(needle))
        }
        Predicate::Between { field, start, end } => Expr::col(Alias::new(field.as_str()))
            .gte(*start)
            .and(Expr::col(Alias::new(field.as_str())).lt(*end)),
        Predicate::Not(inner) => {
            Expr::expr(Func::coalesce([expr(inner), Expr::cust("FALSE")])).not()
        }
        Predicate::And(parts) => join(parts, SimpleExpr::and, "TRUE"),
        Predicate::Or(parts) => join(parts, SimpleExpr::or, "FALSE"),
    }
}

fn join(
    parts: &[Predicate],
    op: fn(SimpleExpr, SimpleExpr) -> SimpleExpr,
    empty: &str,
) -> SimpleExpr {
    parts
        .iter()
        .map(expr)
        .reduce(op)
        .unwrap_or_else(|| Expr::cust(empty))
}

fn bind_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::String(None),
        FieldValue::Text(s) | FieldValue::Enum(s) => s.as_str().into(),
        FieldValue::Bool(b) => (*b).into(),
        FieldValue::Int(i) => (*i).into(),
        FieldValue::Float(f) => (*f).into(),
        FieldValue::Decimal(d) => (*d).into(),
        FieldValue::Date(d) => (*d).into(),
    }
}

/* ---------- LIKE helpers ---------- */

fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn like_contains(s: &str) -> String {
    format!("%{}%", like_escape(s))
}
