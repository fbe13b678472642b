//! `$filter` expression tree
//!
//! Filters are assembled as a small AST and rendered to OData text in one
//! place, so quoting of string literals and parenthesization of nested groups
//! never depend on the call site.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal on the right-hand side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl FilterValue {
    /// Render as an OData literal. Strings are single-quoted with embedded
    /// quotes doubled; non-finite floats use `INF`, `-INF` and `NaN`.
    pub fn to_odata(&self) -> String {
        match self {
            Self::String(s) => format!("'{}'", escape_string(s)),
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(n) if n.is_nan() => "NaN".to_string(),
            Self::Float(n) if n.is_infinite() && n.is_sign_positive() => "INF".to_string(),
            Self::Float(n) if n.is_infinite() => "-INF".to_string(),
            Self::Float(n) => n.to_string(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// A `$filter` expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// `<field> eq <value>`
    Eq(String, FilterValue),
    /// `contains(<field>, '<text>')`
    Contains(String, String),
    /// Members joined with ` and `
    And(Vec<Filter>),
    /// Members joined with ` or `
    Or(Vec<Filter>),
    /// Pre-rendered expression, passed through untouched
    Raw(String),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Eq(field.into(), value.into())
    }

    pub fn contains(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Contains(field.into(), text.into())
    }

    pub fn and(members: Vec<Filter>) -> Self {
        Self::And(members)
    }

    pub fn or(members: Vec<Filter>) -> Self {
        Self::Or(members)
    }

    pub fn raw(expression: impl Into<String>) -> Self {
        Self::Raw(expression.into())
    }

    /// `contains(..)` on every field, OR-ed together
    pub fn contains_any<I, S>(fields: I, text: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Or(
            fields
                .into_iter()
                .map(|field| Self::contains(field, text))
                .collect(),
        )
    }

    /// True when the expression renders to nothing
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Eq(..) | Self::Contains(..) => false,
            Self::Raw(expr) => expr.trim().is_empty(),
            Self::And(members) | Self::Or(members) => members.iter().all(Filter::is_empty),
        }
    }

    /// Render as the value of a `$filter` option
    pub fn to_odata(&self) -> String {
        match self {
            Self::Eq(field, value) => format!("{} eq {}", field, value.to_odata()),
            Self::Contains(field, text) => {
                format!("contains({}, '{}')", field, escape_string(text))
            }
            Self::Raw(expr) => expr.trim().to_string(),
            Self::And(members) => join_members(members, " and "),
            Self::Or(members) => join_members(members, " or "),
        }
    }

    /// Whether this expression needs parentheses when it appears as a member
    /// of a larger group
    fn needs_grouping(&self) -> bool {
        match self {
            Self::Eq(..) | Self::Contains(..) => false,
            Self::Raw(_) => true,
            Self::And(members) | Self::Or(members) => {
                members.iter().filter(|m| !m.is_empty()).count() > 1
            }
        }
    }
}

fn join_members(members: &[Filter], separator: &str) -> String {
    let live: Vec<&Filter> = members.iter().filter(|m| !m.is_empty()).collect();

    // A lone member needs no grouping of its own
    if live.len() == 1 {
        return live[0].to_odata();
    }

    live.iter()
        .map(|member| {
            if member.needs_grouping() {
                format!("({})", member.to_odata())
            } else {
                member.to_odata()
            }
        })
        .collect::<Vec<_>>()
        .join(separator)
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_odata())
    }
}

/// Double every single quote so the text stays inside its string literal
pub fn escape_string(value: &str) -> String {
    value.replace('\'', "''")
}
