//! Condition trees for WHERE clauses.
//!
//! A [`Condition`] is either a single comparison on one field or an OR group of
//! child conditions. Each node renders a SQL fragment with `?` placeholders and
//! yields its bound values in the same order the placeholders appear, so a
//! statement can concatenate fragments and values independently.
//!
//! Comparisons validate lazily: a [`Comparison`] can be assembled piece by piece
//! and only fails when it is built.
//!
//! # Example
//! ```ignore
//! use pgquery::Condition;
//!
//! let c = Condition::or(vec![Condition::equals("a", 1), Condition::equals("b", 2)]);
//! assert_eq!(c.build()?, "(a = ? OR b = ?)");
//! ```

use crate::error::{DbError, DbResult};
use crate::value::Value;
use serde::Deserialize;

/// Comparison operator of a leaf condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// `=`
    Equals,
    /// `>`
    Greater,
    /// `<`
    Less,
    /// `>=`
    GreaterOrEquals,
    /// `<=`
    LessOrEquals,
    /// `BETWEEN ? AND ?`
    Between,
}

impl Op {
    pub fn as_sql(self) -> &'static str {
        match self {
            Op::Equals => "=",
            Op::Greater => ">",
            Op::Less => "<",
            Op::GreaterOrEquals => ">=",
            Op::LessOrEquals => "<=",
            Op::Between => "BETWEEN",
        }
    }
}

/// A comparison on a single field.
///
/// Every slot is optional so that the comparison can be filled in
/// incrementally; missing slots are reported by [`Comparison::build`] and
/// [`Comparison::values`]. A [`Value::Null`] counts as missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Comparison {
    field: Option<String>,
    op: Option<Op>,
    value: Option<Value>,
    value2: Option<Value>,
}

impl Comparison {
    /// Create an empty comparison.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty comparison with the operator already chosen.
    pub fn with_op(op: Op) -> Self {
        Self {
            op: Some(op),
            ..Self::default()
        }
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn op(mut self, op: Op) -> Self {
        self.op = Some(op);
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Upper bound of a BETWEEN comparison.
    pub fn value2(mut self, value: impl Into<Value>) -> Self {
        self.value2 = Some(value.into());
        self
    }

    fn validate(&self) -> DbResult<(&str, Op)> {
        let field = self
            .field
            .as_deref()
            .filter(|f| !f.is_empty())
            .ok_or(DbError::MissingField)?;
        if !is_set(&self.value) {
            return Err(DbError::MissingValue(field.to_string()));
        }
        let op = self
            .op
            .ok_or_else(|| DbError::MissingOperator(field.to_string()))?;
        if op == Op::Between && !is_set(&self.value2) {
            return Err(DbError::MissingSecondValue(field.to_string()));
        }
        Ok((field, op))
    }

    /// Render `field op ?`, or `field BETWEEN ? AND ?`.
    pub fn build(&self) -> DbResult<String> {
        let (field, op) = self.validate()?;
        Ok(match op {
            Op::Between => format!("{field} BETWEEN ? AND ?"),
            _ => format!("{} {} ?", field, op.as_sql()),
        })
    }

    /// Values in placeholder order.
    pub fn values(&self) -> DbResult<Vec<Value>> {
        let (_, op) = self.validate()?;
        let mut out = Vec::with_capacity(2);
        out.extend(self.value.clone());
        if op == Op::Between {
            out.extend(self.value2.clone());
        }
        Ok(out)
    }
}

fn is_set(value: &Option<Value>) -> bool {
    matches!(value, Some(v) if !v.is_null())
}

/// A node in a WHERE condition tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Single field comparison.
    Compare(Comparison),
    /// Disjunction of children, rendered in parentheses.
    Or(Vec<Condition>),
}

impl Condition {
    fn compare(op: Op, field: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Compare(Comparison::with_op(op).field(field).value(value))
    }

    /// `field = ?`
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(Op::Equals, field, value)
    }

    /// `field > ?`
    pub fn greater(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(Op::Greater, field, value)
    }

    /// `field < ?`
    pub fn less(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(Op::Less, field, value)
    }

    /// `field >= ?`
    pub fn greater_or_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(Op::GreaterOrEquals, field, value)
    }

    /// `field <= ?`
    pub fn less_or_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(Op::LessOrEquals, field, value)
    }

    /// `field BETWEEN ? AND ?`
    pub fn between(
        field: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Self {
        Condition::Compare(
            Comparison::with_op(Op::Between)
                .field(field)
                .value(from)
                .value2(to),
        )
    }

    /// OR group over `children`.
    pub fn or(children: Vec<Condition>) -> Self {
        Condition::Or(children)
    }

    /// Append a child to an OR group. A comparison is turned into a group
    /// containing itself and the new child.
    pub fn add_condition(self, condition: Condition) -> Self {
        match self {
            Condition::Or(mut children) => {
                children.push(condition);
                Condition::Or(children)
            }
            leaf @ Condition::Compare(_) => Condition::Or(vec![leaf, condition]),
        }
    }

    /// Render this node as a SQL boolean fragment.
    pub fn build(&self) -> DbResult<String> {
        match self {
            Condition::Compare(c) => c.build(),
            Condition::Or(children) => {
                if children.is_empty() {
                    return Err(DbError::EmptyOr);
                }
                let parts = children
                    .iter()
                    .map(Condition::build)
                    .collect::<DbResult<Vec<_>>>()?;
                Ok(format!("({})", parts.join(" OR ")))
            }
        }
    }

    /// Bound values of this node, in placeholder order.
    pub fn values(&self) -> DbResult<Vec<Value>> {
        match self {
            Condition::Compare(c) => c.values(),
            Condition::Or(children) => {
                if children.is_empty() {
                    return Err(DbError::EmptyOr);
                }
                let mut out = Vec::new();
                for child in children {
                    out.extend(child.values()?);
                }
                Ok(out)
            }
        }
    }
}

impl From<Comparison> for Condition {
    fn from(c: Comparison) -> Self {
        Condition::Compare(c)
    }
}
