//! Typed filter predicates over record attributes.
//!
//! A filter compares one attribute of every record against literal values
//! supplied as text. How the literals are read is decided once, from the kind
//! the attribute has on the first record of the set: integer and float
//! columns parse them as numbers while string columns take them verbatim.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::construct::{Record, Schema};
use crate::datatype::{Kind, Value};
use crate::error::{IdsetError, Result};

/// Comparison operators, indexed as callers have always numbered them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOp {
    Equal,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    NotEqual,
    /// Inclusive; the primary value is the upper bound and the secondary value the lower one.
    Between,
    StartsWith,
    EndsWith,
    Contains,
    NotStartsWith,
    NotEndsWith,
    NotContains,
}

impl FilterOp {
    pub const ALL: [FilterOp; 13] = [
        FilterOp::Equal,
        FilterOp::Greater,
        FilterOp::GreaterOrEqual,
        FilterOp::Less,
        FilterOp::LessOrEqual,
        FilterOp::NotEqual,
        FilterOp::Between,
        FilterOp::StartsWith,
        FilterOp::EndsWith,
        FilterOp::Contains,
        FilterOp::NotStartsWith,
        FilterOp::NotEndsWith,
        FilterOp::NotContains,
    ];
    pub fn from_index(index: u8) -> Option<FilterOp> {
        Self::ALL.get(index as usize).copied()
    }
    pub fn index(&self) -> u8 {
        // ALL is in declaration order
        *self as u8
    }
    pub fn symbol(&self) -> &'static str {
        match self {
            FilterOp::Equal => "==",
            FilterOp::Greater => ">",
            FilterOp::GreaterOrEqual => ">=",
            FilterOp::Less => "<",
            FilterOp::LessOrEqual => "<=",
            FilterOp::NotEqual => "!=",
            FilterOp::Between => "between",
            FilterOp::StartsWith => "startswith",
            FilterOp::EndsWith => "endswith",
            FilterOp::Contains => "contains",
            FilterOp::NotStartsWith => "does not start with",
            FilterOp::NotEndsWith => "does not end with",
            FilterOp::NotContains => "does not contain",
        }
    }
    /// Operators that only make sense on string attributes.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            FilterOp::StartsWith
                | FilterOp::EndsWith
                | FilterOp::Contains
                | FilterOp::NotStartsWith
                | FilterOp::NotEndsWith
                | FilterOp::NotContains
        )
    }
}
impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A filter whose literals have been read according to the column kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    column: String,
    kind: Kind,
    op: FilterOp,
    reference: Value,
    lower: Option<Value>,
}

impl Predicate {
    pub fn compile(
        column: &str,
        op: FilterOp,
        value: &str,
        lower: Option<&str>,
        schema: &Schema,
    ) -> Result<Predicate> {
        if column.trim().is_empty() {
            return Err(IdsetError::Validation("the filter column is empty".into()));
        }
        let kind = schema.kind_of(column).ok_or_else(|| {
            IdsetError::Validation(format!("the filter column '{}' is not in the set", column))
        })?;
        if op.is_textual() && kind.is_numeric() {
            return Err(IdsetError::TypeMisuse(format!(
                "'{}' cannot be applied to the {} column '{}'",
                op, kind, column
            )));
        }
        let reference = kind.coerce(value)?;
        let lower = match (op, lower) {
            (FilterOp::Between, Some(lower)) => Some(kind.coerce(lower)?),
            (FilterOp::Between, None) => {
                return Err(IdsetError::Validation(
                    "'between' needs a lower value".into(),
                ));
            }
            _ => None,
        };
        Ok(Predicate {
            column: column.to_string(),
            kind,
            op,
            reference,
            lower,
        })
    }
    pub fn column(&self) -> &str {
        &self.column
    }
    pub fn kind(&self) -> Kind {
        self.kind
    }
    pub fn op(&self) -> FilterOp {
        self.op
    }
    /// Records lacking the column never match.
    pub fn matches(&self, record: &Record) -> Result<bool> {
        let Some(value) = record.attribute(&self.column) else {
            return Ok(false);
        };
        let reference = &self.reference;
        Ok(match self.op {
            FilterOp::Equal => value.compare(reference) == Some(Ordering::Equal),
            FilterOp::NotEqual => value.compare(reference) != Some(Ordering::Equal),
            FilterOp::Greater => self.order(value, reference)? == Some(Ordering::Greater),
            FilterOp::GreaterOrEqual => matches!(
                self.order(value, reference)?,
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Less => self.order(value, reference)? == Some(Ordering::Less),
            FilterOp::LessOrEqual => matches!(
                self.order(value, reference)?,
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOp::Between => {
                let lower = self.lower.as_ref().ok_or_else(|| {
                    IdsetError::Validation("'between' needs a lower value".into())
                })?;
                matches!(
                    self.order(value, reference)?,
                    Some(Ordering::Less | Ordering::Equal)
                ) && matches!(
                    self.order(value, lower)?,
                    Some(Ordering::Greater | Ordering::Equal)
                )
            }
            FilterOp::StartsWith => self.text(value)?.starts_with(self.pattern()?),
            FilterOp::EndsWith => self.text(value)?.ends_with(self.pattern()?),
            FilterOp::Contains => self.text(value)?.contains(self.pattern()?),
            FilterOp::NotStartsWith => !self.text(value)?.starts_with(self.pattern()?),
            FilterOp::NotEndsWith => !self.text(value)?.ends_with(self.pattern()?),
            FilterOp::NotContains => !self.text(value)?.contains(self.pattern()?),
        })
    }
    fn order(&self, value: &Value, reference: &Value) -> Result<Option<Ordering>> {
        if value.is_numeric() != reference.is_numeric() {
            return Err(IdsetError::TypeMisuse(format!(
                "cannot order the {} value '{}' of '{}' against '{}'",
                value.data_type(),
                value,
                self.column,
                reference
            )));
        }
        Ok(value.compare(reference))
    }
    fn text<'v>(&self, value: &'v Value) -> Result<&'v str> {
        value.as_str().ok_or_else(|| {
            IdsetError::TypeMisuse(format!(
                "'{}' needs a string but '{}' holds the {} value {}",
                self.op,
                self.column,
                value.data_type(),
                value
            ))
        })
    }
    fn pattern(&self) -> Result<&str> {
        self.text(&self.reference)
    }
}
