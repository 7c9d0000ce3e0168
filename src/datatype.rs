// used for persistence
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
// used for exporting record sets
use serde::{Deserialize, Serialize};

// used when comparing values of (possibly) different kinds
use std::cmp::Ordering;
// used to print out readable forms of a data type
use std::fmt;

use crate::error::{IdsetError, Result};

pub trait DataType: fmt::Display + ToSql + Into<Value> + Sized {
    // static stuff which needs to be implemented downstream
    const UID: u8;
    const DATA_TYPE: &'static str;
    fn convert(value: &ValueRef) -> Option<Self>;
    fn parse(literal: &str) -> Option<Self>;
    // instance callable with pre-made implementation
    fn data_type(&self) -> &'static str {
        Self::DATA_TYPE
    }
    fn identifier(&self) -> u8 {
        Self::UID
    }
}

// ------------- Data Types --------------
impl DataType for String {
    const UID: u8 = 1;
    const DATA_TYPE: &'static str = "String";
    fn convert(value: &ValueRef) -> Option<String> {
        value.as_str().ok().map(String::from)
    }
    fn parse(literal: &str) -> Option<String> {
        Some(literal.to_string())
    }
}
impl DataType for i64 {
    const UID: u8 = 2;
    const DATA_TYPE: &'static str = "i64";
    fn convert(value: &ValueRef) -> Option<i64> {
        value.as_i64().ok()
    }
    fn parse(literal: &str) -> Option<i64> {
        literal.trim().parse::<i64>().ok()
    }
}
impl DataType for f64 {
    const UID: u8 = 3;
    const DATA_TYPE: &'static str = "f64";
    fn convert(value: &ValueRef) -> Option<f64> {
        // SQLite stores integral reals as integers when it sees fit
        match value {
            ValueRef::Real(f) => Some(*f),
            ValueRef::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
    fn parse(literal: &str) -> Option<f64> {
        literal.trim().parse::<f64>().ok()
    }
}

fn parse_as<T: DataType>(literal: &str) -> Result<Value> {
    T::parse(literal).map(Into::into).ok_or_else(|| {
        IdsetError::Validation(format!(
            "'{}' cannot be read as a {} value",
            literal,
            T::DATA_TYPE
        ))
    })
}

// ------------- Kind -------------
/// The runtime type of an attribute, as seen on the first record of a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    String,
    Integer,
    Float,
}

impl Kind {
    pub fn identifier(&self) -> u8 {
        match self {
            Kind::String => <String as DataType>::UID,
            Kind::Integer => <i64 as DataType>::UID,
            Kind::Float => <f64 as DataType>::UID,
        }
    }
    pub fn data_type(&self) -> &'static str {
        match self {
            Kind::String => <String as DataType>::DATA_TYPE,
            Kind::Integer => <i64 as DataType>::DATA_TYPE,
            Kind::Float => <f64 as DataType>::DATA_TYPE,
        }
    }
    pub fn from_identifier(uid: u8) -> Option<Kind> {
        [Kind::String, Kind::Integer, Kind::Float]
            .into_iter()
            .find(|kind| kind.identifier() == uid)
    }
    pub fn is_numeric(&self) -> bool {
        matches!(self, Kind::Integer | Kind::Float)
    }
    /// Reads a literal the way a value of this kind would be written.
    pub fn coerce(&self, literal: &str) -> Result<Value> {
        match self {
            Kind::String => parse_as::<String>(literal),
            Kind::Integer => parse_as::<i64>(literal),
            Kind::Float => parse_as::<f64>(literal),
        }
    }
}
impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.data_type())
    }
}

// ------------- Value -------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::String(_) => Kind::String,
            Value::Int(_) => Kind::Integer,
            Value::Float(_) => Kind::Float,
        }
    }
    pub fn identifier(&self) -> u8 {
        self.kind().identifier()
    }
    pub fn data_type(&self) -> &'static str {
        self.kind().data_type()
    }
    pub fn is_numeric(&self) -> bool {
        self.kind().is_numeric()
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::String(_) => None,
        }
    }
    /// Orders two values. Integers and floats compare numerically with each
    /// other; strings only compare with strings. `None` when the values are of
    /// incomparable kinds or a NaN is involved.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }
    pub fn convert(value: &ValueRef, uid: u8) -> Option<Value> {
        match Kind::from_identifier(uid)? {
            Kind::String => <String as DataType>::convert(value).map(Value::String),
            Kind::Integer => <i64 as DataType>::convert(value).map(Value::Int),
            Kind::Float => <f64 as DataType>::convert(value).map(Value::Float),
        }
    }
}
impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::String(s)
    }
}
impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::String(s.to_string())
    }
}
impl From<i64> for Value {
    fn from(i: i64) -> Value {
        Value::Int(i)
    }
}
impl From<f64> for Value {
    fn from(f: f64) -> Value {
        Value::Float(f)
    }
}
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            // integral floats keep their decimal point so they still read as floats
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{:.1}", x)
            }
            Value::Float(x) => write!(f, "{}", x),
        }
    }
}
impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::String(s) => ToSqlOutput::from(s.as_str()),
            Value::Int(i) => ToSqlOutput::from(*i),
            Value::Float(x) => ToSqlOutput::from(*x),
        })
    }
}
