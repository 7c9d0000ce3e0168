//! Idset – set algebra over heterogeneous database identifier records.
//!
//! Idset centers on the *record*: an entry identified by a `database` and an
//! `id`, carrying any number of further typed attributes. Search results from
//! structural and chemical databases arrive as sets of such records, and the
//! interesting work is combining and narrowing them:
//! * Unique, Union, Intersection and Difference decide membership on `id` alone.
//! * Change DbID makes one of the attributes the new identifier.
//! * Keep columns projects records onto a subset of their attributes.
//! * Filter compares one attribute against literal values, reading the
//!   literals according to the attribute's type on the first record.
//!
//! ## Modules
//! * [`construct`] – [`construct::Record`], [`construct::RecordSet`] and the
//!   first-record [`construct::Schema`].
//! * [`datatype`] – The [`datatype::DataType`] trait and the attribute
//!   [`datatype::Value`] it is implemented for (string, integer, float).
//! * [`filter`] – Filter operators and compiled predicates.
//! * [`operate`] – The operations and their numbered parameter contract.
//! * [`dali`] – Reading Dali similarity reports into record sets.
//! * [`persist`] – SQLite storage of record sets.
//! * [`settings`] – Configuration of the `idset` command.
//!
//! ## Quick Start
//! ```
//! use idset::construct::{Record, RecordSet};
//! use idset::filter::FilterOp;
//! use idset::operate::Operation;
//!
//! let hits: RecordSet = vec![
//!     Record::new("pdb", "5xjh-A").with("_DaliZscore", 57.5),
//!     Record::new("pdb", "1qz3-A").with("_DaliZscore", 38.2),
//!     Record::new("pdb", "5xjh-A").with("_DaliZscore", 57.5),
//! ]
//! .into_iter()
//! .collect();
//! let strong = Operation::filter("_DaliZscore", FilterOp::GreaterOrEqual, "40")
//!     .apply(&[&hits], true)
//!     .unwrap();
//! assert_eq!(strong.len(), 1);
//! ```
//!
//! Operations never modify their inputs; each call builds a new set and
//! either returns all of it or fails before returning anything.

pub mod construct;
pub mod dali;
pub mod datatype;
pub mod error;
pub mod filter;
pub mod operate;
pub mod persist;
pub mod settings;

pub use error::{IdsetError, Result};
