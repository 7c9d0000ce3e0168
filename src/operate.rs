//! The record set algebra.
//!
//! Every operation reads one or more input sets and builds a fresh output
//! set; inputs are never touched. Duplicates are always decided on the `id`
//! of a record alone, so two records from different databases that share an
//! `id` count as the same entry.
//!
//! The integer indexes of operations and filter operators are a contract with
//! existing callers and must not be renumbered:
//!
//! | index | operation |
//! |-------|-----------|
//! | 0 | Unique |
//! | 1 | Union |
//! | 2 | Intersection |
//! | 3 | Difference |
//! | 4 | Change DbID |
//! | 5 | Keep columns |
//! | 6 | Filter |

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::construct::{IdHasher, Record, RecordSet};
use crate::error::{IdsetError, Result};
use crate::filter::{FilterOp, Predicate};

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Unique,
    Union,
    Intersection,
    Difference,
    ChangeId {
        new_database: String,
        new_id_column: String,
    },
    KeepColumns {
        columns: Vec<String>,
    },
    Filter {
        column: String,
        op: FilterOp,
        value: String,
        lower: Option<String>,
    },
}

impl Operation {
    pub const NAMES: [&'static str; 7] = [
        "Unique",
        "Union",
        "Intersection",
        "Difference",
        "Change DbID",
        "Keep columns",
        "Filter",
    ];

    pub fn index(&self) -> u8 {
        match self {
            Operation::Unique => 0,
            Operation::Union => 1,
            Operation::Intersection => 2,
            Operation::Difference => 3,
            Operation::ChangeId { .. } => 4,
            Operation::KeepColumns { .. } => 5,
            Operation::Filter { .. } => 6,
        }
    }
    pub fn name(&self) -> &'static str {
        Self::NAMES[self.index() as usize]
    }
    pub fn change_id<D: Into<String>, C: Into<String>>(new_database: D, new_id_column: C) -> Self {
        Operation::ChangeId {
            new_database: new_database.into(),
            new_id_column: new_id_column.into(),
        }
    }
    /// Column names may be separated by semicolons and/or whitespace.
    pub fn keep_columns(list: &str) -> Self {
        Operation::KeepColumns {
            columns: list
                .split(|c: char| c == ';' || c.is_whitespace())
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect(),
        }
    }
    pub fn filter<C: Into<String>, V: Into<String>>(column: C, op: FilterOp, value: V) -> Self {
        Operation::Filter {
            column: column.into(),
            op,
            value: value.into(),
            lower: None,
        }
    }
    pub fn between<C: Into<String>, U: Into<String>, L: Into<String>>(
        column: C,
        upper: U,
        lower: L,
    ) -> Self {
        Operation::Filter {
            column: column.into(),
            op: FilterOp::Between,
            value: upper.into(),
            lower: Some(lower.into()),
        }
    }

    /// Checks the parameters of the operation and the number of inputs it is given.
    pub fn validate(&self, inputs: usize) -> Result<()> {
        match self {
            Operation::Union if inputs == 0 => {
                return Err(IdsetError::Validation(
                    "Union needs at least one input set".into(),
                ));
            }
            Operation::Union => (),
            Operation::Intersection | Operation::Difference if inputs != 2 => {
                return Err(IdsetError::Validation(format!(
                    "{} needs exactly two input sets, got {}",
                    self.name(),
                    inputs
                )));
            }
            Operation::Intersection | Operation::Difference => (),
            _ if inputs != 1 => {
                return Err(IdsetError::Validation(format!(
                    "{} needs exactly one input set, got {}",
                    self.name(),
                    inputs
                )));
            }
            _ => (),
        }
        match self {
            Operation::ChangeId {
                new_database,
                new_id_column,
            } => {
                if new_database.trim().is_empty() {
                    return Err(IdsetError::Validation("the new database is empty".into()));
                }
                if new_id_column.trim().is_empty() {
                    return Err(IdsetError::Validation("the new DbID column is empty".into()));
                }
            }
            Operation::KeepColumns { columns } => {
                if columns.iter().all(|name| name.trim().is_empty()) {
                    return Err(IdsetError::Validation("no columns to keep".into()));
                }
            }
            Operation::Filter {
                column, op, lower, ..
            } => {
                if column.trim().is_empty() {
                    return Err(IdsetError::Validation("the filter column is empty".into()));
                }
                if *op == FilterOp::Between && lower.is_none() {
                    return Err(IdsetError::Validation(
                        "'between' needs a lower value".into(),
                    ));
                }
            }
            _ => (),
        }
        Ok(())
    }

    pub fn apply(&self, inputs: &[&RecordSet], remove_duplicates: bool) -> Result<RecordSet> {
        self.validate(inputs.len())?;
        debug!(
            operation = self.name(),
            inputs = ?inputs.iter().map(|set| set.len()).collect::<Vec<_>>(),
            remove_duplicates,
            "applying"
        );
        let output = match self {
            Operation::Unique => unique(inputs[0]),
            Operation::Union => union(inputs, remove_duplicates),
            Operation::Intersection => intersection(inputs[0], inputs[1], remove_duplicates),
            Operation::Difference => difference(inputs[0], inputs[1], remove_duplicates),
            Operation::ChangeId {
                new_database,
                new_id_column,
            } => change_id(inputs[0], new_database, new_id_column, remove_duplicates),
            Operation::KeepColumns { columns } => {
                keep_columns(inputs[0], columns, remove_duplicates)
            }
            Operation::Filter {
                column,
                op,
                value,
                lower,
            } => filter(
                inputs[0],
                column,
                *op,
                value,
                lower.as_deref(),
                remove_duplicates,
            )?,
        };
        info!(operation = self.name(), records = output.len(), "operation complete");
        Ok(output)
    }
}

/// Runs one operation over its inputs.
pub fn apply(
    operation: &Operation,
    remove_duplicates: bool,
    inputs: &[&RecordSet],
) -> Result<RecordSet> {
    operation.apply(inputs, remove_duplicates)
}

// ------------- Parameters -------------
/// Operation parameters as plain values, the way a form or a config file supplies them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    pub operation: u8,
    pub remove_duplicates: bool,
    pub new_db: Option<String>,
    pub new_db_id: Option<String>,
    pub keep_columns: Option<String>,
    pub filter_column: Option<String>,
    pub filter_op: Option<u8>,
    pub filter_value: Option<String>,
    pub filter_value2: Option<String>,
}

fn required<'p>(value: &'p Option<String>, label: &str) -> Result<&'p str> {
    match value.as_deref() {
        Some(v) => Ok(v),
        None => Err(IdsetError::Validation(format!("missing parameter '{}'", label))),
    }
}

impl Parameters {
    pub fn operation(&self) -> Result<Operation> {
        let operation = match self.operation {
            0 => Operation::Unique,
            1 => Operation::Union,
            2 => Operation::Intersection,
            3 => Operation::Difference,
            4 => Operation::change_id(
                required(&self.new_db, "new_db")?,
                required(&self.new_db_id, "new_db_id")?,
            ),
            5 => Operation::keep_columns(required(&self.keep_columns, "keep_columns")?),
            6 => {
                let index = self
                    .filter_op
                    .ok_or_else(|| IdsetError::Validation("missing parameter 'filter_op'".into()))?;
                let op = FilterOp::from_index(index).ok_or_else(|| {
                    IdsetError::Validation(format!("unknown filter operation {}", index))
                })?;
                Operation::Filter {
                    column: required(&self.filter_column, "filter_column")?.to_string(),
                    op,
                    value: required(&self.filter_value, "filter_value")?.to_string(),
                    lower: match op {
                        FilterOp::Between => {
                            Some(required(&self.filter_value2, "filter_value2")?.to_string())
                        }
                        _ => None,
                    },
                }
            }
            other => {
                return Err(IdsetError::Validation(format!("unknown operation {}", other)));
            }
        };
        Ok(operation)
    }
    pub fn apply(&self, inputs: &[&RecordSet]) -> Result<RecordSet> {
        self.operation()?.apply(inputs, self.remove_duplicates)
    }
}

// ------------- Operators -------------
/// Collects output records, keeping only the first one per id when asked to.
struct Keeper {
    remove_duplicates: bool,
    seen: HashSet<String, IdHasher>,
    kept: RecordSet,
}
impl Keeper {
    fn new(remove_duplicates: bool) -> Self {
        Self {
            remove_duplicates,
            seen: HashSet::default(),
            kept: RecordSet::new(),
        }
    }
    fn admits(&mut self, id: &str) -> bool {
        !self.remove_duplicates || self.seen.insert(id.to_string())
    }
    fn keep(&mut self, record: Record) {
        if self.admits(record.id()) {
            self.kept.push(record);
        }
    }
    fn keep_copy(&mut self, record: &Record) {
        if self.admits(record.id()) {
            self.kept.push(record.clone());
        }
    }
    fn into_set(self) -> RecordSet {
        self.kept
    }
}

fn unique(input: &RecordSet) -> RecordSet {
    let mut keeper = Keeper::new(true);
    input.iter().for_each(|record| keeper.keep_copy(record));
    keeper.into_set()
}

fn union(inputs: &[&RecordSet], remove_duplicates: bool) -> RecordSet {
    let mut keeper = Keeper::new(remove_duplicates);
    inputs
        .iter()
        .flat_map(|set| set.iter())
        .for_each(|record| keeper.keep_copy(record));
    keeper.into_set()
}

fn intersection(primary: &RecordSet, secondary: &RecordSet, remove_duplicates: bool) -> RecordSet {
    let ids = secondary.ids();
    let mut keeper = Keeper::new(remove_duplicates);
    primary
        .iter()
        .filter(|record| ids.contains(record.id()))
        .for_each(|record| keeper.keep_copy(record));
    keeper.into_set()
}

fn difference(primary: &RecordSet, secondary: &RecordSet, remove_duplicates: bool) -> RecordSet {
    let ids = secondary.ids();
    let mut keeper = Keeper::new(remove_duplicates);
    primary
        .iter()
        .filter(|record| !ids.contains(record.id()))
        .for_each(|record| keeper.keep_copy(record));
    keeper.into_set()
}

fn change_id(
    input: &RecordSet,
    new_database: &str,
    new_id_column: &str,
    remove_duplicates: bool,
) -> RecordSet {
    // the label is a column only if the first record carries it
    let database_is_column = input.schema().contains(new_database);
    let mut keeper = Keeper::new(remove_duplicates);
    for record in input {
        let mut changed = record.clone();
        match record.attribute(new_id_column) {
            Some(id) => {
                let database = if database_is_column {
                    record
                        .attribute(new_database)
                        .map(|value| value.to_string())
                        .unwrap_or_else(|| new_database.to_string())
                } else {
                    new_database.to_string()
                };
                changed.set_database(database);
                changed.set_id(id.to_string());
            }
            None => changed.set_database(new_database),
        }
        keeper.keep(changed);
    }
    keeper.into_set()
}

fn keep_columns(input: &RecordSet, columns: &[String], remove_duplicates: bool) -> RecordSet {
    let mut keeper = Keeper::new(remove_duplicates);
    for record in input {
        if keeper.admits(record.id()) {
            keeper
                .kept
                .push(record.projected(|name| columns.iter().any(|column| column == name)));
        }
    }
    keeper.into_set()
}

fn filter(
    input: &RecordSet,
    column: &str,
    op: FilterOp,
    value: &str,
    lower: Option<&str>,
    remove_duplicates: bool,
) -> Result<RecordSet> {
    if input.is_empty() {
        return Ok(RecordSet::new());
    }
    let predicate = Predicate::compile(column, op, value, lower, &input.schema())?;
    let mut keeper = Keeper::new(remove_duplicates);
    let mut lacking = 0usize;
    for record in input {
        if !record.has_attribute(column) {
            lacking += 1;
            continue;
        }
        if predicate.matches(record)? {
            keeper.keep_copy(record);
        }
    }
    if lacking > 0 {
        warn!(column, records = lacking, "records without the filter column were left out");
    }
    Ok(keeper.into_set())
}
