// used to keep attributes in the order they were added
use indexmap::IndexMap;
// used for exporting record sets
use serde::{Deserialize, Serialize};

// dedup bookkeeping uses HashSet keyed on ids
use core::hash::BuildHasherDefault;
use std::collections::HashSet;
use seahash::SeaHasher;

// used to print out readable forms of a construct
use std::fmt;

// our own stuff that we need
use crate::datatype::{Kind, Value};

pub type IdHasher = BuildHasherDefault<SeaHasher>;
pub type IdSet<'a> = HashSet<&'a str, IdHasher>;
pub type Attributes = IndexMap<String, Value>;

// ------------- Record -------------
/// One identified entity, such as a hit in a database search.
///
/// `database` and `id` are always present. Any number of further typed
/// attributes may follow, and records in the same set may disagree on which
/// ones they carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    database: String,
    id: String,
    #[serde(default)]
    attributes: Attributes,
}

impl Record {
    pub fn new<D: Into<String>, I: Into<String>>(database: D, id: I) -> Self {
        Self {
            database: database.into(),
            id: id.into(),
            attributes: Attributes::new(),
        }
    }
    /// Builder form of [`Record::set_attribute`].
    pub fn with<N: Into<String>, V: Into<Value>>(mut self, name: N, value: V) -> Self {
        self.set_attribute(name, value);
        self
    }
    pub fn database(&self) -> &str {
        &self.database
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
    pub fn set_database<D: Into<String>>(&mut self, database: D) {
        self.database = database.into();
    }
    pub fn set_id<I: Into<String>>(&mut self, id: I) {
        self.id = id.into();
    }
    pub fn set_attribute<N: Into<String>, V: Into<Value>>(&mut self, name: N, value: V) {
        self.attributes.insert(name.into(), value.into());
    }
    /// A copy carrying only the attributes accepted by `keep`.
    pub fn projected<F: Fn(&str) -> bool>(&self, keep: F) -> Record {
        Record {
            database: self.database.clone(),
            id: self.id.clone(),
            attributes: self
                .attributes
                .iter()
                .filter(|(name, _)| keep(name.as_str()))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }
}
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.database, self.id)?;
        for (name, value) in &self.attributes {
            write!(f, " {}={}", name, value)?;
        }
        Ok(())
    }
}

// ------------- Schema -------------
/// Attribute names and kinds in the order they appear on the first record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<(String, Kind)>,
}

impl Schema {
    pub fn of(record: &Record) -> Self {
        Self {
            columns: record
                .attributes
                .iter()
                .map(|(name, value)| (name.clone(), value.kind()))
                .collect(),
        }
    }
    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, kind)| *kind)
    }
    pub fn contains(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }
    pub fn columns(&self) -> &[(String, Kind)] {
        &self.columns
    }
    pub fn len(&self) -> usize {
        self.columns.len()
    }
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ------------- RecordSet -------------
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn named<N: Into<String>>(name: N) -> Self {
        Self {
            name: Some(name.into()),
            records: Vec::new(),
        }
    }
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    pub fn set_name<N: Into<String>>(&mut self, name: N) {
        self.name = Some(name.into());
    }
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }
    pub fn records(&self) -> &[Record] {
        &self.records
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
    /// The schema is taken from the first record; an empty set has none.
    pub fn schema(&self) -> Schema {
        self.first().map(Schema::of).unwrap_or_default()
    }
    pub fn ids(&self) -> IdSet<'_> {
        self.records.iter().map(Record::id).collect()
    }
    pub fn distinct_ids(&self) -> usize {
        self.ids().len()
    }
}
impl FromIterator<Record> for RecordSet {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self {
            name: None,
            records: iter.into_iter().collect(),
        }
    }
}
impl IntoIterator for RecordSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;
    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;
    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
