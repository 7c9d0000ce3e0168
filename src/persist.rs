// used for persistence
use rusqlite::{params, Connection, Error, OptionalExtension};
// used for timestamps in the database
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::construct::{Record, RecordSet};
use crate::datatype::{Kind, Value};
use crate::error::{IdsetError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceMode {
    InMemory,
    File(String),
}

/// Summary of a set held in the database.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSet {
    pub name: String,
    pub records: usize,
    pub created: DateTime<Utc>,
    pub digest: String,
}

/// A digest over the full content of a set, order included.
pub fn fingerprint(set: &RecordSet) -> String {
    let mut hasher = blake3::Hasher::new();
    for record in set {
        hasher.update(record.database().as_bytes());
        hasher.update(&[0x1f]);
        hasher.update(record.id().as_bytes());
        for (name, value) in record.attributes() {
            hasher.update(&[0x1f]);
            hasher.update(name.as_bytes());
            hasher.update(&[0x1f, value.identifier()]);
            match value {
                Value::String(s) => hasher.update(s.as_bytes()),
                Value::Int(i) => hasher.update(&i.to_le_bytes()),
                Value::Float(x) => hasher.update(&x.to_bits().to_le_bytes()),
            };
        }
        hasher.update(&[0x1e]);
    }
    hasher.finalize().to_hex().to_string()
}

// ------------- Persistence -------------
pub struct Persistor {
    connection: Connection,
}
impl Persistor {
    pub fn new(mode: PersistenceMode) -> Result<Persistor> {
        let connection = match &mode {
            PersistenceMode::InMemory => Connection::open_in_memory()?,
            PersistenceMode::File(path) => Connection::open(path)?,
        };
        // The "STRICT" keyword introduced in 3.37.0 breaks JDBC connections, which makes
        // debugging using an external tool like DBeaver impossible
        connection.execute_batch(
            "
            create table if not exists DataType (
                DataType_Identity integer not null,
                DataType text not null,
                constraint referenceable_DataType_Identity primary key (
                    DataType_Identity
                ),
                constraint unique_DataType unique (
                    DataType
                )
            );-- STRICT;
            create table if not exists RecordSet (
                RecordSet_Identity integer not null,
                Name text not null,
                Records integer not null,
                Created text not null,
                Digest text not null,
                constraint referenceable_RecordSet_Identity primary key (
                    RecordSet_Identity
                ),
                constraint unique_Name unique (
                    Name
                )
            );-- STRICT;
            create table if not exists Record (
                RecordSet_Identity integer not null,
                Position integer not null,
                Database text not null,
                DbId text not null,
                constraint Record_in_RecordSet foreign key (
                    RecordSet_Identity
                ) references RecordSet(RecordSet_Identity),
                constraint referenceable_Record primary key (
                    RecordSet_Identity,
                    Position
                )
            );-- STRICT;
            create table if not exists Attribute (
                RecordSet_Identity integer not null,
                Position integer not null,
                Ordinal integer not null,
                Name text not null,
                AttributeValue blob null,
                DataType_Identity integer not null,
                constraint Attribute_of_Record foreign key (
                    RecordSet_Identity,
                    Position
                ) references Record(RecordSet_Identity, Position),
                constraint ValueType_is_DataType foreign key (
                    DataType_Identity
                ) references DataType(DataType_Identity),
                constraint referenceable_Attribute primary key (
                    RecordSet_Identity,
                    Position,
                    Ordinal
                )
            );-- STRICT;
            ",
        )?;
        for kind in [Kind::String, Kind::Integer, Kind::Float] {
            connection.execute(
                "insert or ignore into DataType (DataType_Identity, DataType) values (?, ?)",
                params![kind.identifier(), kind.data_type()],
            )?;
        }
        debug!(?mode, "persistor ready");
        Ok(Persistor { connection })
    }

    /// Stores the set under `name`, replacing whatever was stored under it before.
    pub fn persist_set(&mut self, name: &str, set: &RecordSet) -> Result<i64> {
        let digest = fingerprint(set);
        let transaction = self.connection.transaction()?;
        forget(&transaction, name)?;
        transaction.execute(
            "
            insert into RecordSet (
                Name,
                Records,
                Created,
                Digest
            ) values (?, ?, ?, ?)
            ",
            params![name, set.len() as i64, Utc::now().to_rfc3339(), digest],
        )?;
        let identity = transaction.last_insert_rowid();
        {
            let mut add_record = transaction.prepare_cached(
                "
                insert into Record (
                    RecordSet_Identity,
                    Position,
                    Database,
                    DbId
                ) values (?, ?, ?, ?)
                ",
            )?;
            let mut add_attribute = transaction.prepare_cached(
                "
                insert into Attribute (
                    RecordSet_Identity,
                    Position,
                    Ordinal,
                    Name,
                    AttributeValue,
                    DataType_Identity
                ) values (?, ?, ?, ?, ?, ?)
                ",
            )?;
            for (position, record) in set.iter().enumerate() {
                let position = position as i64;
                add_record.execute(params![identity, position, record.database(), record.id()])?;
                for (ordinal, (name, value)) in record.attributes().iter().enumerate() {
                    add_attribute.execute(params![
                        identity,
                        position,
                        ordinal as i64,
                        name,
                        value,
                        value.identifier()
                    ])?;
                }
            }
        }
        transaction.commit()?;
        info!(name, records = set.len(), "persisted record set");
        Ok(identity)
    }

    pub fn restore_set(&self, name: &str) -> Result<RecordSet> {
        let (identity, digest): (i64, String) = match self.connection.query_row(
            "select RecordSet_Identity, Digest from RecordSet where Name = ?",
            params![name],
            |row| Ok((row.get(0)?, row.get(1)?)),
        ) {
            Ok(found) => found,
            Err(Error::QueryReturnedNoRows) => {
                return Err(IdsetError::Persistence(format!(
                    "no record set named '{}'",
                    name
                )));
            }
            Err(err) => return Err(err.into()),
        };

        let mut all_records = self.connection.prepare_cached(
            "
            select Database, DbId
                from Record
                where RecordSet_Identity = ?
                order by Position
            ",
        )?;
        let mut records = all_records
            .query_map(params![identity], |row| {
                Ok(Record::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<Record>>>()?;

        let mut all_attributes = self.connection.prepare_cached(
            "
            select Position, Name, AttributeValue, DataType_Identity
                from Attribute
                where RecordSet_Identity = ?
                order by Position, Ordinal
            ",
        )?;
        let mut rows = all_attributes.query(params![identity])?;
        while let Some(row) = rows.next()? {
            let position: i64 = row.get(0)?;
            let attribute: String = row.get(1)?;
            let uid: u8 = row.get(3)?;
            let value = Value::convert(&row.get_ref(2)?, uid).ok_or_else(|| {
                IdsetError::DataCorruption {
                    message: format!(
                        "attribute '{}' of record {} in '{}' does not hold a value of type {}",
                        attribute, position, name, uid
                    ),
                }
            })?;
            let record = usize::try_from(position)
                .ok()
                .and_then(|position| records.get_mut(position))
                .ok_or_else(|| IdsetError::DataCorruption {
                    message: format!("attribute '{}' refers to missing record {}", attribute, position),
                })?;
            record.set_attribute(attribute, value);
        }

        let mut set: RecordSet = records.into_iter().collect();
        set.set_name(name);
        if fingerprint(&set) != digest {
            return Err(IdsetError::DataCorruption {
                message: format!("the content of '{}' does not match its digest", name),
            });
        }
        debug!(name, records = set.len(), "restored record set");
        Ok(set)
    }

    pub fn stored_sets(&self) -> Result<Vec<StoredSet>> {
        let mut all_sets = self.connection.prepare_cached(
            "
            select Name, Records, Created, Digest
                from RecordSet
                order by Name
            ",
        )?;
        let rows = all_sets
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter()
            .map(|(name, records, created, digest)| {
                let created = DateTime::parse_from_rfc3339(&created)
                    .map_err(|e| IdsetError::DataCorruption {
                        message: format!("creation time of '{}': {}", name, e),
                    })?
                    .with_timezone(&Utc);
                Ok(StoredSet {
                    name,
                    records: records as usize,
                    created,
                    digest,
                })
            })
            .collect()
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self
            .connection
            .query_row(
                "select 1 from RecordSet where Name = ?",
                params![name],
                |_| Ok(()),
            )
            .optional()?
            .is_some())
    }

    pub fn remove_set(&mut self, name: &str) -> Result<bool> {
        let transaction = self.connection.transaction()?;
        let removed = forget(&transaction, name)?;
        transaction.commit()?;
        if removed {
            info!(name, "removed record set");
        }
        Ok(removed)
    }
}

fn forget(connection: &Connection, name: &str) -> Result<bool> {
    connection.execute(
        "
        delete from Attribute where RecordSet_Identity in (
            select RecordSet_Identity from RecordSet where Name = ?
        )
        ",
        params![name],
    )?;
    connection.execute(
        "
        delete from Record where RecordSet_Identity in (
            select RecordSet_Identity from RecordSet where Name = ?
        )
        ",
        params![name],
    )?;
    let removed = connection.execute("delete from RecordSet where Name = ?", params![name])?;
    Ok(removed > 0)
}
