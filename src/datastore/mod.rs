//! SQLite-backed datastore producing result tables.
//!
//! The comparison engine itself never touches a database; this module supplies
//! the result tables it works on, plus schema introspection.
//!
//! # Connections
//!
//! [`Datastore::connection`] hands out a new handle on the same database every
//! time it is called. Handles are independent: dropping one closes it and
//! leaves the others usable. An in-memory datastore uses a uniquely named
//! shared-cache database, which lives as long as the datastore itself.

use once_cell::sync::OnceCell;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info};
use uuid::Uuid;

use crate::table::{Cell, ColumnType, Header, RowTable, TableError, DEFAULT_TOTAL_MARKER};

/// Errors that can occur during datastore operations.
#[derive(Debug, thiserror::Error)]
pub enum DatastoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Table error: {0}")]
    Table(#[from] TableError),
}

pub type DatastoreResult<T> = Result<T, DatastoreError>;

/// A column of a store, with its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedField {
    pub store: String,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

/// A table of the datastore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub name: String,
    pub fields: Vec<TypedField>,
}

/// Access to a database holding the data queries run against.
pub trait Datastore {
    /// Open a new handle on the database.
    fn connection(&self) -> DatastoreResult<Connection>;

    /// Stores by name, introspected once.
    fn stores_by_name(&self) -> DatastoreResult<&HashMap<String, Store>>;
}

#[derive(Debug, Clone)]
enum Location {
    Memory(String),
    File(PathBuf),
}

/// SQLite datastore, in memory or backed by a file.
pub struct SqliteDatastore {
    location: Location,
    // Keeps an in-memory database alive between connections.
    primary: Connection,
    stores: OnceCell<HashMap<String, Store>>,
    total_marker: String,
}

impl SqliteDatastore {
    /// Create a fresh in-memory database.
    pub fn in_memory() -> DatastoreResult<Self> {
        let uri = format!("file:vantage-{}?mode=memory&cache=shared", Uuid::new_v4());
        let location = Location::Memory(uri);
        let primary = Self::open_location(&location)?;
        info!("opened in-memory datastore");
        Ok(Self::with_primary(location, primary))
    }

    /// Open (or create) a database file.
    pub fn open<P: AsRef<Path>>(path: P) -> DatastoreResult<Self> {
        let location = Location::File(path.as_ref().to_path_buf());
        let primary = Self::open_location(&location)?;
        info!("opened datastore {}", path.as_ref().display());
        Ok(Self::with_primary(location, primary))
    }

    /// Use another text marker for grand-total cells in query results.
    pub fn with_total_marker(mut self, marker: impl Into<String>) -> Self {
        self.total_marker = marker.into();
        self
    }

    fn with_primary(location: Location, primary: Connection) -> Self {
        Self {
            location,
            primary,
            stores: OnceCell::new(),
            total_marker: DEFAULT_TOTAL_MARKER.to_string(),
        }
    }

    fn open_location(location: &Location) -> DatastoreResult<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = match location {
            Location::Memory(uri) => Connection::open_with_flags(uri, flags)?,
            Location::File(path) => Connection::open_with_flags(path, flags)?,
        };
        Ok(conn)
    }

    /// Run one or more statements, typically to load data.
    pub fn execute_batch(&self, sql: &str) -> DatastoreResult<()> {
        self.primary.execute_batch(sql)?;
        Ok(())
    }

    /// Forget introspected stores so the next call reads the schema again.
    pub fn refresh_stores(&mut self) {
        self.stores.take();
    }

    /// Run a query and collect its result as a table.
    ///
    /// A column selected straight from a store keeps its declared type, so a
    /// `year INT` column comes back as `Int32` like in [`Datastore::stores_by_name`].
    /// Expression columns have no declared type and are inferred from their
    /// values: integers become `Int64`, reals `Float64` (a column mixing both is
    /// `Float64`), everything else `Text`. Text equal to the total marker
    /// becomes [`Cell::Total`].
    pub fn query(&self, sql: &str) -> DatastoreResult<RowTable> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let declared: Vec<Option<ColumnType>> = stmt
            .columns()
            .iter()
            .map(|column| {
                column
                    .decl_type()
                    .filter(|decl| !decl.trim().is_empty())
                    .map(ColumnType::from_sql_decl)
            })
            .collect();
        let column_count = names.len();

        let raw_rows = stmt
            .query_map([], |row| {
                (0..column_count)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<Result<Vec<_>, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let types: Vec<ColumnType> = declared
            .iter()
            .enumerate()
            .map(|(i, declared)| {
                declared.unwrap_or_else(|| {
                    infer_type(raw_rows.iter().map(|row| &row[i]), &self.total_marker)
                })
            })
            .collect();

        let headers: Vec<Header> = names
            .into_iter()
            .zip(&types)
            .map(|(name, column_type)| Header::dimension(name, *column_type))
            .collect();
        let rows = raw_rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(&headers)
                    .map(|(value, header)| to_cell(value, header, &self.total_marker))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("query returned {} rows", rows.len());
        Ok(RowTable::new(headers, rows)?)
    }

    fn introspect(&self) -> DatastoreResult<HashMap<String, Store>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stores = HashMap::with_capacity(tables.len());
        for table in tables {
            let mut info = conn.prepare(&format!(
                "PRAGMA table_info(\"{}\")",
                table.replace('"', "\"\"")
            ))?;
            let fields = info
                .query_map([], |row| {
                    let name: String = row.get(1)?;
                    let decl: String = row.get(2)?;
                    Ok(TypedField {
                        store: table.clone(),
                        name,
                        column_type: ColumnType::from_sql_decl(&decl),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            stores.insert(
                table.clone(),
                Store {
                    name: table,
                    fields,
                },
            );
        }
        debug!("introspected {} stores", stores.len());
        Ok(stores)
    }
}

impl Datastore for SqliteDatastore {
    fn connection(&self) -> DatastoreResult<Connection> {
        Self::open_location(&self.location)
    }

    fn stores_by_name(&self) -> DatastoreResult<&HashMap<String, Store>> {
        self.stores.get_or_try_init(|| self.introspect())
    }
}

fn infer_type<'a>(values: impl Iterator<Item = &'a Value>, total_marker: &str) -> ColumnType {
    let mut inferred: Option<ColumnType> = None;
    for value in values {
        let column_type = match value {
            Value::Null => continue,
            Value::Text(s) if s == total_marker => continue,
            Value::Integer(_) => ColumnType::Int64,
            Value::Real(_) => ColumnType::Float64,
            Value::Text(_) | Value::Blob(_) => return ColumnType::Text,
        };
        inferred = match (inferred, column_type) {
            (Some(ColumnType::Float64), _) | (Some(ColumnType::Int64), ColumnType::Float64) => {
                Some(ColumnType::Float64)
            }
            _ => Some(column_type),
        };
    }
    inferred.unwrap_or(ColumnType::Text)
}

/// Convert a SQLite value to a cell of the column's type.
///
/// SQLite does not enforce declared types, so a value that cannot be
/// represented in the column's type is rejected.
fn to_cell(value: Value, header: &Header, total_marker: &str) -> Result<Cell, TableError> {
    let cell = match (value, header.column_type) {
        (Value::Null, _) => Some(Cell::Null),
        (Value::Text(s), _) if s == total_marker => Some(Cell::Total),
        (Value::Integer(v), ColumnType::Int32) => i32::try_from(v).ok().map(Cell::Int32),
        (Value::Integer(v), ColumnType::Int64) => Some(Cell::Int64(v)),
        (Value::Integer(v), ColumnType::Float64) => Some(Cell::Float64(v as f64)),
        (Value::Integer(v), ColumnType::Bool) => Some(Cell::Bool(v != 0)),
        (Value::Integer(v), ColumnType::Text) => Some(Cell::Text(v.to_string())),
        (Value::Real(v), ColumnType::Float64) => Some(Cell::Float64(v)),
        (Value::Real(v), ColumnType::Text) => Some(Cell::Text(v.to_string())),
        (Value::Text(s), ColumnType::Text) => Some(Cell::Text(s)),
        (Value::Blob(b), ColumnType::Text) => {
            Some(Cell::Text(String::from_utf8_lossy(&b).into_owned()))
        }
        (other, _) => {
            return Err(TableError::InvalidCell {
                column: header.name.clone(),
                column_type: header.column_type,
                value: format!("{:?}", other),
            })
        }
    };
    cell.ok_or_else(|| TableError::InvalidCell {
        column: header.name.clone(),
        column_type: header.column_type,
        value: "integer out of range".to_string(),
    })
}
