//! Uniqueness checks against a persistent store.
//!
//! Table and column names never come from request data. They are resolved
//! through a [`UniqueAllowlist`] that the application builds from a fixed
//! set of identifiers, and the candidate value is always bound as a query
//! parameter.

use crate::errors::RuleFailure;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

static IDENTIFIER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Rule name that triggers a configured uniqueness check.
pub const UNIQUE_RULE: &str = "unique";

/// A table/column pair was refused before any query was built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UniqueError {
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("table {0} is not allowed for uniqueness checks")]
    TableNotAllowed(String),

    #[error("column {column} of table {table} is not allowed for uniqueness checks")]
    ColumnNotAllowed { table: String, column: String },
}

/// The store could not answer.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("query failed: {0}")]
    Query(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[cfg(feature = "sqlite")]
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// A vetted table and column.
///
/// Only obtainable through [`UniqueAllowlist::target`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueTarget {
    table: String,
    column: String,
}

impl UniqueTarget {
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

/// The tables and columns a uniqueness check may touch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniqueAllowlist {
    tables: BTreeMap<String, BTreeSet<String>>,
}

impl UniqueAllowlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `columns` of `table`. Every name must be a plain SQL identifier.
    pub fn allow<I, S>(mut self, table: &str, columns: I) -> Result<Self, UniqueError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        check_identifier(table)?;
        let entry = self.tables.entry(table.to_string()).or_default();
        for column in columns {
            let column = column.as_ref();
            check_identifier(column)?;
            entry.insert(column.to_string());
        }
        Ok(self)
    }

    /// Resolve a pair, refusing anything not allowed.
    pub fn target(&self, table: &str, column: &str) -> Result<UniqueTarget, UniqueError> {
        let columns = self
            .tables
            .get(table)
            .ok_or_else(|| UniqueError::TableNotAllowed(table.to_string()))?;

        if !columns.contains(column) {
            return Err(UniqueError::ColumnNotAllowed {
                table: table.to_string(),
                column: column.to_string(),
            });
        }

        Ok(UniqueTarget {
            table: table.to_string(),
            column: column.to_string(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn check_identifier(name: &str) -> Result<(), UniqueError> {
    if IDENTIFIER_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(UniqueError::InvalidIdentifier(name.to_string()))
    }
}

/// A store that can count rows holding a value.
pub trait UniqueLookup: Send + Sync {
    /// Number of rows where `target.column() = value`.
    fn count_matching(&self, target: &UniqueTarget, value: &str) -> Result<u64, LookupError>;
}

/// Fails with [`RuleFailure::NotUnique`] when any row already holds `value`.
pub fn check_unique(
    lookup: &dyn UniqueLookup,
    target: &UniqueTarget,
    value: &str,
) -> Result<(), RuleFailure> {
    match lookup.count_matching(target, value) {
        Ok(0) => Ok(()),
        Ok(_) => Err(RuleFailure::NotUnique),
        Err(e) => {
            fieldcheck_log::warn!(
                "uniqueness lookup on {}.{} failed: {}",
                target.table(),
                target.column(),
                e
            );
            Err(RuleFailure::LookupFailed(e.to_string()))
        }
    }
}

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteUniqueLookup;

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use parking_lot::Mutex;
    use rusqlite::Connection;
    use std::path::Path;

    /// Uniqueness lookups against a SQLite database.
    pub struct SqliteUniqueLookup {
        conn: Mutex<Connection>,
    }

    impl SqliteUniqueLookup {
        pub fn new(conn: Connection) -> Self {
            Self {
                conn: Mutex::new(conn),
            }
        }

        pub fn open(path: impl AsRef<Path>) -> Result<Self, LookupError> {
            Ok(Self::new(Connection::open(path)?))
        }

        /// Run `f` with the underlying connection, e.g. to create tables.
        pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
            f(&self.conn.lock())
        }
    }

    impl UniqueLookup for SqliteUniqueLookup {
        fn count_matching(&self, target: &UniqueTarget, value: &str) -> Result<u64, LookupError> {
            // Identifiers were vetted by the allowlist; only the value is bound.
            let sql = format!(
                "SELECT COUNT(*) FROM \"{}\" WHERE \"{}\" = ?1",
                target.table(),
                target.column()
            );
            let conn = self.conn.lock();
            let mut stmt = conn.prepare(&sql)?;
            let n: i64 = stmt.query_row([value], |row| row.get(0))?;
            Ok(u64::try_from(n).unwrap_or(0))
        }
    }
}
