//! A minimal relational data tier.
//!
//! Open a caller-owned connection, then run parameterized SQL through it:
//! [`retrieve_one`] for a single row, [`retrieve_all`] for every row, and
//! [`execute`] for INSERT/UPDATE/DELETE with commit-or-rollback. Each call
//! uses its own cursor and releases it before returning. Failures are
//! logged once and returned; "no rows" and "zero affected" are successes.
//!
//! ```
//! use datatier::{execute, open, retrieve_all, retrieve_one, params};
//!
//! let conn = open("localhost", 0, "", "", ":memory:")?;
//! execute(&conn, "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)", &[])?;
//! assert_eq!(execute(&conn, "INSERT INTO users(name) VALUES(%s)", &params!["Ann"])?, 1);
//!
//! let row = retrieve_one(&conn, "SELECT name FROM users WHERE name=%s", &params!["Ann"])?;
//! assert_eq!(row[0].as_str(), Some("Ann"));
//! assert!(retrieve_all(&conn, "SELECT * FROM users WHERE id > 10", &[])?.is_empty());
//! # Ok::<(), datatier::DataTierError>(())
//! ```

// Core infrastructure modules
pub mod core;

// Configuration loading
pub mod config;

#[cfg(test)]
mod test_utils;

pub use crate::core::db::{
    execute, open, open_session, open_with, retrieve_all, retrieve_one, AffectedCount,
    ConnectOptions, Connection, Cursor, Operation, ResultSet, Row, Session, SqliteConnection,
    Value,
};
pub use crate::core::{DataTierError, DriverError, Result};
