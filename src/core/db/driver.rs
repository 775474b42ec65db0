/// Driver Seam
///
/// The traits a database backend implements for the data tier. The four
/// public operations are written once against these traits; the SQLite
/// backend in `sqlite.rs` is the implementation shipped with the crate.

use super::connection::ConnectOptions;
use super::value::{Row, Value};
use crate::core::DriverError;

/// A per-call statement resource.
///
/// A cursor executes exactly one statement and hands out its rows. It is
/// released by `Drop`, so every exit path of the owning operation releases
/// it exactly once.
pub trait Cursor {
    /// Executes `sql` with positional `params` bound by the driver.
    ///
    /// Returns the driver's row count: rows modified for an action
    /// statement, rows produced for a query.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, DriverError>;

    /// Next row of the last result, or `None` once exhausted.
    fn fetch_one(&mut self) -> Result<Option<Row>, DriverError>;

    /// All remaining rows of the last result.
    fn fetch_all(&mut self) -> Result<Vec<Row>, DriverError>;
}

/// An open database session.
///
/// Sessions are owned by the caller and outlive any number of operations.
/// The data tier never closes one. Implementations are not expected to be
/// `Sync`: one session serves one logical caller at a time.
pub trait Session {
    type Cursor<'s>: Cursor
    where
        Self: 's;

    /// Establishes a new session.
    fn connect(options: &ConnectOptions) -> Result<Self, DriverError>
    where
        Self: Sized;

    /// Opens a cursor bound to this session.
    fn cursor(&self) -> Result<Self::Cursor<'_>, DriverError>;

    /// Starts a transaction if the backend does not already have one open.
    /// Backends that are implicitly transactional keep the default.
    fn begin(&self) -> Result<(), DriverError> {
        Ok(())
    }

    fn commit(&self) -> Result<(), DriverError>;

    fn rollback(&self) -> Result<(), DriverError>;
}
