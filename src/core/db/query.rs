/// Query Execution Module
///
/// The two read operations. Both run through [`with_read_cursor`], which
/// owns the cursor for the duration of the call and turns a driver failure
/// into a logged `DataTierError::Query`.

use super::driver::{Cursor, Session};
use super::operation::Operation;
use super::value::{ResultSet, Row, Value};
use crate::core::{DataTierError, DriverError, Result};
use tracing::{debug, error};

/// Executes a read and returns its first row.
///
/// Returns [`Row::empty`] when the query matches nothing; that is not an
/// error.
///
/// # Errors
///
/// Returns `DataTierError::Query` if the SQL is malformed or the driver
/// fails while executing it. The failure is logged once before it is
/// returned.
///
/// # Examples
///
/// ```
/// use datatier::{open, retrieve_one, Value};
///
/// let conn = open("localhost", 0, "", "", ":memory:")?;
/// let row = retrieve_one(&conn, "SELECT %s + 1", &[Value::from(41)])?;
/// assert_eq!(row[0], Value::Integer(42));
/// # Ok::<(), datatier::DataTierError>(())
/// ```
pub fn retrieve_one<S: Session>(conn: &S, sql: &str, params: &[Value]) -> Result<Row> {
    let row = with_read_cursor(conn, Operation::RetrieveOne, sql, params, |cursor| {
        cursor.fetch_one()
    })?;
    debug!(sql, found = row.is_some(), "retrieve_one");
    Ok(row.unwrap_or_else(Row::empty))
}

/// Executes a read and returns every row in driver order.
///
/// Returns an empty `Vec` when the query matches nothing.
///
/// # Errors
///
/// Same as [`retrieve_one`], logged with its own prefix.
pub fn retrieve_all<S: Session>(conn: &S, sql: &str, params: &[Value]) -> Result<ResultSet> {
    let rows = with_read_cursor(conn, Operation::RetrieveAll, sql, params, |cursor| {
        cursor.fetch_all()
    })?;
    debug!(sql, rows = rows.len(), "retrieve_all");
    Ok(rows)
}

/// Opens a cursor, executes `sql`, hands the cursor to `fetch`, and drops
/// the cursor before returning on every path.
fn with_read_cursor<S, T, F>(
    conn: &S,
    operation: Operation,
    sql: &str,
    params: &[Value],
    fetch: F,
) -> Result<T>
where
    S: Session,
    F: FnOnce(&mut dyn Cursor) -> std::result::Result<T, DriverError>,
{
    let outcome = conn.cursor().and_then(|mut cursor| {
        cursor.execute(sql, params)?;
        fetch(&mut cursor)
    });

    outcome.map_err(|err| {
        error!("{} {}", operation.failure_prefix(), err);
        DataTierError::Query(err)
    })
}
