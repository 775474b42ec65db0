/// Action Executor
///
/// Runs a mutating statement inside a transaction: commit on success,
/// rollback on any failure before the error is returned.

use super::driver::{Cursor, Session};
use super::operation::Operation;
use super::value::{AffectedCount, Value};
use crate::core::{DataTierError, Result};
use tracing::{debug, error};

/// Executes an INSERT, UPDATE or DELETE and returns the number of rows it
/// modified. Zero means the statement ran and matched nothing.
///
/// The change is committed before this returns. The cursor is dropped
/// before the commit outcome is acted on, and before any rollback.
///
/// # Errors
///
/// Returns `DataTierError::Action` if the transaction cannot be started, the
/// statement fails, or the commit fails. In every case the pending
/// transaction is rolled back first; if the rollback also fails, that error
/// travels in the `rollback` field.
pub fn execute<S: Session>(conn: &S, sql: &str, params: &[Value]) -> Result<AffectedCount> {
    let outcome = conn.begin().and_then(|()| {
        let count = conn.cursor()?.execute(sql, params)?;
        conn.commit()?;
        Ok(count)
    });

    match outcome {
        Ok(count) => {
            debug!(sql, affected = count, "execute");
            Ok(count)
        }
        Err(source) => {
            let rollback = conn.rollback().err();
            match &rollback {
                None => error!("{} {}", Operation::Execute.failure_prefix(), source),
                Some(rb) => error!(
                    "{} {} (rollback also failed: {})",
                    Operation::Execute.failure_prefix(),
                    source,
                    rb
                ),
            }
            Err(DataTierError::Action { source, rollback })
        }
    }
}
