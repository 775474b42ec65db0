/// # Test Utilities Module
///
/// Shared fixtures for the unit tests:
/// - `DatabaseFixture`: an in-memory SQLite database with a small schema
/// - `ScriptedSession`: a `Session` double that records every cursor and
///   transaction event and can be told to fail at any step
/// - `capture_logs`: runs a closure under a thread-local subscriber and
///   returns what it logged

use crate::core::db::driver::{Cursor, Session};
use crate::core::db::sqlite::SqliteConnection;
use crate::core::db::{ConnectOptions, Row, Value};
use crate::core::{DataTierError, DriverError, Result};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

/// Isolated database test fixture
pub struct DatabaseFixture {
    pub connection: SqliteConnection,
}

impl DatabaseFixture {
    /// Create a new empty in-memory database
    pub fn new() -> Result<Self> {
        let connection = SqliteConnection::open_in_memory().map_err(DataTierError::Connection)?;
        Ok(DatabaseFixture { connection })
    }

    /// Create fixture with the users/products schema and three users.
    /// `products` is left empty.
    pub fn with_sample_data() -> Result<Self> {
        let fixture = Self::new()?;
        fixture
            .connection
            .raw()
            .execute_batch(
                "
                CREATE TABLE users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    active INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE products (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    price REAL NOT NULL,
                    gender TEXT
                );

                INSERT INTO users (name, active) VALUES ('alice', 1);
                INSERT INTO users (name, active) VALUES ('bob', 0);
                INSERT INTO users (name, active) VALUES ('carol', 1);
            ",
            )
            .map_err(|e| DataTierError::Query(e.into()))?;
        Ok(fixture)
    }
}

/// Something a `ScriptedSession` or one of its cursors was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Begin,
    CursorOpened,
    Execute(String),
    Fetch,
    CursorReleased,
    Commit,
    Rollback,
}

/// A `Session` that records calls instead of talking to a database.
#[derive(Debug, Default)]
pub struct ScriptedSession {
    events: RefCell<Vec<Event>>,
    rows: Vec<Row>,
    rowcount: Option<u64>,
    fail_begin: Option<String>,
    fail_cursor: Option<String>,
    fail_execute: Option<String>,
    fail_fetch: Option<String>,
    fail_commit: Option<String>,
    fail_rollback: Option<String>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows every query produces.
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    /// Row count reported by `execute`; defaults to the number of rows.
    pub fn with_rowcount(mut self, rowcount: u64) -> Self {
        self.rowcount = Some(rowcount);
        self
    }

    pub fn fail_begin(mut self, msg: &str) -> Self {
        self.fail_begin = Some(msg.to_string());
        self
    }

    pub fn fail_cursor(mut self, msg: &str) -> Self {
        self.fail_cursor = Some(msg.to_string());
        self
    }

    pub fn fail_execute(mut self, msg: &str) -> Self {
        self.fail_execute = Some(msg.to_string());
        self
    }

    pub fn fail_fetch(mut self, msg: &str) -> Self {
        self.fail_fetch = Some(msg.to_string());
        self
    }

    pub fn fail_commit(mut self, msg: &str) -> Self {
        self.fail_commit = Some(msg.to_string());
        self
    }

    pub fn fail_rollback(mut self, msg: &str) -> Self {
        self.fail_rollback = Some(msg.to_string());
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn count(&self, event: &Event) -> usize {
        self.events.borrow().iter().filter(|e| *e == event).count()
    }

    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

fn scripted(failure: &Option<String>) -> std::result::Result<(), DriverError> {
    match failure {
        Some(msg) => Err(DriverError::Other(msg.clone())),
        None => Ok(()),
    }
}

impl Session for ScriptedSession {
    type Cursor<'s> = ScriptedCursor<'s>;

    fn connect(options: &ConnectOptions) -> std::result::Result<Self, DriverError> {
        if options.database.is_empty() {
            return Err(DriverError::Other("no database selected".to_string()));
        }
        Ok(Self::new())
    }

    fn cursor(&self) -> std::result::Result<ScriptedCursor<'_>, DriverError> {
        scripted(&self.fail_cursor)?;
        self.record(Event::CursorOpened);
        Ok(ScriptedCursor {
            session: self,
            pending: VecDeque::new(),
        })
    }

    fn begin(&self) -> std::result::Result<(), DriverError> {
        self.record(Event::Begin);
        scripted(&self.fail_begin)
    }

    fn commit(&self) -> std::result::Result<(), DriverError> {
        self.record(Event::Commit);
        scripted(&self.fail_commit)
    }

    fn rollback(&self) -> std::result::Result<(), DriverError> {
        self.record(Event::Rollback);
        scripted(&self.fail_rollback)
    }
}

pub struct ScriptedCursor<'s> {
    session: &'s ScriptedSession,
    pending: VecDeque<Row>,
}

impl Cursor for ScriptedCursor<'_> {
    fn execute(&mut self, sql: &str, _params: &[Value]) -> std::result::Result<u64, DriverError> {
        self.session.record(Event::Execute(sql.to_string()));
        scripted(&self.session.fail_execute)?;
        self.pending = self.session.rows.iter().cloned().collect();
        Ok(self.session.rowcount.unwrap_or(self.pending.len() as u64))
    }

    fn fetch_one(&mut self) -> std::result::Result<Option<Row>, DriverError> {
        self.session.record(Event::Fetch);
        scripted(&self.session.fail_fetch)?;
        Ok(self.pending.pop_front())
    }

    fn fetch_all(&mut self) -> std::result::Result<Vec<Row>, DriverError> {
        self.session.record(Event::Fetch);
        scripted(&self.session.fail_fetch)?;
        Ok(self.pending.drain(..).collect())
    }
}

impl Drop for ScriptedCursor<'_> {
    fn drop(&mut self) {
        self.session.record(Event::CursorReleased);
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a DEBUG-level fmt subscriber installed on this thread and
/// returns its result together with everything it logged.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = SharedBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, logs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_sample_data() {
        let fixture = DatabaseFixture::with_sample_data().unwrap();
        let count: i64 = fixture
            .connection
            .raw()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_capture_logs_collects_events() {
        let ((), logs) = capture_logs(|| {
            tracing::error!("first");
            tracing::debug!("second");
        });
        assert!(logs.contains("ERROR"));
        assert!(logs.contains("first"));
        assert!(logs.contains("second"));
    }

    #[test]
    fn test_scripted_cursor_records_release() {
        let session = ScriptedSession::new();
        {
            let _cursor = session.cursor().unwrap();
        }
        assert_eq!(session.events(), vec![Event::CursorOpened, Event::CursorReleased]);
    }
}
