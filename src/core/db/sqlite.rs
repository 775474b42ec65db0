/// SQLite Backend
///
/// The `rusqlite` implementation of the driver seam. Cursors are buffered:
/// `execute` prepares the statement, runs it to completion, keeps the rows,
/// and finalizes the statement before returning. One call runs exactly one
/// statement; SQL text holding more than one is rejected.

use super::connection::ConnectOptions;
use super::driver::{Cursor, Session};
use super::value::{Row, Value};
use crate::core::DriverError;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Batch, OpenFlags, ToSql};
use std::borrow::Cow;
use std::collections::VecDeque;
use tracing::debug;

/// The connection type handed out by [`crate::open`].
pub type Connection = SqliteConnection;

/// An open SQLite session.
///
/// `Send` but not `Sync`: a connection may move between threads, but two
/// threads can never use the same one at once.
#[derive(Debug)]
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, DriverError> {
        let conn = rusqlite::Connection::open_in_memory()?;
        Self::configure(&conn)?;
        Ok(SqliteConnection { conn })
    }

    /// The underlying `rusqlite` connection.
    pub fn raw(&self) -> &rusqlite::Connection {
        &self.conn
    }

    /// Whether a transaction is open on this connection.
    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn configure(conn: &rusqlite::Connection) -> Result<(), DriverError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(())
    }
}

impl Session for SqliteConnection {
    type Cursor<'s> = SqliteCursor<'s>;

    fn connect(options: &ConnectOptions) -> Result<Self, DriverError> {
        debug!(
            host = %options.host,
            port = options.port,
            "sqlite is file-addressed; host, port and credentials are not used"
        );
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = rusqlite::Connection::open_with_flags(&options.database, flags)?;
        conn.busy_timeout(options.connect_timeout)?;
        Self::configure(&conn)?;
        Ok(SqliteConnection { conn })
    }

    fn cursor(&self) -> Result<SqliteCursor<'_>, DriverError> {
        Ok(SqliteCursor {
            conn: &self.conn,
            rows: VecDeque::new(),
        })
    }

    fn begin(&self) -> Result<(), DriverError> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }
        Ok(())
    }

    fn commit(&self) -> Result<(), DriverError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    // SQLite may already have rolled back on its own after some errors.
    fn rollback(&self) -> Result<(), DriverError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }
}

/// Buffered cursor over one statement's result.
pub struct SqliteCursor<'c> {
    conn: &'c rusqlite::Connection,
    rows: VecDeque<Row>,
}

impl Cursor for SqliteCursor<'_> {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, DriverError> {
        self.rows.clear();

        let sql = if params.is_empty() {
            Cow::Borrowed(sql)
        } else {
            translate_placeholders(sql)
        };
        let conn = self.conn;
        let mut batch = Batch::new(conn, &sql);
        let mut stmt = batch
            .next()?
            .ok_or_else(|| DriverError::Other("empty statement".to_string()))?;
        if batch.next()?.is_some() {
            return Err(DriverError::Other(
                "multiple statements in one call are not supported".to_string(),
            ));
        }
        let bound = rusqlite::params_from_iter(params.iter());

        let column_count = stmt.column_count();
        if column_count == 0 {
            // changes() keeps the last DML count across DDL and PRAGMAs
            let before = total_changes(conn)?;
            let changed = stmt.execute(bound)?;
            let after = total_changes(conn)?;
            return Ok(if after == before { 0 } else { changed as u64 });
        }

        let mut rows = stmt.query(bound)?;
        while let Some(row) = rows.next()? {
            let values = (0..column_count)
                .map(|i| row.get_ref(i).map(Value::from))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            self.rows.push_back(Row::new(values));
        }
        Ok(self.rows.len() as u64)
    }

    fn fetch_one(&mut self) -> Result<Option<Row>, DriverError> {
        Ok(self.rows.pop_front())
    }

    fn fetch_all(&mut self) -> Result<Vec<Row>, DriverError> {
        Ok(self.rows.drain(..).collect())
    }
}

fn total_changes(conn: &rusqlite::Connection) -> Result<i64, DriverError> {
    Ok(conn.query_row("SELECT total_changes()", [], |row| row.get(0))?)
}

/// Rewrites `%s` placeholders to SQLite's `?` and `%%` to a literal `%`.
///
/// `%s` inside quoted literals or identifiers is left alone, and `--` and
/// `/* */` comments are copied verbatim. SQL without a `%` is returned
/// unchanged.
pub fn translate_placeholders(sql: &str) -> Cow<'_, str> {
    if !sql.contains('%') {
        return Cow::Borrowed(sql);
    }

    let mut out = String::with_capacity(sql.len());
    let mut quote: Option<char> = None;
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        if quote.is_none() && c == '-' && chars.peek() == Some(&'-') {
            out.push(c);
            for c in chars.by_ref() {
                out.push(c);
                if c == '\n' {
                    break;
                }
            }
            continue;
        }
        if quote.is_none() && c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            out.push_str("/*");
            let mut prev = '\0';
            for c in chars.by_ref() {
                out.push(c);
                if prev == '*' && c == '/' {
                    break;
                }
                prev = c;
            }
            continue;
        }
        if c == '%' {
            match chars.peek() {
                Some('%') => {
                    chars.next();
                    out.push('%');
                }
                Some('s') if quote.is_none() => {
                    chars.next();
                    out.push('?');
                }
                _ => out.push('%'),
            }
            continue;
        }

        out.push(c);
        match quote {
            Some(q) if c == q => quote = None,
            None if matches!(c, '\'' | '"' | '`') => quote = Some(c),
            _ => {}
        }
    }
    Cow::Owned(out)
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}
