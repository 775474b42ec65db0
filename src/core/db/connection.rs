/// Connection Factory Module
///
/// Builds connection options and opens caller-owned sessions. A session
/// opened here is never closed by the data tier; dropping it is the
/// caller's business.

use super::driver::Session;
use super::operation::Operation;
use super::sqlite::Connection;
use crate::core::{DataTierError, Result};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error};

/// Default time allowed for the driver to establish (or wait on) a session.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything needed to reach a database.
///
/// The SQLite backend is file-addressed: `database` is a path or
/// `:memory:`, and `host`, `port` and the credentials are carried for
/// backends that need them.
#[derive(Clone, PartialEq)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub connect_timeout: Duration,
}

impl ConnectOptions {
    pub fn new(host: &str, port: u16, username: &str, password: &str, database: &str) -> Self {
        ConnectOptions {
            host: host.to_string(),
            port,
            username: username.to_string(),
            password: password.to_string(),
            database: database.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl fmt::Debug for ConnectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Opens a connection to `database` on `host:port` as `username`.
///
/// # Errors
///
/// Returns `DataTierError::Connection` if the driver cannot establish the
/// session. The failure is logged once before it is returned.
///
/// # Examples
///
/// ```
/// let conn = datatier::open("localhost", 0, "", "", ":memory:")?;
/// # Ok::<(), datatier::DataTierError>(())
/// ```
pub fn open(host: &str, port: u16, username: &str, password: &str, database: &str) -> Result<Connection> {
    open_with(&ConnectOptions::new(host, port, username, password, database))
}

/// Opens a connection described by `options` on the default backend.
pub fn open_with(options: &ConnectOptions) -> Result<Connection> {
    open_session(options)
}

/// Opens a session on any backend implementing [`Session`].
pub fn open_session<S: Session>(options: &ConnectOptions) -> Result<S> {
    debug!(
        host = %options.host,
        port = options.port,
        database = %options.database,
        "opening connection"
    );
    S::connect(options).map_err(|err| {
        error!("{} {}", Operation::Open.failure_prefix(), err);
        DataTierError::Connection(err)
    })
}
