/// Database Module
///
/// The data tier proper: a connection factory and three statement
/// operations, written once against the driver seam.
///
/// ## Architecture
///
/// - **Driver seam** (`driver.rs`): the `Session` and `Cursor` traits a backend implements
/// - **SQLite backend** (`sqlite.rs`): the `rusqlite` implementation
/// - **Connection Factory** (`connection.rs`): connection options and `open`
/// - **Reads** (`query.rs`): `retrieve_one` and `retrieve_all`
/// - **Writes** (`action.rs`): `execute`, with commit/rollback
///
/// ## Resource model
///
/// The caller owns the connection and keeps it across calls; nothing here
/// closes it. Every operation opens its own cursor and drops it before
/// returning, on success and on failure alike. Operations on one
/// connection must be serialized by the caller.
///
/// ## Error Handling
///
/// Every failing operation logs exactly one `ERROR` line with a fixed
/// prefix (see [`Operation::failure_prefix`]) and then returns the error.
/// Nothing is swallowed.
pub mod action;
pub mod connection;
pub mod driver;
pub mod operation;
pub mod query;
pub mod sqlite;
pub mod value;

pub use action::*;
pub use connection::*;
pub use driver::*;
pub use operation::*;
pub use query::*;
pub use sqlite::*;
pub use value::*;
