//! Types for working with errors produced by the mysqli facade.
//!
//! Every [`Error`] carries a MySQL-style error number ([`Error::errno`]) and SQLSTATE
//! ([`Error::sqlstate`]) so callers can report failures the way `mysqli_errno()` and
//! `mysqli_error()` do.

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::io;
use std::path::Path;
use std::result::Result as StdResult;

use sqlx::mysql::MySqlDatabaseError;

mod client;

pub use client::ClientError;

/// A specialized `Result` type for the mysqli facade.
pub type Result<T, E = Error> = StdResult<T, E>;

// Convenience type alias for usage within this crate.
pub(crate) type BoxDynError = Box<dyn StdError + 'static + Send + Sync>;

/// SQLSTATE reported for errors that did not come from the server.
pub(crate) const GENERAL_SQLSTATE: &str = "HY000";

/// SQLSTATE reported after a successful call.
pub(crate) const SUCCESS_SQLSTATE: &str = "00000";

// Client error numbers, as assigned by libmysqlclient (`errmsg.h`).
pub(crate) const CR_UNKNOWN_ERROR: u16 = 2000;
pub(crate) const CR_CONNECTION_ERROR: u16 = 2002;
pub(crate) const CR_CONN_HOST_ERROR: u16 = 2003;
pub(crate) const CR_UNKNOWN_HOST: u16 = 2005;
pub(crate) const CR_SERVER_GONE_ERROR: u16 = 2006;
pub(crate) const CR_SSL_CONNECTION_ERROR: u16 = 2026;
pub(crate) const CR_MALFORMED_PACKET: u16 = 2027;

/// Represents all the ways a call can fail.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Error returned from the MySQL server.
    #[error("{0}")]
    Server(ServerError),

    /// A connection to the server could not be established.
    #[error("{message}")]
    Connect {
        errno: u16,
        message: String,

        #[source]
        source: sqlx::Error,
    },

    /// A statement handle was used out of order or with invalid arguments.
    ///
    /// These are detected on the client; nothing is sent to the server.
    #[error("{0}")]
    Client(#[from] ClientError),

    /// Any other failure reported by the underlying driver.
    #[error("{0}")]
    Driver(#[source] sqlx::Error),

    /// A column value could not be converted into a [`Value`][crate::Value].
    #[error("error occurred while decoding column {index}: {source}")]
    Decode {
        index: usize,

        #[source]
        source: BoxDynError,
    },

    /// Connection parameters could not be read or parsed.
    #[error("error occurred while reading connection parameters: {0}")]
    Configuration(String),
}

impl Error {
    /// The MySQL error number. Never `0`.
    pub fn errno(&self) -> u16 {
        match self {
            Error::Server(err) => err.number,
            Error::Connect { errno, .. } => *errno,
            Error::Client(err) => err.errno(),
            Error::Driver(err) => driver_errno(err),
            Error::Decode { .. } | Error::Configuration(_) => CR_UNKNOWN_ERROR,
        }
    }

    /// The five-character SQLSTATE code for this error.
    pub fn sqlstate(&self) -> &str {
        match self {
            Error::Server(err) => &err.sqlstate,
            _ => GENERAL_SQLSTATE,
        }
    }

    /// Returns the server error, if this is one.
    pub fn as_server_error(&self) -> Option<&ServerError> {
        match self {
            Error::Server(err) => Some(err),
            _ => None,
        }
    }

    /// Wraps a failure to establish a connection to `host:port` (or `socket`).
    pub(crate) fn connect(host: &str, port: u16, socket: Option<&Path>, err: sqlx::Error) -> Self {
        // a server that answered but rejected us (bad credentials, unknown database)
        if matches!(err, sqlx::Error::Database(_)) {
            return Error::from(err);
        }

        let (errno, reason) = match &err {
            sqlx::Error::Io(io) => match socket {
                Some(_) => (CR_CONNECTION_ERROR, io.to_string()),
                None => (CR_CONN_HOST_ERROR, io.to_string()),
            },

            sqlx::Error::Configuration(source) => (CR_UNKNOWN_HOST, source.to_string()),
            sqlx::Error::Tls(source) => (CR_SSL_CONNECTION_ERROR, source.to_string()),
            sqlx::Error::Protocol(message) => (CR_MALFORMED_PACKET, message.clone()),

            other => (CR_UNKNOWN_ERROR, other.to_string()),
        };

        let message = match socket {
            Some(socket) => format!(
                "Can't connect to local MySQL server through socket '{}' ({})",
                socket.display(),
                reason
            ),

            None => format!("Can't connect to MySQL server on '{host}:{port}' ({reason})"),
        };

        Error::Connect {
            errno,
            message,
            source: err,
        }
    }

    /// Wraps a failure to resolve `host` before connecting to it.
    pub(crate) fn unknown_host(host: &str, err: io::Error) -> Self {
        Error::Connect {
            errno: CR_UNKNOWN_HOST,
            message: format!("Unknown MySQL server host '{host}' ({err})"),
            source: sqlx::Error::Io(err),
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => Error::Server(match db.try_downcast_ref::<MySqlDatabaseError>() {
                Some(mysql) => ServerError {
                    number: mysql.number(),
                    sqlstate: mysql.code().unwrap_or(GENERAL_SQLSTATE).to_owned(),
                    message: mysql.message().to_owned(),
                },

                None => ServerError {
                    number: CR_UNKNOWN_ERROR,
                    sqlstate: db
                        .code()
                        .map_or_else(|| GENERAL_SQLSTATE.to_owned(), |code| code.into_owned()),
                    message: db.message().to_owned(),
                },
            }),

            sqlx::Error::ColumnDecode { index, source } => Error::Decode {
                index: index.parse().unwrap_or_default(),
                source,
            },

            other => Error::Driver(other),
        }
    }
}

/// Maps a driver failure that happened after the connection was established.
fn driver_errno(err: &sqlx::Error) -> u16 {
    match err {
        sqlx::Error::Io(_) => CR_SERVER_GONE_ERROR,
        sqlx::Error::Tls(_) => CR_SSL_CONNECTION_ERROR,
        sqlx::Error::Protocol(_) => CR_MALFORMED_PACKET,
        sqlx::Error::Configuration(_) => CR_UNKNOWN_HOST,
        _ => CR_UNKNOWN_ERROR,
    }
}

/// An error returned from the MySQL server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    /// Server error number, e.g. `1146` for "table doesn't exist".
    pub number: u16,
    /// SQLSTATE code, e.g. `42S02`.
    pub sqlstate: String,
    /// Human-readable message as sent by the server.
    pub message: String,
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for ServerError {}

/// The `errno` / `error` / `sqlstate` triple a handle reports for its most recent call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LastError {
    pub(crate) errno: u16,
    pub(crate) error: String,
    pub(crate) sqlstate: String,
}

impl LastError {
    pub(crate) fn clear(&mut self) {
        self.errno = 0;
        self.error.clear();
        self.sqlstate.clear();
        self.sqlstate.push_str(SUCCESS_SQLSTATE);
    }

    pub(crate) fn set(&mut self, err: &Error) {
        self.errno = err.errno();
        self.error = err.to_string();
        self.sqlstate = err.sqlstate().to_owned();
    }

    /// Records the outcome of a call and passes it through unchanged.
    pub(crate) fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => self.clear(),
            Err(err) => self.set(err),
        }

        result
    }
}

impl Default for LastError {
    fn default() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            sqlstate: SUCCESS_SQLSTATE.to_owned(),
        }
    }
}

#[test]
fn it_maps_refused_tcp_connections_to_conn_host_error() {
    let io = io::Error::new(io::ErrorKind::ConnectionRefused, "Connection refused");
    let err = Error::connect("127.0.0.1", 1, None, sqlx::Error::Io(io));

    assert_eq!(err.errno(), CR_CONN_HOST_ERROR);
    assert_eq!(err.sqlstate(), GENERAL_SQLSTATE);
    assert!(err.to_string().starts_with("Can't connect to MySQL server on '127.0.0.1:1'"));
}

#[test]
fn it_maps_socket_failures_to_connection_error() {
    let io = io::Error::new(io::ErrorKind::NotFound, "No such file or directory");
    let socket = Path::new("/tmp/missing.sock");
    let err = Error::connect("localhost", 3306, Some(socket), sqlx::Error::Io(io));

    assert_eq!(err.errno(), CR_CONNECTION_ERROR);
    assert!(err.to_string().contains("/tmp/missing.sock"));
}

#[test]
fn it_maps_resolution_failures_to_unknown_host() {
    let io = io::Error::new(io::ErrorKind::Other, "failed to lookup address information");
    let err = Error::unknown_host("db.invalid", io);

    assert_eq!(err.errno(), CR_UNKNOWN_HOST);
    assert!(err.to_string().starts_with("Unknown MySQL server host 'db.invalid'"));
}

#[test]
fn it_maps_lost_connections_to_server_gone() {
    let io = io::Error::new(io::ErrorKind::UnexpectedEof, "early eof");
    let err = Error::from(sqlx::Error::Io(io));

    assert_eq!(err.errno(), CR_SERVER_GONE_ERROR);
    assert!(!err.to_string().is_empty());
}

#[test]
fn it_records_and_clears_the_last_error() {
    let mut last = LastError::default();

    let failed: Result<()> = Err(ClientError::InvalidParameterNumber.into());
    assert!(last.record(failed).is_err());
    assert_eq!(last.errno, 2034);
    assert_eq!(last.error, "Invalid parameter number");
    assert_eq!(last.sqlstate, GENERAL_SQLSTATE);

    assert!(last.record(Ok(())).is_ok());
    assert_eq!(last, LastError::default());
}
