//! A blocking, mysqli-style procedural facade over the SQLx MySQL driver.
//!
//! The API mirrors the connection / prepared statement handle model of PHP's `mysqli`
//! extension: a [`Link`] is opened from [`ConnectParams`], plain statements run through
//! [`Link::query`], and prepared statements are driven through a [`Stmt`] with
//! `bind_param`, `send_long_data`, `execute`, `bind_result` and `fetch`.
//!
//! Every call blocks until the server answers. The wire protocol and server-side
//! statement preparation are handled by [`sqlx`].
//!
//! ```rust,no_run
//! # fn example() -> sqlx_mysqli::Result<()> {
//! use sqlx_mysqli::{ConnectParams, Link, Value};
//!
//! let mut link = Link::connect(&ConnectParams::from_env()?)?;
//!
//! let mut stmt = link.prepare("INSERT INTO notes (title, body) VALUES (?, ?)")?;
//! stmt.bind_param("sb", [Value::from("Hello World"), Value::Null])?;
//! stmt.send_long_data(1, "first chunk, ")?;
//! stmt.send_long_data(1, "second chunk")?;
//! stmt.execute()?;
//! stmt.close();
//!
//! link.close()?;
//! # Ok(())
//! # }
//! ```
#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(future_incompatible)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]

mod arguments;
mod dump;
pub mod error;
mod link;
mod logger;
mod options;
mod query_result;
mod rt;
mod statement;
mod value;

pub use arguments::{parse_type_spec, ParamType};
pub use dump::{var_dump, VarDump};
pub use error::{ClientError, Error, Result, ServerError};
pub use link::Link;
pub use options::{ConnectParams, LogSettings};
pub use query_result::{QueryResult, ResultSet};
pub use statement::Stmt;
pub use value::Value;
