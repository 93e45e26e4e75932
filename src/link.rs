use sqlx::mysql::MySqlConnection;
use sqlx::{Column, Connection, Either, Executor, Statement};
use tokio::runtime::Runtime;

use crate::error::{Error, LastError, Result};
use crate::logger::{StmtLogger, TARGET};
use crate::options::ConnectParams;
use crate::query_result::{QueryResult, ResultSet};
use crate::rt;
use crate::statement::Stmt;

/// A connection to a MySQL server.
///
/// Every call blocks until the server responds. The handle remembers the outcome of its
/// most recent call in [`errno`][Link::errno], [`error`][Link::error] and
/// [`sqlstate`][Link::sqlstate], independently of the `Result` returned to the caller.
pub struct Link {
    // dropped before the runtime it is registered with
    pub(crate) conn: MySqlConnection,
    pub(crate) rt: Runtime,
    params: ConnectParams,
    last_error: LastError,
    affected_rows: u64,
    insert_id: u64,
}

impl Link {
    /// Opens a connection.
    ///
    /// Failures carry a non-zero [`Error::errno`]: the server's error number when the
    /// server rejected the connection, or a client error number (`2002`, `2003`, ...)
    /// when it could not be reached.
    pub fn connect(params: &ConnectParams) -> Result<Self> {
        let host = params.get_host();
        let port = params.get_port();
        let socket = params.get_socket();

        let rt = rt::current_thread()
            .map_err(|err| Error::connect(host, port, socket, sqlx::Error::Io(err)))?;

        if socket.is_none() {
            if let Err(err) = rt.block_on(tokio::net::lookup_host((host, port))) {
                let err = Error::unknown_host(host, err);

                tracing::debug!(target: TARGET, host, port, errno = err.errno(), "connect failed: {err}");

                return Err(err);
            }
        }

        let options = params.to_connect_options();

        let conn = match rt.block_on(MySqlConnection::connect_with(&options)) {
            Ok(conn) => conn,
            Err(err) => {
                let err = Error::connect(host, port, socket, err);

                tracing::debug!(target: TARGET, host, port, errno = err.errno(), "connect failed: {err}");

                return Err(err);
            }
        };

        tracing::debug!(target: TARGET, host, port, db = params.get_db(), "connected");

        Ok(Self {
            conn,
            rt,
            params: params.clone(),
            last_error: LastError::default(),
            affected_rows: 0,
            insert_id: 0,
        })
    }

    /// Runs a plain SQL statement.
    ///
    /// Statements that produce a result set (`SELECT`, `SHOW`, ...) are buffered
    /// entirely and returned as [`QueryResult::Rows`].
    pub fn query(&mut self, sql: &str) -> Result<QueryResult> {
        let mut logger = StmtLogger::new(sql, 0, &self.params.log_settings);
        let result = self.query_inner(sql, &mut logger);

        if result.is_err() {
            logger.failed();
        }

        self.last_error.record(result)
    }

    fn query_inner(&mut self, sql: &str, logger: &mut StmtLogger) -> Result<QueryResult> {
        if returns_rows(sql) {
            let rows = self.rt.block_on(self.conn.fetch_all(sql))?;
            let set = ResultSet::from_rows(None, &rows)?;

            self.affected_rows = set.num_rows() as u64;
            self.insert_id = 0;

            logger.rows_returned(self.affected_rows);

            return Ok(QueryResult::Rows(set));
        }

        let done = self.rt.block_on(self.conn.execute(sql))?;

        self.affected_rows = done.rows_affected();
        self.insert_id = done.last_insert_id();

        logger.rows_affected(self.affected_rows);

        Ok(QueryResult::Done {
            affected_rows: self.affected_rows,
            insert_id: self.insert_id,
        })
    }

    /// Changes the default database.
    pub fn select_db(&mut self, db: &str) -> Result<()> {
        let sql = format!("USE `{}`", db.replace('`', "``"));

        self.query(&sql)?;
        self.params = self.params.clone().db(db);

        Ok(())
    }

    /// Prepares `sql` on the server.
    ///
    /// Placeholders are written as `?`. The returned statement borrows the connection
    /// until it is closed.
    pub fn prepare(&mut self, sql: &str) -> Result<Stmt<'_>> {
        let result = self.prepare_inner(sql);
        let (param_count, field_names) = self.last_error.record(result)?;

        tracing::debug!(
            target: TARGET,
            summary = crate::logger::parse_query_summary(sql),
            param_count,
            field_count = field_names.len(),
            "prepared"
        );

        Ok(Stmt::new(self, sql, param_count, field_names))
    }

    fn prepare_inner(&mut self, sql: &str) -> Result<(usize, Vec<String>)> {
        let statement = self.rt.block_on(self.conn.prepare(sql))?;

        let param_count = match statement.parameters() {
            Some(Either::Left(types)) => types.len(),
            Some(Either::Right(count)) => count,
            None => 0,
        };

        let field_names = statement
            .columns()
            .iter()
            .map(|column| column.name().to_owned())
            .collect();

        Ok((param_count, field_names))
    }

    /// Checks that the connection is still alive.
    pub fn ping(&mut self) -> Result<()> {
        let result = self.rt.block_on(self.conn.ping()).map_err(Error::from);

        self.last_error.record(result)
    }

    /// The version string reported by the server.
    pub fn server_info(&mut self) -> Result<String> {
        let result = self
            .rt
            .block_on(sqlx::query_scalar::<_, String>("SELECT VERSION()").fetch_one(&mut self.conn))
            .map_err(Error::from);

        self.last_error.record(result)
    }

    /// Closes the connection.
    pub fn close(self) -> Result<()> {
        let Link { conn, rt, .. } = self;

        rt.block_on(conn.close())?;

        tracing::debug!(target: TARGET, "connection closed");

        Ok(())
    }

    /// Error number of the most recent call, or `0` if it succeeded.
    pub fn errno(&self) -> u16 {
        self.last_error.errno
    }

    /// Error message of the most recent call, or `""` if it succeeded.
    pub fn error(&self) -> &str {
        &self.last_error.error
    }

    /// SQLSTATE of the most recent call, `"00000"` if it succeeded.
    pub fn sqlstate(&self) -> &str {
        &self.last_error.sqlstate
    }

    /// Rows changed, deleted or inserted (or returned, for a result set) by the last query.
    pub fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    /// `AUTO_INCREMENT` value generated by the last query, or `0`.
    pub fn insert_id(&self) -> u64 {
        self.insert_id
    }

    pub fn params(&self) -> &ConnectParams {
        &self.params
    }
}

/// Whether `sql` is a statement that produces a result set.
fn returns_rows(sql: &str) -> bool {
    const KEYWORDS: &[&str] = &[
        "SELECT", "SHOW", "DESCRIBE", "DESC", "EXPLAIN", "WITH", "VALUES", "TABLE", "CHECKSUM",
    ];

    let keyword: String = skip_leading_noise(sql)
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .collect();

    KEYWORDS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(&keyword))
}

// whitespace, opening parentheses and comments
fn skip_leading_noise(mut sql: &str) -> &str {
    loop {
        let trimmed = sql.trim_start_matches(|c: char| c.is_whitespace() || c == '(');

        if let Some(rest) = trimmed.strip_prefix("/*") {
            sql = rest.find("*/").map_or("", |end| &rest[end + 2..]);
        } else if trimmed.starts_with("-- ") || trimmed.starts_with('#') {
            sql = trimmed.find('\n').map_or("", |end| &trimmed[end + 1..]);
        } else {
            return trimmed;
        }
    }
}

#[test]
fn it_detects_statements_with_result_sets() {
    assert!(returns_rows("SELECT * FROM test_026_table_1"));
    assert!(returns_rows("  select 1"));
    assert!(returns_rows("(SELECT 1) UNION (SELECT 2)"));
    assert!(returns_rows("/* hint */ SHOW TABLES"));
    assert!(returns_rows("-- comment\nDESCRIBE t"));
    assert!(returns_rows("# comment\nWITH x AS (SELECT 1) SELECT * FROM x"));

    assert!(!returns_rows("DROP TABLE IF EXISTS test_026_table_1"));
    assert!(!returns_rows("INSERT INTO t VALUES (1)"));
    assert!(!returns_rows("SET sql_mode=''"));
    assert!(!returns_rows("SELECTED"));
    assert!(!returns_rows("/* unterminated"));
    assert!(!returns_rows(""));
}
