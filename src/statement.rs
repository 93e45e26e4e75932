use std::collections::VecDeque;

use crate::arguments::{Params, MySqlQuery};
use crate::error::{ClientError, Error, LastError, Result};
use crate::link::Link;
use crate::logger::{StmtLogger, TARGET};
use crate::query_result::ResultSet;
use crate::value::Value;

/// A prepared statement.
///
/// The statement mutably borrows its [`Link`] until it is closed (or dropped), so a
/// connection is never used by two handles at once.
///
/// Parameters are bound with [`bind_param`][Stmt::bind_param] and can be replaced with
/// [`set_param`][Stmt::set_param] between executions. Large values can be streamed in
/// chunks with [`send_long_data`][Stmt::send_long_data].
///
/// Rows are read with [`fetch`][Stmt::fetch], which copies the next row into the bound
/// result slots ([`result`][Stmt::result], [`results`][Stmt::results]).
pub struct Stmt<'l> {
    link: &'l mut Link,
    sql: String,
    params: Params,
    field_names: Vec<String>,
    // rows of the last execution not yet fetched
    rows: VecDeque<Vec<Value>>,
    results: Vec<Value>,
    executed: bool,
    num_rows: usize,
    affected_rows: u64,
    insert_id: u64,
    last_error: LastError,
}

impl<'l> Stmt<'l> {
    pub(crate) fn new(
        link: &'l mut Link,
        sql: &str,
        param_count: usize,
        field_names: Vec<String>,
    ) -> Self {
        Self {
            link,
            sql: sql.to_owned(),
            params: Params::new(param_count),
            field_names,
            rows: VecDeque::new(),
            results: Vec::new(),
            executed: false,
            num_rows: 0,
            affected_rows: 0,
            insert_id: 0,
            last_error: LastError::default(),
        }
    }

    /// Binds values to the statement's placeholders.
    ///
    /// `types` holds one character per placeholder: `i` (integer), `d` (double),
    /// `s` (string) or `b` (blob). Its length must match both the number of `values`
    /// and the number of placeholders.
    pub fn bind_param<I>(&mut self, types: &str, values: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        let result = self.params.bind(types, values).map_err(Error::from);

        self.last_error.record(result)
    }

    /// Replaces the value bound to placeholder `index` (zero-based) for the next execute.
    pub fn set_param(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        let result = self.params.set(index, value.into()).map_err(Error::from);

        self.last_error.record(result)
    }

    /// Appends `chunk` to the data of placeholder `index` (zero-based).
    ///
    /// Chunks are concatenated in call order, without separators, and replace the bound
    /// value of that placeholder on the next [`execute`][Stmt::execute]. Pending chunks are
    /// discarded after every execute, successful or not.
    pub fn send_long_data(&mut self, index: usize, chunk: impl AsRef<[u8]>) -> Result<()> {
        let chunk = chunk.as_ref();
        let result = self
            .params
            .append_long_data(index, chunk)
            .map_err(Error::from);

        if result.is_ok() {
            tracing::trace!(
                target: TARGET,
                index,
                chunk_len = chunk.len(),
                pending = self.params.pending_long_data(),
                "long data appended"
            );
        }

        self.last_error.record(result)
    }

    /// Executes the statement with the currently bound values.
    ///
    /// A result set is buffered entirely; read it with [`fetch`][Stmt::fetch].
    pub fn execute(&mut self) -> Result<()> {
        let mut logger = StmtLogger::new(
            &self.sql,
            self.params.count(),
            &self.link.params().log_settings,
        );
        logger.long_data_bytes(self.params.pending_long_data());

        let result = self.execute_inner(&mut logger);

        // long data applies to one execution only
        self.params.clear_long_data();

        if result.is_err() {
            logger.failed();
        }

        self.last_error.record(result)
    }

    fn execute_inner(&mut self, logger: &mut StmtLogger) -> Result<()> {
        // a failed execution leaves nothing to fetch
        self.rows.clear();
        self.executed = false;

        let arguments = self.params.take_arguments()?;

        let query: MySqlQuery<'_> = arguments
            .into_iter()
            .fold(sqlx::query(&self.sql), |query, arg| arg.bind(query));

        let link = &mut *self.link;

        if self.field_names.is_empty() {
            let done = link.rt.block_on(query.execute(&mut link.conn))?;

            self.affected_rows = done.rows_affected();
            self.insert_id = done.last_insert_id();
            self.num_rows = 0;

            logger.rows_affected(self.affected_rows);
        } else {
            let rows = link.rt.block_on(query.fetch_all(&mut link.conn))?;
            let set = ResultSet::from_rows(Some(self.field_names.clone()), &rows)?;

            self.num_rows = set.num_rows();
            self.affected_rows = self.num_rows as u64;
            self.insert_id = 0;
            self.rows = set.collect();

            logger.rows_returned(self.affected_rows);
        }

        self.executed = true;

        Ok(())
    }

    /// Declares `count` result slots, one per column of the result set.
    ///
    /// The slots read as [`Value::Null`] until the first successful [`fetch`][Stmt::fetch].
    pub fn bind_result(&mut self, count: usize) -> Result<()> {
        let result = if count == self.field_names.len() {
            self.results = vec![Value::Null; count];
            Ok(())
        } else {
            Err(Error::from(ClientError::FieldCountMismatch {
                expected: self.field_names.len(),
                actual: count,
            }))
        };

        self.last_error.record(result)
    }

    /// Copies the next buffered row into the result slots.
    ///
    /// Returns `false` once every row has been fetched; the slots keep their last values.
    pub fn fetch(&mut self) -> Result<bool> {
        let result = if self.field_names.is_empty() {
            Err(Error::from(ClientError::NoResultSet))
        } else if !self.executed {
            Err(Error::from(ClientError::CommandsOutOfSync))
        } else {
            Ok(match self.rows.pop_front() {
                Some(row) => {
                    self.results = row;
                    true
                }

                None => false,
            })
        };

        if let Ok(fetched) = result {
            tracing::trace!(target: TARGET, fetched, remaining = self.rows.len(), "fetch");
        }

        self.last_error.record(result)
    }

    /// The value of result slot `index` (zero-based).
    pub fn result(&self, index: usize) -> Option<&Value> {
        self.results.get(index)
    }

    /// All result slots, in column order.
    pub fn results(&self) -> &[Value] {
        &self.results
    }

    /// Discards pending long data and any unfetched rows.
    ///
    /// Bound values are kept.
    pub fn reset(&mut self) {
        self.params.clear_long_data();
        self.rows.clear();
        self.executed = false;
        self.last_error.clear();
    }

    pub fn param_count(&self) -> usize {
        self.params.count()
    }

    pub fn field_count(&self) -> usize {
        self.field_names.len()
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Number of rows in the result set of the last execution.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    pub fn insert_id(&self) -> u64 {
        self.insert_id
    }

    /// Error number of the most recent call on this statement, or `0`.
    pub fn errno(&self) -> u16 {
        self.last_error.errno
    }

    /// Error message of the most recent call on this statement, or `""`.
    pub fn error(&self) -> &str {
        &self.last_error.error
    }

    pub fn sqlstate(&self) -> &str {
        &self.last_error.sqlstate
    }

    /// Closes the statement and releases the connection borrow.
    ///
    /// The server-side statement stays in the connection's statement cache and is
    /// reused if the same SQL is prepared again.
    pub fn close(self) {
        tracing::trace!(
            target: TARGET,
            summary = crate::logger::parse_query_summary(&self.sql),
            "statement closed"
        );
    }
}
