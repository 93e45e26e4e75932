use std::collections::VecDeque;

use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row};

use crate::error::Result;
use crate::value::{decode_row, Value};

/// The outcome of [`Link::query`][crate::Link::query].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// The statement produced a result set.
    Rows(ResultSet),
    /// The statement did not produce a result set.
    Done { affected_rows: u64, insert_id: u64 },
}

impl QueryResult {
    pub fn into_result_set(self) -> Option<ResultSet> {
        match self {
            QueryResult::Rows(rows) => Some(rows),
            QueryResult::Done { .. } => None,
        }
    }
}

/// A fully buffered result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    field_names: Vec<String>,
    rows: VecDeque<Vec<Value>>,
    num_rows: usize,
}

impl ResultSet {
    pub(crate) fn new(field_names: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            field_names,
            num_rows: rows.len(),
            rows: rows.into(),
        }
    }

    pub(crate) fn from_rows(field_names: Option<Vec<String>>, rows: &[MySqlRow]) -> Result<Self> {
        // without a row there is nothing to read the column names from
        let field_names = field_names.unwrap_or_else(|| {
            rows.first()
                .map(|row| row.columns().iter().map(|c| c.name().to_owned()).collect())
                .unwrap_or_default()
        });

        let rows = rows.iter().map(decode_row).collect::<Result<Vec<_>>>()?;

        Ok(Self::new(field_names, rows))
    }

    /// Number of rows in the set, fetched or not.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn field_count(&self) -> usize {
        self.field_names.len()
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Returns the next row, or `None` once every row has been fetched.
    pub fn fetch_row(&mut self) -> Option<Vec<Value>> {
        self.rows.pop_front()
    }

    /// Returns the next row as `(column name, value)` pairs.
    pub fn fetch_assoc(&mut self) -> Option<Vec<(String, Value)>> {
        let row = self.fetch_row()?;

        Some(self.field_names.iter().cloned().zip(row).collect())
    }
}

impl Iterator for ResultSet {
    type Item = Vec<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.fetch_row()
    }
}

#[test]
fn it_fetches_rows_in_order() {
    let mut set = ResultSet::new(
        vec!["c1".into(), "c2".into()],
        vec![
            vec![Value::from("a"), Value::Int(1)],
            vec![Value::from("b"), Value::Int(2)],
        ],
    );

    assert_eq!(set.num_rows(), 2);
    assert_eq!(set.field_count(), 2);

    assert_eq!(
        set.fetch_assoc(),
        Some(vec![
            ("c1".to_owned(), Value::from("a")),
            ("c2".to_owned(), Value::Int(1))
        ])
    );
    assert_eq!(set.fetch_row(), Some(vec![Value::from("b"), Value::Int(2)]));
    assert_eq!(set.fetch_row(), None);

    // the row count describes the whole set
    assert_eq!(set.num_rows(), 2);
}
