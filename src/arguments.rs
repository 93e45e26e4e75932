use std::collections::HashMap;

use sqlx::mysql::{MySql, MySqlArguments};
use sqlx::query::Query;

use crate::error::ClientError;
use crate::value::Value;

pub(crate) type MySqlQuery<'q> = Query<'q, MySql, MySqlArguments>;

/// The declared type of one placeholder, as given by one character of a type string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// `i`: the value is sent as a 64-bit integer.
    Integer,
    /// `d`: the value is sent as a double.
    Double,
    /// `s`: the value is sent as a string.
    String,
    /// `b`: the value is sent as binary data; usually supplied through long data.
    Blob,
}

impl ParamType {
    pub fn from_char(ty: char) -> Option<Self> {
        match ty {
            'i' => Some(Self::Integer),
            'd' => Some(Self::Double),
            's' => Some(Self::String),
            'b' => Some(Self::Blob),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Integer => 'i',
            Self::Double => 'd',
            Self::String => 's',
            Self::Blob => 'b',
        }
    }
}

/// Parses a type string such as `"sb"` into one [`ParamType`] per placeholder.
pub fn parse_type_spec(spec: &str) -> Result<Vec<ParamType>, ClientError> {
    spec.chars()
        .map(|ty| ParamType::from_char(ty).ok_or(ClientError::UnsupportedParamType(ty)))
        .collect()
}

/// A bound value after coercion to its declared type; what is actually sent on execute.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Param {
    Null,
    Int(i64),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Param {
    fn coerce(ty: ParamType, value: &Value) -> Self {
        if value.is_null() {
            return Param::Null;
        }

        match ty {
            ParamType::Integer => Param::Int(to_i64(value)),
            ParamType::Double => Param::Double(to_f64(value)),

            ParamType::String => match value {
                Value::Bytes(bytes) => match std::str::from_utf8(bytes) {
                    Ok(s) => Param::Text(s.to_owned()),
                    Err(_) => Param::Blob(bytes.clone()),
                },

                other => Param::Text(other.to_string()),
            },

            ParamType::Blob => match value {
                Value::Bytes(bytes) => Param::Blob(bytes.clone()),
                other => Param::Blob(other.to_string().into_bytes()),
            },
        }
    }

    pub(crate) fn bind<'q>(self, query: MySqlQuery<'q>) -> MySqlQuery<'q> {
        match self {
            Param::Null => query.bind(None::<String>),
            Param::Int(v) => query.bind(v),
            Param::Double(v) => query.bind(v),
            Param::Text(v) => query.bind(v),
            Param::Blob(v) => query.bind(v),
        }
    }
}

// Strings that do not hold a number coerce to zero.
#[allow(clippy::cast_possible_truncation)]
fn to_i64(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Int(v) => *v,
        Value::Double(v) => *v as i64,
        Value::String(_) | Value::Bytes(_) => {
            let text = value.to_string();
            let text = text.trim();

            text.parse::<i64>()
                .or_else(|_| text.parse::<f64>().map(|v| v as i64))
                .unwrap_or(0)
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Int(v) => *v as f64,
        Value::Double(v) => *v,
        Value::String(_) | Value::Bytes(_) => value.to_string().trim().parse().unwrap_or(0.0),
    }
}

/// Placeholder bindings of one prepared statement, including pending long data.
#[derive(Debug, Default)]
pub(crate) struct Params {
    count: usize,
    types: Vec<ParamType>,
    values: Vec<Value>,
    bound: bool,
    // chunks appended per parameter index, in call order
    long_data: HashMap<usize, Vec<u8>>,
}

impl Params {
    pub(crate) fn new(count: usize) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    pub(crate) fn bind(&mut self, spec: &str, values: Vec<Value>) -> Result<(), ClientError> {
        let types = parse_type_spec(spec)?;

        if types.len() != values.len() {
            return Err(ClientError::ParamCountMismatch {
                expected: types.len(),
                actual: values.len(),
            });
        }

        if types.len() != self.count {
            return Err(ClientError::ParamCountMismatch {
                expected: self.count,
                actual: types.len(),
            });
        }

        self.types = types;
        self.values = values;
        self.bound = true;

        Ok(())
    }

    pub(crate) fn set(&mut self, index: usize, value: Value) -> Result<(), ClientError> {
        self.check_index(index)?;
        self.values[index] = value;

        Ok(())
    }

    pub(crate) fn append_long_data(&mut self, index: usize, chunk: &[u8]) -> Result<(), ClientError> {
        self.check_index(index)?;
        self.long_data.entry(index).or_default().extend_from_slice(chunk);

        Ok(())
    }

    /// Total number of long-data bytes waiting for the next execute.
    pub(crate) fn pending_long_data(&self) -> usize {
        self.long_data.values().map(Vec::len).sum()
    }

    pub(crate) fn clear_long_data(&mut self) {
        self.long_data.clear();
    }

    /// Coerces every bound value for sending and consumes the pending long data, which
    /// replaces the bound value of its parameter.
    pub(crate) fn take_arguments(&mut self) -> Result<Vec<Param>, ClientError> {
        let mut long_data = std::mem::take(&mut self.long_data);

        if self.count == 0 {
            return Ok(Vec::new());
        }

        if !self.bound {
            return Err(ClientError::ParamsNotBound);
        }

        Ok(self
            .types
            .iter()
            .zip(&self.values)
            .enumerate()
            .map(|(index, (ty, value))| match long_data.remove(&index) {
                Some(data) => Param::Blob(data),
                None => Param::coerce(*ty, value),
            })
            .collect())
    }

    fn check_index(&self, index: usize) -> Result<(), ClientError> {
        if index >= self.count {
            return Err(ClientError::InvalidParameterNumber);
        }

        if !self.bound {
            return Err(ClientError::ParamsNotBound);
        }

        Ok(())
    }
}
