/// Misuse of a statement handle, detected before anything is sent to the server.
///
/// Error numbers and messages follow libmysqlclient where an equivalent exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The call is not valid in the handle's current state (e.g. `fetch` before `execute`).
    #[error("Commands out of sync; you can't run this command now")]
    CommandsOutOfSync,

    /// `execute` or `send_long_data` was called before `bind_param`.
    #[error("No data supplied for parameters in prepared statement")]
    ParamsNotBound,

    /// A parameter index is not below the statement's parameter count.
    #[error("Invalid parameter number")]
    InvalidParameterNumber,

    /// A type string contains a character other than `i`, `d`, `s` or `b`.
    #[error("Using unsupported buffer type: '{}'", .0.escape_default())]
    UnsupportedParamType(char),

    /// The type string, the values and the placeholders disagree in number.
    #[error(
        "Number of variables doesn't match number of parameters in prepared statement \
         (expected {expected}, got {actual})"
    )]
    ParamCountMismatch { expected: usize, actual: usize },

    /// `bind_result` was given a different number of slots than the statement has columns.
    #[error(
        "Number of bind variables doesn't match number of fields in prepared statement \
         (expected {expected}, got {actual})"
    )]
    FieldCountMismatch { expected: usize, actual: usize },

    /// `fetch` was called on a statement that does not produce a result set.
    #[error("Attempt to read a row while there is no result set associated with the statement")]
    NoResultSet,
}

impl ClientError {
    pub fn errno(&self) -> u16 {
        match self {
            Self::CommandsOutOfSync => 2014,
            Self::ParamsNotBound => 2031,
            Self::InvalidParameterNumber => 2034,
            Self::UnsupportedParamType(_) => 2036,
            Self::NoResultSet => 2053,
            Self::ParamCountMismatch { .. } | Self::FieldCountMismatch { .. } => 2000,
        }
    }
}

#[test]
fn it_uses_libmysqlclient_numbers() {
    assert_eq!(ClientError::CommandsOutOfSync.errno(), 2014);
    assert_eq!(ClientError::ParamsNotBound.errno(), 2031);
    assert_eq!(ClientError::InvalidParameterNumber.errno(), 2034);
    assert_eq!(ClientError::UnsupportedParamType('x').errno(), 2036);
    assert_eq!(ClientError::NoResultSet.errno(), 2053);
}

#[test]
fn it_reports_counts_on_mismatch() {
    let err = ClientError::ParamCountMismatch {
        expected: 2,
        actual: 3,
    };

    assert!(err.to_string().ends_with("(expected 2, got 3)"));
}

#[test]
fn it_uses_libmysqlclient_messages() {
    assert_eq!(
        ClientError::CommandsOutOfSync.to_string(),
        "Commands out of sync; you can't run this command now"
    );
    assert_eq!(
        ClientError::UnsupportedParamType('x').to_string(),
        "Using unsupported buffer type: 'x'"
    );
    assert_eq!(
        ClientError::UnsupportedParamType('\n').to_string(),
        "Using unsupported buffer type: '\\n'"
    );
}
