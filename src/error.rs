/// Problems confined to a single source row. The row is skipped and the run continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("row has no value for column {column}")]
    MissingValue { column: &'static str },

    #[error("column {column} is not valid UTF-8")]
    InvalidUtf8 { column: &'static str },

    #[error("column {column} is not an integer: {value:?}")]
    InvalidInteger { column: &'static str, value: String },
}

pub type RowResult<T> = Result<T, RowError>;
