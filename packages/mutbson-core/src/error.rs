use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("illegal operation: {0}")]
    IllegalOperation(String),
    #[error("empty array operation: {0}")]
    EmptyArrayOperation(String),
    #[error("internal error: {0}")]
    InternalError(String),
    #[error("bad value: {0}")]
    BadValue(String),
}
