use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("the order of the B-tree must be at least 3, but was {0}")]
    OrderTooSmall(usize),
    #[error("invalid range: maximum {max} is smaller than minimum {min}")]
    InvalidRange { min: String, max: String },
    #[error("the maximum number of log entries must be at least 1, but was {0}")]
    InvalidCapacity(usize),
    #[error("NaN can not be used as key")]
    NanKey,
    #[error("B-tree structure is corrupted: {0}")]
    StructuralCorruption(String),
}
