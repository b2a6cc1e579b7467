use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("invalid havoc window `{0}`: expected START..END or TICK")]
    InvalidWindow(String),
    #[error("empty havoc window `{0}`: end must be greater than start")]
    EmptyWindow(String),
    #[error("invalid havoc burst: length {length} must be in 1..{period}")]
    InvalidBurst { period: u64, length: u64 },
}

pub type Result<T> = std::result::Result<T, SimError>;
