use thiserror::Error;

/// Faults observed at the transport seam.
///
/// These never stop the driver: the exchange that produced one is treated as
/// a rejected command. They are kept for logging and statistics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("transport timeout")]
    Timeout,
    #[error("transport fault: {0}")]
    Transport(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing peripheral")]
    MissingPeripheral,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
