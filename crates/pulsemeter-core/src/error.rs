//! Shared error type across pulsemeter crates.

use thiserror::Error;

/// Stable machine-readable error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Counter increment with a negative (or NaN) delta.
    NegativeIncrement,
    /// Label-value tuple length does not match the descriptor arity.
    LabelArityMismatch,
    /// Quantile or rank-error target outside the open interval (0, 1).
    InvalidQuantileTarget,
    /// Malformed metric descriptor (empty name, bad charset, duplicate labels).
    InvalidDescriptor,
    /// A metric with the same name is already registered.
    AlreadyRegistered,
    /// Invalid configuration.
    Config,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NegativeIncrement => "NEGATIVE_INCREMENT",
            ErrorCode::LabelArityMismatch => "LABEL_ARITY_MISMATCH",
            ErrorCode::InvalidQuantileTarget => "INVALID_QUANTILE_TARGET",
            ErrorCode::InvalidDescriptor => "INVALID_DESCRIPTOR",
            ErrorCode::AlreadyRegistered => "ALREADY_REGISTERED",
            ErrorCode::Config => "CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, PulseError>;

/// Unified error type used by core and exporter.
///
/// Every variant is a synchronous programmer-contract violation. The core
/// performs no I/O, so nothing here is transient or retryable; an error means
/// the calling code is wrong, not that the environment misbehaved.
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("counter increment must be non-negative, got {0}")]
    NegativeIncrement(f64),
    #[error("expected {expected} label values, got {got}")]
    LabelArityMismatch { expected: usize, got: usize },
    #[error("invalid quantile target: {0}")]
    InvalidQuantileTarget(String),
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("metric already registered: {0}")]
    AlreadyRegistered(String),
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl PulseError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            PulseError::NegativeIncrement(_) => ErrorCode::NegativeIncrement,
            PulseError::LabelArityMismatch { .. } => ErrorCode::LabelArityMismatch,
            PulseError::InvalidQuantileTarget(_) => ErrorCode::InvalidQuantileTarget,
            PulseError::InvalidDescriptor(_) => ErrorCode::InvalidDescriptor,
            PulseError::AlreadyRegistered(_) => ErrorCode::AlreadyRegistered,
            PulseError::Config(_) => ErrorCode::Config,
            PulseError::Internal(_) => ErrorCode::Internal,
        }
    }
}
