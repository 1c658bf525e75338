//! Error types for the gauntlet engine.
//!
//! Configuration problems are fatal and surface while a challenge is being
//! built. Noisy status snapshots are never errors: the sanitizer drops what it
//! cannot use. The runtime failures are a snapshot that breaks the caller's
//! contract (no `START: success` entry) or input that never parsed into one.

use thiserror::Error;

/// The unified error type for the gauntlet crates.
#[derive(Debug, Error)]
pub enum GauntletError {
    /// A step list or transition row is malformed. Construction is aborted.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    /// A status snapshot violated the caller's precondition.
    ///
    /// Raised when `START` is missing or not `success`, or when status or age
    /// input cannot be parsed into a snapshot at all. Either way the caller
    /// handed over something that is not a snapshot; no step produced it.
    #[error("invalid status snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    /// A challenge or snapshot file could not be read.
    #[error("i/o error: {reason}")]
    Io { reason: String },
}

impl GauntletError {
    /// Shorthand for building a [`GauntletError::Configuration`].
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the gauntlet crates.
pub type GauntletResult<T> = Result<T, GauntletError>;
