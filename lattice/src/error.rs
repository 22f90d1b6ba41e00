//! Error taxonomy shared by every classifier in the crate.

use thiserror::Error;

/// Errors raised by divisor parsing, basis construction and classification.
///
/// All variants except [`LatticeError::Format`], [`LatticeError::Cache`] and
/// [`LatticeError::Config`] signal a broken internal invariant. They abort the
/// classification call that raised them; no partial result is returned.
#[derive(Debug, Error)]
pub enum LatticeError {
    /// A label string does not match the divisor label grammar.
    #[error("cannot parse divisor label '{label}': {reason}")]
    Format {
        /// The offending label.
        label: String,
        /// Why the label was rejected.
        reason: String,
    },

    /// A basis completion or basis change produced a degenerate result.
    #[error("degenerate basis: {0}")]
    DegenerateBasis(String),

    /// No Dynkin catalog entry matches the intersection graph of a root basis.
    #[error("unrecognized Dynkin type for root basis [{0}]")]
    UnrecognizedType(String),

    /// An involution does not preserve a class or set it is required to preserve.
    #[error("involution does not preserve {0}")]
    Preservation(String),

    /// Reading, writing or decoding the memoization cache failed.
    #[error("cache error: {0}")]
    Cache(String),

    /// A classifier configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LatticeError {
    pub(crate) fn format(label: &str, reason: impl Into<String>) -> Self {
        Self::Format {
            label: label.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LatticeError>;
