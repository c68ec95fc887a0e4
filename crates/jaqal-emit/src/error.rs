//! Error types for the Jaqal emitter.

use thiserror::Error;

/// Errors that can occur while writing Jaqal source.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EmitError {
    /// A constant or gate argument is NaN or infinite.
    #[error("Cannot emit non-finite number {value} in {context}")]
    NonFiniteNumber {
        /// The offending value.
        value: f64,
        /// Where it was found.
        context: String,
    },

    /// A mapped register selects source indices that no Jaqal slice describes.
    #[error("Mapped register '{0}' selects indices that cannot be written as a slice")]
    UnsupportedSelection(String),
}

/// Result type for emitter operations.
pub type EmitResult<T> = Result<T, EmitError>;
