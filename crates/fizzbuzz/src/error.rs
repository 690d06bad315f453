//! Error types for range validation.
//!
//! Validation is the only fallible step of an evaluation. Once a [`Range`]
//! has been constructed, evaluating it cannot fail; an elapsed deadline only
//! leaves slots empty.
//!
//! ## Error Cases
//! - `InvalidInput`: a bound is missing, is not an integer, or `from > to`.
//! - `RangeTooLarge`: the range holds more numbers than the configured cap.
//!
//! [`Range`]: crate::Range

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that range validation can emit.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A bound was missing or malformed, or the bounds were reversed.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The inclusive range spans more numbers than allowed.
    #[error("Range of {size} numbers exceeds maximum allowed ({max})")]
    RangeTooLarge { size: u128, max: usize },
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}
