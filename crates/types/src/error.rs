use thiserror::Error;

/// Errors raised while constructing, decoding, or resolving a relative time expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelativeTimeError {
    /// Malformed legacy string, time-of-day, or numeric attribute.
    #[error("{0}")]
    InvalidArgument(String),

    /// The `type` discriminator names a variant that does not exist.
    #[error("unsupported relative time type '{0}'; expected 'after' or 'next'")]
    UnsupportedDiscriminator(String),

    /// `resolve` was called on an expression whose `valid()` check fails.
    #[error("relative time '{0}' is not valid and cannot be resolved")]
    Invalid(String),

    /// Calendar arithmetic left the representable date range.
    #[error("relative time '{0}' resolves outside the supported date range")]
    OutOfRange(String),
}
