//! The crate-wide [`Error`] trait and [`BoxedError`].
//!
//! Every error surfaced by this library implements [`Error`], which adds a
//! retry hint on top of [`std::error::Error`]. The library itself never
//! retries; the hint is for the calling layer.

use std::convert::Infallible;

use snafu::{AsErrorSource, Snafu};

/// Errors that may occur in the library.
pub trait Error: std::error::Error + AsErrorSource + Send + Sync + 'static {
    /// If true, a failed request may succeed if it is attempted again.
    fn is_retryable(&self) -> bool;
}

impl Error for Infallible {
    fn is_retryable(&self) -> bool {
        false
    }
}

/// A type-erased [`Error`], used where transport errors cross into the
/// non-generic error types of this crate.
#[derive(Debug, Snafu)]
#[snafu(transparent)]
pub struct BoxedError {
    source: Box<dyn Error>,
}

impl BoxedError {
    /// Boxes a concrete error.
    pub fn from_err<E: Error>(err: E) -> Self {
        Self {
            source: Box::new(err),
        }
    }
}

impl Error for BoxedError {
    fn is_retryable(&self) -> bool {
        self.source.is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use snafu::Snafu;

    use super::*;

    #[derive(Debug, Snafu)]
    enum Transport {
        #[snafu(display("flaky"))]
        Flaky,
    }

    impl Error for Transport {
        fn is_retryable(&self) -> bool {
            true
        }
    }

    #[test]
    fn boxed_error_keeps_retry_hint_and_message() {
        let boxed = BoxedError::from_err(Transport::Flaky);
        assert!(boxed.is_retryable());
        assert_eq!(boxed.to_string(), "flaky");
    }
}
