// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for tree construction and decoding.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by the bulk loaders and the wire codec.
///
/// Queries never fail with a recoverable error; they either run to
/// completion or are cut short by the visit callback returning `false`.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// `finish` was called with a fanout smaller than 2.
    #[error("degree must be at least 2, got {0}")]
    InvalidDegree(usize),

    /// `finish` was called again on a builder that already produced a tree.
    #[error("finish called more than once")]
    AlreadyFinished,

    /// The byte payload handed to the deserializer is not a valid record.
    #[error("malformed tree payload: {0}")]
    Malformed(&'static str),
}

#[cfg(test)]
mod tests {
    use super::Error;
    use alloc::string::ToString;

    #[test]
    fn display_messages() {
        assert_eq!(
            Error::InvalidDegree(1).to_string(),
            "degree must be at least 2, got 1"
        );
        assert!(
            Error::AlreadyFinished
                .to_string()
                .contains("called more than once")
        );
        assert_eq!(
            Error::Malformed("truncated varint").to_string(),
            "malformed tree payload: truncated varint"
        );
    }
}
