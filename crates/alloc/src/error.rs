//! Allocation error types
//!
//! The raw forwarding calls report failure as `None`. [`AllocError`] is the
//! typed form used by the `try_*` helpers and by config validation, so host
//! code can propagate out-of-memory upward with `?`.

use thiserror::Error;

use crate::hint::AllocHint;

/// Result type for allocation operations
pub type AllocResult<T> = Result<T, AllocError>;

/// Errors reported by the allocation layer
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AllocError {
    /// The active allocator could not satisfy the request
    #[error("allocation of {size} bytes ({hint}) could not be satisfied")]
    Exhausted {
        /// Requested size in bytes
        size: usize,
        /// Hint passed with the request
        hint: AllocHint,
    },

    /// `count * elem_size` does not fit in `usize`
    #[error("array of {count} elements of {elem_size} bytes overflows the address space")]
    SizeOverflow {
        /// Number of elements requested
        count: usize,
        /// Size of one element in bytes
        elem_size: usize,
    },

    /// The element type needs stronger alignment than blocks guarantee
    #[error("alignment {align} exceeds the guaranteed block alignment {max}")]
    UnsupportedAlignment {
        /// Alignment required by the type
        align: usize,
        /// Alignment every block is guaranteed to have
        max: usize,
    },

    /// Allocator configuration is invalid
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

impl AllocError {
    /// Returns `true` if this error means the allocator ran out of memory
    #[inline]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_message_names_size_and_hint() {
        let err = AllocError::Exhausted {
            size: 16,
            hint: AllocHint::Permanent,
        };
        assert_eq!(
            err.to_string(),
            "allocation of 16 bytes (permanent) could not be satisfied"
        );
        assert!(err.is_exhausted());
    }

    #[test]
    fn config_error_is_not_exhaustion() {
        let err = AllocError::InvalidConfig("max_allocation_size cannot be zero");
        assert!(!err.is_exhausted());
        assert!(err.to_string().contains("cannot be zero"));
    }
}
