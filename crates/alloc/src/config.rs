//! Configuration for the system allocator
//!
//! Follows the preset-plus-validate pattern: start from [`SystemConfig::new`],
//! [`SystemConfig::debug`] or [`SystemConfig::constrained`], adjust with the
//! `with_*` builders, then hand it to
//! [`SystemAllocator::with_config`](crate::SystemAllocator::with_config),
//! which validates it.

#[cfg(feature = "logging")]
use tracing::warn;

use crate::error::{AllocError, AllocResult};
use crate::traits::BLOCK_ALIGN;

/// Largest request the system allocator can ever satisfy: the block plus
/// its size header must fit in `isize::MAX`.
pub const MAX_SYSTEM_ALLOCATION: usize = isize::MAX as usize - BLOCK_ALIGN;

/// Tuning for [`SystemAllocator`](crate::SystemAllocator)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SystemConfig {
    /// Requests above this many bytes fail immediately with `None`
    pub max_allocation_size: usize,
    /// Zero-fill every block before handing it out
    pub zero_memory: bool,
}

impl SystemConfig {
    /// Default configuration: no limit beyond the platform's, no zeroing
    pub const fn new() -> Self {
        Self {
            max_allocation_size: MAX_SYSTEM_ALLOCATION,
            zero_memory: false,
        }
    }

    /// Debug configuration: zero-filled blocks make reads of
    /// never-written memory deterministic
    pub const fn debug() -> Self {
        Self {
            max_allocation_size: MAX_SYSTEM_ALLOCATION,
            zero_memory: true,
        }
    }

    /// Configuration with a hard per-request ceiling
    pub const fn constrained(max_allocation_size: usize) -> Self {
        Self {
            max_allocation_size,
            zero_memory: false,
        }
    }

    /// Sets the per-request ceiling
    pub const fn with_max_allocation_size(mut self, max_allocation_size: usize) -> Self {
        self.max_allocation_size = max_allocation_size;
        self
    }

    /// Enables or disables zero-filling
    pub const fn with_zero_memory(mut self, zero_memory: bool) -> Self {
        self.zero_memory = zero_memory;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> AllocResult<()> {
        if self.max_allocation_size == 0 {
            return Err(AllocError::InvalidConfig(
                "max_allocation_size cannot be zero",
            ));
        }

        if self.max_allocation_size > MAX_SYSTEM_ALLOCATION {
            return Err(AllocError::InvalidConfig(
                "max_allocation_size exceeds the platform maximum",
            ));
        }

        #[cfg(feature = "logging")]
        if !self.max_allocation_size.is_power_of_two()
            && self.max_allocation_size != MAX_SYSTEM_ALLOCATION
        {
            warn!(
                max_allocation_size = self.max_allocation_size,
                "max_allocation_size is not a power of two"
            );
        }

        Ok(())
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        assert!(SystemConfig::new().validate().is_ok());
        assert!(SystemConfig::debug().validate().is_ok());
        assert!(SystemConfig::constrained(4096).validate().is_ok());
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = SystemConfig::constrained(0).validate().unwrap_err();
        assert_eq!(
            err,
            AllocError::InvalidConfig("max_allocation_size cannot be zero")
        );
    }

    #[test]
    fn limit_above_platform_maximum_is_rejected() {
        let config = SystemConfig::new().with_max_allocation_size(usize::MAX);
        assert!(matches!(
            config.validate(),
            Err(AllocError::InvalidConfig(_))
        ));
    }

    #[test]
    fn builders_compose() {
        let config = SystemConfig::new()
            .with_zero_memory(true)
            .with_max_allocation_size(1 << 20);
        assert!(config.zero_memory);
        assert_eq!(config.max_allocation_size, 1 << 20);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: SystemConfig = serde_json::from_str(r#"{"zero_memory": true}"#).unwrap();
        assert!(config.zero_memory);
        assert_eq!(config.max_allocation_size, MAX_SYSTEM_ALLOCATION);
    }
}
