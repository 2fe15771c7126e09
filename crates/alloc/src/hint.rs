//! Allocation lifetime hints
//!
//! Every request carries an [`AllocHint`] describing how long the caller
//! expects to keep the block. The hint is advisory: the system allocator
//! ignores it, while a custom allocator may route `Temporary` requests to a
//! scratch region and `Permanent` ones to longer-lived storage.

use core::fmt;

/// Expected lifetime of an allocation
///
/// The set of hints may grow, so matches outside this crate need a wildcard
/// arm. Unknown hints should be treated like [`AllocHint::Permanent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[non_exhaustive]
pub enum AllocHint {
    /// Memory outlives the current call and is released explicitly later.
    #[default]
    Permanent,
    /// Memory is released before the current operation completes.
    Temporary,
}

impl AllocHint {
    /// All hints known to this version of the crate
    pub const ALL: [Self; 2] = [Self::Permanent, Self::Temporary];

    /// Returns `true` for [`AllocHint::Temporary`]
    #[inline]
    pub const fn is_temporary(self) -> bool {
        matches!(self, Self::Temporary)
    }

    /// Stable lowercase name, as used in logs and config files
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Permanent => "permanent",
            Self::Temporary => "temporary",
        }
    }
}

impl fmt::Display for AllocHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_permanent() {
        assert_eq!(AllocHint::default(), AllocHint::Permanent);
        assert!(!AllocHint::default().is_temporary());
    }

    #[test]
    fn display_matches_as_str() {
        for hint in AllocHint::ALL {
            assert_eq!(hint.to_string(), hint.as_str());
        }
        assert_eq!(AllocHint::Temporary.to_string(), "temporary");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&AllocHint::Temporary).unwrap();
        assert_eq!(json, "\"temporary\"");

        let hint: AllocHint = serde_json::from_str("\"permanent\"").unwrap();
        assert_eq!(hint, AllocHint::Permanent);
    }
}
