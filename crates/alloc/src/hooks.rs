//! Allocation hook pairs
//!
//! A hook pair is two plain function pointers, one allocating and one
//! releasing. [`AllocHooks`] is the value form of that pair: it can be
//! injected into host code directly, or installed process-wide through the
//! [`registry`](crate::registry).
//!
//! ```rust
//! use core::ptr::NonNull;
//! use meshnav_alloc::{AllocHint, AllocHooks, RawAllocator, system_alloc, system_free};
//!
//! fn scratch_alloc(size: usize, hint: AllocHint) -> Option<NonNull<u8>> {
//!     // route Temporary requests to a scratch pool here
//!     system_alloc(size, hint)
//! }
//!
//! let hooks = AllocHooks::new(scratch_alloc, system_free);
//! let block = hooks.allocate(64, AllocHint::Temporary).unwrap();
//! unsafe { hooks.deallocate(block) };
//! ```

use core::fmt;
use core::ptr::{self, NonNull};

use crate::hint::AllocHint;
use crate::system::{system_alloc, system_free};
use crate::traits::RawAllocator;

/// An allocation hook
///
/// Returns a block of at least `size` bytes aligned to
/// [`BLOCK_ALIGN`](crate::BLOCK_ALIGN), or `None` without retrying.
pub type AllocFn = fn(size: usize, hint: AllocHint) -> Option<NonNull<u8>>;

/// A release hook
///
/// Only ever called with non-null blocks produced by the matching
/// [`AllocFn`].
pub type FreeFn = unsafe fn(ptr: NonNull<u8>);

/// A matched allocate/release pair
#[derive(Clone, Copy)]
pub struct AllocHooks {
    alloc: AllocFn,
    free: FreeFn,
}

impl AllocHooks {
    /// The built-in default pair
    pub const SYSTEM: Self = Self::new(system_alloc, system_free);

    /// Creates a pair from two hooks
    ///
    /// `free` must accept every block `alloc` produces.
    #[inline]
    pub const fn new(alloc: AllocFn, free: FreeFn) -> Self {
        Self { alloc, free }
    }

    /// Creates a pair where a missing half falls back to the system default
    #[inline]
    pub fn from_parts(alloc: Option<AllocFn>, free: Option<FreeFn>) -> Self {
        Self {
            alloc: alloc.unwrap_or(Self::SYSTEM.alloc),
            free: free.unwrap_or(Self::SYSTEM.free),
        }
    }

    /// The allocation hook
    #[inline]
    pub const fn alloc_fn(&self) -> AllocFn {
        self.alloc
    }

    /// The release hook
    #[inline]
    pub const fn free_fn(&self) -> FreeFn {
        self.free
    }

    /// Returns `true` if the allocation half is the system default
    pub fn is_system_alloc(&self) -> bool {
        ptr::fn_addr_eq(self.alloc, Self::SYSTEM.alloc)
    }

    /// Returns `true` if the release half is the system default
    pub fn is_system_free(&self) -> bool {
        ptr::fn_addr_eq(self.free, Self::SYSTEM.free)
    }

    /// Returns `true` if both halves are the system default
    pub fn is_system(&self) -> bool {
        self.is_system_alloc() && self.is_system_free()
    }
}

impl Default for AllocHooks {
    fn default() -> Self {
        Self::SYSTEM
    }
}

impl PartialEq for AllocHooks {
    fn eq(&self, other: &Self) -> bool {
        ptr::fn_addr_eq(self.alloc, other.alloc) && ptr::fn_addr_eq(self.free, other.free)
    }
}

impl Eq for AllocHooks {}

impl fmt::Debug for AllocHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocHooks")
            .field("alloc", &(self.alloc as *const ()))
            .field("free", &(self.free as *const ()))
            .field("system", &self.is_system())
            .finish()
    }
}

// SAFETY: the hooks carry the block contract themselves; a custom pair's
// author accepts it by constructing the pair.
unsafe impl RawAllocator for AllocHooks {
    #[inline]
    fn allocate(&self, size: usize, hint: AllocHint) -> Option<NonNull<u8>> {
        (self.alloc)(size, hint)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>) {
        unsafe { (self.free)(ptr) }
    }
}
