//! Owned, zero-initialised blocks
//!
//! [`ScopedBlock`] keeps a block together with the allocator that produced
//! it and releases it there on drop, so the block can never be handed to
//! the wrong release hook by accident.
//!
//! [`ScopedBlock::new`] snapshots the registry's active pair when it
//! allocates. Reconfiguring the registry while the block is alive does not
//! change where it is released.

use core::fmt;
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};
use core::slice;

use crate::error::AllocResult;
use crate::hint::AllocHint;
use crate::hooks::AllocHooks;
use crate::registry;
use crate::traits::RawAllocator;

/// A block released on drop through the allocator that produced it
///
/// Contents are zero-filled on creation, which is what makes the safe slice
/// views sound.
///
/// # Examples
///
/// ```rust
/// use meshnav_alloc::{AllocHint, ScopedBlock};
///
/// let mut scratch = ScopedBlock::new(256, AllocHint::Temporary)?;
/// scratch[0] = 7;
/// assert_eq!(scratch.len(), 256);
/// // released through the hooks that were active at allocation
/// # Ok::<(), meshnav_alloc::AllocError>(())
/// ```
pub struct ScopedBlock<A: RawAllocator = AllocHooks> {
    ptr: NonNull<u8>,
    len: usize,
    hint: AllocHint,
    alloc: A,
}

impl ScopedBlock<AllocHooks> {
    /// Allocates a zeroed block through the process-wide hooks
    ///
    /// The pair active at this call is kept with the block and releases it.
    pub fn new(len: usize, hint: AllocHint) -> AllocResult<Self> {
        Self::new_in(len, hint, registry::capture())
    }
}

impl<A: RawAllocator> ScopedBlock<A> {
    /// Allocates a zeroed block from `alloc`
    pub fn new_in(len: usize, hint: AllocHint, alloc: A) -> AllocResult<Self> {
        let ptr = alloc.try_allocate(len, hint)?;
        // SAFETY: the allocator contract gives us `len` writable bytes.
        unsafe { ptr::write_bytes(ptr.as_ptr(), 0, len) };
        Ok(Self {
            ptr,
            len,
            hint,
            alloc,
        })
    }

    /// Requested size in bytes
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` for a zero-byte block
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Hint the block was allocated with
    #[inline]
    pub const fn hint(&self) -> AllocHint {
        self.hint
    }

    /// The allocator that will release the block
    #[inline]
    pub const fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Start of the block
    #[inline]
    pub const fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Start of the block, writable
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Gives up ownership without releasing the block
    ///
    /// The caller becomes responsible for passing the pointer to
    /// `deallocate` on the returned allocator.
    pub fn into_raw(self) -> (NonNull<u8>, A) {
        let this = core::mem::ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so `alloc` is moved out exactly once.
        let alloc = unsafe { ptr::read(&this.alloc) };
        (this.ptr, alloc)
    }
}

impl<A: RawAllocator> Deref for ScopedBlock<A> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        // SAFETY: `len` bytes were zero-initialised and are owned by self.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<A: RawAllocator> DerefMut for ScopedBlock<A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [u8] {
        // SAFETY: as in `deref`, and `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<A: RawAllocator> Drop for ScopedBlock<A> {
    fn drop(&mut self) {
        // SAFETY: the block came from `self.alloc` and is released once.
        unsafe { self.alloc.deallocate(self.ptr) }
    }
}

impl<A: RawAllocator> fmt::Debug for ScopedBlock<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedBlock")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("hint", &self.hint)
            .finish_non_exhaustive()
    }
}

// SAFETY: the block is uniquely owned; moving it across threads is sound
// whenever the allocator that will release it can move too.
unsafe impl<A: RawAllocator + Send> Send for ScopedBlock<A> {}
// SAFETY: shared access only hands out `&[u8]`.
unsafe impl<A: RawAllocator + Sync> Sync for ScopedBlock<A> {}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;
    use crate::system::SystemAllocator;

    /// Counts releases, delegating storage to the system allocator
    #[derive(Default)]
    struct CountingRelease {
        released: Cell<usize>,
    }

    unsafe impl RawAllocator for CountingRelease {
        fn allocate(&self, size: usize, hint: AllocHint) -> Option<NonNull<u8>> {
            SystemAllocator::new().allocate(size, hint)
        }

        unsafe fn deallocate(&self, ptr: NonNull<u8>) {
            self.released.set(self.released.get() + 1);
            unsafe { SystemAllocator::new().deallocate(ptr) }
        }
    }

    #[test]
    fn contents_start_zeroed() {
        let block = ScopedBlock::new_in(128, AllocHint::Permanent, SystemAllocator::new()).unwrap();
        assert_eq!(block.len(), 128);
        assert!(block.iter().all(|&b| b == 0));
    }

    #[test]
    fn drop_releases_through_owning_allocator() {
        let counter = CountingRelease::default();
        {
            let mut block = ScopedBlock::new_in(16, AllocHint::Temporary, &counter).unwrap();
            block[15] = 0xFF;
            assert_eq!(block.hint(), AllocHint::Temporary);
        }
        assert_eq!(counter.released.get(), 1);
    }

    #[test]
    fn into_raw_skips_release() {
        let counter = CountingRelease::default();
        let block = ScopedBlock::new_in(8, AllocHint::Permanent, &counter).unwrap();
        let (ptr, alloc) = block.into_raw();
        assert_eq!(counter.released.get(), 0);

        unsafe { alloc.deallocate(ptr) };
        assert_eq!(counter.released.get(), 1);
    }

    #[test]
    fn empty_block_is_valid() {
        let block = ScopedBlock::new_in(0, AllocHint::Temporary, SystemAllocator::new()).unwrap();
        assert!(block.is_empty());
        assert!(!block.as_ptr().is_null());
    }

    #[test]
    fn exhaustion_is_an_error() {
        let limited =
            SystemAllocator::with_config(crate::SystemConfig::constrained(64)).unwrap();
        let err = ScopedBlock::new_in(65, AllocHint::Permanent, limited).unwrap_err();
        assert!(err.is_exhausted());
    }

    #[test]
    fn global_block_round_trips() {
        let mut block = ScopedBlock::new(1024, AllocHint::Temporary).unwrap();
        block.fill(0xAB);
        assert_eq!(block[1023], 0xAB);
        assert!(block.allocator().is_system());
    }
}
