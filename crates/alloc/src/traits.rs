//! The allocator seam
//!
//! [`RawAllocator`] has exactly two capabilities, allocate and deallocate.
//! Unlike `core::alloc::GlobalAlloc` it does not ask for a layout on release:
//! consumers hand back a bare pointer, so every implementation must be able
//! to find the size of a block from the pointer alone.
//!
//! Host code written against `A: RawAllocator` is monomorphised, so the
//! allocator behind it costs nothing beyond the call itself.
//!
//! # Safety
//!
//! Implementors promise that every block returned by `allocate`:
//! - is valid for reads and writes of at least `size` bytes
//! - is aligned to at least [`BLOCK_ALIGN`]
//! - does not overlap any other live block
//! - stays valid until passed to `deallocate` on the same allocator

use core::ptr::NonNull;

use crate::error::{AllocError, AllocResult};
use crate::hint::AllocHint;

/// Minimum alignment of every block, matching what general-purpose
/// allocators guarantee (16 bytes on 64-bit targets).
pub const BLOCK_ALIGN: usize = 2 * size_of::<usize>();

/// Allocation and deallocation of untyped blocks
///
/// # Safety
///
/// See the [module documentation](self) for the contract a block must meet.
pub unsafe trait RawAllocator {
    /// Allocates a block of at least `size` bytes
    ///
    /// Returns `None` if the request cannot be satisfied. Implementations
    /// must not retry, abort or panic on exhaustion. A zero-byte request
    /// either yields a valid block or `None`.
    fn allocate(&self, size: usize, hint: AllocHint) -> Option<NonNull<u8>>;

    /// Releases a block
    ///
    /// # Safety
    /// - `ptr` was returned by `allocate` on this allocator
    /// - `ptr` has not been released already
    /// - `ptr` is not used after this call
    unsafe fn deallocate(&self, ptr: NonNull<u8>);

    /// Like [`allocate`](Self::allocate), reporting exhaustion as an error
    #[inline]
    fn try_allocate(&self, size: usize, hint: AllocHint) -> AllocResult<NonNull<u8>> {
        self.allocate(size, hint)
            .ok_or(AllocError::Exhausted { size, hint })
    }

    /// Allocates uninitialised storage for `count` values of `T`
    ///
    /// Types aligned more strictly than [`BLOCK_ALIGN`] are rejected rather
    /// than handed a misaligned block.
    fn allocate_array<T>(&self, count: usize, hint: AllocHint) -> AllocResult<NonNull<T>> {
        let align = align_of::<T>();
        if align > BLOCK_ALIGN {
            return Err(AllocError::UnsupportedAlignment {
                align,
                max: BLOCK_ALIGN,
            });
        }

        let elem_size = size_of::<T>();
        let size = count
            .checked_mul(elem_size)
            .ok_or(AllocError::SizeOverflow { count, elem_size })?;

        let ptr = self.try_allocate(size, hint)?;
        debug_assert_eq!(ptr.as_ptr() as usize % align, 0, "misaligned block");
        Ok(ptr.cast())
    }

    /// Releases a block given as a raw pointer. Null is a no-op.
    ///
    /// # Safety
    /// Same as [`deallocate`](Self::deallocate) for non-null `ptr`.
    #[inline]
    unsafe fn deallocate_raw(&self, ptr: *mut u8) {
        if let Some(ptr) = NonNull::new(ptr) {
            // SAFETY: non-null, and the caller upholds the deallocate contract.
            unsafe { self.deallocate(ptr) }
        }
    }
}

// SAFETY: forwards both capabilities to `A`, so the block contract is A's.
unsafe impl<A: RawAllocator + ?Sized> RawAllocator for &A {
    #[inline]
    fn allocate(&self, size: usize, hint: AllocHint) -> Option<NonNull<u8>> {
        (**self).allocate(size, hint)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>) {
        unsafe { (**self).deallocate(ptr) }
    }
}
