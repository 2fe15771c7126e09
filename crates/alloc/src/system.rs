//! System allocator implementation
//!
//! The built-in default behind every hook. Delegates to `std::alloc::System`
//! and ignores the hint.
//!
//! Release only receives a pointer, while `System` needs the original
//! layout back. Each block is therefore preceded by a `BLOCK_ALIGN`-sized
//! header holding the total size of the underlying allocation:
//!
//! ```text
//! base                 block (returned)
//! |  total: usize | pad |  size bytes ...  |
//! |<-- BLOCK_ALIGN ---->|
//! ```
//!
//! The header is self-describing, so any `SystemAllocator` can release a
//! block produced by any other, whatever their configs.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::NonNull;
use std::alloc::System;

use crate::config::SystemConfig;
use crate::error::AllocResult;
use crate::hint::AllocHint;
use crate::traits::{BLOCK_ALIGN, RawAllocator};

/// Bytes reserved in front of every block
const HEADER: usize = BLOCK_ALIGN;

/// The instance used by [`system_alloc`] and [`system_free`]
const DEFAULT: SystemAllocator = SystemAllocator::new();

/// Wrapper for the platform's general-purpose allocator
///
/// Zero-byte requests succeed with a valid, header-only block that must be
/// released like any other. Requests above the configured limit fail with
/// `None` without touching the platform allocator.
///
/// # Thread Safety
/// As thread-safe as the platform allocator, which is always thread-safe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemAllocator {
    config: SystemConfig,
}

impl SystemAllocator {
    /// Creates a system allocator with the default configuration
    #[inline]
    pub const fn new() -> Self {
        Self {
            config: SystemConfig::new(),
        }
    }

    /// Creates a system allocator with a validated configuration
    pub fn with_config(config: SystemConfig) -> AllocResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration
    #[inline]
    pub const fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Usable bytes of a block produced by a `SystemAllocator`
    ///
    /// # Safety
    /// `ptr` must be a live block returned by a `SystemAllocator`.
    #[inline]
    pub unsafe fn usable_size(ptr: NonNull<u8>) -> usize {
        // SAFETY: the caller guarantees the header in front of `ptr` exists.
        unsafe { ptr.sub(HEADER).cast::<usize>().read() - HEADER }
    }

    /// Describes the platform allocator behind `System`
    pub fn backend() -> &'static str {
        #[cfg(target_os = "linux")]
        return "Linux system allocator (typically glibc malloc or musl)";

        #[cfg(target_os = "windows")]
        return "Windows HeapAlloc";

        #[cfg(target_os = "macos")]
        return "macOS system allocator (libsystem_malloc)";

        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        return "Platform-specific system allocator";
    }
}

/// Layout of the underlying allocation for a `size`-byte block
#[inline]
fn layout_for(size: usize) -> Option<Layout> {
    let total = size.checked_add(HEADER)?;
    Layout::from_size_align(total, BLOCK_ALIGN).ok()
}

// SAFETY: blocks are carved from a fresh `System` allocation aligned to
// BLOCK_ALIGN; the header is BLOCK_ALIGN long, so the block keeps that
// alignment and is followed by at least `size` bytes of the same allocation.
unsafe impl RawAllocator for SystemAllocator {
    #[inline]
    fn allocate(&self, size: usize, _hint: AllocHint) -> Option<NonNull<u8>> {
        if size > self.config.max_allocation_size {
            return None;
        }
        let layout = layout_for(size)?;

        // SAFETY: layout.size() >= HEADER > 0.
        let base = unsafe {
            if self.config.zero_memory {
                System.alloc_zeroed(layout)
            } else {
                System.alloc(layout)
            }
        };
        let base = NonNull::new(base)?;

        // SAFETY: base is aligned for usize and owns `layout.size()` bytes,
        // of which the first HEADER hold the size record.
        unsafe {
            base.cast::<usize>().write(layout.size());
            Some(base.add(HEADER))
        }
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>) {
        // SAFETY: the caller guarantees `ptr` came from a SystemAllocator, so
        // the header in front of it records the size of the base allocation,
        // which was made with BLOCK_ALIGN alignment.
        unsafe {
            let base = ptr.sub(HEADER);
            let total = base.cast::<usize>().read();
            let layout = Layout::from_size_align_unchecked(total, BLOCK_ALIGN);
            System.dealloc(base.as_ptr(), layout);
        }
    }
}

/// Default allocation hook: the system allocator, hint ignored
pub fn system_alloc(size: usize, hint: AllocHint) -> Option<NonNull<u8>> {
    DEFAULT.allocate(size, hint)
}

/// Default release hook, the counterpart of [`system_alloc`]
///
/// # Safety
/// `ptr` must be a live block returned by [`system_alloc`] or any other
/// `SystemAllocator`.
pub unsafe fn system_free(ptr: NonNull<u8>) {
    unsafe { DEFAULT.deallocate(ptr) }
}
