//! The process-wide hook registry
//!
//! Holds the active [`AllocHooks`] pair that every call through
//! [`allocate`], [`deallocate`] and [`GlobalHooks`] is forwarded to. At
//! startup the pair is the system default.
//!
//! # Configure before use
//!
//! [`configure`] is meant to run once, before the host library allocates
//! anything. The registry takes no lock: reads and writes of the two slots
//! are single atomic loads and stores, so a `configure` racing with
//! allocations on other threads may see either pair for each half. Callers
//! that reconfigure mid-run must synchronise externally.
//!
//! Every block must be released through the pair that was active when it was
//! allocated. Releasing across a reconfiguration is undefined behaviour and
//! is not detected. Debug builds with the `logging` feature emit a warning
//! when the pair changes after allocation activity has begun.

use core::mem;
use core::ptr::{self, NonNull};
use core::sync::atomic::{AtomicPtr, Ordering};
#[cfg(all(debug_assertions, feature = "logging"))]
use core::sync::atomic::AtomicBool;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

use crate::error::AllocResult;
use crate::hint::AllocHint;
use crate::hooks::{AllocFn, AllocHooks, FreeFn};
use crate::system::{system_alloc, system_free};
use crate::traits::RawAllocator;

/// Active allocation hook; null means the system default
static ALLOC_HOOK: AtomicPtr<()> = AtomicPtr::new(ptr::null_mut());

/// Active release hook; null means the system default
static FREE_HOOK: AtomicPtr<()> = AtomicPtr::new(ptr::null_mut());

/// Set by the first allocation through the registry
#[cfg(all(debug_assertions, feature = "logging"))]
static ALLOCATION_STARTED: AtomicBool = AtomicBool::new(false);

/// Encodes a hook for storage, mapping the default to null
#[inline]
fn encode_alloc(hook: Option<AllocFn>) -> *mut () {
    match hook {
        Some(f) if !ptr::fn_addr_eq(f, system_alloc as AllocFn) => f as *mut (),
        _ => ptr::null_mut(),
    }
}

#[inline]
fn encode_free(hook: Option<FreeFn>) -> *mut () {
    match hook {
        Some(f) if !ptr::fn_addr_eq(f, system_free as FreeFn) => f as *mut (),
        _ => ptr::null_mut(),
    }
}

#[inline]
fn active_alloc() -> AllocFn {
    let raw = ALLOC_HOOK.load(Ordering::Acquire);
    if raw.is_null() {
        system_alloc
    } else {
        // SAFETY: non-null values in ALLOC_HOOK only come from `encode_alloc`,
        // which erased an `AllocFn`.
        unsafe { mem::transmute::<*mut (), AllocFn>(raw) }
    }
}

#[inline]
fn active_free() -> FreeFn {
    let raw = FREE_HOOK.load(Ordering::Acquire);
    if raw.is_null() {
        system_free
    } else {
        // SAFETY: non-null values in FREE_HOOK only come from `encode_free`,
        // which erased a `FreeFn`.
        unsafe { mem::transmute::<*mut (), FreeFn>(raw) }
    }
}

/// Replaces the active hooks
///
/// A `None` half resets that half to the system default, so
/// `configure(None, None)` restores the default pair and
/// `configure(Some(my_alloc), None)` keeps the default release hook.
pub fn configure(alloc: Option<AllocFn>, free: Option<FreeFn>) {
    let alloc_raw = encode_alloc(alloc);
    let free_raw = encode_free(free);

    let alloc_changed = ALLOC_HOOK.swap(alloc_raw, Ordering::AcqRel) != alloc_raw;
    let free_changed = FREE_HOOK.swap(free_raw, Ordering::AcqRel) != free_raw;

    on_reconfigured(alloc_changed || free_changed);
}

/// Installs a prepared pair
#[inline]
pub fn install(hooks: AllocHooks) {
    configure(Some(hooks.alloc_fn()), Some(hooks.free_fn()));
}

/// Restores the system default pair. Idempotent.
#[inline]
pub fn reset() {
    configure(None, None);
}

/// The pair currently in effect
pub fn active() -> AllocHooks {
    AllocHooks::new(active_alloc(), active_free())
}

/// Snapshot of the active pair for a block that will keep it
///
/// Counts as allocation activity for the reconfiguration warning.
pub(crate) fn capture() -> AllocHooks {
    #[cfg(all(debug_assertions, feature = "logging"))]
    mark_allocation_started();

    active()
}

/// Allocates through the active hook
///
/// Returns `None` if the active allocator cannot satisfy the request. There
/// is no retry; the caller decides whether to shrink the request or give up.
#[inline]
pub fn allocate(size: usize, hint: AllocHint) -> Option<NonNull<u8>> {
    #[cfg(all(debug_assertions, feature = "logging"))]
    mark_allocation_started();

    active_alloc()(size, hint)
}

/// Like [`allocate`], reporting exhaustion as an error
#[inline]
pub fn try_allocate(size: usize, hint: AllocHint) -> AllocResult<NonNull<u8>> {
    GlobalHooks.try_allocate(size, hint)
}

/// Releases a block through the active hook. Null is a no-op.
///
/// # Safety
/// A non-null `ptr` must have been returned by [`allocate`] under the pair
/// that is still active, and must not have been released already.
#[inline]
pub unsafe fn deallocate(ptr: *mut u8) {
    if let Some(ptr) = NonNull::new(ptr) {
        // SAFETY: non-null; the caller upholds the pairing contract.
        unsafe { active_free()(ptr) }
    }
}

#[cfg(all(debug_assertions, feature = "logging"))]
#[inline]
fn mark_allocation_started() {
    if !ALLOCATION_STARTED.load(Ordering::Relaxed) {
        ALLOCATION_STARTED.store(true, Ordering::Relaxed);
    }
}

#[cfg(feature = "logging")]
fn on_reconfigured(changed: bool) {
    if !changed {
        return;
    }

    let hooks = active();
    debug!(
        system_alloc = hooks.is_system_alloc(),
        system_free = hooks.is_system_free(),
        "Installed allocation hooks"
    );

    #[cfg(debug_assertions)]
    if ALLOCATION_STARTED.load(Ordering::Relaxed) {
        warn!(
            "Allocation hooks changed after allocation activity began; \
             blocks allocated earlier must still be released by the previous hooks"
        );
    }
}

#[cfg(not(feature = "logging"))]
#[inline]
fn on_reconfigured(_changed: bool) {}

/// A [`RawAllocator`] forwarding to the process-wide registry
///
/// Lets host code generic over `A: RawAllocator` keep the global override
/// point without naming it. Zero-sized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GlobalHooks;

// SAFETY: forwards to whatever pair is active; the block contract is that
// pair's.
unsafe impl RawAllocator for GlobalHooks {
    #[inline]
    fn allocate(&self, size: usize, hint: AllocHint) -> Option<NonNull<u8>> {
        allocate(size, hint)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>) {
        unsafe { active_free()(ptr) }
    }
}
