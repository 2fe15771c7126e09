//! # meshnav-alloc
//!
//! Swappable allocation hooks for the meshnav navigation toolkit.
//!
//! Every allocation the toolkit makes for meshes, query nodes and scratch
//! buffers goes through this crate, which lets an embedding application
//! substitute its own strategy (arena, pool, tracking allocator) without
//! touching any call site.
//!
//! ## Quick Start
//!
//! ```rust
//! use core::ptr::NonNull;
//! use meshnav_alloc::{AllocHint, registry, system_alloc, system_free};
//!
//! fn arena_alloc(size: usize, hint: AllocHint) -> Option<NonNull<u8>> {
//!     // a real embedder routes Temporary requests to its scratch arena
//!     system_alloc(size, hint)
//! }
//!
//! // Once, before the toolkit allocates anything.
//! registry::configure(Some(arena_alloc), Some(system_free));
//!
//! let block = registry::allocate(1024, AllocHint::Temporary).expect("out of memory");
//! unsafe { registry::deallocate(block.as_ptr()) };
//!
//! // Back to the built-in default.
//! registry::reset();
//! ```
//!
//! ## Two ways in
//!
//! - **Injected**: host code generic over [`RawAllocator`] receives an
//!   allocator value ([`SystemAllocator`], [`AllocHooks`] or your own type) and
//!   is monomorphised over it.
//! - **Global**: the [`registry`] holds one process-wide [`AllocHooks`] pair,
//!   reached through [`registry::allocate`] / [`registry::deallocate`] or the
//!   zero-sized [`GlobalHooks`].
//!
//! ## Features
//!
//! - `logging` (default): `tracing` events when hooks are (re)installed
//! - `serde` (default): `Serialize`/`Deserialize` for [`SystemConfig`] and
//!   [`AllocHint`]

#![cfg_attr(docsrs, feature(doc_cfg))]
// The crate is a thin layer over raw allocation; every unsafe block carries
// a SAFETY note.
#![allow(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod block;
pub mod config;
pub mod error;
pub mod hint;
pub mod hooks;
pub mod registry;
pub mod system;
pub mod traits;

pub use block::ScopedBlock;
pub use config::{MAX_SYSTEM_ALLOCATION, SystemConfig};
pub use error::{AllocError, AllocResult};
pub use hint::AllocHint;
pub use hooks::{AllocFn, AllocHooks, FreeFn};
pub use registry::GlobalHooks;
pub use system::{SystemAllocator, system_alloc, system_free};
pub use traits::{BLOCK_ALIGN, RawAllocator};

pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::block::ScopedBlock;
    pub use crate::error::{AllocError, AllocResult};
    pub use crate::hint::AllocHint;
    pub use crate::hooks::{AllocFn, AllocHooks, FreeFn};
    pub use crate::registry::{self, GlobalHooks};
    pub use crate::system::SystemAllocator;
    pub use crate::traits::RawAllocator;
}
