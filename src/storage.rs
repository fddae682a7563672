//! Storage boundary for all runtime allocation.
//!
//! Every value cell, string buffer, and captured-argument array is obtained
//! from a [`Storage`] impl and returned to it. No other allocation path
//! exists in the runtime, so a host with its own heap (bump, free-list,
//! arena) controls all runtime memory by implementing this one trait.

use std::alloc::{alloc, dealloc, Layout};
use std::ptr::NonNull;

/// Raw storage provider.
///
/// Exhaustion is reported as `None`, never by panicking: the runtime turns
/// it into an [`AllocationExhausted`](crate::Fault::AllocationExhausted)
/// fault through the host surface.
pub trait Storage {
    /// Request a block of storage. Requests always have nonzero size.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Return a block previously obtained from [`Storage::allocate`].
    ///
    /// # Safety
    ///
    /// `ptr` must have come from `allocate` on this same storage with the
    /// same `layout`, and must not be released twice.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

/// Passthrough to the system allocator.
///
/// The default storage for hosts without their own heap. Hosts that manage
/// memory themselves substitute their own [`Storage`] impl instead.
pub struct SystemStorage;

impl Storage for SystemStorage {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert!(layout.size() > 0, "zero-size request reached storage");
        // SAFETY: layout has nonzero size per the trait contract.
        let ptr = unsafe { alloc(layout) };
        NonNull::new(ptr)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller guarantees ptr came from `allocate` with `layout`.
        dealloc(ptr.as_ptr(), layout);
    }
}
