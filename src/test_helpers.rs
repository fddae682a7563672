//! Shared storage doubles for unit tests.

use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;

use crate::storage::{Storage, SystemStorage};

/// Storage wrapper that counts outstanding blocks, for leak assertions.
pub(crate) struct CountingStorage {
    inner: SystemStorage,
    live: Cell<usize>,
}

impl CountingStorage {
    pub(crate) fn new() -> Self {
        CountingStorage {
            inner: SystemStorage,
            live: Cell::new(0),
        }
    }

    /// Blocks allocated but not yet released.
    pub(crate) fn live_blocks(&self) -> usize {
        self.live.get()
    }
}

impl Storage for CountingStorage {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        let block = self.inner.allocate(layout)?;
        self.live.set(self.live.get() + 1);
        Some(block)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        self.live.set(self.live.get() - 1);
        // SAFETY delegated: forwarded contract.
        self.inner.release(ptr, layout);
    }
}

/// Storage that never returns released blocks to the system.
///
/// Released memory stays mapped (leaked for the test's lifetime), so a
/// stale handle can be read safely and use-after-free faults are
/// deterministic.
pub(crate) struct QuarantineStorage {
    inner: SystemStorage,
}

impl QuarantineStorage {
    pub(crate) fn new() -> Self {
        QuarantineStorage {
            inner: SystemStorage,
        }
    }
}

impl Storage for QuarantineStorage {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.inner.allocate(layout)
    }

    unsafe fn release(&self, _ptr: NonNull<u8>, _layout: Layout) {
        // quarantined
    }
}

/// Storage that is permanently exhausted.
pub(crate) struct ExhaustedStorage;

impl Storage for ExhaustedStorage {
    fn allocate(&self, _layout: Layout) -> Option<NonNull<u8>> {
        None
    }

    unsafe fn release(&self, _ptr: NonNull<u8>, _layout: Layout) {}
}
