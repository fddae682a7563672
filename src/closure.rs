//! Closure payloads: a callable bundled with its captured environment.

use std::alloc::Layout;
use std::ptr;
use std::ptr::NonNull;

use crate::runtime::Runtime;
use crate::storage::Storage;
use crate::value::Handle;

/// A callable runtime entity.
///
/// The entry point of a closure value. Invocation hands it the runtime and
/// the closure's captured arguments, in capture order; it returns a value
/// it owns and no longer depends on (reference count at least one), whose
/// ownership transfers to the invoker.
///
/// Generated code usually implements this for zero-sized entry structs; a
/// blanket impl covers plain functions of the right shape.
pub trait Callable {
    fn call(&self, rt: &mut Runtime<'_>, args: &[Handle]) -> Handle;
}

impl<F> Callable for F
where
    F: Fn(&mut Runtime<'_>, &[Handle]) -> Handle,
{
    fn call(&self, rt: &mut Runtime<'_>, args: &[Handle]) -> Handle {
        self(rt, args)
    }
}

/// Fixed-length, storage-owned array of captured handles.
///
/// Owned exclusively by one closure payload. The referenced values are kept
/// alive by the retain taken at capture time; the array itself is raw
/// storage with no drop glue.
pub(crate) struct ArgList {
    data: NonNull<Handle>,
    len: usize,
}

impl ArgList {
    /// Copy `captured` into a fresh storage-owned array.
    ///
    /// Zero captures allocate nothing. Returns `None` on exhaustion.
    pub(crate) fn copy_from(storage: &dyn Storage, captured: &[Handle]) -> Option<ArgList> {
        let len = captured.len();
        if len == 0 {
            return Some(ArgList {
                data: NonNull::dangling(),
                len: 0,
            });
        }
        let data = storage.allocate(Self::layout(len))?.cast::<Handle>();
        // SAFETY: the allocation is sized for `len` handles and fresh, so
        // the regions cannot overlap.
        unsafe {
            ptr::copy_nonoverlapping(captured.as_ptr(), data.as_ptr(), len);
        }
        Some(ArgList { data, len })
    }

    /// Raw parts for constructing a detached argument slice at invocation.
    pub(crate) fn raw_parts(&self) -> (*const Handle, usize) {
        (self.data.as_ptr(), self.len)
    }

    /// The captured handles, in capture order.
    pub(crate) fn as_slice(&self) -> &[Handle] {
        // SAFETY: data is valid for len handles for as long as the list is
        // alive.
        unsafe { std::slice::from_raw_parts(self.data.as_ptr(), self.len) }
    }

    /// Return the array to storage.
    ///
    /// # Safety
    ///
    /// Must be called exactly once, with the storage the array came from,
    /// and the list must not be used afterwards.
    pub(crate) unsafe fn release(&self, storage: &dyn Storage) {
        if self.len != 0 {
            // SAFETY delegated: same storage and layout as `copy_from`.
            storage.release(self.data.cast::<u8>(), Self::layout(self.len));
        }
    }

    fn layout(len: usize) -> Layout {
        Layout::array::<Handle>(len).unwrap_or_else(|_| Layout::new::<Handle>())
    }
}

/// Payload of a Closure-tagged value.
pub(crate) struct ClosurePayload {
    /// Entry point. Opaque to the runtime; only ever called.
    pub(crate) entry: &'static dyn Callable,
    /// Captured environment, retained once per capture.
    pub(crate) captured: ArgList,
}
