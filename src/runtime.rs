//! The runtime: construction, reference-count lifetime, invocation.
//!
//! A [`Runtime`] ties together the two host-provided seams — storage and
//! I/O — and owns every operation over the value graph. All methods run to
//! completion synchronously; a precondition violation unwinds through the
//! host fault surface and never returns.

use std::alloc::Layout;
use std::mem;
use std::ptr;
use std::slice;

use crate::closure::{ArgList, Callable, ClosurePayload};
use crate::fault::Fault;
use crate::host::HostIo;
use crate::storage::Storage;
use crate::text::TextBuf;
use crate::value::{Handle, Payload, Tag, Value};

/// The Tabl value runtime.
pub struct Runtime<'h> {
    storage: &'h dyn Storage,
    host: &'h dyn HostIo,
}

impl<'h> Runtime<'h> {
    pub fn new(storage: &'h dyn Storage, host: &'h dyn HostIo) -> Self {
        Runtime { storage, host }
    }

    pub(crate) fn host(&self) -> &dyn HostIo {
        self.host
    }

    // ── Constructors ────────────────────────────────────────────────────
    //
    // Total: each returns a fresh cell with a reference count of one, owned
    // by the caller. The only failure mode is storage exhaustion, which
    // faults rather than returning.

    pub fn none(&mut self) -> Handle {
        self.fresh(Payload::None)
    }

    pub fn number(&mut self, n: i64) -> Handle {
        self.fresh(Payload::Number(n))
    }

    /// Construct a String value by copying `text` into storage-owned
    /// memory. The caller's buffer is never aliased or mutated.
    pub fn string(&mut self, text: &str) -> Handle {
        let Some(buf) = TextBuf::copy_from(self.storage, text) else {
            self.host.raise_fault(Fault::AllocationExhausted {
                bytes: text.len() + 1,
            })
        };
        self.fresh(Payload::String(buf))
    }

    pub fn boolean(&mut self, b: bool) -> Handle {
        self.fresh(Payload::Boolean(b))
    }

    /// Construct a Closure value from an entry point and the values it
    /// captures. Each captured value is retained once; the matching release
    /// happens when the closure itself dies.
    pub fn closure(&mut self, entry: &'static dyn Callable, captured: &[Handle]) -> Handle {
        for &arg in captured {
            self.retain(arg);
        }
        let Some(args) = ArgList::copy_from(self.storage, captured) else {
            self.host.raise_fault(Fault::AllocationExhausted {
                bytes: captured.len() * mem::size_of::<Handle>(),
            })
        };
        self.fresh(Payload::Closure(ClosurePayload {
            entry,
            captured: args,
        }))
    }

    fn fresh(&mut self, payload: Payload) -> Handle {
        let layout = Layout::new::<Value>();
        let Some(cell) = self.storage.allocate(layout) else {
            self.host.raise_fault(Fault::AllocationExhausted {
                bytes: layout.size(),
            })
        };
        let cell = cell.cast::<Value>();
        let tag = payload.tag();
        // SAFETY: cell is fresh storage sized and aligned for a Value.
        unsafe {
            cell.as_ptr().write(Value {
                refcount: 1,
                payload,
            });
        }
        tracing::trace!(%tag, "value constructed");
        Handle(cell)
    }

    // ── Reference-count lifetime ────────────────────────────────────────
    //
    // Retain and release pair 1:1 across every hand-off of a handle into
    // longer-lived storage. This is the system's sole correctness
    // discipline; there is no cycle detection.

    /// Add an owner to a live value.
    pub fn retain(&mut self, h: Handle) {
        // SAFETY: the handle refers to a live cell per the ownership
        // discipline; a dead cell is caught by the zero check below.
        let value = unsafe { &mut *h.as_ptr() };
        if value.refcount == 0 {
            self.host.raise_fault(Fault::RetainAfterFree);
        }
        value.refcount += 1;
        tracing::trace!(tag = %value.payload.tag(), refcount = value.refcount, "retain");
    }

    /// Remove an owner from a live value, reclaiming it when the last
    /// owner is gone.
    pub fn release(&mut self, h: Handle) {
        // SAFETY: as in `retain`.
        let value = unsafe { &mut *h.as_ptr() };
        if value.refcount == 0 {
            self.host.raise_fault(Fault::ReleaseAfterFree);
        }
        value.refcount -= 1;
        tracing::trace!(tag = %value.payload.tag(), refcount = value.refcount, "release");
        if value.refcount == 0 {
            self.reclaim(h);
        }
    }

    /// Current owner count, for debugging and tests.
    pub fn refcount(&self, h: Handle) -> u64 {
        // SAFETY: live handle per the ownership discipline.
        unsafe { (*h.as_ptr()).refcount }
    }

    /// Reclaim a dead value exactly once: payload resources first, then the
    /// cell itself.
    ///
    /// Exclusive ownership edges are followed recursively — a String's
    /// buffer goes back to storage, a Closure releases every captured value
    /// and then its argument array. The cell is tombstoned before its
    /// storage is returned, so misuse through a stale handle reads a zero
    /// count instead of the old payload wherever the block is still mapped.
    fn reclaim(&mut self, h: Handle) {
        // SAFETY: the count just reached zero and this is the single
        // reclamation path, so the cell is still live and unaliased.
        let value = unsafe { ptr::read(h.as_ptr()) };
        debug_assert_eq!(value.refcount, 0);
        tracing::debug!(tag = %value.payload.tag(), "reclaiming value");
        match value.payload {
            Payload::None | Payload::Number(_) | Payload::Boolean(_) => {}
            // SAFETY: the buffer is owned exclusively by this cell and
            // released exactly once, here.
            Payload::String(buf) => unsafe { buf.release(self.storage) },
            Payload::Closure(closure) => {
                for &arg in closure.captured.as_slice() {
                    self.release(arg);
                }
                // SAFETY: the array is owned exclusively by this cell and
                // released exactly once, here.
                unsafe { closure.captured.release(self.storage) };
            }
        }
        // SAFETY: tombstone the cell, then hand its storage back. The
        // payload was moved out above; nothing reads the cell afterwards
        // through a correctly managed handle.
        unsafe {
            h.as_ptr().write(Value {
                refcount: 0,
                payload: Payload::None,
            });
            self.storage.release(h.0.cast::<u8>(), Layout::new::<Value>());
        }
    }

    // ── Invocation ──────────────────────────────────────────────────────

    /// Invoke a Closure value, passing its captured arguments to the entry
    /// point in capture order.
    ///
    /// Ownership of the returned value transfers to the caller; the
    /// closure's own count is untouched. Synchronous, with no reentry
    /// guard — recursive closures are the caller's responsibility.
    pub fn invoke(&mut self, h: Handle) -> Handle {
        // SAFETY: live handle per the ownership discipline.
        let value = unsafe { &*h.as_ptr() };
        let closure = match &value.payload {
            Payload::Closure(closure) => closure,
            other => self.host.raise_fault(Fault::TypeMismatch {
                expected: Tag::Closure,
                found: other.tag(),
            }),
        };
        let entry = closure.entry;
        let (args, len) = closure.captured.raw_parts();
        // SAFETY: the caller keeps the closure alive across the call, so
        // the argument array outlives the slice. Detaching the lifetime
        // lets the entry point borrow the runtime mutably.
        let args = unsafe { slice::from_raw_parts(args, len) };
        entry.call(self, args)
    }

    // ── Payload accessors ───────────────────────────────────────────────
    //
    // Generated code reads payloads through these; each faults on a tag
    // mismatch rather than guessing.

    /// The value's tag.
    pub fn tag(&self, h: Handle) -> Tag {
        // SAFETY: live handle per the ownership discipline.
        unsafe { (*h.as_ptr()).payload.tag() }
    }

    /// The numeric payload of a Number value.
    pub fn number_value(&self, h: Handle) -> i64 {
        // SAFETY: live handle per the ownership discipline.
        let value = unsafe { &*h.as_ptr() };
        match &value.payload {
            Payload::Number(n) => *n,
            other => self.host.raise_fault(Fault::TypeMismatch {
                expected: Tag::Number,
                found: other.tag(),
            }),
        }
    }

    /// The text payload of a String value.
    pub fn string_value(&self, h: Handle) -> &str {
        // SAFETY: live handle per the ownership discipline.
        let value = unsafe { &*h.as_ptr() };
        match &value.payload {
            Payload::String(buf) => buf.as_str(),
            other => self.host.raise_fault(Fault::TypeMismatch {
                expected: Tag::String,
                found: other.tag(),
            }),
        }
    }

    /// The bit payload of a Boolean value.
    pub fn boolean_value(&self, h: Handle) -> bool {
        // SAFETY: live handle per the ownership discipline.
        let value = unsafe { &*h.as_ptr() };
        match &value.payload {
            Payload::Boolean(b) => *b,
            other => self.host.raise_fault(Fault::TypeMismatch {
                expected: Tag::Boolean,
                found: other.tag(),
            }),
        }
    }
}
