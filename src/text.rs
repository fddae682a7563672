//! Owned string storage for String-tagged values.

use std::alloc::Layout;
use std::ptr;
use std::ptr::NonNull;
use std::slice;
use std::str;

use crate::storage::Storage;

/// Storage-owned byte buffer backing a String-tagged value.
///
/// Holds `len + 1` bytes: content copied verbatim, then a NUL terminator
/// (the convention generated code inherits from the wire format). The
/// buffer is owned exclusively by one value cell and never aliased; there
/// is no `Drop` impl because lifetime is the reference-count manager's job.
pub(crate) struct TextBuf {
    data: NonNull<u8>,
    len: usize,
}

impl TextBuf {
    /// Copy `text` into a fresh storage-owned buffer.
    ///
    /// Either a complete owned copy exists afterwards or `None` is returned
    /// on exhaustion; there is no partial state.
    pub(crate) fn copy_from(storage: &dyn Storage, text: &str) -> Option<TextBuf> {
        let len = text.len();
        let data = storage.allocate(Self::layout(len))?;
        // SAFETY: data is valid for len + 1 bytes and freshly allocated, so
        // the regions cannot overlap.
        unsafe {
            ptr::copy_nonoverlapping(text.as_ptr(), data.as_ptr(), len);
            data.as_ptr().add(len).write(0);
        }
        Some(TextBuf { data, len })
    }

    /// View the content (terminator excluded).
    pub(crate) fn as_str(&self) -> &str {
        // SAFETY: the buffer was copied verbatim from a `&str` and is never
        // mutated, so UTF-8 validity holds.
        unsafe {
            let bytes = slice::from_raw_parts(self.data.as_ptr(), self.len);
            str::from_utf8_unchecked(bytes)
        }
    }

    /// Return the buffer to storage.
    ///
    /// # Safety
    ///
    /// Must be called exactly once, with the storage the buffer came from,
    /// and the buffer must not be used afterwards.
    pub(crate) unsafe fn release(&self, storage: &dyn Storage) {
        // SAFETY delegated: same storage and layout as `copy_from`.
        storage.release(self.data, Self::layout(self.len));
    }

    fn layout(len: usize) -> Layout {
        // content + NUL terminator
        Layout::array::<u8>(len + 1).unwrap_or_else(|_| Layout::new::<u8>())
    }
}
