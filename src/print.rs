//! Direct printing of values through the host output surface.

use crate::runtime::Runtime;
use crate::value::{Handle, Payload};

impl Runtime<'_> {
    /// Render a value through the host output surface.
    ///
    /// Pure over the value graph: no tag, payload, or reference count is
    /// touched. Dispatches on the tag; closure contents are deliberately
    /// not rendered.
    pub fn print(&self, h: Handle) {
        let host = self.host();
        // SAFETY: live handle per the ownership discipline.
        let value = unsafe { &*h.as_ptr() };
        match &value.payload {
            Payload::None => host.emit_text("Type: None, Value: None"),
            Payload::Number(n) => {
                host.emit_text("Type: Number, Value: ");
                host.emit_number(*n);
            }
            Payload::String(buf) => {
                host.emit_text("Type: String, Value: ");
                host.emit_text(buf.as_str());
            }
            Payload::Boolean(b) => {
                host.emit_text("Type: Boolean, Value: ");
                host.emit_boolean(*b);
            }
            Payload::Closure(_) => host.emit_text("Type: Closure"),
        }
        host.emit_text("\n");
    }
}
