//! Host output and fault surface.
//!
//! The runtime never prints or aborts on its own; the host supplies both.
//! Two impls are provided:
//!
//! - [`StdoutHost`]: output to stdout, faults to stderr (default for
//!   native hosts)
//! - [`BufferHost`]: output captured to a buffer for assertions and for
//!   embedded hosts without a terminal

use parking_lot::Mutex;

use crate::fault::Fault;

/// The I/O and fault surface a host provides to the runtime.
///
/// The printer is the sole caller of the emit methods. `raise_fault` is a
/// non-local abort: control must not return to the caller.
pub trait HostIo {
    /// Emit a text fragment, verbatim, no newline.
    fn emit_text(&self, text: &str);

    /// Emit a number in decimal.
    fn emit_number(&self, n: i64);

    /// Emit a boolean literal.
    fn emit_boolean(&self, b: bool);

    /// Abort the current execution path with `fault`.
    fn raise_fault(&self, fault: Fault) -> !;
}

/// Host that writes to stdout.
#[derive(Default)]
pub struct StdoutHost;

impl HostIo for StdoutHost {
    fn emit_text(&self, text: &str) {
        print!("{text}");
    }

    fn emit_number(&self, n: i64) {
        print!("{n}");
    }

    fn emit_boolean(&self, b: bool) {
        print!("{b}");
    }

    fn raise_fault(&self, fault: Fault) -> ! {
        eprintln!("tabl fault: {fault}");
        std::panic::panic_any(fault)
    }
}

/// Host that captures emitted output in a buffer.
pub struct BufferHost {
    buffer: Mutex<String>,
}

impl BufferHost {
    pub fn new() -> Self {
        BufferHost {
            buffer: Mutex::new(String::new()),
        }
    }

    /// All output emitted so far.
    pub fn output(&self) -> String {
        self.buffer.lock().clone()
    }

    /// Discard captured output.
    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Default for BufferHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostIo for BufferHost {
    fn emit_text(&self, text: &str) {
        self.buffer.lock().push_str(text);
    }

    fn emit_number(&self, n: i64) {
        self.buffer.lock().push_str(&n.to_string());
    }

    fn emit_boolean(&self, b: bool) {
        self.buffer.lock().push_str(if b { "true" } else { "false" });
    }

    fn raise_fault(&self, fault: Fault) -> ! {
        std::panic::panic_any(fault)
    }
}
