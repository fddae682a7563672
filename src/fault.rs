//! Fault taxonomy and the unwind boundary.
//!
//! Faults are not error values: a precondition violation unwinds through
//! [`HostIo::raise_fault`](crate::HostIo::raise_fault) and never returns to
//! the violating call site. The provided hosts unwind via
//! `std::panic::panic_any` with a [`Fault`] payload so that cleanup code
//! between the violation and the entry point still runs; [`catch_fault`]
//! is the matching boundary an embedder wraps around a program entry point.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::value::Tag;

/// An unrecoverable precondition violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fault {
    /// An operation received a value whose tag does not satisfy its
    /// precondition.
    TypeMismatch { expected: Tag, found: Tag },
    /// Integer division with a zero divisor.
    DivisionByZero,
    /// The storage allocator could not satisfy a request.
    AllocationExhausted { bytes: usize },
    /// Retain on a value whose reference count is already zero.
    RetainAfterFree,
    /// Release on a value whose reference count is already zero.
    ReleaseAfterFree,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {expected}, found {found}")
            }
            Fault::DivisionByZero => write!(f, "division by zero"),
            Fault::AllocationExhausted { bytes } => {
                write!(f, "storage exhausted: {bytes} byte request failed")
            }
            Fault::RetainAfterFree => {
                write!(f, "retain on a value with zero reference count")
            }
            Fault::ReleaseAfterFree => {
                write!(f, "release on a value with zero reference count")
            }
        }
    }
}

/// Run `f`, catching a runtime fault raised anywhere inside it.
///
/// Returns the closure's result, or the [`Fault`] that unwound out of it.
/// Panics that are not faults (a bug, a test assertion) are resumed
/// untouched.
pub fn catch_fault<T>(f: impl FnOnce() -> T) -> Result<T, Fault> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(payload) => match payload.downcast::<Fault>() {
            Ok(fault) => Err(*fault),
            Err(other) => panic::resume_unwind(other),
        },
    }
}
