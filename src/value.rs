//! The tagged value representation.
//!
//! A [`Value`] is a reference count plus a [`Payload`] sum type; the payload
//! variant in use is always exactly the one the tag reports, enforced by the
//! type system rather than by convention. Neither type is exposed outside
//! the crate — generated code holds opaque [`Handle`]s and goes through the
//! [`Runtime`](crate::Runtime) for every observation and mutation.

use std::fmt;
use std::ptr::NonNull;

use crate::closure::ClosurePayload;
use crate::text::TextBuf;

/// Discriminant of a value's active payload variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    None,
    Number,
    String,
    Boolean,
    Closure,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tag::None => "None",
            Tag::Number => "Number",
            Tag::String => "String",
            Tag::Boolean => "Boolean",
            Tag::Closure => "Closure",
        };
        f.write_str(name)
    }
}

/// The payload variants a value can carry.
pub(crate) enum Payload {
    None,
    Number(i64),
    String(TextBuf),
    Boolean(bool),
    Closure(ClosurePayload),
}

impl Payload {
    pub(crate) fn tag(&self) -> Tag {
        match self {
            Payload::None => Tag::None,
            Payload::Number(_) => Tag::Number,
            Payload::String(_) => Tag::String,
            Payload::Boolean(_) => Tag::Boolean,
            Payload::Closure(_) => Tag::Closure,
        }
    }
}

/// A heap value cell: reference count plus payload.
///
/// Lives in storage obtained from the [`Storage`](crate::Storage) boundary.
/// A count of zero means dead storage; the cell is tombstoned and returned
/// to storage by the reclamation path.
pub(crate) struct Value {
    pub(crate) refcount: u64,
    pub(crate) payload: Payload,
}

/// Opaque reference to a heap value.
///
/// Generated code passes handles around and hands them back to the runtime;
/// it never inspects the cell behind one. A handle is valid while the
/// retain/release discipline keeps its value's reference count above zero.
#[derive(Clone, Copy, Debug)]
pub struct Handle(pub(crate) NonNull<Value>);

impl Handle {
    pub(crate) fn as_ptr(self) -> *mut Value {
        self.0.as_ptr()
    }
}
