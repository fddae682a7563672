//! Tabl Runtime Library (`tabl_rt`)
//!
//! Runtime support for compiled Tabl programs. The Tabl compiler emits Rust
//! code that drives this crate's API; the crate itself implements only the
//! tagged value model and its lifetime and operation semantics.
//!
//! # Function categories
//!
//! - **Construction**: [`Runtime::none`], [`Runtime::number`],
//!   [`Runtime::string`], [`Runtime::boolean`], [`Runtime::closure`]
//! - **Lifetime**: [`Runtime::retain`], [`Runtime::release`],
//!   [`Runtime::refcount`]
//! - **Operations**: [`Runtime::apply`], [`Runtime::invoke`]
//! - **Output**: [`Runtime::print`]
//! - **Faults**: [`Fault`], [`catch_fault`]
//!
//! # Host boundary
//!
//! The runtime implements neither allocation nor I/O. Hosts inject a
//! [`Storage`] allocator and a [`HostIo`] surface at [`Runtime::new`]; every
//! value cell, string buffer, and captured-argument array comes from
//! `Storage`, and every byte of output and every fault goes through
//! `HostIo`. Precondition violations unwind through
//! [`HostIo::raise_fault`] — there is no recoverable error value anywhere
//! in the API.
//!
//! # Ownership discipline
//!
//! Every constructor returns a value with a reference count of one, owned
//! by the caller. Storing a [`Handle`] in longer-lived structure pairs with
//! `retain`; dropping such a reference pairs with `release`. The last
//! release reclaims the value's owned resources exactly once. There is no
//! cycle detection: closures that capture each other leak.
//!
//! Execution is single-threaded and fully synchronous. Reference counts are
//! plain integers, not atomics.

mod closure;
mod fault;
mod host;
mod ops;
mod print;
mod runtime;
mod storage;
mod text;
mod value;

pub use closure::Callable;
pub use fault::{catch_fault, Fault};
pub use host::{BufferHost, HostIo, StdoutHost};
pub use ops::BinaryOp;
pub use runtime::Runtime;
pub use storage::{Storage, SystemStorage};
pub use value::{Handle, Tag};

#[cfg(test)]
mod test_helpers;

#[cfg(test)]
mod tests;
