//! Tests for the value model core: construction, lifetime, invocation.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests can panic"
)]

use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;

use crate::test_helpers::{CountingStorage, ExhaustedStorage, QuarantineStorage};
use crate::{catch_fault, BinaryOp, BufferHost, Callable, Fault, Handle, Runtime, SystemStorage, Tag};

// ── Constructors ────────────────────────────────────────────────────────

#[test]
fn constructors_return_fresh_owned_values() {
    let storage = SystemStorage;
    let host = BufferHost::new();
    let mut rt = Runtime::new(&storage, &host);

    let none = rt.none();
    assert_eq!(rt.tag(none), Tag::None);
    assert_eq!(rt.refcount(none), 1);

    let num = rt.number(42);
    assert_eq!(rt.tag(num), Tag::Number);
    assert_eq!(rt.refcount(num), 1);
    assert_eq!(rt.number_value(num), 42);

    let text = rt.string("hello");
    assert_eq!(rt.tag(text), Tag::String);
    assert_eq!(rt.refcount(text), 1);
    assert_eq!(rt.string_value(text), "hello");

    let truth = rt.boolean(true);
    assert_eq!(rt.tag(truth), Tag::Boolean);
    assert_eq!(rt.refcount(truth), 1);
    assert!(rt.boolean_value(truth));

    static ENTRY: NoneEntry = NoneEntry;
    let closure = rt.closure(&ENTRY, &[]);
    assert_eq!(rt.tag(closure), Tag::Closure);
    assert_eq!(rt.refcount(closure), 1);
}

#[test]
fn string_copies_do_not_alias_the_source() {
    let storage = SystemStorage;
    let host = BufferHost::new();
    let mut rt = Runtime::new(&storage, &host);

    let source = String::from("owned copy");
    let text = rt.string(&source);
    drop(source);

    assert_eq!(rt.string_value(text), "owned copy");
}

// ── Reference-count lifetime ────────────────────────────────────────────

#[test]
fn retain_then_release_leaves_count_unchanged() {
    let storage = SystemStorage;
    let host = BufferHost::new();
    let mut rt = Runtime::new(&storage, &host);

    let num = rt.number(7);
    rt.retain(num);
    rt.release(num);
    assert_eq!(rt.refcount(num), 1);

    // Still fully usable afterwards
    assert_eq!(rt.number_value(num), 7);
}

#[test]
fn reclamation_returns_all_blocks_to_storage() {
    let storage = CountingStorage::new();
    let host = BufferHost::new();
    let mut rt = Runtime::new(&storage, &host);

    let a = rt.number(1);
    let b = rt.string("captured");
    static ENTRY: NoneEntry = NoneEntry;
    let closure = rt.closure(&ENTRY, &[a, b]);
    assert!(storage.live_blocks() > 0);

    // The closure holds one retain on each capture; dropping the original
    // owners leaves both alive until the closure itself dies.
    rt.release(a);
    rt.release(b);
    assert_eq!(rt.refcount(closure), 1);
    assert!(storage.live_blocks() > 0);

    rt.release(closure);
    assert_eq!(storage.live_blocks(), 0);
}

#[test]
fn retain_after_free_faults() {
    let storage = QuarantineStorage::new();
    let host = BufferHost::new();
    let mut rt = Runtime::new(&storage, &host);

    let num = rt.number(5);
    rt.release(num);

    let fault = catch_fault(|| rt.retain(num)).unwrap_err();
    assert_eq!(fault, Fault::RetainAfterFree);
}

#[test]
fn release_after_free_faults() {
    let storage = QuarantineStorage::new();
    let host = BufferHost::new();
    let mut rt = Runtime::new(&storage, &host);

    let num = rt.number(5);
    rt.release(num);

    let fault = catch_fault(|| rt.release(num)).unwrap_err();
    assert_eq!(fault, Fault::ReleaseAfterFree);
}

#[test]
fn exhausted_storage_faults_on_construction() {
    let storage = ExhaustedStorage;
    let host = BufferHost::new();
    let mut rt = Runtime::new(&storage, &host);

    let fault = catch_fault(|| rt.number(1)).unwrap_err();
    assert!(matches!(fault, Fault::AllocationExhausted { .. }));
}

// ── Closures ────────────────────────────────────────────────────────────

/// Entry that returns the absence value.
struct NoneEntry;

impl Callable for NoneEntry {
    fn call(&self, rt: &mut Runtime<'_>, _args: &[Handle]) -> Handle {
        rt.none()
    }
}

/// Plain function entry, exercising the blanket `Callable` impl.
fn subtract_entry(rt: &mut Runtime<'_>, args: &[Handle]) -> Handle {
    rt.apply(BinaryOp::Subtract, args[0], args[1])
}

#[test]
fn closure_capture_retains_each_value_once() {
    let storage = SystemStorage;
    let host = BufferHost::new();
    let mut rt = Runtime::new(&storage, &host);

    let a = rt.number(10);
    let b = rt.number(4);
    assert_eq!(rt.refcount(a), 1);
    assert_eq!(rt.refcount(b), 1);

    let closure = rt.closure(&subtract_entry, &[a, b]);
    assert_eq!(rt.refcount(a), 2);
    assert_eq!(rt.refcount(b), 2);

    rt.release(closure);
    assert_eq!(rt.refcount(a), 1);
    assert_eq!(rt.refcount(b), 1);
}

#[test]
fn invocation_passes_captured_args_in_order() {
    let storage = SystemStorage;
    let host = BufferHost::new();
    let mut rt = Runtime::new(&storage, &host);

    let a = rt.number(10);
    let b = rt.number(4);
    let closure = rt.closure(&subtract_entry, &[a, b]);

    // 10 - 4, not 4 - 10
    let result = rt.invoke(closure);
    assert_eq!(rt.number_value(result), 6);
    assert_eq!(rt.refcount(result), 1);
}

/// Tracks entry calls across invocations.
static INVOKE_COUNT: AtomicUsize = AtomicUsize::new(0);

struct CountingEntry;

impl Callable for CountingEntry {
    fn call(&self, rt: &mut Runtime<'_>, _args: &[Handle]) -> Handle {
        INVOKE_COUNT.fetch_add(1, Ordering::SeqCst);
        rt.none()
    }
}

#[test]
fn each_invocation_calls_the_entry_once() {
    INVOKE_COUNT.store(0, Ordering::SeqCst);

    let storage = SystemStorage;
    let host = BufferHost::new();
    let mut rt = Runtime::new(&storage, &host);

    static ENTRY: CountingEntry = CountingEntry;
    let closure = rt.closure(&ENTRY, &[]);

    rt.invoke(closure);
    rt.invoke(closure);
    assert_eq!(INVOKE_COUNT.load(Ordering::SeqCst), 2);
}

#[test]
fn invoking_a_non_closure_faults() {
    let storage = SystemStorage;
    let host = BufferHost::new();
    let mut rt = Runtime::new(&storage, &host);

    let num = rt.number(3);
    let fault = catch_fault(|| rt.invoke(num)).unwrap_err();
    assert_eq!(
        fault,
        Fault::TypeMismatch {
            expected: Tag::Closure,
            found: Tag::Number,
        }
    );
}

// ── End-to-end scenario ─────────────────────────────────────────────────

#[test]
fn three_plus_four_is_seven() {
    let storage = SystemStorage;
    let host = BufferHost::new();
    let mut rt = Runtime::new(&storage, &host);

    let lhs = rt.number(3);
    let rhs = rt.number(4);
    let sum = rt.apply(BinaryOp::Add, lhs, rhs);

    assert_eq!(rt.number_value(sum), 7);
    assert_eq!(rt.refcount(sum), 1);
    // Operands are untouched by apply
    assert_eq!(rt.refcount(lhs), 1);
    assert_eq!(rt.refcount(rhs), 1);
}

#[test]
fn seven_divided_by_zero_faults_deterministically() {
    let storage = SystemStorage;
    let host = BufferHost::new();
    let mut rt = Runtime::new(&storage, &host);

    let lhs = rt.number(7);
    let rhs = rt.number(0);
    let fault = catch_fault(|| rt.apply(BinaryOp::Divide, lhs, rhs)).unwrap_err();
    assert_eq!(fault, Fault::DivisionByZero);
}
