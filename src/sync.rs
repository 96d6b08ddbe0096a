//! Atomic primitives used by the visitation ledger.
//!
//! Under `--cfg loom` these resolve to loom's model-checked atomics so the
//! claim protocol can be explored exhaustively; otherwise they are the plain
//! `std` types.

#[cfg(loom)]
pub(crate) use loom::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[cfg(not(loom))]
pub(crate) use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
