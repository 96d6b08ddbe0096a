//! Lock-free building blocks shared by search tasks.

pub mod bitset;

pub use bitset::AtomicBitset;
