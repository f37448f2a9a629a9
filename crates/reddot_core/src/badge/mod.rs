//! Badge visuals, pooling and UI target bindings.
//!
//! # Responsibility
//! - Define the host-side contracts for badge visuals and UI targets.
//! - Recycle badge visuals through a pool instead of re-instantiating.
//!
//! # Invariants
//! - A badge handle is owned by exactly one binding or by the pool, never both.

pub mod binding;
pub mod pool;
