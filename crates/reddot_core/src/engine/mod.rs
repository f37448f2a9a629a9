//! Badge aggregation engine.
//!
//! # Responsibility
//! - Run the tick pipeline: own counts, bottom-up aggregation, UI refresh.
//! - Drive ticks from a cooperative, cancellable schedule.
//! - Expose the engine instance used by host applications.
//!
//! # Invariants
//! - Aggregation and refresh are pure functions of registry state; repeating
//!   them without new check results changes nothing and causes no pool churn.
//! - Everything runs on one logical thread; nothing blocks or suspends.

pub mod aggregation;
pub mod schedule;
pub mod system;
