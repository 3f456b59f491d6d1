//! Adapters layer (Hexagonal Architecture)
//!
//! Reference: SPEC-08-CONSENSUS.md Section 7

mod event_bus;

pub use event_bus::*;
