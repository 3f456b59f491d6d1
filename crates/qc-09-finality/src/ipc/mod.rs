//! IPC module for Finality subsystem
//!
//! Reference: SPEC-09-FINALITY.md Section 6

pub mod handler;

pub use handler::FinalityIpcHandler;
