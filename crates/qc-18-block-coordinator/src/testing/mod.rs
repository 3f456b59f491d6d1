//! Hand-rolled mock collaborators, shipped as part of the crate so both
//! this crate's `#[cfg(test)]` unit suites and the crate-level `tests/`
//! scenario suite can drive the coordinator without a real chain store,
//! state store, or execution engine.

pub mod mocks;
