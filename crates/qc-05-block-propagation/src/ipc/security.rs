//! IPC security for Block Propagation subsystem.
//!
//! Uses centralized security module from shared-types.

pub use shared_types::security::{MessageVerifier, NonceCache};
pub use shared_types::AuthenticatedMessage;
