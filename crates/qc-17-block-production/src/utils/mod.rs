//! Utility modules for block production

pub mod hashing;
pub mod validation;

pub use hashing::{
    blake3, blake3d, meets_difficulty, serialize_block_header, sha256, sha256d, transaction_hash,
};
pub use validation::{batch, GasValidator, SignatureValidator, TransactionValidator};
