//! keyloom-crypto: deterministic key material for password derivation
//!
//! Key hierarchy:
//! ```text
//! Seed (raw high-entropy bytes, owned by the secure-store collaborator)
//!   ├── Password Seed (HKDF, context "keyloom", index 0)
//!   │     └── Site Key (HKDF, context = site id, index 0)
//!   │           └── Account Key (HKDF, context = username, index = password index)
//!   │                 └── ChaCha20 byte stream → password characters
//!   └── Backup Seed (HKDF, context "keyloom", index 1)
//! ```
//!
//! Every operation is a synchronous pure function of its inputs: same inputs,
//! same bytes, no I/O, no shared state. The mnemonic codec encodes the raw
//! seed (plus a SHA-256 checksum prefix) as words for paper backup.

pub mod error;
pub mod kdf;
pub mod mnemonic;
pub mod stream;

pub use error::{CryptoError, MnemonicError};
pub use kdf::{
    derive, derive_backup_seed, derive_key, derive_password_seed, ContextTag, DerivedKey, Seed,
};
pub use mnemonic::{from_mnemonic, to_mnemonic};
pub use stream::expand;

/// Size of a derived key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Minimum accepted seed size in bytes (128-bit)
pub const MIN_SEED_SIZE: usize = 16;

/// Seed size produced by `Seed::generate` (128-bit, 12 mnemonic words)
pub const SEED_SIZE: usize = 16;
