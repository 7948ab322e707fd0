//! keyloom-engine: deterministic password generation and offset recovery
//!
//! Combines keyloom-crypto's key hierarchy with keyloom-ppd's policy model:
//! site key → account key → ChaCha20 byte stream → alphabet characters. A
//! [`PasswordOffset`] captures any known password as per-character deltas
//! against that stream, so the persistence collaborator can store
//! `(site_id, username, index, offset)` and reproduce the password
//! bit-for-bit later — without ever storing the password itself.

pub mod generator;
pub mod offset;

pub use generator::{GenerateError, PasswordGenerator, MAX_PASSWORD_ATTEMPTS};
pub use offset::PasswordOffset;

/// Per-account rotation counter, advanced on every password change so
/// successive passwords are cryptographically unrelated. The caller
/// serializes advancement; the engine treats it as a pure parameter.
pub type PasswordIndex = u64;
