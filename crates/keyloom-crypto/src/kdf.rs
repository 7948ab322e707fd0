//! HKDF-SHA256 subkey derivation from the root seed
//!
//! Every derivation is a pure function of `(secret, context, index)`. The
//! context is compressed to a short printable tag (BLAKE3 → base64 → 8
//! chars) so arbitrarily long context strings feed the KDF in a fixed shape.
//! Two-stage usage: callers first derive a per-site key from
//! `(password seed, site id)`, then a per-account key from
//! `(site key, username, password index)`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::{KEY_SIZE, MIN_SEED_SIZE, SEED_SIZE};

/// Maximum output of a single HKDF-SHA256 derivation (255 hash blocks).
pub const MAX_DERIVE_SIZE: usize = 255 * 32;

/// Length of a context tag in characters.
pub const CONTEXT_TAG_SIZE: usize = 8;

/// Context under which the purpose sub-seeds are derived from the root seed.
const SEED_CONTEXT: &[u8] = b"keyloom";

/// The root secret, received from the secure-store collaborator for the
/// duration of a derivation call. Never persisted by this crate.
///
/// Zeroized on drop to prevent secrets lingering in memory.
#[derive(Clone)]
pub struct Seed {
    bytes: Vec<u8>,
}

impl Seed {
    /// Wrap raw seed bytes. Rejects buffers shorter than [`MIN_SEED_SIZE`].
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CryptoError> {
        if bytes.len() < MIN_SEED_SIZE {
            return Err(CryptoError::SeedTooShort {
                length: bytes.len(),
                min: MIN_SEED_SIZE,
            });
        }
        Ok(Self { bytes })
    }

    /// Generate a fresh random seed of [`SEED_SIZE`] bytes.
    ///
    /// Called once at account setup; the secure store owns the result.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; SEED_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Construct from bytes already validated elsewhere (mnemonic decoding).
    pub(crate) fn from_raw(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for Seed {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Seed").field("bytes", &"[REDACTED]").finish()
    }
}

/// A 256-bit subkey produced by [`derive_key`]. Ephemeral: exists only
/// within a single generation call. Zeroized on drop.
#[derive(Clone)]
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Short printable derivation context: the first 8 bytes of the BLAKE3 hash
/// of the context, base64-encoded and truncated to [`CONTEXT_TAG_SIZE`]
/// characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextTag(String);

impl ContextTag {
    pub fn new(context: &[u8]) -> Self {
        let hash = blake3::hash(context);
        let mut tag = STANDARD.encode(&hash.as_bytes()[..8]);
        tag.truncate(CONTEXT_TAG_SIZE);
        Self(tag)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Derive `output_length` bytes from `(secret, context, index)` via
/// HKDF-SHA256.
///
/// Deterministic and side-effect free: the same inputs always produce the
/// same output. The HKDF info is the context tag followed by the big-endian
/// index, so derivations under different contexts or indices are unrelated.
pub fn derive(
    secret: &[u8],
    context: &[u8],
    index: u64,
    output_length: usize,
) -> Result<Vec<u8>, CryptoError> {
    if output_length == 0 || output_length > MAX_DERIVE_SIZE {
        return Err(CryptoError::KeyDerivation {
            requested: output_length,
            max: MAX_DERIVE_SIZE,
        });
    }

    let tag = ContextTag::new(context);
    let mut info = Vec::with_capacity(CONTEXT_TAG_SIZE + 8);
    info.extend_from_slice(tag.as_str().as_bytes());
    info.extend_from_slice(&index.to_be_bytes());

    let hkdf = Hkdf::<Sha256>::new(None, secret);
    let mut okm = vec![0u8; output_length];
    hkdf.expand(&info, &mut okm)
        .map_err(|_| CryptoError::KeyDerivation {
            requested: output_length,
            max: MAX_DERIVE_SIZE,
        })?;
    Ok(okm)
}

/// 32-byte convenience wrapper around [`derive`], the shape every caller in
/// this system uses.
pub fn derive_key(secret: &[u8], context: &[u8], index: u64) -> Result<DerivedKey, CryptoError> {
    let mut okm = derive(secret, context, index, KEY_SIZE)?;
    let mut bytes = [0u8; KEY_SIZE];
    bytes.copy_from_slice(&okm);
    okm.zeroize();
    Ok(DerivedKey::from_bytes(bytes))
}

/// Derive the password sub-seed from the root seed.
///
/// Password generation consumes this sub-seed, never the raw seed, so the
/// password and backup domains stay independently rotatable.
pub fn derive_password_seed(seed: &Seed) -> Result<DerivedKey, CryptoError> {
    derive_key(seed.as_bytes(), SEED_CONTEXT, 0)
}

/// Derive the backup sub-seed, reserved for the persistence collaborator's
/// encryption keys.
pub fn derive_backup_seed(seed: &Seed) -> Result<DerivedKey, CryptoError> {
    derive_key(seed.as_bytes(), SEED_CONTEXT, 1)
}
