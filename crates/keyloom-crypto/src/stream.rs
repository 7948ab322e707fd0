//! Deterministic byte stream expansion
//!
//! A derived key is expanded into pseudorandom bytes with the ChaCha20
//! keystream (zero nonce, counter 0). The stream is prefix-consistent:
//! `expand(k, n)` is a prefix of `expand(k, m)` for `m > n`. Offset recovery
//! relies on this when it regenerates more bytes than were originally
//! consumed.

use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::ChaCha20;

use crate::error::CryptoError;
use crate::kdf::DerivedKey;

/// Upper bound on a single expansion request.
pub const MAX_STREAM_SIZE: usize = 4096;

/// Expand `key` into `length` deterministic pseudorandom bytes.
pub fn expand(key: &DerivedKey, length: usize) -> Result<Vec<u8>, CryptoError> {
    if length == 0 || length > MAX_STREAM_SIZE {
        return Err(CryptoError::RandomGeneration {
            requested: length,
            max: MAX_STREAM_SIZE,
        });
    }

    let mut cipher = ChaCha20::new(key.as_bytes().into(), &[0u8; 12].into());
    let mut buffer = vec![0u8; length];
    cipher.apply_keystream(&mut buffer);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_key() -> DerivedKey {
        DerivedKey::from_bytes([7u8; 32])
    }

    #[test]
    fn test_expand_deterministic() {
        let s1 = expand(&test_key(), 64).unwrap();
        let s2 = expand(&test_key(), 64).unwrap();
        assert_eq!(s1, s2, "stream must be deterministic");
    }

    #[test]
    fn test_expand_different_keys() {
        let s1 = expand(&DerivedKey::from_bytes([1u8; 32]), 64).unwrap();
        let s2 = expand(&DerivedKey::from_bytes([2u8; 32]), 64).unwrap();
        assert_ne!(s1, s2, "different keys must produce different streams");
    }

    #[test]
    fn test_expand_rejects_bad_lengths() {
        assert!(matches!(
            expand(&test_key(), 0),
            Err(CryptoError::RandomGeneration { requested: 0, .. })
        ));
        assert!(matches!(
            expand(&test_key(), MAX_STREAM_SIZE + 1),
            Err(CryptoError::RandomGeneration { .. })
        ));
        assert!(expand(&test_key(), MAX_STREAM_SIZE).is_ok());
    }

    #[test]
    fn test_zero_key_matches_rfc_8439_keystream() {
        // RFC 8439 A.1 test vector #1: all-zero key, all-zero nonce, counter 0
        let stream = expand(&DerivedKey::from_bytes([0u8; 32]), 16).unwrap();
        assert_eq!(
            stream,
            [
                0x76, 0xb8, 0xe0, 0xad, 0xa0, 0xf1, 0x3d, 0x90, 0x40, 0x5d, 0x6a, 0xe5, 0x53,
                0x86, 0xbd, 0x28
            ]
        );
    }

    proptest! {
        #[test]
        fn stream_is_prefix_consistent(
            key in proptest::array::uniform32(any::<u8>()),
            short in 1usize..=256,
            extra in 0usize..=256,
        ) {
            let key = DerivedKey::from_bytes(key);
            let small = expand(&key, short).unwrap();
            let large = expand(&key, short + extra).unwrap();
            prop_assert_eq!(&large[..short], &small[..]);
        }
    }
}
