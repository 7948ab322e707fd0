//! Mnemonic seed codec: `seed || checksum` as 11-bit word indices
//!
//! The checksum is the first `seed_len/4` bits of SHA-256 over the seed,
//! appended to the seed bits and split into 11-bit groups indexing the
//! 2048-word English list. For English with SHA-256 this coincides with
//! BIP-39, so published vectors pin the encoding.
//!
//! Encoding is read-only and non-destructive; decoding verifies the checksum
//! before a seed is reconstructed. Checksum and unknown-word failures are
//! recoverable: the caller re-prompts the user for corrected words.

use bip39::Language;
use sha2::{Digest, Sha256};

use crate::error::MnemonicError;
use crate::kdf::Seed;

/// Seed lengths the codec supports, in bytes.
const SUPPORTED_SEED_SIZES: [usize; 5] = [16, 20, 24, 28, 32];

/// Word counts corresponding to the supported seed lengths.
const SUPPORTED_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Encode a seed as a word sequence for paper backup.
pub fn to_mnemonic(seed: &Seed) -> Result<Vec<String>, MnemonicError> {
    let bytes = seed.as_bytes();
    if !SUPPORTED_SEED_SIZES.contains(&bytes.len()) {
        return Err(MnemonicError::UnsupportedSeedLength {
            length: bytes.len(),
        });
    }

    let checksum_bits = bytes.len() / 4;
    let digest = Sha256::digest(bytes);

    let mut bits = Vec::with_capacity(bytes.len() * 8 + checksum_bits);
    for &byte in bytes {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1 == 1);
        }
    }
    for i in 0..checksum_bits {
        bits.push((digest[i / 8] >> (7 - i % 8)) & 1 == 1);
    }

    // The English list is statically 2048 words, so every 11-bit group is a
    // valid index.
    let word_list = Language::English.word_list();
    let words = bits
        .chunks(11)
        .map(|group| {
            let index = group.iter().fold(0usize, |acc, &bit| (acc << 1) | bit as usize);
            word_list[index].to_string()
        })
        .collect();
    Ok(words)
}

/// Reconstruct a seed from a word sequence, verifying the checksum.
pub fn from_mnemonic(words: &[&str]) -> Result<Seed, MnemonicError> {
    if !SUPPORTED_WORD_COUNTS.contains(&words.len()) {
        return Err(MnemonicError::InvalidWordCount { count: words.len() });
    }

    let word_list = Language::English.word_list();
    let mut bits = Vec::with_capacity(words.len() * 11);
    for (position, word) in words.iter().enumerate() {
        let index = word_list
            .iter()
            .position(|candidate| candidate == word)
            .ok_or_else(|| MnemonicError::UnknownWord {
                word: (*word).to_string(),
                position,
            })?;
        for shift in (0..11).rev() {
            bits.push((index >> shift) & 1 == 1);
        }
    }

    let checksum_bits = words.len() / 3;
    let seed_bits = bits.len() - checksum_bits;
    let mut bytes = vec![0u8; seed_bits / 8];
    for (i, &bit) in bits[..seed_bits].iter().enumerate() {
        if bit {
            bytes[i / 8] |= 1 << (7 - i % 8);
        }
    }

    let digest = Sha256::digest(&bytes);
    for (i, &bit) in bits[seed_bits..].iter().enumerate() {
        let expected = (digest[i / 8] >> (7 - i % 8)) & 1 == 1;
        if bit != expected {
            return Err(MnemonicError::ChecksumMismatch);
        }
    }

    // Supported word counts decode to at least 16 bytes, so the seed minimum
    // always holds.
    Ok(Seed::from_raw(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn patterned_seed(len: usize) -> Seed {
        Seed::from_bytes((0..len).map(|i| (i * 37 + 11) as u8).collect()).unwrap()
    }

    fn roundtrip(seed: &Seed) -> Seed {
        let words = to_mnemonic(seed).unwrap();
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        from_mnemonic(&refs).unwrap()
    }

    #[test]
    fn test_roundtrip_all_supported_lengths() {
        for (len, word_count) in SUPPORTED_SEED_SIZES.iter().zip(SUPPORTED_WORD_COUNTS) {
            let seed = patterned_seed(*len);
            let words = to_mnemonic(&seed).unwrap();
            assert_eq!(words.len(), word_count);

            let recovered = roundtrip(&seed);
            assert_eq!(recovered.as_bytes(), seed.as_bytes());
        }
    }

    #[test]
    fn test_unsupported_seed_lengths() {
        let seed = Seed::from_bytes(vec![0u8; 17]).unwrap();
        assert_eq!(
            to_mnemonic(&seed),
            Err(MnemonicError::UnsupportedSeedLength { length: 17 })
        );

        let seed = Seed::from_bytes(vec![0u8; 36]).unwrap();
        assert_eq!(
            to_mnemonic(&seed),
            Err(MnemonicError::UnsupportedSeedLength { length: 36 })
        );
    }

    #[test]
    fn test_published_vector_all_zero() {
        let seed = Seed::from_bytes(vec![0u8; 16]).unwrap();
        let words = to_mnemonic(&seed).unwrap();
        let mut expected = vec!["abandon"; 11];
        expected.push("about");
        assert_eq!(words, expected);
    }

    #[test]
    fn test_published_vector_all_ones() {
        let seed = Seed::from_bytes(vec![0xFF; 16]).unwrap();
        let words = to_mnemonic(&seed).unwrap();
        let mut expected = vec!["zoo"; 11];
        expected.push("wrong");
        assert_eq!(words, expected);
    }

    #[test]
    fn test_published_vector_all_zero_32_bytes() {
        let seed = Seed::from_bytes(vec![0u8; 32]).unwrap();
        let words = to_mnemonic(&seed).unwrap();
        let mut expected = vec!["abandon"; 23];
        expected.push("art");
        assert_eq!(words, expected);
    }

    #[test]
    fn test_encoding_matches_reference_implementation() {
        for len in SUPPORTED_SEED_SIZES {
            let seed = patterned_seed(len);
            let words = to_mnemonic(&seed).unwrap();
            let reference = bip39::Mnemonic::from_entropy(seed.as_bytes()).unwrap();
            assert_eq!(words.join(" "), reference.to_string());
        }
    }

    #[test]
    fn test_invalid_word_counts() {
        assert_eq!(
            from_mnemonic(&[]).unwrap_err(),
            MnemonicError::InvalidWordCount { count: 0 }
        );
        assert_eq!(
            from_mnemonic(&["abandon"; 11]).unwrap_err(),
            MnemonicError::InvalidWordCount { count: 11 }
        );
        assert_eq!(
            from_mnemonic(&["abandon"; 13]).unwrap_err(),
            MnemonicError::InvalidWordCount { count: 13 }
        );
    }

    #[test]
    fn test_unknown_word_reports_position() {
        let mut words = vec!["abandon"; 12];
        words[7] = "keyboard-cat";
        assert_eq!(
            from_mnemonic(&words).unwrap_err(),
            MnemonicError::UnknownWord {
                word: "keyboard-cat".to_string(),
                position: 7,
            }
        );
    }

    #[test]
    fn test_checksum_mismatch_known_bad_phrases() {
        // Valid words, wrong final checksum bits: the all-zero phrase must end
        // in "about" and the all-ones phrase in "wrong".
        assert_eq!(
            from_mnemonic(&["abandon"; 12]).unwrap_err(),
            MnemonicError::ChecksumMismatch
        );
        assert_eq!(
            from_mnemonic(&["zoo"; 12]).unwrap_err(),
            MnemonicError::ChecksumMismatch
        );
    }

    #[test]
    fn test_word_corruption_agrees_with_reference_parser() {
        let seed = patterned_seed(16);
        let words = to_mnemonic(&seed).unwrap();

        for position in 0..words.len() {
            for replacement in ["abandon", "zoo", "legal"] {
                if words[position] == replacement {
                    continue;
                }
                let mut corrupted: Vec<&str> =
                    words.iter().map(String::as_str).collect();
                corrupted[position] = replacement;

                let ours = from_mnemonic(&corrupted);
                let reference = bip39::Mnemonic::parse_in(
                    Language::English,
                    &corrupted.join(" "),
                );
                assert_eq!(
                    ours.is_ok(),
                    reference.is_ok(),
                    "decoder disagrees with reference at position {position}"
                );
                if ours.is_err() {
                    assert_eq!(ours.unwrap_err(), MnemonicError::ChecksumMismatch);
                }
            }
        }
    }

    proptest! {
        #[test]
        fn mnemonic_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 16..=16)) {
            let seed = Seed::from_bytes(bytes).unwrap();
            let words = to_mnemonic(&seed).unwrap();
            let refs: Vec<&str> = words.iter().map(String::as_str).collect();
            let recovered = from_mnemonic(&refs).unwrap();
            prop_assert_eq!(recovered.as_bytes(), seed.as_bytes());
        }

        #[test]
        fn mnemonic_matches_reference(bytes in proptest::collection::vec(any::<u8>(), 32..=32)) {
            let seed = Seed::from_bytes(bytes).unwrap();
            let words = to_mnemonic(&seed).unwrap();
            let reference = bip39::Mnemonic::from_entropy(seed.as_bytes()).unwrap();
            prop_assert_eq!(words.join(" "), reference.to_string());
        }
    }
}
