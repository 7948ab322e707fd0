use thiserror::Error;

/// Errors from key derivation and byte-stream expansion.
///
/// These are caller errors (bad lengths) or primitive failures; they are
/// never retried within this crate.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("seed too short: {length} bytes (minimum {min})")]
    SeedTooShort { length: usize, min: usize },

    #[error("invalid derivation output length: {requested} (must be 1..={max})")]
    KeyDerivation { requested: usize, max: usize },

    #[error("invalid byte stream length: {requested} (must be 1..={max})")]
    RandomGeneration { requested: usize, max: usize },
}

/// Errors from the mnemonic seed codec.
///
/// `UnknownWord` and `ChecksumMismatch` are recoverable: the caller
/// re-prompts the user for corrected words instead of aborting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MnemonicError {
    #[error("unsupported seed length: {length} bytes")]
    UnsupportedSeedLength { length: usize },

    #[error("invalid word count: {count} (expected 12, 15, 18, 21, or 24)")]
    InvalidWordCount { count: usize },

    #[error("unknown word {word:?} at position {position}")]
    UnknownWord { word: String, position: usize },

    #[error("mnemonic checksum mismatch")]
    ChecksumMismatch,
}
