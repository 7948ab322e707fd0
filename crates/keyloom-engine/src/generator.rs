//! Deterministic password generation for one `(username, site)` account
//!
//! Derivation is two-stage: site key from `(password seed, site id)` at
//! index 0, then account key from `(site key, username)` at the password
//! index. The account key expands into a byte stream; each byte (plus its
//! offset component, when regenerating) indexes the policy's alphabet.
//!
//! The offset-free path validates candidates and bumps the index on
//! rejection, bounded by [`MAX_PASSWORD_ATTEMPTS`]. Offset-driven
//! regeneration must reproduce history exactly: it never validates and
//! never retries.

use thiserror::Error;
use zeroize::Zeroizing;

use keyloom_crypto::{derive_key, expand, CryptoError, DerivedKey};
use keyloom_ppd::{generation_length, length_bounds, Alphabet, Ppd, PpdError, Validator};

use crate::offset::PasswordOffset;
use crate::PasswordIndex;

/// Upper bound on candidates tried before generation gives up.
pub const MAX_PASSWORD_ATTEMPTS: u64 = 5;

/// Errors from password generation and offset capture.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("password policy error: {0}")]
    Policy(#[from] PpdError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("no policy-satisfying password found after {attempts} attempts")]
    RetriesExhausted { attempts: u64 },

    #[error("password has {length} characters but the policy allows at most {max}")]
    PasswordTooLong { length: usize, max: usize },

    #[error("character {character:?} is not in the effective alphabet")]
    UnsupportedCharacter { character: char },
}

/// Generates and reproduces passwords for one account under one policy
/// snapshot. Alphabet, length bounds, and validator are resolved once at
/// construction.
pub struct PasswordGenerator {
    username: String,
    site_id: String,
    password_seed: DerivedKey,
    alphabet: Alphabet,
    max_length: usize,
    generation_length: usize,
    validator: Validator,
}

impl PasswordGenerator {
    pub fn new(
        username: &str,
        site_id: &str,
        password_seed: &DerivedKey,
        ppd: Option<&Ppd>,
    ) -> Result<Self, GenerateError> {
        let alphabet = Alphabet::resolve(ppd)?;
        let (_, max_length) = length_bounds(ppd);
        let validator = Validator::new(ppd)?;
        Ok(Self {
            username: username.to_string(),
            site_id: site_id.to_string(),
            password_seed: password_seed.clone(),
            alphabet,
            max_length,
            generation_length: generation_length(ppd),
            validator,
        })
    }

    /// Derive a password at `index`, returning it together with the index
    /// that produced it.
    ///
    /// Without an offset, candidates failing the policy advance the index,
    /// up to [`MAX_PASSWORD_ATTEMPTS`]. With an offset, the offset length is
    /// the candidate length and the result is returned as-is: regeneration
    /// reproduces history even when the password would fail today's policy.
    pub fn generate(
        &self,
        index: PasswordIndex,
        offset: Option<&PasswordOffset>,
    ) -> Result<(String, PasswordIndex), GenerateError> {
        if let Some(offset) = offset {
            // A zero-length capture round-trips to the empty password; the
            // byte stream requires length >= 1 and is never consulted.
            if offset.is_empty() {
                return Ok((String::new(), index));
            }
            let password = self.render(index, offset.len(), Some(offset))?;
            return Ok((password, index));
        }

        let mut index = index;
        for _ in 0..MAX_PASSWORD_ATTEMPTS {
            let candidate = self.render(index, self.generation_length, None)?;
            match self.validator.validate(&candidate) {
                Ok(()) => return Ok((candidate, index)),
                Err(violation) => {
                    tracing::debug!(%violation, index, "candidate rejected, advancing index");
                    index += 1;
                }
            }
        }
        Err(GenerateError::RetriesExhausted {
            attempts: MAX_PASSWORD_ATTEMPTS,
        })
    }

    /// Capture `password` as per-character deltas at `index`, so future
    /// [`generate`](Self::generate) calls with the offset reproduce it
    /// exactly. The password only needs to be alphabet-composed and within
    /// the policy's resolvable maximum length; it does not need to satisfy
    /// the rest of the policy.
    pub fn calculate_offset(
        &self,
        index: PasswordIndex,
        password: &str,
    ) -> Result<PasswordOffset, GenerateError> {
        let chars: Vec<char> = password.chars().collect();
        if chars.len() > self.max_length {
            return Err(GenerateError::PasswordTooLong {
                length: chars.len(),
                max: self.max_length,
            });
        }
        if chars.is_empty() {
            return Ok(PasswordOffset::from(Vec::new()));
        }

        let stream = self.stream_for(index, chars.len())?;
        let size = self.alphabet.len();
        let mut components = Vec::with_capacity(chars.len());
        for (&character, &byte) in chars.iter().zip(stream.iter()) {
            let position = self
                .alphabet
                .position_of(character)
                .ok_or(GenerateError::UnsupportedCharacter { character })?;
            components.push(((position + size - byte as usize % size) % size) as u32);
        }
        Ok(PasswordOffset::from(components))
    }

    /// Two-stage key derivation followed by stream expansion.
    fn stream_for(
        &self,
        index: PasswordIndex,
        length: usize,
    ) -> Result<Zeroizing<Vec<u8>>, GenerateError> {
        let site_key = derive_key(self.password_seed.as_bytes(), self.site_id.as_bytes(), 0)?;
        let account_key = derive_key(site_key.as_bytes(), self.username.as_bytes(), index)?;
        Ok(Zeroizing::new(expand(&account_key, length)?))
    }

    fn render(
        &self,
        index: PasswordIndex,
        length: usize,
        offset: Option<&PasswordOffset>,
    ) -> Result<String, GenerateError> {
        let stream = self.stream_for(index, length)?;
        let mut password = String::with_capacity(length);
        for (i, &byte) in stream.iter().enumerate() {
            let delta = offset.map_or(0, |o| o.components()[i] as usize);
            password.push(self.alphabet.char_at(byte as usize + delta));
        }
        Ok(password)
    }
}
