//! Reversible password offsets
//!
//! An offset holds `(alphabet_position - stream_byte) mod alphabet_size` per
//! character. Adding it back during regeneration reproduces the exact
//! historical password even after the policy or generator parameters have
//! changed. The persistence collaborator stores offsets alongside
//! `(site_id, username, index)` — never the password itself.

use serde::{Deserialize, Serialize};

/// Per-character deltas captured by
/// [`calculate_offset`](crate::PasswordGenerator::calculate_offset).
///
/// Invariant: one component per password character at capture time;
/// regeneration uses the offset length as the candidate length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordOffset(Vec<u32>);

impl PasswordOffset {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }
}

impl From<Vec<u32>> for PasswordOffset {
    fn from(components: Vec<u32>) -> Self {
        Self(components)
    }
}
