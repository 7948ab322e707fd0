//! PPD document model and resolution
//!
//! PPD documents arrive as already-parsed JSON (camelCase keys, every field
//! optional) from the policy-source collaborator. A loaded document is an
//! immutable snapshot: one validate/generate call sees one consistent policy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard default minimum password length.
pub const MIN_LENGTH_BOUND: usize = 8;

/// Hard default maximum password length, and the cap on generated passwords.
pub const MAX_LENGTH_BOUND: usize = 50;

/// Errors raised while loading or resolving a policy. A malformed PPD fails
/// loudly here, before any key material is derived.
#[derive(Debug, Error)]
pub enum PpdError {
    #[error("invalid PPD document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown character set: {name}")]
    UnknownCharacterSet { name: String },

    #[error("policy resolves to an empty alphabet")]
    EmptyAlphabet,

    #[error("invalid position specifier: {raw:?}")]
    InvalidPosition { raw: String },
}

/// A site's Password Policy Description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ppd {
    /// Canonical site URL this policy was fetched for.
    pub url: Option<String>,
    /// Human-readable site name.
    pub name: Option<String>,
    /// Policy document revision.
    pub version: Option<String>,
    /// Declared character sets, in declaration order. Absent means the
    /// built-in sets in their pinned order.
    pub character_sets: Option<Vec<CharacterSet>>,
    /// Minimum password length. Absent or zero falls back to
    /// [`MIN_LENGTH_BOUND`].
    pub min_length: Option<u32>,
    /// Maximum password length. Absent or zero falls back to
    /// [`MAX_LENGTH_BOUND`].
    pub max_length: Option<u32>,
    /// Longest allowed run of identical or ordered characters. Absent and
    /// zero both mean unrestricted.
    pub max_consecutive: Option<u32>,
    /// Whole-password occurrence bounds per character set.
    pub character_set_settings: Vec<CharacterSetSetting>,
    /// Occurrence bounds at specific positions.
    pub position_restrictions: Vec<PositionRestriction>,
    /// "At least K of N rules" constraint groups.
    pub requirement_groups: Vec<RequirementGroup>,
}

impl Ppd {
    /// Parse a PPD document from JSON.
    pub fn from_json(json: &str) -> Result<Self, PpdError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize back to JSON (for the policy cache).
    pub fn to_json(&self) -> Result<String, PpdError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A named character set. Without explicit `characters` the name must refer
/// to a built-in set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSet {
    pub name: String,
    pub characters: Option<String>,
}

/// Whole-password occurrence bounds for one named set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharacterSetSetting {
    pub name: String,
    pub min_occurs: Option<u32>,
    pub max_occurs: Option<u32>,
}

/// Occurrence bounds for a named set at specific positions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PositionRestriction {
    /// Comma-separated position list; see [`Position`].
    pub positions: String,
    pub min_occurs: u32,
    pub max_occurs: Option<u32>,
    pub character_set: String,
}

/// A group of rules of which at least `min_rules` must pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequirementGroup {
    pub min_rules: u32,
    pub requirement_rules: Vec<RequirementRule>,
}

impl Default for RequirementGroup {
    fn default() -> Self {
        Self {
            min_rules: 1,
            requirement_rules: Vec::new(),
        }
    }
}

/// A single rule inside a requirement group. Structurally a position
/// restriction, but `positions` may be omitted to count over the whole
/// password.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequirementRule {
    pub positions: Option<String>,
    pub min_occurs: u32,
    pub max_occurs: Option<u32>,
    pub character_set: String,
}

/// The built-in character sets, in their pinned fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinSet {
    LowerLetters,
    UpperLetters,
    Numbers,
    Specials,
}

impl BuiltinSet {
    /// Fallback order when a policy declares no sets: lower → upper →
    /// numbers → specials.
    pub const ALL: [BuiltinSet; 4] = [
        BuiltinSet::LowerLetters,
        BuiltinSet::UpperLetters,
        BuiltinSet::Numbers,
        BuiltinSet::Specials,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinSet::LowerLetters => "LowerLetters",
            BuiltinSet::UpperLetters => "UpperLetters",
            BuiltinSet::Numbers => "Numbers",
            BuiltinSet::Specials => "Specials",
        }
    }

    pub fn characters(self) -> &'static str {
        match self {
            BuiltinSet::LowerLetters => "abcdefghijklmnopqrstuvwxyz",
            BuiltinSet::UpperLetters => "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            BuiltinSet::Numbers => "0123456789",
            BuiltinSet::Specials => r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        BuiltinSet::ALL.into_iter().find(|set| set.name() == name)
    }
}

/// Resolve a character-set name against the policy's declared sets, falling
/// back to the built-ins. Rules and settings reference sets by name; an
/// unresolvable name is a policy error.
pub(crate) fn resolve_set_characters(
    ppd: Option<&Ppd>,
    name: &str,
) -> Result<Vec<char>, PpdError> {
    if let Some(sets) = ppd.and_then(|p| p.character_sets.as_deref()) {
        if let Some(set) = sets.iter().find(|s| s.name == name) {
            if let Some(explicit) = &set.characters {
                return Ok(explicit.chars().collect());
            }
        }
    }
    BuiltinSet::from_name(name)
        .map(|set| set.characters().chars().collect())
        .ok_or_else(|| PpdError::UnknownCharacterSet {
            name: name.to_string(),
        })
}

/// The effective allowed alphabet for one policy snapshot.
///
/// Construction order is pinned: declared sets in declaration order, first
/// occurrence wins on duplicate characters; without declared sets, the
/// built-ins in [`BuiltinSet::ALL`] order. The order is part of the offset
/// reproducibility contract and must never change for a given policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    pub fn resolve(ppd: Option<&Ppd>) -> Result<Self, PpdError> {
        let mut chars: Vec<char> = Vec::new();
        match ppd.and_then(|p| p.character_sets.as_deref()) {
            Some(sets) => {
                for set in sets {
                    match &set.characters {
                        Some(explicit) => {
                            for c in explicit.chars() {
                                if !chars.contains(&c) {
                                    chars.push(c);
                                }
                            }
                        }
                        None => {
                            let builtin = BuiltinSet::from_name(&set.name).ok_or_else(|| {
                                PpdError::UnknownCharacterSet {
                                    name: set.name.clone(),
                                }
                            })?;
                            for c in builtin.characters().chars() {
                                if !chars.contains(&c) {
                                    chars.push(c);
                                }
                            }
                        }
                    }
                }
            }
            None => {
                for set in BuiltinSet::ALL {
                    chars.extend(set.characters().chars());
                }
            }
        }

        if chars.is_empty() {
            return Err(PpdError::EmptyAlphabet);
        }
        Ok(Self { chars })
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Character at `index` modulo the alphabet size: the generator's
    /// byte-to-character map. The alphabet is never empty by construction.
    pub fn char_at(&self, index: usize) -> char {
        self.chars[index % self.chars.len()]
    }

    /// Position of `c` in the alphabet: the inverse map used for offset
    /// capture.
    pub fn position_of(&self, c: char) -> Option<usize> {
        self.chars.iter().position(|&member| member == c)
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }
}

/// A parsed position specifier.
///
/// `"3"` counts from the start, `"-1"` from the end, and a value strictly
/// between 0 and 1 (`"0.5"`) is a ratio of the password length, rounded
/// down.
#[derive(Debug, Clone, PartialEq)]
pub enum Position {
    FromStart(usize),
    FromEnd(usize),
    Ratio(f64),
}

impl Position {
    /// Parse a comma-separated position list.
    pub fn parse_list(spec: &str) -> Result<Vec<Position>, PpdError> {
        spec.split(',').map(Position::parse_token).collect()
    }

    fn parse_token(raw: &str) -> Result<Position, PpdError> {
        let token = raw.trim();
        if let Ok(value) = token.parse::<i64>() {
            return if value >= 0 {
                Ok(Position::FromStart(value as usize))
            } else {
                Ok(Position::FromEnd(value.unsigned_abs() as usize))
            };
        }
        if let Ok(ratio) = token.parse::<f64>() {
            if ratio > 0.0 && ratio < 1.0 {
                return Ok(Position::Ratio(ratio));
            }
        }
        Err(PpdError::InvalidPosition {
            raw: token.to_string(),
        })
    }

    /// Resolve to a concrete zero-based index for a password of `length`
    /// characters. Out-of-range positions resolve to `None` and contribute
    /// no occurrences.
    pub fn resolve(&self, length: usize) -> Option<usize> {
        match *self {
            Position::FromStart(index) => (index < length).then_some(index),
            Position::FromEnd(back) => length.checked_sub(back),
            Position::Ratio(ratio) => Some((ratio * length as f64).floor() as usize),
        }
    }
}

/// Resolve `(min, max)` length bounds. Absent or zero bounds fall back to
/// the hard defaults; if the resolved minimum exceeds the resolved maximum,
/// the minimum clamps down so generation stays possible.
pub fn length_bounds(ppd: Option<&Ppd>) -> (usize, usize) {
    let min = ppd
        .and_then(|p| p.min_length)
        .filter(|&v| v > 0)
        .map(|v| v as usize)
        .unwrap_or(MIN_LENGTH_BOUND);
    let max = ppd
        .and_then(|p| p.max_length)
        .filter(|&v| v > 0)
        .map(|v| v as usize)
        .unwrap_or(MAX_LENGTH_BOUND);
    (min.min(max), max)
}

/// Length of generated passwords: the resolved maximum, capped at
/// [`MAX_LENGTH_BOUND`]. Generating the longest allowed password maximizes
/// entropy.
pub fn generation_length(ppd: Option<&Ppd>) -> usize {
    length_bounds(ppd).1.min(MAX_LENGTH_BOUND)
}
