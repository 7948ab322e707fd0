//! Password validation against a policy snapshot
//!
//! [`Validator::new`] resolves every set reference and position spec up
//! front, so a malformed policy is a [`PpdError`] at construction, never a
//! password failure. Validation short-circuits on the first failed step and
//! reports a [`Violation`] value. Violations are ordinary outcomes, not
//! control-flow errors.
//!
//! All steps operate on Unicode scalar boundaries, never raw bytes, so
//! multi-byte alphabets cannot split characters.

use thiserror::Error;

use crate::model::{length_bounds, resolve_set_characters, Alphabet, Position, Ppd, PpdError};

/// Why a password failed validation. The first failed step wins.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Violation {
    #[error("password has {length} characters, minimum is {min}")]
    TooShort { length: usize, min: usize },

    #[error("password has {length} characters, maximum is {max}")]
    TooLong { length: usize, max: usize },

    #[error("character {character:?} at position {position} is outside the allowed sets")]
    DisallowedCharacter { character: char, position: usize },

    #[error("consecutive run ending at position {position} exceeds {max} characters")]
    ConsecutiveRun { position: usize, max: usize },

    #[error("character set {set:?} occurs {count} times, outside its occurrence bounds")]
    SetOccurrences {
        set: String,
        count: usize,
        min: Option<u32>,
        max: Option<u32>,
    },

    #[error("position restriction on set {set:?} matched {count} times, outside its bounds")]
    PositionRestriction {
        set: String,
        count: usize,
        min: u32,
        max: Option<u32>,
    },

    #[error("requirement group satisfied only {satisfied} rules, {required} required")]
    RequirementGroup { satisfied: usize, required: u32 },
}

/// A position restriction or requirement rule with its set and positions
/// resolved.
struct ResolvedRule {
    set_name: String,
    set: Vec<char>,
    /// `None` counts over the whole password (position-less group rules).
    positions: Option<Vec<Position>>,
    min_occurs: u32,
    max_occurs: Option<u32>,
}

impl ResolvedRule {
    fn occurrences(&self, chars: &[char]) -> usize {
        match &self.positions {
            Some(positions) => positions
                .iter()
                .filter_map(|position| position.resolve(chars.len()))
                .filter(|&index| {
                    chars
                        .get(index)
                        .map_or(false, |c| self.set.contains(c))
                })
                .count(),
            None => chars.iter().filter(|c| self.set.contains(c)).count(),
        }
    }

    fn passes(&self, chars: &[char]) -> bool {
        let count = self.occurrences(chars);
        count >= self.min_occurs as usize
            && self.max_occurs.map_or(true, |max| count <= max as usize)
    }
}

struct ResolvedSetting {
    name: String,
    set: Vec<char>,
    min: Option<u32>,
    max: Option<u32>,
}

struct ResolvedGroup {
    min_rules: u32,
    rules: Vec<ResolvedRule>,
}

/// Evaluates candidate passwords against one PPD snapshot.
pub struct Validator {
    min_length: usize,
    max_length: usize,
    /// `None` means unrestricted (absent and zero are the same sentinel).
    max_consecutive: Option<usize>,
    alphabet: Alphabet,
    settings: Vec<ResolvedSetting>,
    restrictions: Vec<ResolvedRule>,
    groups: Vec<ResolvedGroup>,
}

impl Validator {
    pub fn new(ppd: Option<&Ppd>) -> Result<Self, PpdError> {
        let alphabet = Alphabet::resolve(ppd)?;
        let (min_length, max_length) = length_bounds(ppd);
        let max_consecutive = ppd
            .and_then(|p| p.max_consecutive)
            .filter(|&v| v > 0)
            .map(|v| v as usize);

        let mut settings = Vec::new();
        let mut restrictions = Vec::new();
        let mut groups = Vec::new();

        if let Some(ppd) = ppd {
            for setting in &ppd.character_set_settings {
                settings.push(ResolvedSetting {
                    name: setting.name.clone(),
                    set: resolve_set_characters(Some(ppd), &setting.name)?,
                    min: setting.min_occurs,
                    max: setting.max_occurs,
                });
            }
            for restriction in &ppd.position_restrictions {
                restrictions.push(ResolvedRule {
                    set_name: restriction.character_set.clone(),
                    set: resolve_set_characters(Some(ppd), &restriction.character_set)?,
                    positions: Some(Position::parse_list(&restriction.positions)?),
                    min_occurs: restriction.min_occurs,
                    max_occurs: restriction.max_occurs,
                });
            }
            for group in &ppd.requirement_groups {
                let rules = group
                    .requirement_rules
                    .iter()
                    .map(|rule| -> Result<ResolvedRule, PpdError> {
                        Ok(ResolvedRule {
                            set_name: rule.character_set.clone(),
                            set: resolve_set_characters(Some(ppd), &rule.character_set)?,
                            positions: rule
                                .positions
                                .as_deref()
                                .map(Position::parse_list)
                                .transpose()?,
                            min_occurs: rule.min_occurs,
                            max_occurs: rule.max_occurs,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                groups.push(ResolvedGroup {
                    min_rules: group.min_rules,
                    rules,
                });
            }
        }

        Ok(Self {
            min_length,
            max_length,
            max_consecutive,
            alphabet,
            settings,
            restrictions,
            groups,
        })
    }

    /// Check `password` against every policy step, reporting the first
    /// violation.
    pub fn validate(&self, password: &str) -> Result<(), Violation> {
        let chars: Vec<char> = password.chars().collect();

        if chars.len() < self.min_length {
            return Err(Violation::TooShort {
                length: chars.len(),
                min: self.min_length,
            });
        }
        if chars.len() > self.max_length {
            return Err(Violation::TooLong {
                length: chars.len(),
                max: self.max_length,
            });
        }

        for (position, &character) in chars.iter().enumerate() {
            if !self.alphabet.contains(character) {
                return Err(Violation::DisallowedCharacter {
                    character,
                    position,
                });
            }
        }

        if let Some(max) = self.max_consecutive {
            check_runs(&chars, max)?;
        }

        for setting in &self.settings {
            let count = chars.iter().filter(|c| setting.set.contains(c)).count();
            let below = setting.min.map_or(false, |min| count < min as usize);
            let above = setting.max.map_or(false, |max| count > max as usize);
            if below || above {
                return Err(Violation::SetOccurrences {
                    set: setting.name.clone(),
                    count,
                    min: setting.min,
                    max: setting.max,
                });
            }
        }

        for rule in &self.restrictions {
            if !rule.passes(&chars) {
                return Err(Violation::PositionRestriction {
                    set: rule.set_name.clone(),
                    count: rule.occurrences(&chars),
                    min: rule.min_occurs,
                    max: rule.max_occurs,
                });
            }
        }

        for group in &self.groups {
            let satisfied = group.rules.iter().filter(|rule| rule.passes(&chars)).count();
            if satisfied < group.min_rules as usize {
                return Err(Violation::RequirementGroup {
                    satisfied,
                    required: group.min_rules,
                });
            }
        }

        Ok(())
    }

    pub fn is_valid(&self, password: &str) -> bool {
        self.validate(password).is_ok()
    }
}

/// Reject identical runs and ordered runs longer than `max`.
///
/// Ordered runs count only across ASCII letters or digits at adjacent scalar
/// values, in both directions ("abc", "321"). Specials have no natural order
/// and only count as identical repeats.
fn check_runs(chars: &[char], max: usize) -> Result<(), Violation> {
    let mut identical = 1usize;
    let mut ascending = 1usize;
    let mut descending = 1usize;

    for i in 1..chars.len() {
        let prev = chars[i - 1];
        let cur = chars[i];
        identical = if cur == prev { identical + 1 } else { 1 };
        ascending = if adjacent(prev, cur) { ascending + 1 } else { 1 };
        descending = if adjacent(cur, prev) { descending + 1 } else { 1 };

        if identical > max || ascending > max || descending > max {
            return Err(Violation::ConsecutiveRun { position: i, max });
        }
    }
    Ok(())
}

/// True when `b` directly follows `a` in a natural alphabet order.
fn adjacent(a: char, b: char) -> bool {
    a.is_ascii_alphanumeric() && b.is_ascii_alphanumeric() && (b as u32) == (a as u32) + 1
}
