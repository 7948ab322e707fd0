//! keyloom-ppd: Password Policy Description model and validator
//!
//! A PPD describes one site's password composition rules: allowed character
//! sets, length bounds, consecutive-run limits, per-set occurrence bounds,
//! positional restrictions, and "at least K of N rules" requirement groups.
//!
//! The model resolves to a pinned [`Alphabet`] whose construction order is
//! part of the offset reproducibility contract: validator and generator must
//! agree on exactly one alphabet order, forever, for a given policy.

pub mod model;
pub mod validator;

pub use model::{
    generation_length, length_bounds, Alphabet, BuiltinSet, CharacterSet, CharacterSetSetting,
    Position, PositionRestriction, Ppd, PpdError, RequirementGroup, RequirementRule,
    MAX_LENGTH_BOUND, MIN_LENGTH_BOUND,
};
pub use validator::{Validator, Violation};
