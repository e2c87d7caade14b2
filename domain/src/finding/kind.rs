//! Validation-output kinds and their two orderings.
//!
//! | Kind | `priority()` | `report_rank()` | Questions allowed |
//! |------|-------------:|----------------:|:-----------------:|
//! | `TRANSLATION_AMBIGUOUS` | 1 | 1 | yes |
//! | `IMPOSSIBLE` | 2 | 2 | no |
//! | `INVALID` | 3 | 3 | no |
//! | `SATISFIABLE` | 4 | 4 | yes |
//! | `NO_TRANSLATIONS` | 99 | 6 | no |
//! | `VALID` | 100 | 5 | no |
//! | `TOO_COMPLEX` | 999 | 0 | no |
//!
//! `priority()` orders findings for the rewrite loop (lower is processed
//! first). `report_rank()` picks the overall kind of a validation pass from
//! the kinds of its findings, which is why a pass can be `VALID` while
//! still carrying `NO_TRANSLATIONS` findings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Judgment category of a finding or of a whole validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationKind {
    TranslationAmbiguous,
    Impossible,
    Invalid,
    Satisfiable,
    NoTranslations,
    Valid,
    TooComplex,
}

impl ValidationKind {
    pub const ALL: [ValidationKind; 7] = [
        ValidationKind::TranslationAmbiguous,
        ValidationKind::Impossible,
        ValidationKind::Invalid,
        ValidationKind::Satisfiable,
        ValidationKind::NoTranslations,
        ValidationKind::Valid,
        ValidationKind::TooComplex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationKind::TranslationAmbiguous => "TRANSLATION_AMBIGUOUS",
            ValidationKind::Impossible => "IMPOSSIBLE",
            ValidationKind::Invalid => "INVALID",
            ValidationKind::Satisfiable => "SATISFIABLE",
            ValidationKind::NoTranslations => "NO_TRANSLATIONS",
            ValidationKind::Valid => "VALID",
            ValidationKind::TooComplex => "TOO_COMPLEX",
        }
    }

    /// Sort key for the rewrite loop. Lower values are addressed first.
    pub fn priority(&self) -> u16 {
        match self {
            ValidationKind::TranslationAmbiguous => 1,
            ValidationKind::Impossible => 2,
            ValidationKind::Invalid => 3,
            ValidationKind::Satisfiable => 4,
            ValidationKind::NoTranslations => 99,
            ValidationKind::Valid => 100,
            ValidationKind::TooComplex => 999,
        }
    }

    /// Precedence used when collapsing a finding list into one overall kind.
    pub fn report_rank(&self) -> u8 {
        match self {
            ValidationKind::TooComplex => 0,
            ValidationKind::TranslationAmbiguous => 1,
            ValidationKind::Impossible => 2,
            ValidationKind::Invalid => 3,
            ValidationKind::Satisfiable => 4,
            ValidationKind::Valid => 5,
            ValidationKind::NoTranslations => 6,
        }
    }

    /// Only ambiguity and satisfiability can be changed by more user input.
    pub fn allows_questions(&self) -> bool {
        matches!(
            self,
            ValidationKind::TranslationAmbiguous | ValidationKind::Satisfiable
        )
    }

    /// Whether a finding of this kind can drive a rewrite pass.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, ValidationKind::NoTranslations)
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        ValidationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("Unknown validation kind: {}", s))
    }
}
