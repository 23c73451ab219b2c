//! Error types for compendium construction.
//!
//! Every error is fatal to the build: a dataset that produces one of
//! these cannot be trusted, so construction is aborted instead of
//! silently defaulting. Query-time misses are not errors.

use crate::entity::EntityKind;
use crate::name::Name;
use thiserror::Error;

/// Errors that can occur while building a compendium.
///
/// # Examples
///
/// ```rust
/// use demon_compendium::CompendiumError;
///
/// let err = CompendiumError::UnknownCode { code: 'z' };
/// assert_eq!(err.to_string(), "Unknown resist code: 'z'");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompendiumError {
    /// A resist code character is not part of the title's alphabet.
    #[error("Unknown resist code: '{code}'")]
    UnknownCode { code: char },

    /// A resist code cannot be packed into `(category << 10) | severity`.
    #[error("Resist code {code} cannot be packed: {reason}")]
    InvalidPackedCode { code: i32, reason: &'static str },

    /// A price estimate does not fit in an `i64`.
    #[error("Price estimate overflows for pcoeff {pcoeff} and stat sum {stat_sum}")]
    PriceOverflow { pcoeff: i32, stat_sum: i64 },

    /// A resist table has the wrong number of columns.
    #[error("Resist table for {name} has {found} columns, expected {expected}")]
    ResistWidth {
        name: Name,
        expected: usize,
        found: usize,
    },

    /// A required raw field is missing.
    #[error("Missing field `{field}` for {name}")]
    MissingField { name: Name, field: &'static str },

    /// An entity belongs to a race the title does not define.
    #[error("Unknown race {race} for {name}")]
    UnknownRace { name: Name, race: Name },

    /// An entity references a skill that is not in the skill table.
    #[error("Unknown skill {skill} referenced by {owner}")]
    UnknownSkill { owner: Name, skill: Name },

    /// A disinherit list names an element outside the inherit order.
    #[error("Unknown inherit element {element} for {owner}")]
    UnknownElement { owner: Name, element: Name },

    /// An inheritance vector does not fit the bitmask width.
    #[error("Inheritance vector of {0} elements exceeds 32 bits")]
    InheritOverflow(usize),

    /// Two entities of the same kind share a name.
    #[error("Duplicate {kind} name: {name}")]
    DuplicateName { kind: EntityKind, name: Name },

    /// A special recipe is keyed by a demon that does not exist.
    #[error("Special recipe for unknown demon: {0}")]
    UnknownRecipeTarget(Name),

    /// A fusion prerequisite is keyed by a demon that does not exist.
    #[error("Fusion prerequisite for unknown demon: {0}")]
    UnknownPrereqTarget(Name),

    /// An `A x B` pair token could not be split into two names.
    #[error("Malformed ingredient pair '{token}' in recipe for {result}")]
    MalformedPair { result: Name, token: String },

    /// The title configuration is inconsistent.
    #[error("Invalid title configuration: {0}")]
    InvalidConfig(String),

    /// A JSON document could not be parsed.
    #[error("Failed to parse {what}: {message}")]
    Parse { what: &'static str, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CompendiumError::UnknownSkill {
            owner: Name::new("Pixie"),
            skill: Name::new("Zio"),
        };
        let display = err.to_string();
        assert!(display.contains("Pixie"));
        assert!(display.contains("Zio"));
    }

    #[test]
    fn test_duplicate_display() {
        let err = CompendiumError::DuplicateName {
            kind: EntityKind::Gem,
            name: Name::new("Diamond"),
        };
        assert_eq!(err.to_string(), "Duplicate gem name: Diamond");
    }
}
