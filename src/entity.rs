//! Canonical entity types.
//!
//! These are the normalized, immutable records the compendium exposes.
//! Demons, enemies and gems share the `Demon` shape; skills carry the
//! cross-reference lists filled in by the index builder.

use crate::name::Name;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a demon can be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FusionMethod {
    /// Standard level-based fusion.
    Normal,
    /// Designed multi-ingredient recipe.
    Special,
    /// Random fusion outcome.
    Accident,
    /// Obtained with a password outside fusion.
    Password,
    /// Obtained through recruitment or item negotiation.
    Recruit,
}

impl FusionMethod {
    /// Whether this method requires a prerequisite description.
    pub fn needs_prereq(self) -> bool {
        matches!(
            self,
            FusionMethod::Special | FusionMethod::Accident | FusionMethod::Password
        )
    }
}

impl fmt::Display for FusionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FusionMethod::Normal => "normal",
            FusionMethod::Special => "special",
            FusionMethod::Accident => "accident",
            FusionMethod::Password => "password",
            FusionMethod::Recruit => "recruit",
        };
        f.write_str(s)
    }
}

/// Entity namespaces. Names are unique within a kind, not across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Demon,
    Enemy,
    Skill,
    Gem,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Demon => "demon",
            EntityKind::Enemy => "enemy",
            EntityKind::Skill => "skill",
            EntityKind::Gem => "gem",
        };
        f.write_str(s)
    }
}

/// A resist profile in one of the two title encodings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResistProfile {
    /// Per-element severities split into physical and magic tables,
    /// with the averaged display summary.
    Summary {
        physical: Vec<i32>,
        magic: Vec<i32>,
        summary: Vec<f64>,
    },
    /// Values packed as `(category << 10) | severity`.
    Packed { resists: Vec<u32>, ailments: Vec<u32> },
    /// No resist data (gems).
    None,
}

/// Negotiation reaction of an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    Eager,
    Happy,
}

/// A negotiation trigger: when `actor` does `action`, the enemy reacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub actor: String,
    pub action: String,
    pub result: Mood,
}

/// Combat-only fields of an enemy record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    /// Encounter areas joined with `", "`.
    pub area: String,
    pub drops: Vec<String>,
    pub traits: Vec<String>,
    pub contacts: Vec<Contact>,
    /// Alternate resist profile used when the enemy is enraged.
    pub enraged: Option<ResistProfile>,
}

/// A demon, enemy or gem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demon {
    pub name: Name,
    pub race: Name,
    pub level: i32,
    pub align: Option<String>,
    pub attack: String,
    pub stats: Vec<i32>,
    pub price: i64,
    pub resists: ResistProfile,
    /// Inheritable elements, first element in the most significant bit.
    pub inherits: u32,
    /// Per-element inheritance flags in canonical element order.
    pub affinities: Vec<u8>,
    pub fusion: FusionMethod,
    pub prereq: Option<String>,
    /// Known skills and the level they are learned at. Levels at or
    /// below zero mean the skill is known on creation.
    pub skills: IndexMap<Name, i32>,
    /// Skills obtainable by transfer rather than growth.
    pub transfers: IndexMap<Name, i32>,
    pub growth: Option<String>,
    pub code: Option<usize>,
    /// Introduced by a DLC overlay.
    pub dlc: bool,
    pub is_enemy: bool,
    /// Stub record standing in for an enemy without data.
    pub placeholder: bool,
    pub encounter: Option<Encounter>,
}

/// A `(demon, level)` cross-reference entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRef {
    pub demon: Name,
    pub level: i32,
}

/// A skill with its cross-reference lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: Name,
    pub element: Name,
    pub power: i32,
    pub accuracy: i32,
    pub cost: i32,
    pub rank: u16,
    pub target: String,
    pub effect: String,
    pub inherit: Name,
    pub code: Option<usize>,
    pub learned_by: Vec<SkillRef>,
    pub transfer: Vec<SkillRef>,
}

/// Weight of the element order in the skill sort key.
///
/// Ranks are `u16`, so any rank is strictly below this weight and the
/// element group always dominates the rank.
pub const ELEMENT_ORDER_WEIGHT: u64 = 1 << 16;

impl Skill {
    /// Display sort key: `element_order * ELEMENT_ORDER_WEIGHT + rank`.
    pub fn sort_key(&self, element_order: usize) -> u64 {
        element_order as u64 * ELEMENT_ORDER_WEIGHT + u64::from(self.rank)
    }
}

/// Two names combined as a single fusion component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamePair {
    pub name1: Name,
    pub name2: Name,
}
