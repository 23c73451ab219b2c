//! Per-title configuration.
//!
//! A `TitleConfig` lists every per-title setting the engine recognizes,
//! together with its default, so raw records never need ad-hoc
//! `field || default` handling. It is validated once before the build.

use crate::codec::{ResistAlphabet, MAX_INHERIT_ELEMENTS};
use crate::error::CompendiumError;
use crate::name::Name;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Resist encoding used by a title family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResistEncoding {
    /// Physical and magic tables decoded directly, plus a display summary.
    #[default]
    Summary,
    /// One resist and one ailment table, packed as `(category << 10) | severity`.
    Packed,
}

/// How the position of a skill in a raw skill list maps to a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevels {
    /// `level = index + offset`.
    Offset(i32),
    /// `level = ranks[index]`; slots past the table use the last rank.
    Ranks(Vec<i32>),
}

impl SkillLevels {
    /// Level of the skill found at `index` in a raw list.
    pub fn level_at(&self, index: usize) -> i32 {
        match self {
            SkillLevels::Offset(offset) => index as i32 + offset,
            SkillLevels::Ranks(ranks) => ranks
                .get(index)
                .or_else(|| ranks.last())
                .copied()
                .unwrap_or(index as i32),
        }
    }
}

/// Which demons of a race may be consumed as fusion ingredients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientRule {
    /// Only demons obtained through normal fusion.
    #[default]
    NormalOnly,
    /// Every demon, whatever its fusion method.
    AllDemons,
}

/// Settings that change which entities feed the fusion indices.
///
/// Changing settings means building a new compendium; entities are
/// never updated in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionSettings {
    /// Leave DLC demons out of the level indices.
    #[serde(default)]
    pub exclude_dlc: bool,
}

fn default_blank_code() -> char {
    '-'
}

fn default_gem_race() -> Name {
    Name::new("Gem")
}

fn default_auto_element() -> Name {
    Name::new("auto")
}

fn default_passive_element() -> Name {
    Name::new("pas")
}

fn default_demon_skill_levels() -> SkillLevels {
    SkillLevels::Offset(0)
}

fn default_enemy_skill_levels() -> SkillLevels {
    SkillLevels::Offset(1)
}

fn default_pcoeff() -> i32 {
    96
}

/// Closed configuration of one game title.
///
/// # Examples
///
/// ```rust
/// use demon_compendium::config::{ResistEncoding, TitleConfig};
///
/// let config = TitleConfig::from_json(r#"{
///     "title": "Example",
///     "races": ["Beast", "Fairy"],
///     "elements": ["phys", "fire"],
///     "resist_codes": { "-": 100, "w": 200 }
/// }"#).unwrap();
///
/// assert_eq!(config.resist_encoding, ResistEncoding::Summary);
/// assert_eq!(config.gem_race, "Gem");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleConfig {
    pub title: String,

    /// Races in canonical order.
    pub races: Vec<Name>,

    /// Skill elements in canonical display order.
    pub elements: Vec<Name>,

    /// Elements covered by the inheritance bitmask, most significant first.
    #[serde(default)]
    pub inherit_elements: Vec<Name>,

    /// Resist column headers; sets the width of a blank packed profile.
    #[serde(default)]
    pub resist_elements: Vec<Name>,

    /// Ailment column headers of packed-family titles.
    #[serde(default)]
    pub ailments: Vec<String>,

    pub resist_codes: ResistAlphabet,

    #[serde(default)]
    pub resist_encoding: ResistEncoding,

    /// Code used to fill absent resist tables.
    #[serde(default = "default_blank_code")]
    pub blank_code: char,

    /// Default alignment per race.
    #[serde(default)]
    pub alignments: HashMap<String, String>,

    /// Race of the "pure element" demons, if the title has one.
    #[serde(default)]
    pub element_race: Option<Name>,

    /// Gem names in level order.
    #[serde(default)]
    pub gems: Vec<Name>,

    #[serde(default = "default_gem_race")]
    pub gem_race: Name,

    #[serde(default = "default_demon_skill_levels")]
    pub demon_skill_levels: SkillLevels,

    #[serde(default = "default_enemy_skill_levels")]
    pub enemy_skill_levels: SkillLevels,

    /// Derive skill ranks as `power / 10` instead of reading them.
    #[serde(default)]
    pub rank_from_power: bool,

    /// Element whose unranked skills default to rank 1.
    #[serde(default = "default_auto_element")]
    pub auto_element: Name,

    /// Element of generated ailment-resistance skills.
    #[serde(default = "default_passive_element")]
    pub passive_element: Name,

    #[serde(default)]
    pub ingredient_rule: IngredientRule,

    #[serde(default = "default_pcoeff")]
    pub default_pcoeff: i32,
}

impl TitleConfig {
    /// Create a configuration with every optional setting at its default.
    pub fn new(
        title: impl Into<String>,
        races: Vec<Name>,
        elements: Vec<Name>,
        resist_codes: ResistAlphabet,
    ) -> Self {
        Self {
            title: title.into(),
            races,
            elements,
            inherit_elements: Vec::new(),
            resist_elements: Vec::new(),
            ailments: Vec::new(),
            resist_codes,
            resist_encoding: ResistEncoding::default(),
            blank_code: default_blank_code(),
            alignments: HashMap::new(),
            element_race: None,
            gems: Vec::new(),
            gem_race: default_gem_race(),
            demon_skill_levels: default_demon_skill_levels(),
            enemy_skill_levels: default_enemy_skill_levels(),
            rank_from_power: false,
            auto_element: default_auto_element(),
            passive_element: default_passive_element(),
            ingredient_rule: IngredientRule::default(),
            default_pcoeff: default_pcoeff(),
        }
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, CompendiumError> {
        serde_json::from_str(json).map_err(|e| CompendiumError::Parse {
            what: "title configuration",
            message: e.to_string(),
        })
    }

    /// Check the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns `CompendiumError::InvalidConfig` if there are no races, a race
    /// or element is listed twice, the blank code is not in the resist
    /// alphabet, or there are too many inherit elements for a bitmask.
    pub fn validate(&self) -> Result<(), CompendiumError> {
        if self.races.is_empty() {
            return Err(CompendiumError::InvalidConfig(format!(
                "{} defines no races",
                self.title
            )));
        }
        check_unique("race", &self.races)?;
        check_unique("element", &self.elements)?;
        check_unique("inherit element", &self.inherit_elements)?;
        if self.inherit_elements.len() > MAX_INHERIT_ELEMENTS {
            return Err(CompendiumError::InvalidConfig(format!(
                "{} inherit elements do not fit a {}-bit mask",
                self.inherit_elements.len(),
                MAX_INHERIT_ELEMENTS
            )));
        }
        if !self.resist_codes.contains_key(&self.blank_code) {
            return Err(CompendiumError::InvalidConfig(format!(
                "blank code '{}' is not a resist code",
                self.blank_code
            )));
        }
        Ok(())
    }

    /// Whether `race` can appear in the level indices.
    pub fn knows_race(&self, race: &str) -> bool {
        self.races.iter().any(|r| r == race) || (!self.gems.is_empty() && self.gem_race == race)
    }

    /// Position of `element` in the canonical element order.
    pub fn element_order(&self, element: &str) -> Option<usize> {
        self.elements.iter().position(|e| e == element)
    }

    /// Blank code string of the given width.
    pub fn blank_codes(&self, width: usize) -> String {
        std::iter::repeat(self.blank_code).take(width).collect()
    }
}

fn check_unique(what: &str, names: &[Name]) -> Result<(), CompendiumError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CompendiumError::InvalidConfig(format!(
                "{what} {name} is listed twice"
            )));
        }
    }
    Ok(())
}
