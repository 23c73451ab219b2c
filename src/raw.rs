//! Raw per-title tables.
//!
//! These mirror the loosely shaped source data: every field is optional
//! and defaults are applied later by the normalizer. A title is a base
//! `RawDataset` plus zero or more overlays (expansions, DLC).

use crate::error::CompendiumError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Copy every field that is set on `$overlay` onto `$base`.
macro_rules! merge_fields {
    ($base:expr, $overlay:expr; $($field:ident),+ $(,)?) => {
        $(
            if $overlay.$field.is_some() {
                $base.$field = $overlay.$field;
            }
        )+
    };
}

/// A raw demon or enemy record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDemon {
    pub race: Option<String>,
    pub lvl: Option<i32>,
    pub align: Option<String>,
    pub attack: Option<String>,
    pub stats: Option<Vec<i32>>,
    pub pcoeff: Option<i32>,
    pub growth: Option<String>,

    /// Summary family: physical resist codes.
    pub presists: Option<String>,
    /// Summary family: magic resist codes.
    pub mresists: Option<String>,
    /// Summary family: disinherited elements.
    pub disinherits: Option<Vec<String>>,

    /// Packed family: resist codes.
    pub resists: Option<String>,
    /// Packed family: per-column severity overrides.
    pub resmods: Option<Vec<i32>>,
    /// Packed family: ailment resist codes.
    pub ailments: Option<String>,
    pub ailmods: Option<Vec<i32>>,
    /// Packed family: affinity string, `o` marks an inheritable element.
    pub inherits: Option<String>,

    /// Skill names in learning order.
    pub skills: Option<Vec<String>>,
    /// Transferable skill names in order.
    #[serde(alias = "source")]
    pub transfers: Option<Vec<String>>,

    pub areas: Option<Vec<String>>,
    pub drops: Option<Vec<String>>,
    pub traits: Option<Vec<String>>,
    pub eager: Option<IndexMap<String, String>>,
    pub happy: Option<IndexMap<String, String>>,
    /// Enraged resist codes (physical table in the summary family).
    pub eresists: Option<String>,
    /// Enraged magic resist codes (summary family only).
    pub emresists: Option<String>,
}

impl RawDemon {
    /// Merge `overlay` onto this record, field by field.
    pub fn merge(&mut self, overlay: RawDemon) {
        merge_fields!(self, overlay;
            race, lvl, align, attack, stats, pcoeff, growth,
            presists, mresists, disinherits,
            resists, resmods, ailments, ailmods, inherits,
            skills, transfers,
            areas, drops, traits, eager, happy, eresists, emresists,
        );
    }
}

/// A raw skill record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSkill {
    #[serde(alias = "elem")]
    pub element: Option<String>,
    pub power: Option<i32>,
    pub accuracy: Option<i32>,
    pub cost: Option<i32>,
    pub rank: Option<u16>,
    pub target: Option<String>,
    pub effect: Option<String>,
    pub inherit: Option<String>,
}

impl RawSkill {
    /// Merge `overlay` onto this record, field by field.
    pub fn merge(&mut self, overlay: RawSkill) {
        merge_fields!(self, overlay;
            element, power, accuracy, cost, rank, target, effect, inherit,
        );
    }
}

/// A raw special recipe.
///
/// # Examples
///
/// ```rust
/// use demon_compendium::raw::RawRecipe;
///
/// let list: RawRecipe = serde_json::from_str(r#"["Pixie", "Angel x Archangel"]"#).unwrap();
/// assert!(matches!(list, RawRecipe::Ingredients(_)));
///
/// let totem: RawRecipe = serde_json::from_str(r#"{"totem": "Bird"}"#).unwrap();
/// assert!(matches!(totem, RawRecipe::Totem { ingredients: None, .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRecipe {
    /// Explicit ingredient list; `"A x B"` tokens are ingredient pairs.
    Ingredients(Vec<String>),
    /// Totem recipe. Without ingredients it produces one of the current
    /// normal-fusion results of the demon's race; without a totem it is
    /// accident-only.
    Totem {
        #[serde(default)]
        totem: Option<String>,
        #[serde(default)]
        ingredients: Option<Vec<String>>,
    },
}

/// One layer of raw title data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDataset {
    pub demons: IndexMap<String, RawDemon>,
    pub enemies: IndexMap<String, RawDemon>,
    /// Enemies known only by name and race.
    pub bosses: IndexMap<String, String>,
    pub skills: IndexMap<String, RawSkill>,
    pub special_recipes: IndexMap<String, RawRecipe>,
    pub fusion_prereqs: IndexMap<String, String>,
    pub growth_types: IndexMap<String, Vec<Vec<i32>>>,
    /// Demon names indexed by numeric code.
    pub demon_codes: Vec<String>,
    /// Skill names indexed by numeric code.
    pub skill_codes: Vec<String>,
    /// Demons first introduced by this layer are DLC demons.
    pub dlc: bool,
}

impl RawDataset {
    /// Parse one dataset layer from JSON.
    pub fn from_json(json: &str) -> Result<Self, CompendiumError> {
        serde_json::from_str(json).map_err(|e| CompendiumError::Parse {
            what: "dataset",
            message: e.to_string(),
        })
    }
}

/// Base dataset plus ordered overlays. Later overlays win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTables {
    pub base: RawDataset,
    pub overlays: Vec<RawDataset>,
}

impl RawTables {
    pub fn new(base: RawDataset) -> Self {
        Self {
            base,
            overlays: Vec::new(),
        }
    }

    /// Append an overlay layer.
    pub fn with_overlay(mut self, overlay: RawDataset) -> Self {
        self.overlays.push(overlay);
        self
    }

    /// All layers, base first.
    pub fn layers(&self) -> impl Iterator<Item = &RawDataset> {
        std::iter::once(&self.base).chain(self.overlays.iter())
    }
}
