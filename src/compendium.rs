//! Compendium facade.
//!
//! Provides the `Compendium` type, the read-only query surface over one
//! title's derived data. All derivation happens inside the constructor;
//! a built compendium is immutable and can be shared across threads.

use crate::codec::decode_inherit_bitmask;
use crate::config::{FusionSettings, TitleConfig};
use crate::entity::{Demon, FusionMethod, NamePair, Skill};
use crate::error::CompendiumError;
use crate::index::{cross_reference_skills, sort_skills, LevelIndex};
use crate::name::Name;
use crate::normalizer::normalize;
use crate::raw::RawTables;
use crate::recipe::{classify, RecipeBook};
use indexmap::IndexMap;
use std::collections::HashMap;

const BUILD_TARGET: &str = "demon_compendium::build";

/// Display scale of one decoded inheritance bit.
const INHERIT_DISPLAY_SCALE: u32 = 100;

/// Fully derived data of one title.
///
/// The build runs these stages in order:
/// 1. Normalize raw tables into canonical entities
/// 2. Classify recipes (pass one)
/// 3. Cross-reference skills
/// 4. Build and freeze the level index
/// 5. Resolve referential recipes (pass two)
///
/// # Examples
///
/// ```rust
/// use demon_compendium::config::TitleConfig;
/// use demon_compendium::raw::{RawDataset, RawTables};
/// use demon_compendium::Compendium;
///
/// let config = TitleConfig::from_json(r#"{
///     "title": "Example",
///     "races": ["Beast"],
///     "elements": ["phys"],
///     "resist_codes": { "-": 100 }
/// }"#).unwrap();
///
/// let base = RawDataset::from_json(r#"{
///     "demons": {
///         "Inugami": { "race": "Beast", "lvl": 7 },
///         "Nekomata": { "race": "Beast", "lvl": 3 }
///     }
/// }"#).unwrap();
///
/// let compendium = Compendium::build(&config, &RawTables::new(base)).unwrap();
/// assert_eq!(compendium.get_result_demon_lvls("Beast"), &[3, 7]);
/// assert_eq!(compendium.reverse_lookup_demon("Beast", 7).unwrap(), "Inugami");
/// ```
#[derive(Debug, Clone)]
pub struct Compendium {
    config: TitleConfig,
    settings: FusionSettings,
    demons: IndexMap<Name, Demon>,
    enemies: IndexMap<Name, Demon>,
    gems: IndexMap<Name, Demon>,
    skills: IndexMap<Name, Skill>,
    growth_types: IndexMap<String, Vec<Vec<i32>>>,
    element_order: HashMap<Name, usize>,
    index: LevelIndex,
    recipes: RecipeBook,
}

impl Compendium {
    /// Build a compendium with default fusion settings.
    ///
    /// # Errors
    ///
    /// Returns the first fatal data error found in the configuration or the
    /// raw tables. No partially built compendium is ever returned.
    pub fn build(config: &TitleConfig, tables: &RawTables) -> Result<Self, CompendiumError> {
        Self::build_with_settings(config, tables, &FusionSettings::default())
    }

    /// Build a compendium with explicit fusion settings.
    ///
    /// Settings only affect the level indices and referential recipes, so
    /// switching settings means building again from the same inputs.
    pub fn build_with_settings(
        config: &TitleConfig,
        tables: &RawTables,
        settings: &FusionSettings,
    ) -> Result<Self, CompendiumError> {
        let mut normalized = normalize(config, tables)?;

        let pending = classify(
            &mut normalized.demons,
            &normalized.prereqs,
            &normalized.recipes,
        )?;

        cross_reference_skills(
            &mut normalized.skills,
            &normalized.demons,
            &normalized.enemies,
        )?;

        let index = LevelIndex::build(config, &normalized, &pending, settings);
        let recipes = pending.resolve(&index);

        let element_order = config
            .elements
            .iter()
            .enumerate()
            .map(|(order, element)| (element.clone(), order))
            .collect();

        tracing::info!(
            target: BUILD_TARGET,
            title = %config.title,
            demons = normalized.demons.len(),
            enemies = normalized.enemies.len(),
            skills = normalized.skills.len(),
            exclude_dlc = settings.exclude_dlc,
            "built compendium"
        );

        Ok(Self {
            config: config.clone(),
            settings: *settings,
            demons: normalized.demons,
            enemies: normalized.enemies,
            gems: normalized.gems,
            skills: normalized.skills,
            growth_types: normalized.growth_types,
            element_order,
            index,
            recipes,
        })
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    pub fn config(&self) -> &TitleConfig {
        &self.config
    }

    pub fn settings(&self) -> &FusionSettings {
        &self.settings
    }

    /// Look up a demon, falling back to enemies and then gems.
    pub fn get_demon(&self, name: &str) -> Option<&Demon> {
        self.demons
            .get(name)
            .or_else(|| self.enemies.get(name))
            .or_else(|| self.gems.get(name))
    }

    pub fn get_enemy(&self, name: &str) -> Option<&Demon> {
        self.enemies.get(name)
    }

    pub fn get_skill(&self, name: &str) -> Option<&Skill> {
        self.skills.get(name)
    }

    /// Look up several skills, sorted by element order then rank.
    ///
    /// Unknown names are skipped.
    pub fn get_skills(&self, names: &[&str]) -> Vec<&Skill> {
        let mut skills: Vec<&Skill> = names
            .iter()
            .filter_map(|name| self.skills.get(*name))
            .collect();
        sort_skills(&mut skills, &self.element_order);
        skills
    }

    /// Ascending levels of `race` usable as fusion ingredients.
    pub fn get_ingredient_demon_lvls(&self, race: &str) -> &[i32] {
        self.index.ingredient_levels(race)
    }

    /// Ascending levels of `race` producible by normal fusion.
    pub fn get_result_demon_lvls(&self, race: &str) -> &[i32] {
        self.index.result_levels(race)
    }

    /// Single-ingredient entries of the special recipe for `name`.
    pub fn get_special_name_entries(&self, name: &str) -> &[Name] {
        self.recipes.entries(name)
    }

    /// Ingredient pairs of the special recipe for `name`.
    pub fn get_special_name_pairs(&self, name: &str) -> &[NamePair] {
        self.recipes.pairs(name)
    }

    pub fn reverse_lookup_demon(&self, race: &str, level: i32) -> Option<&Name> {
        self.index.reverse_lookup(race, level)
    }

    /// Whether `name` is a demon of the title's element race.
    pub fn is_element_demon(&self, name: &str) -> bool {
        match (&self.config.element_race, self.demons.get(name)) {
            (Some(race), Some(demon)) => demon.race == *race,
            _ => false,
        }
    }

    /// Every entity, enemies first, then demons. Gems are not included.
    pub fn all_demons(&self) -> impl Iterator<Item = &Demon> {
        self.enemies.values().chain(self.demons.values())
    }

    pub fn all_skills(&self) -> impl Iterator<Item = &Skill> {
        self.skills.values()
    }

    /// Demons that cannot be produced by normal fusion.
    pub fn special_demons(&self) -> impl Iterator<Item = &Demon> {
        self.demons
            .values()
            .filter(|demon| demon.fusion != FusionMethod::Normal)
    }

    /// Per-level stat growth rows of a growth type.
    pub fn get_stat_growths(&self, growth: &str) -> Option<&[Vec<i32>]> {
        self.growth_types.get(growth).map(Vec::as_slice)
    }

    /// Inheritance bitmask decoded per inherit element and scaled for display.
    ///
    /// A full mask over three elements decodes to `[100, 100, 100]`.
    pub fn get_inherit_elems(&self, mask: u32) -> Vec<u32> {
        decode_inherit_bitmask(mask, self.config.inherit_elements.len())
            .into_iter()
            .map(|bit| u32::from(bit) * INHERIT_DISPLAY_SCALE)
            .collect()
    }
}
