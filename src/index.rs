//! Index builder.
//!
//! Builds the derived lookup structures of a compendium from the
//! normalized entities: per-race inverted level lookups, sorted
//! ingredient and result level lists, and the skill cross-references.
//!
//! All traversals visit entities in ascending level order using a stable
//! sort over source order, so ties keep their source order and
//! cross-reference lists come out level-ordered without a separate sort.

use crate::config::{FusionSettings, IngredientRule, TitleConfig};
use crate::entity::{Demon, FusionMethod, Skill, SkillRef};
use crate::error::CompendiumError;
use crate::name::Name;
use crate::normalizer::NormalizedTables;
use crate::recipe::PendingRecipes;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};

const BUILD_TARGET: &str = "demon_compendium::build";

/// Per-race level structures consumed by fusion calculators.
///
/// Once built the index is frozen; referential recipes are resolved
/// against it afterwards.
#[derive(Debug, Clone, Default)]
pub struct LevelIndex {
    inverted: HashMap<Name, BTreeMap<i32, Name>>,
    ingredients: HashMap<Name, Vec<i32>>,
    results: HashMap<Name, Vec<i32>>,
}

impl LevelIndex {
    /// Build the level index.
    ///
    /// * Inverted lookup: demons and enemies with full records in one
    ///   ascending level traversal, demons first on equal levels. On a
    ///   same-race, same-level collision the later entity wins and a
    ///   warning is logged.
    /// * Ingredients: demons allowed by the title's ingredient rule minus
    ///   element demons, plus enemies with full records and gems.
    /// * Results: normal-fusion demons without any special recipe.
    ///
    /// Level lists are ascending and keep duplicates.
    pub fn build(
        config: &TitleConfig,
        tables: &NormalizedTables,
        pending: &PendingRecipes,
        settings: &FusionSettings,
    ) -> Self {
        let mut index = LevelIndex::default();
        for race in &config.races {
            index.init_race(race);
        }
        if !config.gems.is_empty() {
            index.init_race(&config.gem_race);
        }

        let included = |d: &&Demon| !(settings.exclude_dlc && d.dlc);
        let demons: Vec<&Demon> = tables.demons.values().filter(included).collect();
        let enemies: Vec<&Demon> = tables.enemies.values().filter(|e| !e.placeholder).collect();

        for demon in by_level(demons.iter().chain(&enemies).copied()) {
            index.invert(demon);
        }

        for demon in &demons {
            let is_element = config.element_race.as_ref() == Some(&demon.race);
            let usable = match config.ingredient_rule {
                IngredientRule::NormalOnly => demon.fusion == FusionMethod::Normal,
                IngredientRule::AllDemons => true,
            };
            if usable && !is_element {
                index.push_ingredient(demon);
            }
            if demon.fusion == FusionMethod::Normal && !pending.has_recipe(demon.name.as_str()) {
                index
                    .results
                    .entry(demon.race.clone())
                    .or_default()
                    .push(demon.level);
            }
        }
        for enemy in &enemies {
            index.push_ingredient(enemy);
        }
        for gem in tables.gems.values() {
            index.push_ingredient(gem);
        }

        for levels in index.ingredients.values_mut() {
            levels.sort_unstable();
        }
        for levels in index.results.values_mut() {
            levels.sort_unstable();
        }

        tracing::debug!(
            target: BUILD_TARGET,
            races = index.inverted.len(),
            ingredients = index.ingredients.values().map(Vec::len).sum::<usize>(),
            results = index.results.values().map(Vec::len).sum::<usize>(),
            "built level index"
        );

        index
    }

    fn init_race(&mut self, race: &Name) {
        self.inverted.entry(race.clone()).or_default();
        self.ingredients.entry(race.clone()).or_default();
        self.results.entry(race.clone()).or_default();
    }

    fn invert(&mut self, demon: &Demon) {
        let levels = self.inverted.entry(demon.race.clone()).or_default();
        if let Some(previous) = levels.insert(demon.level, demon.name.clone()) {
            tracing::warn!(
                target: BUILD_TARGET,
                race = %demon.race,
                level = demon.level,
                previous = %previous,
                current = %demon.name,
                "level collision in inverted lookup, last write wins"
            );
        }
    }

    fn push_ingredient(&mut self, demon: &Demon) {
        self.ingredients
            .entry(demon.race.clone())
            .or_default()
            .push(demon.level);
    }

    /// Ascending levels usable as fusion ingredients for `race`.
    pub fn ingredient_levels(&self, race: &str) -> &[i32] {
        self.ingredients
            .get(race)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Ascending levels producible by normal fusion for `race`.
    pub fn result_levels(&self, race: &str) -> &[i32] {
        self.results.get(race).map(Vec::as_slice).unwrap_or_default()
    }

    /// Name of the entity of `race` at `level`, if any.
    pub fn reverse_lookup(&self, race: &str, level: i32) -> Option<&Name> {
        self.inverted.get(race).and_then(|levels| levels.get(&level))
    }

    /// Races known to the index.
    pub fn races(&self) -> impl Iterator<Item = &Name> {
        self.inverted.keys()
    }
}

/// Collect entities in ascending level order, stable over source order.
fn by_level<'a>(entities: impl Iterator<Item = &'a Demon>) -> Vec<&'a Demon> {
    let mut sorted: Vec<&Demon> = entities.collect();
    sorted.sort_by_key(|d| d.level);
    sorted
}

/// Fill `learned_by` and `transfer` of every skill.
///
/// Demons and enemies are visited in one ascending level traversal,
/// demons first on equal levels, so both lists come out level-ordered.
/// Known skills append to `learned_by`, transferable skills to `transfer`.
///
/// # Errors
///
/// Returns `CompendiumError::UnknownSkill` if an entity references a skill
/// that is not in `skills`.
pub fn cross_reference_skills(
    skills: &mut IndexMap<Name, Skill>,
    demons: &IndexMap<Name, Demon>,
    enemies: &IndexMap<Name, Demon>,
) -> Result<(), CompendiumError> {
    for owner in by_level(demons.values().chain(enemies.values())) {
        for (skill, &level) in &owner.skills {
            lookup(skills, owner, skill)?.learned_by.push(SkillRef {
                demon: owner.name.clone(),
                level,
            });
        }
        for (skill, &level) in &owner.transfers {
            lookup(skills, owner, skill)?.transfer.push(SkillRef {
                demon: owner.name.clone(),
                level,
            });
        }
    }
    Ok(())
}

fn lookup<'a>(
    skills: &'a mut IndexMap<Name, Skill>,
    owner: &Demon,
    skill: &Name,
) -> Result<&'a mut Skill, CompendiumError> {
    skills
        .get_mut(skill)
        .ok_or_else(|| CompendiumError::UnknownSkill {
            owner: owner.name.clone(),
            skill: skill.clone(),
        })
}

/// Sort skills for display.
///
/// Stable ascending sort on `Skill::sort_key`. Elements missing from the
/// canonical order sort after every known element.
pub fn sort_skills(skills: &mut [&Skill], element_order: &HashMap<Name, usize>) {
    let unknown = element_order.len();
    skills.sort_by_key(|skill| {
        skill.sort_key(element_order.get(&skill.element).copied().unwrap_or(unknown))
    });
}
