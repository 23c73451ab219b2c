//! Recipe classifier.
//!
//! Classification runs in two passes around the index build:
//!
//! ```text
//! [classify] → PendingRecipes → [LevelIndex, frozen] → [resolve] → RecipeBook
//! ```
//!
//! Pass one tags every demon with its fusion method, writes the
//! prerequisite text and normalizes explicit ingredient lists. Recipes
//! that produce "one of the current normal-fusion results" of a race stay
//! pending until pass two, which reads the frozen `LevelIndex`.

use crate::entity::{Demon, FusionMethod, NamePair};
use crate::error::CompendiumError;
use crate::index::LevelIndex;
use crate::name::Name;
use crate::raw::RawRecipe;
use indexmap::IndexMap;

const BUILD_TARGET: &str = "demon_compendium::build";

const FUSION_ACCIDENT: &str = "Fusion Accident";
const PASSWORD_ONLY: &str = "Password Only";
const ACCIDENT_PREREQ: &str = "Fusion accident only";
const SPECIAL_PREREQ: &str = "Special fusion with the listed ingredients";

/// A normalized special recipe: single ingredients and ingredient pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialRecipe {
    pub entries: Vec<Name>,
    pub pairs: Vec<NamePair>,
}

/// A recipe after pass one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeDraft {
    /// Fully known without any index.
    Resolved(SpecialRecipe),
    /// One of the current normal-fusion results of `race`.
    CurrentResults { race: Name },
}

/// Output of pass one, waiting for the level index.
#[derive(Debug, Clone, Default)]
pub struct PendingRecipes {
    drafts: IndexMap<Name, RecipeDraft>,
}

impl PendingRecipes {
    /// Whether `name` has any special recipe, resolved or not.
    pub fn has_recipe(&self, name: &str) -> bool {
        self.drafts.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&RecipeDraft> {
        self.drafts.get(name)
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Pass two: resolve referential recipes against the frozen index.
    ///
    /// Each level of the race's result list is reverse-looked up to a
    /// demon name, in list order. A race without results resolves to an
    /// empty recipe.
    pub fn resolve(self, index: &LevelIndex) -> RecipeBook {
        let mut referential = 0usize;
        let recipes = self
            .drafts
            .into_iter()
            .map(|(name, draft)| {
                let recipe = match draft {
                    RecipeDraft::Resolved(recipe) => recipe,
                    RecipeDraft::CurrentResults { race } => {
                        referential += 1;
                        SpecialRecipe {
                            entries: index
                                .result_levels(race.as_str())
                                .iter()
                                .filter_map(|&level| {
                                    index.reverse_lookup(race.as_str(), level).cloned()
                                })
                                .collect(),
                            pairs: Vec::new(),
                        }
                    }
                };
                (name, recipe)
            })
            .collect();

        tracing::debug!(target: BUILD_TARGET, referential, "resolved referential recipes");
        RecipeBook { recipes }
    }
}

/// Final special recipes, keyed by result demon.
#[derive(Debug, Clone, Default)]
pub struct RecipeBook {
    recipes: IndexMap<Name, SpecialRecipe>,
}

impl RecipeBook {
    pub fn get(&self, name: &str) -> Option<&SpecialRecipe> {
        self.recipes.get(name)
    }

    /// Single-ingredient entries of the recipe for `name`.
    pub fn entries(&self, name: &str) -> &[Name] {
        self.recipes
            .get(name)
            .map(|r| r.entries.as_slice())
            .unwrap_or_default()
    }

    /// Ingredient pairs of the recipe for `name`.
    pub fn pairs(&self, name: &str) -> &[NamePair] {
        self.recipes
            .get(name)
            .map(|r| r.pairs.as_slice())
            .unwrap_or_default()
    }

    /// Result demons with a special recipe, in source order.
    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.recipes.keys()
    }
}

/// Pass one: tag demons and normalize recipes.
///
/// Prerequisite texts are applied first: `Fusion Accident` tags the demon
/// `accident`, `Password Only` tags it `password`, blank text is ignored,
/// anything else keeps it `normal` with the text attached. Special recipes then override:
///
/// * an ingredient list with more than one entry is `special`, any
///   shorter list is `accident`;
/// * a totem recipe with ingredients is `special`;
/// * a totem recipe without ingredients is `special` and stays pending
///   until the result levels are known;
/// * a recipe without a totem is `accident`.
///
/// # Errors
///
/// Returns `CompendiumError::UnknownPrereqTarget` or
/// `CompendiumError::UnknownRecipeTarget` for entries keyed by a demon that
/// does not exist, and `CompendiumError::MalformedPair` for a pair token
/// that does not split into two names.
pub fn classify(
    demons: &mut IndexMap<Name, Demon>,
    prereqs: &IndexMap<Name, String>,
    recipes: &IndexMap<Name, RawRecipe>,
) -> Result<PendingRecipes, CompendiumError> {
    for (name, prereq) in prereqs {
        let demon = demons
            .get_mut(name)
            .ok_or_else(|| CompendiumError::UnknownPrereqTarget(name.clone()))?;
        if prereq.trim().is_empty() {
            continue;
        }
        demon.fusion = if prereq.contains(FUSION_ACCIDENT) {
            FusionMethod::Accident
        } else if prereq.contains(PASSWORD_ONLY) {
            FusionMethod::Password
        } else {
            FusionMethod::Normal
        };
        demon.prereq = Some(prereq.clone());
    }

    let mut drafts = IndexMap::new();
    for (name, recipe) in recipes {
        let demon = demons
            .get_mut(name)
            .ok_or_else(|| CompendiumError::UnknownRecipeTarget(name.clone()))?;

        let draft = match recipe {
            RawRecipe::Ingredients(tokens) => {
                let (fusion, fallback) = if tokens.len() > 1 {
                    (FusionMethod::Special, SPECIAL_PREREQ)
                } else {
                    (FusionMethod::Accident, ACCIDENT_PREREQ)
                };
                demon.fusion = fusion;
                if demon.prereq.is_none() {
                    demon.prereq = Some(String::from(fallback));
                }
                RecipeDraft::Resolved(split_ingredients(name, tokens)?)
            }
            RawRecipe::Totem {
                totem: Some(totem),
                ingredients: Some(tokens),
            } => {
                demon.fusion = FusionMethod::Special;
                demon.prereq = Some(format!(
                    "Perform fusion that uses the following ingredients with {totem} totem"
                ));
                RecipeDraft::Resolved(split_ingredients(name, tokens)?)
            }
            RawRecipe::Totem {
                totem: Some(totem),
                ingredients: None,
            } => {
                demon.fusion = FusionMethod::Special;
                demon.prereq = Some(format!(
                    "Perform fusion that creates one of the following results with {totem} totem"
                ));
                RecipeDraft::CurrentResults {
                    race: demon.race.clone(),
                }
            }
            RawRecipe::Totem { totem: None, .. } => {
                demon.fusion = FusionMethod::Accident;
                demon.prereq = Some(String::from(ACCIDENT_PREREQ));
                RecipeDraft::Resolved(SpecialRecipe::default())
            }
        };
        drafts.insert(name.clone(), draft);
    }

    tracing::debug!(
        target: BUILD_TARGET,
        recipes = drafts.len(),
        pending = drafts
            .values()
            .filter(|d| matches!(d, RecipeDraft::CurrentResults { .. }))
            .count(),
        "classified recipes"
    );

    Ok(PendingRecipes { drafts })
}

/// Split recipe tokens into single entries and `"A x B"` pairs.
fn split_ingredients(result: &Name, tokens: &[String]) -> Result<SpecialRecipe, CompendiumError> {
    let mut recipe = SpecialRecipe::default();
    for token in tokens {
        match token.split_once(" x ") {
            Some((name1, name2)) => {
                let (name1, name2) = (name1.trim(), name2.trim());
                if name1.is_empty() || name2.is_empty() || name2.contains(" x ") {
                    return Err(CompendiumError::MalformedPair {
                        result: result.clone(),
                        token: token.clone(),
                    });
                }
                recipe.pairs.push(NamePair {
                    name1: Name::new(name1),
                    name2: Name::new(name2),
                });
            }
            None => recipe.entries.push(Name::new(token)),
        }
    }
    Ok(recipe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ResistProfile;

    fn demon(name: &str, race: &str, level: i32) -> Demon {
        Demon {
            name: Name::new(name),
            race: Name::new(race),
            level,
            align: None,
            attack: String::from("Normal"),
            stats: Vec::new(),
            price: 0,
            resists: ResistProfile::None,
            inherits: 0,
            affinities: Vec::new(),
            fusion: FusionMethod::Normal,
            prereq: None,
            skills: IndexMap::new(),
            transfers: IndexMap::new(),
            growth: None,
            code: None,
            dlc: false,
            is_enemy: false,
            placeholder: false,
            encounter: None,
        }
    }

    fn demons(list: &[(&str, &str, i32)]) -> IndexMap<Name, Demon> {
        list.iter()
            .map(|&(n, r, l)| (Name::new(n), demon(n, r, l)))
            .collect()
    }

    fn recipes(list: Vec<(&str, RawRecipe)>) -> IndexMap<Name, RawRecipe> {
        list.into_iter().map(|(n, r)| (Name::new(n), r)).collect()
    }

    #[test]
    fn test_pair_notation() {
        let mut table = demons(&[("C", "Beast", 10)]);
        let raw = recipes(vec![(
            "C",
            RawRecipe::Ingredients(vec!["A x B".into(), "D".into()]),
        )]);
        let pending = classify(&mut table, &IndexMap::new(), &raw).unwrap();
        match pending.get("C") {
            Some(RecipeDraft::Resolved(recipe)) => {
                assert_eq!(
                    recipe.pairs,
                    vec![NamePair {
                        name1: Name::new("A"),
                        name2: Name::new("B")
                    }]
                );
                assert_eq!(recipe.entries, vec![Name::new("D")]);
            }
            other => panic!("unexpected draft {other:?}"),
        }
        assert_eq!(table["C"].fusion, FusionMethod::Special);
    }

    #[test]
    fn test_single_entry_list_is_accident() {
        let mut table = demons(&[("Alciel", "Tyrant", 80), ("Demonee-ho", "Fairy", 30)]);
        let raw = recipes(vec![
            ("Alciel", RawRecipe::Ingredients(vec![])),
            ("Demonee-ho", RawRecipe::Ingredients(vec!["Jack Frost".into()])),
        ]);
        classify(&mut table, &IndexMap::new(), &raw).unwrap();
        assert_eq!(table["Alciel"].fusion, FusionMethod::Accident);
        assert_eq!(table["Demonee-ho"].fusion, FusionMethod::Accident);
        assert_eq!(table["Alciel"].prereq.as_deref(), Some(ACCIDENT_PREREQ));
    }

    #[test]
    fn test_prereq_tags() {
        let mut table = demons(&[("A", "Beast", 1), ("B", "Beast", 2), ("C", "Beast", 3)]);
        let prereqs: IndexMap<Name, String> = [
            ("A", "Fusion Accident only"),
            ("B", "Password Only"),
            ("C", "Requires Law alignment"),
        ]
        .into_iter()
        .map(|(n, p)| (Name::new(n), p.to_string()))
        .collect();
        classify(&mut table, &prereqs, &IndexMap::new()).unwrap();
        assert_eq!(table["A"].fusion, FusionMethod::Accident);
        assert_eq!(table["B"].fusion, FusionMethod::Password);
        assert_eq!(table["C"].fusion, FusionMethod::Normal);
        assert_eq!(table["C"].prereq.as_deref(), Some("Requires Law alignment"));
    }

    #[test]
    fn test_blank_prereq_gets_fallback_text() {
        let mut table = demons(&[("C", "Beast", 10), ("D", "Beast", 12)]);
        let prereqs: IndexMap<Name, String> = [("C", ""), ("D", "  ")]
            .into_iter()
            .map(|(n, p)| (Name::new(n), p.to_string()))
            .collect();
        let raw = recipes(vec![(
            "C",
            RawRecipe::Ingredients(vec!["A".into(), "B".into()]),
        )]);
        classify(&mut table, &prereqs, &raw).unwrap();
        assert_eq!(table["C"].fusion, FusionMethod::Special);
        assert_eq!(table["C"].prereq.as_deref(), Some(SPECIAL_PREREQ));
        assert_eq!(table["D"].fusion, FusionMethod::Normal);
        assert_eq!(table["D"].prereq, None);
    }

    #[test]
    fn test_recipe_overrides_prereq_tag() {
        let mut table = demons(&[("Alciel", "Tyrant", 80)]);
        let prereqs: IndexMap<Name, String> =
            [(Name::new("Alciel"), String::from("Password Only"))].into_iter().collect();
        let raw = recipes(vec![("Alciel", RawRecipe::Ingredients(vec![]))]);
        classify(&mut table, &prereqs, &raw).unwrap();
        assert_eq!(table["Alciel"].fusion, FusionMethod::Accident);
        assert_eq!(table["Alciel"].prereq.as_deref(), Some("Password Only"));
    }

    #[test]
    fn test_totem_recipes() {
        let mut table = demons(&[
            ("Garuda", "Avian", 50),
            ("Yatagarasu", "Avian", 60),
            ("Lilim", "Night", 9),
        ]);
        let raw = recipes(vec![
            (
                "Garuda",
                RawRecipe::Totem {
                    totem: Some("Bird".into()),
                    ingredients: Some(vec!["Hamsa".into(), "Suparna".into()]),
                },
            ),
            (
                "Yatagarasu",
                RawRecipe::Totem {
                    totem: Some("Bird".into()),
                    ingredients: None,
                },
            ),
            (
                "Lilim",
                RawRecipe::Totem {
                    totem: None,
                    ingredients: None,
                },
            ),
        ]);
        let pending = classify(&mut table, &IndexMap::new(), &raw).unwrap();
        assert_eq!(pending.len(), 3);
        assert_eq!(
            table["Garuda"].prereq.as_deref(),
            Some("Perform fusion that uses the following ingredients with Bird totem")
        );
        assert_eq!(
            table["Yatagarasu"].prereq.as_deref(),
            Some("Perform fusion that creates one of the following results with Bird totem")
        );
        assert_eq!(
            pending.get("Yatagarasu"),
            Some(&RecipeDraft::CurrentResults {
                race: Name::new("Avian")
            })
        );
        assert_eq!(table["Lilim"].fusion, FusionMethod::Accident);
        assert!(table.values().all(|d| d.prereq.is_some()));
    }

    #[test]
    fn test_unknown_recipe_target() {
        let mut table = demons(&[]);
        let raw = recipes(vec![("Ghost", RawRecipe::Ingredients(vec![]))]);
        assert_eq!(
            classify(&mut table, &IndexMap::new(), &raw).unwrap_err(),
            CompendiumError::UnknownRecipeTarget(Name::new("Ghost"))
        );
    }

    #[test]
    fn test_malformed_pair() {
        let mut table = demons(&[("C", "Beast", 10)]);
        let raw = recipes(vec![(
            "C",
            RawRecipe::Ingredients(vec![" x B".into(), "D".into()]),
        )]);
        assert!(matches!(
            classify(&mut table, &IndexMap::new(), &raw),
            Err(CompendiumError::MalformedPair { .. })
        ));
    }

    #[test]
    fn test_recipe_book_lookups() {
        let mut recipes = IndexMap::new();
        recipes.insert(
            Name::new("C"),
            SpecialRecipe {
                entries: vec![Name::new("D")],
                pairs: Vec::new(),
            },
        );
        let book = RecipeBook { recipes };
        assert_eq!(book.entries("C"), &[Name::new("D")]);
        assert!(book.pairs("C").is_empty());
        assert!(book.entries("Nobody").is_empty());
    }
}
