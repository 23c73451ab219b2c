//! Entity normalizer.
//!
//! Merges overlay layers onto the base dataset and converts every raw
//! record into its canonical entity, applying the title's documented
//! defaults and decoding resist and inheritance data through the codec.

use crate::codec::{
    decode_affinities, decode_inherit_bitmask, decode_resist_codes, encode_inherit_bitmask,
    estimate_base_price, pack_inherit_bits, pack_resist, pack_resist_codes, summarize_resists,
    unpack_resist, MAGIC_RESISTS, PHYSICAL_RESISTS,
};
use crate::config::{ResistEncoding, SkillLevels, TitleConfig};
use crate::entity::{
    Contact, Demon, Encounter, EntityKind, FusionMethod, Mood, ResistProfile, Skill,
};
use crate::error::CompendiumError;
use crate::name::Name;
use crate::raw::{RawDemon, RawRecipe, RawSkill, RawTables};
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashSet};

const BUILD_TARGET: &str = "demon_compendium::build";

/// Stats of a placeholder enemy.
const PLACEHOLDER_STATS: [i32; 7] = [100, 100, 1, 1, 1, 1, 1];

/// Resist codes that generate ailment-resistance skills, with their prefix.
const AILMENT_PREFIXES: [(char, &str); 3] = [('w', "Weak "), ('s', "Resist "), ('n', "Null ")];

/// All layers merged into one set of raw tables.
#[derive(Debug, Default)]
pub struct MergedLayers {
    pub demons: IndexMap<String, RawDemon>,
    pub dlc_demons: HashSet<String>,
    pub enemies: IndexMap<String, RawDemon>,
    pub bosses: IndexMap<String, String>,
    pub skills: IndexMap<String, RawSkill>,
    pub recipes: IndexMap<String, RawRecipe>,
    pub prereqs: IndexMap<String, String>,
    pub growth_types: IndexMap<String, Vec<Vec<i32>>>,
    pub demon_codes: Vec<String>,
    pub skill_codes: Vec<String>,
}

/// Merge all layers of `tables`, base first.
///
/// Demon, enemy and skill records that collide are merged field by
/// field; recipes, prerequisites, boss stubs and growth tables are
/// replaced whole. A later non-empty code table replaces an earlier one.
pub fn merge_layers(tables: &RawTables) -> MergedLayers {
    let mut merged = MergedLayers::default();

    for layer in tables.layers() {
        for (name, demon) in &layer.demons {
            match merged.demons.get_mut(name) {
                Some(base) => base.merge(demon.clone()),
                None => {
                    merged.demons.insert(name.clone(), demon.clone());
                    if layer.dlc {
                        merged.dlc_demons.insert(name.clone());
                    }
                }
            }
        }
        for (name, enemy) in &layer.enemies {
            match merged.enemies.get_mut(name) {
                Some(base) => base.merge(enemy.clone()),
                None => {
                    merged.enemies.insert(name.clone(), enemy.clone());
                }
            }
        }
        for (name, skill) in &layer.skills {
            match merged.skills.get_mut(name) {
                Some(base) => base.merge(skill.clone()),
                None => {
                    merged.skills.insert(name.clone(), skill.clone());
                }
            }
        }
        merged
            .bosses
            .extend(layer.bosses.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
            .recipes
            .extend(layer.special_recipes.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
            .prereqs
            .extend(layer.fusion_prereqs.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
            .growth_types
            .extend(layer.growth_types.iter().map(|(k, v)| (k.clone(), v.clone())));
        if !layer.demon_codes.is_empty() {
            merged.demon_codes = layer.demon_codes.clone();
        }
        if !layer.skill_codes.is_empty() {
            merged.skill_codes = layer.skill_codes.clone();
        }
    }

    merged
}

/// Canonical entity tables, before recipe classification and indexing.
#[derive(Debug, Clone, Default)]
pub struct NormalizedTables {
    pub demons: IndexMap<Name, Demon>,
    pub enemies: IndexMap<Name, Demon>,
    pub gems: IndexMap<Name, Demon>,
    pub skills: IndexMap<Name, Skill>,
    pub recipes: IndexMap<Name, RawRecipe>,
    pub prereqs: IndexMap<Name, String>,
    pub growth_types: IndexMap<String, Vec<Vec<i32>>>,
}

/// Normalize the raw tables of one title.
///
/// # Errors
///
/// Fails on an invalid configuration, a resist code outside the
/// alphabet, a missing race or level, an unknown race or inherit element,
/// a resist table of the wrong width, or a duplicate name within a kind.
pub fn normalize(
    config: &TitleConfig,
    tables: &RawTables,
) -> Result<NormalizedTables, CompendiumError> {
    config.validate()?;
    let merged = merge_layers(tables);
    let normalizer = Normalizer::new(config)?;

    let mut skills = IndexMap::new();
    for (name, raw) in &merged.skills {
        let skill = normalizer.skill(name, raw)?;
        skills.insert(skill.name.clone(), skill);
    }
    for skill in normalizer.ailment_skills() {
        if skills.contains_key(&skill.name) {
            return Err(CompendiumError::DuplicateName {
                kind: EntityKind::Skill,
                name: skill.name,
            });
        }
        skills.insert(skill.name.clone(), skill);
    }

    let mut demons = IndexMap::new();
    for (name, raw) in &merged.demons {
        let mut demon = normalizer.demon(name, raw, false)?;
        demon.dlc = merged.dlc_demons.contains(name);
        demons.insert(demon.name.clone(), demon);
    }

    let mut enemies = IndexMap::new();
    for (name, raw) in &merged.enemies {
        let enemy = normalizer.demon(name, raw, true)?;
        enemies.insert(enemy.name.clone(), enemy);
    }
    for (name, race) in &merged.bosses {
        let boss = normalizer.placeholder_enemy(name, race)?;
        if enemies.contains_key(&boss.name) {
            return Err(CompendiumError::DuplicateName {
                kind: EntityKind::Enemy,
                name: boss.name,
            });
        }
        enemies.insert(boss.name.clone(), boss);
    }

    let mut gems = IndexMap::new();
    for gem in normalizer.gems() {
        if gems.contains_key(&gem.name) {
            return Err(CompendiumError::DuplicateName {
                kind: EntityKind::Gem,
                name: gem.name,
            });
        }
        gems.insert(gem.name.clone(), gem);
    }

    for (code, name) in merged.demon_codes.iter().enumerate() {
        if let Some(demon) = demons.get_mut(name.as_str()) {
            demon.code = Some(code);
        }
        if let Some(enemy) = enemies.get_mut(name.as_str()) {
            enemy.code = Some(code);
        }
    }
    for (code, name) in merged.skill_codes.iter().enumerate() {
        if let Some(skill) = skills.get_mut(name.as_str()) {
            skill.code = Some(code);
        }
    }

    tracing::debug!(
        target: BUILD_TARGET,
        title = %config.title,
        demons = demons.len(),
        enemies = enemies.len(),
        gems = gems.len(),
        skills = skills.len(),
        "normalized entities"
    );

    Ok(NormalizedTables {
        demons,
        enemies,
        gems,
        skills,
        recipes: merged
            .recipes
            .into_iter()
            .map(|(k, v)| (Name::from(k), v))
            .collect(),
        prereqs: merged
            .prereqs
            .into_iter()
            .map(|(k, v)| (Name::from(k), v))
            .collect(),
        growth_types: merged.growth_types,
    })
}

/// Converts raw records of one title into canonical entities.
struct Normalizer<'a> {
    config: &'a TitleConfig,
    /// Ailment resist category to skill name prefix.
    ailment_prefixes: BTreeMap<u32, &'static str>,
}

impl<'a> Normalizer<'a> {
    fn new(config: &'a TitleConfig) -> Result<Self, CompendiumError> {
        let mut ailment_prefixes = BTreeMap::new();
        if config.resist_encoding == ResistEncoding::Packed && !config.ailments.is_empty() {
            for (code, prefix) in AILMENT_PREFIXES {
                if let Some(&value) = config.resist_codes.get(&code) {
                    let (category, _) = unpack_resist(pack_resist(value, None)?);
                    ailment_prefixes.insert(category, prefix);
                }
            }
        }
        Ok(Self {
            config,
            ailment_prefixes,
        })
    }

    fn skill(&self, name: &str, raw: &RawSkill) -> Result<Skill, CompendiumError> {
        let name = Name::new(name);
        let element = Name::from(raw.element.clone().ok_or_else(|| {
            CompendiumError::MissingField {
                name: name.clone(),
                field: "element",
            }
        })?);
        let power = raw.power.unwrap_or(0);
        let rank = if self.config.rank_from_power {
            u16::try_from(power.max(0) / 10).unwrap_or(u16::MAX)
        } else {
            raw.rank
                .unwrap_or(if element == self.config.auto_element { 1 } else { 99 })
        };
        let inherit = if rank == 99 {
            Name::new("non")
        } else {
            raw.inherit.clone().map(Name::from).unwrap_or_else(|| element.clone())
        };

        Ok(Skill {
            name,
            element,
            power,
            accuracy: raw.accuracy.unwrap_or(0),
            cost: raw.cost.unwrap_or(0),
            rank,
            target: raw.target.clone().unwrap_or_else(|| String::from("Self")),
            effect: raw.effect.clone().unwrap_or_default(),
            inherit,
            code: None,
            learned_by: Vec::new(),
            transfer: Vec::new(),
        })
    }

    fn ailment_skills(&self) -> Vec<Skill> {
        let mut skills = Vec::new();
        for prefix in self.ailment_prefixes.values() {
            for ailment in &self.config.ailments {
                skills.push(Skill {
                    name: Name::from(format!("{prefix}{ailment}")),
                    element: self.config.passive_element.clone(),
                    power: 0,
                    accuracy: 0,
                    cost: 0,
                    rank: 99,
                    target: String::from("Self"),
                    effect: String::from("Innate resistance"),
                    inherit: Name::new("non"),
                    code: None,
                    learned_by: Vec::new(),
                    transfer: Vec::new(),
                });
            }
        }
        skills
    }

    fn demon(&self, name: &str, raw: &RawDemon, is_enemy: bool) -> Result<Demon, CompendiumError> {
        let name = Name::new(name);
        let race = raw.race.as_deref().ok_or_else(|| CompendiumError::MissingField {
            name: name.clone(),
            field: "race",
        })?;
        if !self.config.knows_race(race) {
            return Err(CompendiumError::UnknownRace {
                name,
                race: Name::new(race),
            });
        }
        let level = raw.lvl.ok_or_else(|| CompendiumError::MissingField {
            name: name.clone(),
            field: "lvl",
        })?;

        let stats = raw.stats.clone().unwrap_or_default();
        let resists = self.resist_profile(&name, raw)?;
        let (inherits, affinities) = self.inheritance(&name, raw)?;

        let levels = if is_enemy {
            &self.config.enemy_skill_levels
        } else {
            &self.config.demon_skill_levels
        };
        let mut skills = skill_levels(raw.skills.as_deref(), levels);
        let transfers = skill_levels(raw.transfers.as_deref(), levels);
        if let ResistProfile::Packed { ailments, .. } = &resists {
            for (i, value) in ailments.iter().enumerate() {
                let (category, _) = unpack_resist(*value);
                if let (Some(prefix), Some(ailment)) =
                    (self.ailment_prefixes.get(&category), self.config.ailments.get(i))
                {
                    skills.entry(Name::from(format!("{prefix}{ailment}"))).or_insert(0);
                }
            }
        }

        let price = match self.config.resist_encoding {
            ResistEncoding::Packed => {
                estimate_base_price(&stats, raw.pcoeff.unwrap_or(self.config.default_pcoeff))?
            }
            ResistEncoding::Summary if is_enemy => i64::from(level).pow(2),
            ResistEncoding::Summary => 0,
        };

        let encounter = if is_enemy {
            Some(self.encounter(&name, raw)?)
        } else {
            None
        };

        Ok(Demon {
            name,
            race: Name::new(race),
            level,
            align: raw
                .align
                .clone()
                .or_else(|| self.config.alignments.get(race).cloned()),
            attack: raw.attack.clone().unwrap_or_else(|| String::from("Normal")),
            stats,
            price,
            resists,
            inherits,
            affinities,
            fusion: FusionMethod::Normal,
            prereq: None,
            skills,
            transfers,
            growth: raw.growth.clone(),
            code: None,
            dlc: false,
            is_enemy,
            placeholder: false,
            encounter,
        })
    }

    fn placeholder_enemy(&self, name: &str, race: &str) -> Result<Demon, CompendiumError> {
        let name = Name::new(name);
        let resists = self.resist_profile(&name, &RawDemon::default())?;
        Ok(Demon {
            name,
            race: Name::new(race),
            level: 1,
            align: Some(String::from("Neutral-Neutral")),
            attack: String::from("Normal"),
            stats: PLACEHOLDER_STATS.to_vec(),
            price: estimate_base_price(&PLACEHOLDER_STATS, self.config.default_pcoeff)?,
            resists,
            inherits: 0,
            affinities: vec![0; self.config.inherit_elements.len()],
            fusion: FusionMethod::Password,
            prereq: Some(String::from("Not obtainable through fusion")),
            skills: IndexMap::new(),
            transfers: IndexMap::new(),
            growth: None,
            code: None,
            dlc: false,
            is_enemy: true,
            placeholder: true,
            encounter: None,
        })
    }

    fn gems(&self) -> Vec<Demon> {
        self.config
            .gems
            .iter()
            .enumerate()
            .map(|(i, gem)| Demon {
                name: gem.clone(),
                race: self.config.gem_race.clone(),
                level: i as i32 + 1,
                align: None,
                attack: String::new(),
                stats: Vec::new(),
                price: 0,
                resists: ResistProfile::None,
                inherits: 0,
                affinities: Vec::new(),
                fusion: FusionMethod::Recruit,
                prereq: Some(String::from("Item negotiation only")),
                skills: IndexMap::new(),
                transfers: IndexMap::new(),
                growth: None,
                code: None,
                dlc: false,
                is_enemy: false,
                placeholder: false,
                encounter: None,
            })
            .collect()
    }

    fn resist_profile(
        &self,
        name: &Name,
        raw: &RawDemon,
    ) -> Result<ResistProfile, CompendiumError> {
        match self.config.resist_encoding {
            ResistEncoding::Summary => self.summary_profile(
                name,
                raw.presists.as_deref(),
                raw.mresists.as_deref(),
            ),
            ResistEncoding::Packed => {
                let resists = match &raw.resists {
                    Some(codes) => codes.clone(),
                    None => self.config.blank_codes(self.config.resist_elements.len()),
                };
                let ailments = match &raw.ailments {
                    Some(codes) => codes.clone(),
                    None => self.config.blank_codes(self.config.ailments.len()),
                };
                check_width(name, &self.config.resist_elements, &resists)?;
                check_width(name, &self.config.ailments, &ailments)?;
                Ok(ResistProfile::Packed {
                    resists: pack_resist_codes(
                        &resists,
                        &self.config.resist_codes,
                        raw.resmods.as_deref(),
                    )?,
                    ailments: pack_resist_codes(
                        &ailments,
                        &self.config.resist_codes,
                        raw.ailmods.as_deref(),
                    )?,
                })
            }
        }
    }

    fn summary_profile(
        &self,
        name: &Name,
        physical: Option<&str>,
        magic: Option<&str>,
    ) -> Result<ResistProfile, CompendiumError> {
        let physical = match physical {
            Some(codes) => decode_resist_codes(codes, &self.config.resist_codes)?,
            None => decode_resist_codes(
                &self.config.blank_codes(PHYSICAL_RESISTS),
                &self.config.resist_codes,
            )?,
        };
        let magic = match magic {
            Some(codes) => decode_resist_codes(codes, &self.config.resist_codes)?,
            None => decode_resist_codes(
                &self.config.blank_codes(MAGIC_RESISTS),
                &self.config.resist_codes,
            )?,
        };
        let physical_cols: &[i32; PHYSICAL_RESISTS] = physical
            .as_slice()
            .try_into()
            .map_err(|_| CompendiumError::ResistWidth {
                name: name.clone(),
                expected: PHYSICAL_RESISTS,
                found: physical.len(),
            })?;
        let magic_cols: &[i32; MAGIC_RESISTS] = magic
            .as_slice()
            .try_into()
            .map_err(|_| CompendiumError::ResistWidth {
                name: name.clone(),
                expected: MAGIC_RESISTS,
                found: magic.len(),
            })?;
        let summary = summarize_resists(physical_cols, magic_cols).to_vec();
        Ok(ResistProfile::Summary {
            physical,
            magic,
            summary,
        })
    }

    fn inheritance(&self, name: &Name, raw: &RawDemon) -> Result<(u32, Vec<u8>), CompendiumError> {
        match self.config.resist_encoding {
            ResistEncoding::Summary => {
                let disinherits: Vec<Name> = raw
                    .disinherits
                    .iter()
                    .flatten()
                    .map(|e| Name::new(e))
                    .collect();
                let mask =
                    encode_inherit_bitmask(name, &disinherits, &self.config.inherit_elements)?;
                Ok((
                    mask,
                    decode_inherit_bitmask(mask, self.config.inherit_elements.len()),
                ))
            }
            ResistEncoding::Packed => {
                let affinities = match &raw.inherits {
                    Some(codes) => decode_affinities(codes),
                    None => vec![0; self.config.inherit_elements.len()],
                };
                Ok((pack_inherit_bits(&affinities)?, affinities))
            }
        }
    }

    fn encounter(&self, name: &Name, raw: &RawDemon) -> Result<Encounter, CompendiumError> {
        let eager = raw.eager.iter().flatten().map(|(actor, action)| Contact {
            actor: actor.clone(),
            action: action.clone(),
            result: Mood::Eager,
        });
        let happy = raw.happy.iter().flatten().map(|(actor, action)| Contact {
            actor: actor.clone(),
            action: action.clone(),
            result: Mood::Happy,
        });
        let contacts = eager.chain(happy).collect();

        let enraged = match (&raw.eresists, self.config.resist_encoding) {
            (None, _) => None,
            (Some(codes), ResistEncoding::Summary) => {
                Some(self.summary_profile(name, Some(codes), raw.emresists.as_deref())?)
            }
            (Some(codes), ResistEncoding::Packed) => {
                check_width(name, &self.config.resist_elements, codes)?;
                Some(ResistProfile::Packed {
                    resists: pack_resist_codes(codes, &self.config.resist_codes, None)?,
                    ailments: Vec::new(),
                })
            }
        };

        Ok(Encounter {
            area: raw.areas.as_deref().unwrap_or_default().join(", "),
            drops: raw.drops.clone().unwrap_or_default(),
            traits: raw.traits.clone().unwrap_or_default(),
            contacts,
            enraged,
        })
    }
}

/// Map a raw skill list to `skill -> level`. Entries of one character or
/// less are empty slots and are skipped.
fn skill_levels(names: Option<&[String]>, levels: &SkillLevels) -> IndexMap<Name, i32> {
    let mut map = IndexMap::new();
    for (i, skill) in names.unwrap_or_default().iter().enumerate() {
        if skill.chars().count() > 1 {
            map.insert(Name::new(skill), levels.level_at(i));
        }
    }
    map
}

/// Check a code string against its column headers, when the title has any.
fn check_width<T>(name: &Name, columns: &[T], codes: &str) -> Result<(), CompendiumError> {
    let found = codes.chars().count();
    if !columns.is_empty() && found != columns.len() {
        return Err(CompendiumError::ResistWidth {
            name: name.clone(),
            expected: columns.len(),
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ResistAlphabet;
    use crate::raw::RawDataset;

    fn summary_config() -> TitleConfig {
        let mut config = TitleConfig::new(
            "Summary",
            vec![Name::new("Beast"), Name::new("Fairy")],
            vec![Name::new("phys"), Name::new("fire"), Name::new("auto")],
            ResistAlphabet::from([('-', 100), ('w', 200), ('s', 50), ('n', 0)]),
        );
        config.inherit_elements = vec![Name::new("phys"), Name::new("fire")];
        config.gems = vec![Name::new("Ruby"), Name::new("Emerald")];
        config.alignments.insert("Beast".into(), "Neutral".into());
        config
    }

    fn packed_config() -> TitleConfig {
        let mut config = TitleConfig::new(
            "Packed",
            vec![Name::new("Beast"), Name::new("Prime")],
            vec![Name::new("phys"), Name::new("pas")],
            ResistAlphabet::from([('-', 1100), ('w', 2125), ('s', 3050), ('n', 4000)]),
        );
        config.resist_encoding = ResistEncoding::Packed;
        config.resist_elements = vec![Name::new("phys"), Name::new("fire")];
        config.ailments = vec!["Poison".into(), "Sleep".into()];
        config.demon_skill_levels = SkillLevels::Offset(-3);
        config
    }

    fn raw_demon(race: &str, lvl: i32) -> RawDemon {
        RawDemon {
            race: Some(race.into()),
            lvl: Some(lvl),
            ..Default::default()
        }
    }

    #[test]
    fn test_overlay_merge_and_dlc() {
        let mut base = RawDataset::default();
        base.demons.insert("Cerberus".into(), raw_demon("Beast", 30));
        let mut overlay = RawDataset {
            dlc: true,
            ..Default::default()
        };
        overlay.demons.insert(
            "Cerberus".into(),
            RawDemon {
                lvl: Some(35),
                ..Default::default()
            },
        );
        overlay.demons.insert("Orthrus".into(), raw_demon("Beast", 20));

        let merged = merge_layers(&RawTables::new(base).with_overlay(overlay));
        assert_eq!(merged.demons["Cerberus"].lvl, Some(35));
        assert_eq!(merged.demons["Cerberus"].race.as_deref(), Some("Beast"));
        assert!(merged.dlc_demons.contains("Orthrus"));
        assert!(!merged.dlc_demons.contains("Cerberus"));
    }

    #[test]
    fn test_later_overlay_wins() {
        let mut base = RawDataset::default();
        base.demons.insert(
            "Cerberus".into(),
            RawDemon {
                attack: Some("Bite".into()),
                ..raw_demon("Beast", 30)
            },
        );
        base.special_recipes.insert(
            "Cerberus".into(),
            RawRecipe::Ingredients(vec!["Orthrus".into()]),
        );

        let mut first = RawDataset::default();
        first.demons.insert(
            "Cerberus".into(),
            RawDemon {
                lvl: Some(35),
                attack: Some("Claw".into()),
                ..Default::default()
            },
        );
        first.special_recipes.insert(
            "Cerberus".into(),
            RawRecipe::Ingredients(vec!["Orthrus".into(), "Inugami".into()]),
        );

        let mut second = RawDataset::default();
        second.demons.insert(
            "Cerberus".into(),
            RawDemon {
                lvl: Some(40),
                ..Default::default()
            },
        );
        second.special_recipes.insert(
            "Cerberus".into(),
            RawRecipe::Totem {
                totem: Some("Beast".into()),
                ingredients: None,
            },
        );

        let tables = RawTables::new(base).with_overlay(first).with_overlay(second);
        let merged = merge_layers(&tables);
        let cerberus = &merged.demons["Cerberus"];
        assert_eq!(cerberus.lvl, Some(40));
        assert_eq!(cerberus.attack.as_deref(), Some("Claw"));
        assert_eq!(cerberus.race.as_deref(), Some("Beast"));
        assert_eq!(
            merged.recipes["Cerberus"],
            RawRecipe::Totem {
                totem: Some("Beast".into()),
                ingredients: None
            }
        );
    }

    #[test]
    fn test_summary_demon_defaults() {
        let mut base = RawDataset::default();
        base.demons.insert(
            "Cerberus".into(),
            RawDemon {
                disinherits: Some(vec!["fire".into()]),
                skills: Some(vec!["Bite".into(), "-".into(), "Agi".into()]),
                ..raw_demon("Beast", 30)
            },
        );
        let mut config = summary_config();
        config.demon_skill_levels = SkillLevels::Ranks(vec![0, 3, 4]);

        let tables = normalize(&config, &RawTables::new(base)).unwrap();
        let demon = &tables.demons["Cerberus"];
        assert_eq!(demon.align.as_deref(), Some("Neutral"));
        assert_eq!(demon.attack, "Normal");
        assert_eq!(demon.inherits, 0b10);
        assert_eq!(demon.affinities, vec![1, 0]);
        assert_eq!(demon.skills.get("Bite"), Some(&0));
        assert_eq!(demon.skills.get("Agi"), Some(&4));
        assert_eq!(demon.skills.len(), 2);
        match &demon.resists {
            ResistProfile::Summary { physical, summary, .. } => {
                assert_eq!(physical.len(), PHYSICAL_RESISTS);
                assert_eq!(summary[0], 100.0);
            }
            other => panic!("unexpected profile {other:?}"),
        }
    }

    #[test]
    fn test_missing_race_is_error() {
        let mut base = RawDataset::default();
        base.demons.insert(
            "Nobody".into(),
            RawDemon {
                lvl: Some(1),
                ..Default::default()
            },
        );
        let err = normalize(&summary_config(), &RawTables::new(base)).unwrap_err();
        assert_eq!(
            err,
            CompendiumError::MissingField {
                name: Name::new("Nobody"),
                field: "race"
            }
        );
    }

    #[test]
    fn test_unknown_race_is_error() {
        let mut base = RawDataset::default();
        base.demons.insert("Odd".into(), raw_demon("Tyrant", 1));
        assert!(matches!(
            normalize(&summary_config(), &RawTables::new(base)),
            Err(CompendiumError::UnknownRace { .. })
        ));
    }

    #[test]
    fn test_unknown_resist_code_is_error() {
        let mut base = RawDataset::default();
        base.demons.insert(
            "Odd".into(),
            RawDemon {
                presists: Some("z".repeat(PHYSICAL_RESISTS)),
                ..raw_demon("Beast", 1)
            },
        );
        assert_eq!(
            normalize(&summary_config(), &RawTables::new(base)).unwrap_err(),
            CompendiumError::UnknownCode { code: 'z' }
        );
    }

    #[test]
    fn test_resist_width_is_error() {
        let mut base = RawDataset::default();
        base.demons.insert(
            "Odd".into(),
            RawDemon {
                presists: Some("w".into()),
                ..raw_demon("Beast", 1)
            },
        );
        assert!(matches!(
            normalize(&summary_config(), &RawTables::new(base)),
            Err(CompendiumError::ResistWidth { expected: 14, found: 1, .. })
        ));
    }

    #[test]
    fn test_skill_rank_defaults() {
        let mut base = RawDataset::default();
        base.skills.insert(
            "Attack Up".into(),
            RawSkill {
                element: Some("auto".into()),
                ..Default::default()
            },
        );
        base.skills.insert(
            "Agi".into(),
            RawSkill {
                element: Some("fire".into()),
                ..Default::default()
            },
        );
        base.skills.insert(
            "Maragi".into(),
            RawSkill {
                element: Some("fire".into()),
                rank: Some(4),
                ..Default::default()
            },
        );
        let tables = normalize(&summary_config(), &RawTables::new(base)).unwrap();
        assert_eq!(tables.skills["Attack Up"].rank, 1);
        assert_eq!(tables.skills["Agi"].rank, 99);
        assert_eq!(tables.skills["Agi"].inherit, "non");
        assert_eq!(tables.skills["Maragi"].inherit, "fire");
        assert_eq!(tables.skills["Agi"].target, "Self");
    }

    #[test]
    fn test_rank_from_power() {
        let mut base = RawDataset::default();
        base.skills.insert(
            "Bufu".into(),
            RawSkill {
                element: Some("ice".into()),
                power: Some(45),
                rank: Some(7),
                ..Default::default()
            },
        );
        let mut config = summary_config();
        config.rank_from_power = true;
        let tables = normalize(&config, &RawTables::new(base)).unwrap();
        assert_eq!(tables.skills["Bufu"].rank, 4);
    }

    #[test]
    fn test_gems() {
        let tables = normalize(&summary_config(), &RawTables::default()).unwrap();
        let emerald = &tables.gems["Emerald"];
        assert_eq!(emerald.race, "Gem");
        assert_eq!(emerald.level, 2);
        assert_eq!(emerald.fusion, FusionMethod::Recruit);
        assert_eq!(emerald.prereq.as_deref(), Some("Item negotiation only"));
    }

    #[test]
    fn test_duplicate_gem_is_error() {
        let mut config = summary_config();
        config.gems.push(Name::new("Ruby"));
        assert_eq!(
            normalize(&config, &RawTables::default()).unwrap_err(),
            CompendiumError::DuplicateName {
                kind: EntityKind::Gem,
                name: Name::new("Ruby")
            }
        );
    }

    #[test]
    fn test_demon_and_gem_namespaces_are_separate() {
        let mut base = RawDataset::default();
        base.demons.insert("Ruby".into(), raw_demon("Fairy", 4));
        let tables = normalize(&summary_config(), &RawTables::new(base)).unwrap();
        assert!(tables.demons.contains_key("Ruby"));
        assert!(tables.gems.contains_key("Ruby"));
    }

    #[test]
    fn test_enemy_encounter() {
        let mut base = RawDataset::default();
        let mut eager = IndexMap::new();
        eager.insert("Flynn".to_string(), "Talk".to_string());
        base.enemies.insert(
            "Slime".into(),
            RawDemon {
                areas: Some(vec!["Mikado".into(), "Tokyo".into()]),
                skills: Some(vec!["Bite".into()]),
                eager: Some(eager),
                eresists: Some("w".repeat(PHYSICAL_RESISTS)),
                ..raw_demon("Beast", 6)
            },
        );
        let tables = normalize(&summary_config(), &RawTables::new(base)).unwrap();
        let slime = &tables.enemies["Slime"];
        assert!(slime.is_enemy);
        assert_eq!(slime.price, 36);
        assert_eq!(slime.skills.get("Bite"), Some(&1));
        let encounter = slime.encounter.as_ref().unwrap();
        assert_eq!(encounter.area, "Mikado, Tokyo");
        assert_eq!(encounter.contacts[0].result, Mood::Eager);
        assert!(matches!(
            encounter.enraged,
            Some(ResistProfile::Summary { .. })
        ));
    }

    #[test]
    fn test_boss_duplicates_enemy() {
        let mut base = RawDataset::default();
        base.enemies.insert("Slime".into(), raw_demon("Beast", 6));
        base.bosses.insert("Slime".into(), "Beast".into());
        assert!(matches!(
            normalize(&summary_config(), &RawTables::new(base)),
            Err(CompendiumError::DuplicateName {
                kind: EntityKind::Enemy,
                ..
            })
        ));
    }

    #[test]
    fn test_packed_demon() {
        let mut base = RawDataset::default();
        base.demons.insert(
            "Kaiwan".into(),
            RawDemon {
                resists: Some("-w".into()),
                resmods: Some(vec![0, 250]),
                ailments: Some("sn".into()),
                inherits: Some("o-o".into()),
                skills: Some(vec!["Bite".into()]),
                stats: Some(vec![50, 50, 10, 10]),
                ..raw_demon("Beast", 12)
            },
        );
        let tables = normalize(&packed_config(), &RawTables::new(base)).unwrap();
        let kaiwan = &tables.demons["Kaiwan"];
        match &kaiwan.resists {
            ResistProfile::Packed { resists, ailments } => {
                assert_eq!(resists[0], (1 << 10) | 40);
                assert_eq!(resists[1], (2 << 10) | 100);
                assert_eq!(unpack_resist(ailments[1]), (4, 0));
            }
            other => panic!("unexpected profile {other:?}"),
        }
        assert_eq!(kaiwan.inherits, 0b101);
        assert_eq!(kaiwan.price, 1551);
        assert_eq!(kaiwan.skills.get("Bite"), Some(&-3));
        assert_eq!(kaiwan.skills.get("Resist Poison"), Some(&0));
        assert_eq!(kaiwan.skills.get("Null Sleep"), Some(&0));
        assert!(tables.skills.contains_key("Weak Sleep"));
        assert_eq!(tables.skills["Null Poison"].element, "pas");
    }

    #[test]
    fn test_placeholder_boss() {
        let mut base = RawDataset::default();
        base.bosses.insert("Mastema".into(), "Prime".into());
        let tables = normalize(&packed_config(), &RawTables::new(base)).unwrap();
        let boss = &tables.enemies["Mastema"];
        assert!(boss.placeholder);
        assert!(boss.is_enemy);
        assert_eq!(boss.level, 1);
        assert_eq!(boss.fusion, FusionMethod::Password);
        assert!(boss.prereq.is_some());
    }

    #[test]
    fn test_codes() {
        let mut base = RawDataset::default();
        base.demons.insert("Pixie".into(), raw_demon("Fairy", 2));
        base.demon_codes = vec!["Nobody".into(), "Pixie".into()];
        let tables = normalize(&summary_config(), &RawTables::new(base)).unwrap();
        assert_eq!(tables.demons["Pixie"].code, Some(1));
    }
}
