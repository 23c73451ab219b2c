//! # demon-compendium - Compendium Derivation Engine for Demon-Fusion Titles
//!
//! Turns the raw per-title data tables of a demon-fusion RPG into the
//! derived lookup structures a fusion calculator needs:
//! - **Canonical entities** for demons, enemies, gems and skills
//! - **Decoded resists** and inheritance bitmasks
//! - **Special recipes** classified by fusion method
//! - **Level indices** per race for forward and reverse fusion search
//!
//! ## Core Concepts
//!
//! ### Build Pipeline
//!
//! A compendium is derived once, inside its constructor:
//!
//! ```text
//! [RawTables] → [normalize] → [classify] → [LevelIndex] → [resolve] → Compendium
//! ```
//!
//! 1. **Normalize** applies per-title defaults and decodes compact codes
//! 2. **Classify** tags every demon with its fusion method (pass one)
//! 3. **Index** builds the frozen per-race level lists
//! 4. **Resolve** expands recipes that refer to current fusion results (pass two)
//!
//! ### Title Families
//!
//! Titles come in two resist encodings, selected by
//! [`config::ResistEncoding`]: summary titles carry physical and magic
//! resist tables plus a display summary, packed titles carry packed
//! resist and ailment values and generate ailment-resistance skills.
//!
//! ## Example
//!
//! ```rust
//! use demon_compendium::*;
//!
//! let config = TitleConfig::from_json(r#"{
//!     "title": "Example",
//!     "races": ["Beast", "Fairy"],
//!     "elements": ["phys", "elec"],
//!     "resist_codes": { "-": 100, "w": 200 }
//! }"#).unwrap();
//!
//! let base = RawDataset::from_json(r#"{
//!     "demons": {
//!         "Pixie": { "race": "Fairy", "lvl": 2, "skills": ["Zio"] },
//!         "High Pixie": { "race": "Fairy", "lvl": 10 }
//!     },
//!     "skills": { "Zio": { "element": "elec", "rank": 1 } },
//!     "special_recipes": { "High Pixie": ["Pixie", "Angel x Archangel"] }
//! }"#).unwrap();
//!
//! let compendium = Compendium::build(&config, &RawTables::new(base)).unwrap();
//! assert_eq!(compendium.get_result_demon_lvls("Fairy"), &[2]);
//! assert_eq!(compendium.get_special_name_pairs("High Pixie")[0].name2, "Archangel");
//! assert_eq!(compendium.get_skill("Zio").unwrap().learned_by[0].demon, "Pixie");
//! ```
//!
//! ## Modules
//!
//! - [`name`] - Shared entity name type
//! - [`codec`] - Resist, inheritance and price codecs
//! - [`config`] - Per-title configuration
//! - [`raw`] - Raw table records
//! - [`normalizer`] - Entity normalizer
//! - [`recipe`] - Two-pass recipe classifier
//! - [`index`] - Level indices and skill cross-references
//! - [`compendium`] - Query facade
//! - [`error`] - Error types

pub mod codec;
pub mod compendium;
pub mod config;
pub mod entity;
pub mod error;
pub mod index;
pub mod name;
pub mod normalizer;
pub mod raw;
pub mod recipe;

// Re-export main types for convenience
pub use compendium::Compendium;
pub use config::{FusionSettings, IngredientRule, ResistEncoding, SkillLevels, TitleConfig};
pub use error::CompendiumError;
pub use name::Name;
pub use raw::{RawDataset, RawTables};

// Re-export entity types
pub use entity::{
    Contact, Demon, Encounter, EntityKind, FusionMethod, Mood, NamePair, ResistProfile, Skill,
    SkillRef,
};
