//! Basic example: Build a compendium and query its fusion tables
//!
//! This example demonstrates:
//! - Loading a title configuration and one raw dataset from JSON
//! - Building a compendium
//! - Querying level lists, reverse lookups and special recipes

use demon_compendium::*;

const CONFIG: &str = r#"{
    "title": "Basic",
    "races": ["Beast", "Fairy"],
    "elements": ["phys", "elec"],
    "resist_codes": { "-": 100, "w": 200, "s": 50 }
}"#;

const DATASET: &str = r#"{
    "demons": {
        "Nekomata": { "race": "Beast", "lvl": 3, "skills": ["Lunge"] },
        "Inugami": { "race": "Beast", "lvl": 7, "skills": ["Lunge"] },
        "Cerberus": { "race": "Beast", "lvl": 40 },
        "Pixie": { "race": "Fairy", "lvl": 2, "skills": ["Zio"] },
        "High Pixie": { "race": "Fairy", "lvl": 10 }
    },
    "skills": {
        "Lunge": { "element": "phys", "rank": 2 },
        "Zio": { "element": "elec", "rank": 1 }
    },
    "special_recipes": {
        "Cerberus": ["Pixie x Inugami", "Nekomata"]
    }
}"#;

fn main() -> Result<(), CompendiumError> {
    let config = TitleConfig::from_json(CONFIG)?;
    let tables = RawTables::new(RawDataset::from_json(DATASET)?);

    println!("Building compendium for {}...", config.title);
    let compendium = Compendium::build(&config, &tables)?;

    println!("\n=== Level Lists ===");
    for race in &config.races {
        println!("{}:", race);
        println!("  ingredients: {:?}", compendium.get_ingredient_demon_lvls(race.as_str()));
        println!("  results:     {:?}", compendium.get_result_demon_lvls(race.as_str()));
    }

    println!("\n=== Reverse Lookup ===");
    for level in [3, 7, 99] {
        match compendium.reverse_lookup_demon("Beast", level) {
            Some(name) => println!("Beast lvl {}: {}", level, name),
            None => println!("Beast lvl {}: none", level),
        }
    }

    println!("\n=== Special Recipes ===");
    for demon in compendium.special_demons() {
        println!("{} ({})", demon.name, demon.fusion);
        for entry in compendium.get_special_name_entries(demon.name.as_str()) {
            println!("  - {}", entry);
        }
        for pair in compendium.get_special_name_pairs(demon.name.as_str()) {
            println!("  - {} x {}", pair.name1, pair.name2);
        }
    }

    println!("\n=== Skills ===");
    for skill in compendium.get_skills(&["Zio", "Lunge"]) {
        let holders: Vec<String> = skill
            .learned_by
            .iter()
            .map(|r| format!("{} ({})", r.demon, r.level))
            .collect();
        println!("{} [{}]: {}", skill.name, skill.element, holders.join(", "));
    }

    Ok(())
}
