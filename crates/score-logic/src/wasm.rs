//! WASM bindings for the browser score sheet

#![cfg(feature = "wasm")]

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::catalog::{GuildCard, LeaderCard, ScoringCard, Scope};
use crate::city::{CitySnapshot, SnapshotField};
use crate::conflict::ConflictInput;
use crate::project::{ProjectId, PROJECTS};
use crate::ring::{PlayerId, SeatingRing};
use crate::rules::ScoringRules;
use crate::{aggregate, conflict, project, science};

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

fn parse<T: serde::de::DeserializeOwned>(what: &str, json: &str) -> Result<T, JsError> {
    serde_json::from_str(json).map_err(|e| JsError::new(&format!("Invalid {}: {}", what, e)))
}

/// Empty string means the standard tables.
fn parse_rules(rules_json: &str) -> Result<ScoringRules, JsError> {
    if rules_json.trim().is_empty() {
        return Ok(ScoringRules::standard());
    }
    ScoringRules::from_json(rules_json).map_err(|e| JsError::new(&e.to_string()))
}

/// Best wildcard placement for a science hand
///
/// # Returns
/// JSON serialized ScienceResult
#[wasm_bindgen]
pub fn optimize_science(tablets: i32, compasses: i32, gears: i32, wildcards: i32) -> Result<JsValue, JsError> {
    let result = science::optimize(tablets, compasses, gears, wildcards)
        .map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&result)
}

/// One-line advice for a science hand
///
/// # Arguments
/// * `rules_json` - scoring rules override, or empty for the standard tables
#[wasm_bindgen]
pub fn science_hint(
    tablets: i32,
    compasses: i32,
    gears: i32,
    wildcards: i32,
    rules_json: &str,
) -> Result<String, JsError> {
    let rules = parse_rules(rules_json)?;
    let result = science::optimize(tablets, compasses, gears, wildcards)
        .map_err(|e| JsError::new(&e.to_string()))?;
    Ok(science::hint(&result).describe(rules.set_bonus))
}

/// Resolve land conflicts for all three ages
///
/// # Arguments
/// * `ring_json` - seat order, e.g. `[4, 9, 2]`
/// * `input_json` - per-player strength, diplomacy and boarding flags
/// * `rules_json` - scoring rules override, or empty for the standard tables
///
/// # Returns
/// JSON serialized ConflictOutcome
#[wasm_bindgen]
pub fn resolve_land(ring_json: &str, input_json: &str, rules_json: &str) -> Result<JsValue, JsError> {
    let ring: SeatingRing = parse("ring", ring_json)?;
    let input: ConflictInput = parse("conflict input", input_json)?;
    let rules = parse_rules(rules_json)?;
    let outcome = conflict::resolve_land(&ring, &input, &rules.land)
        .map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&outcome)
}

/// Rank naval strength for all three ages
///
/// Same arguments as `resolve_land`.
#[wasm_bindgen]
pub fn resolve_naval(ring_json: &str, input_json: &str, rules_json: &str) -> Result<JsValue, JsError> {
    let ring: SeatingRing = parse("ring", ring_json)?;
    let input: ConflictInput = parse("conflict input", input_json)?;
    let rules = parse_rules(rules_json)?;
    let outcome = conflict::resolve_naval(&ring, &input, &rules.naval)
        .map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&outcome)
}

/// Reward or penalty of a collaborative project for one player
///
/// # Arguments
/// * `project` - project id, e.g. `"colossus"`
/// * `completed` - whether the table finished the project
/// * `contributed` - whether this player paid in
/// * `player` - id of the player, used in missing-field reports
/// * `city_json` - JSON serialized CitySnapshot of that player
#[wasm_bindgen]
pub fn evaluate_project(
    project: &str,
    completed: bool,
    contributed: bool,
    player: u32,
    city_json: &str,
) -> Result<JsValue, JsError> {
    let id: ProjectId = parse("project", &format!("\"{}\"", project))?;
    let city: CitySnapshot = parse("city", city_json)?;
    let outcome = project::evaluate_project(id, completed, contributed, PlayerId(player), &city);
    to_js(&outcome)
}

/// Score a full game sheet
///
/// # Returns
/// JSON serialized GameReport with every breakdown and the standings
#[wasm_bindgen]
pub fn score_game(sheet_json: &str, rules_json: &str) -> Result<JsValue, JsError> {
    let sheet: aggregate::GameSheet = parse("game sheet", sheet_json)?;
    let rules = parse_rules(rules_json)?;
    let report = aggregate::score_game(sheet, rules).map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&report)
}

#[derive(Serialize)]
struct CardInfo<C: Serialize> {
    id: C,
    name: &'static str,
    own: Vec<SnapshotField>,
    neighbors: Vec<SnapshotField>,
}

fn card_infos<C: ScoringCard + Serialize>(cards: &[C]) -> Vec<CardInfo<C>> {
    cards
        .iter()
        .filter_map(|card| {
            let entry = card.entry()?;
            let fields = entry.required_fields();
            let pick = |keep: fn(Scope) -> bool| -> Vec<SnapshotField> {
                fields.iter().filter(|(s, _)| keep(*s)).map(|(_, f)| *f).collect()
            };
            Some(CardInfo {
                id: *card,
                name: entry.name,
                own: pick(|s| matches!(s, Scope::Own | Scope::OwnAndNeighbors)),
                neighbors: pick(|s| matches!(s, Scope::Neighbors | Scope::OwnAndNeighbors)),
            })
        })
        .collect()
}

/// List a catalog for the card pickers
///
/// # Arguments
/// * `catalog` - `"guilds"`, `"leaders"` or `"projects"`
#[wasm_bindgen]
pub fn list_catalog(catalog: &str) -> Result<JsValue, JsError> {
    match catalog {
        "guilds" => to_js(&card_infos(&GuildCard::ALL)),
        "leaders" => to_js(&card_infos(&LeaderCard::ALL)),
        "projects" => to_js(&PROJECTS),
        _ => Err(JsError::new(&format!("Unknown catalog: {}", catalog))),
    }
}
