//! Score Logic for a ring-seated card-drafting game
//!
//! End-of-game scoring for three to seven players seated in a circle.
//! Every evaluator is a pure function of its inputs; the `Scoreboard` ties
//! them together with a per-game cache.
//! This crate is compiled to:
//! - Native (for the score sheet service and tests)
//! - WASM (for the browser score sheet)

mod error;
mod rules;
mod ring;
mod city;
mod science;
mod conflict;
mod catalog;
mod city_vp;
mod project;
mod aggregate;

#[cfg(feature = "wasm")]
mod wasm;

pub use error::{Result, ScoreError};
pub use rules::{Age, LandTable, NavalTable, ScoringRules, AGES};
pub use ring::{PlayerId, SeatingRing, MAX_PLAYERS, MIN_PLAYERS};
pub use city::{city_of, CardColor, Cities, CitySnapshot, FieldRef, SnapshotField};
pub use science::{hint, optimize, ScienceHint, ScienceInputs, ScienceResult, ScienceSymbol, SET_BONUS};
pub use conflict::{
    resolve_land, resolve_naval, Boarding, ConflictEntry, ConflictEvent, ConflictInput, ConflictOutcome,
    EngagementKind, NavalPlace, PlayerConflictResult,
};
pub use catalog::{granted_wildcards, CatalogEntry, GuildCard, LeaderCard, Scope, ScoringCard, ScoringRule};
pub use city_vp::{score_card, score_cards, score_guilds, score_leaders, CatalogScore, ScoredEntry};
pub use project::{
    evaluate_project, project, projects_for, Applied, Penalty, ProjectDefinition, ProjectId, ProjectOutcome,
    Resource, Reward, TokenDelta, TokenKind, VpFormula, PROJECTS,
};
pub use aggregate::{
    score_game, Breakdown, Category, CategoryScore, CategorySource, GameReport, GameSheet, ProjectSelection,
    ScoreCache, Scoreboard, Standing,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_surface_scores_a_game() {
        let ring = SeatingRing::new(vec![PlayerId(10), PlayerId(20), PlayerId(30)]).unwrap();
        let cities: Cities = ring
            .players()
            .iter()
            .map(|p| (*p, CitySnapshot::new().with(SnapshotField::Coins, p.0 / 10 * 3)))
            .collect();
        let report = score_game(GameSheet::new(ring, cities), ScoringRules::default()).unwrap();

        let order: Vec<PlayerId> = report.standings.iter().map(|s| s.player).collect();
        assert_eq!(order, vec![PlayerId(30), PlayerId(20), PlayerId(10)]);
        assert_eq!(report.standings[0].total, 3);
    }
}
