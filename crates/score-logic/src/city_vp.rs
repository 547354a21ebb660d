//! Neighbor and city VP resolution for guild and leader cards

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::catalog::{GuildCard, LeaderCard, ScoringCard, ScoringRule};
use crate::city::{city_of, Cities, FieldRef, SnapshotField};
use crate::error::Result;
use crate::ring::{PlayerId, SeatingRing};
use crate::rules::ScoringRules;
use crate::science::ScienceInputs;

/// VP of one selected card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredEntry {
    pub name: String,
    pub value: i32,
    /// Fields that were read as zero because nobody entered them
    pub missing_fields: Vec<FieldRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// VP of every selected card of one catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogScore {
    pub entries: Vec<ScoredEntry>,
    pub total: i32,
    /// Union of the entries' missing fields
    pub missing_fields: Vec<FieldRef>,
}

impl CatalogScore {
    pub fn is_complete(&self) -> bool {
        self.missing_fields.is_empty()
    }
}

/// Score one card for `player`.
pub fn score_card<C: ScoringCard + Debug>(
    player: PlayerId,
    card: C,
    ring: &SeatingRing,
    cities: &Cities,
    rules: &ScoringRules,
) -> Result<ScoredEntry> {
    let Some(entry) = card.entry() else {
        tracing::warn!(%player, catalog = C::CATALOG, ?card, "unrecognized card scored as zero");
        return Ok(ScoredEntry {
            name: format!("{:?}", card),
            value: 0,
            missing_fields: Vec::new(),
            note: Some(format!("unrecognized {} card, scored as zero", C::CATALOG)),
        });
    };

    let mut missing = Vec::new();
    let (value, note) = evaluate(entry.rule, player, ring, cities, rules, &mut missing)?;
    Ok(ScoredEntry {
        name: entry.name.to_string(),
        value,
        missing_fields: missing,
        note,
    })
}

/// Score a list of selected cards for `player`.
///
/// # Arguments
/// * `player` - whose cards these are
/// * `cards` - selected cards, scored in order
/// * `ring` - seating, for left/right neighbors
/// * `cities` - snapshots of every seated player
/// * `rules` - set bonus used by science-based cards
pub fn score_cards<C: ScoringCard + Debug>(
    player: PlayerId,
    cards: &[C],
    ring: &SeatingRing,
    cities: &Cities,
    rules: &ScoringRules,
) -> Result<CatalogScore> {
    ring.position(player)?;
    let mut score = CatalogScore::default();
    for card in cards {
        let entry = score_card(player, *card, ring, cities, rules)?;
        score.total = score.total.saturating_add(entry.value);
        for field in &entry.missing_fields {
            if !score.missing_fields.contains(field) {
                score.missing_fields.push(*field);
            }
        }
        score.entries.push(entry);
    }
    tracing::debug!(%player, catalog = C::CATALOG, cards = cards.len(), total = score.total, "scored catalog");
    Ok(score)
}

/// Score the guilds selected in `player`'s city.
pub fn score_guilds(player: PlayerId, ring: &SeatingRing, cities: &Cities, rules: &ScoringRules) -> Result<CatalogScore> {
    let cards: Vec<GuildCard> = city_of(cities, player)?.guilds.clone();
    score_cards(player, &cards, ring, cities, rules)
}

/// Score the leaders selected in `player`'s city.
pub fn score_leaders(player: PlayerId, ring: &SeatingRing, cities: &Cities, rules: &ScoringRules) -> Result<CatalogScore> {
    let cards: Vec<LeaderCard> = city_of(cities, player)?.leaders.clone();
    score_cards(player, &cards, ring, cities, rules)
}

fn vp(value: u64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Summed fields of one player's snapshot
fn sum_fields(
    cities: &Cities,
    player: PlayerId,
    fields: &[SnapshotField],
    missing: &mut Vec<FieldRef>,
) -> Result<u64> {
    let city = city_of(cities, player)?;
    Ok(fields.iter().map(|f| u64::from(city.lookup(player, *f, missing))).sum())
}

fn evaluate(
    rule: ScoringRule,
    player: PlayerId,
    ring: &SeatingRing,
    cities: &Cities,
    rules: &ScoringRules,
    missing: &mut Vec<FieldRef>,
) -> Result<(i32, Option<String>)> {
    let (left, right) = ring.neighbors(player)?;

    let value = match rule {
        ScoringRule::PerOwn { fields, points, per } => {
            let units = sum_fields(cities, player, fields, missing)? / u64::from(per.max(1));
            units.saturating_mul(u64::from(points))
        }
        ScoringRule::PerNeighbors { fields, points, include_self } => {
            let mut units = sum_fields(cities, left, fields, missing)? + sum_fields(cities, right, fields, missing)?;
            if include_self {
                units += sum_fields(cities, player, fields, missing)?;
            }
            units.saturating_mul(u64::from(points))
        }
        ScoringRule::PerSet { fields, points } => {
            let mut sets: Option<u64> = None;
            for field in fields {
                let n = sum_fields(cities, player, std::slice::from_ref(field), missing)?;
                sets = Some(sets.map_or(n, |s| s.min(n)));
            }
            sets.unwrap_or(0).saturating_mul(u64::from(points))
        }
        ScoringRule::BeatsNeighbors { field, points } => {
            let fields = std::slice::from_ref(&field);
            let own = sum_fields(cities, player, fields, missing)?;
            let l = sum_fields(cities, left, fields, missing)?;
            let r = sum_fields(cities, right, fields, missing)?;
            if own > l && own > r {
                u64::from(points)
            } else {
                0
            }
        }
        ScoringRule::NeighborCoins { per, cap } => {
            let coins = [SnapshotField::Coins];
            let total = sum_fields(cities, left, &coins, missing)? + sum_fields(cities, right, &coins, missing)?;
            (total / u64::from(per.max(1))).min(u64::from(cap))
        }
        ScoringRule::PerScienceSet { points } => {
            let (inputs, absent) = ScienceInputs::from_city(player, city_of(cities, player)?);
            for field in absent {
                if !missing.contains(&field) {
                    missing.push(field);
                }
            }
            let sets = inputs.score_with_rules(rules).sets;
            u64::from(sets).saturating_mul(u64::from(points))
        }
        ScoringRule::ScienceWildcard => {
            return Ok((0, Some("adds one science wildcard".to_string())));
        }
        ScoringRule::Flat { points } => u64::from(points),
    };

    Ok((vp(value), None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::{CardColor, CitySnapshot};

    fn ring(n: u32) -> SeatingRing {
        SeatingRing::new((1..=n).map(PlayerId).collect()).unwrap()
    }

    fn full_city(n: u32) -> CitySnapshot {
        let mut city = CitySnapshot::new();
        for color in CardColor::ALL {
            city.set(SnapshotField::cards(color), n);
        }
        city.with(SnapshotField::WonderStages, n)
            .with(SnapshotField::Coins, n)
            .with(SnapshotField::MilitaryVictories, n)
            .with(SnapshotField::MilitaryDefeats, n)
            .with(SnapshotField::Tablets, n)
            .with(SnapshotField::Compasses, n)
            .with(SnapshotField::Gears, n)
    }

    fn cities(list: Vec<CitySnapshot>) -> Cities {
        list.into_iter().enumerate().map(|(i, c)| (PlayerId(i as u32 + 1), c)).collect()
    }

    fn guild(player: u32, card: GuildCard, ring: &SeatingRing, cities: &Cities) -> ScoredEntry {
        score_card(PlayerId(player), card, ring, cities, &ScoringRules::standard()).unwrap()
    }

    fn leader(player: u32, card: LeaderCard, ring: &SeatingRing, cities: &Cities) -> ScoredEntry {
        score_card(PlayerId(player), card, ring, cities, &ScoringRules::standard()).unwrap()
    }

    #[test]
    fn test_workers_counts_neighbors_only() {
        let c = cities(vec![
            full_city(0).with_cards(CardColor::Brown, 9),
            full_city(0).with_cards(CardColor::Brown, 2),
            full_city(0).with_cards(CardColor::Brown, 1),
            full_city(0).with_cards(CardColor::Brown, 4),
        ]);
        let r = ring(4);
        // player 1: left is 4, right is 2
        assert_eq!(guild(1, GuildCard::Workers, &r, &c).value, 6);
        // player 3 sees 2 and 4, never 1
        assert_eq!(guild(3, GuildCard::Workers, &r, &c).value, 6);
    }

    #[test]
    fn test_self_and_neighbors_in_three_player_ring() {
        let c = cities(vec![
            full_city(0).with(SnapshotField::WonderStages, 2),
            full_city(0).with(SnapshotField::WonderStages, 3),
            full_city(0).with(SnapshotField::WonderStages, 1),
        ]);
        let entry = guild(1, GuildCard::Builders, &ring(3), &c);
        assert_eq!(entry.value, 2 + 3 + 1);
        assert!(entry.missing_fields.is_empty());
    }

    #[test]
    fn test_own_color_counted_once_with_neighbors() {
        let c = cities(vec![
            full_city(0).with_cards(CardColor::Grey, 2),
            full_city(0).with_cards(CardColor::Grey, 3),
            full_city(0).with_cards(CardColor::Grey, 4),
        ]);
        let rule = ScoringRule::PerNeighbors { fields: &[SnapshotField::GreyCards], points: 1, include_self: true };
        let mut missing = Vec::new();
        let (value, _) = evaluate(rule, PlayerId(1), &ring(3), &c, &ScoringRules::standard(), &mut missing).unwrap();
        // both neighbors plus own city, own city not doubled
        assert_eq!(value, 2 + 3 + 4);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_craftsmens_multiplier() {
        let c = cities(vec![full_city(1), full_city(2), full_city(3)]);
        assert_eq!(guild(1, GuildCard::Craftsmens, &ring(3), &c).value, 10);
    }

    #[test]
    fn test_shipowners_own_colors() {
        let c = cities(vec![
            full_city(0)
                .with_cards(CardColor::Brown, 3)
                .with_cards(CardColor::Grey, 2)
                .with_cards(CardColor::Purple, 1),
            full_city(5),
            full_city(5),
        ]);
        assert_eq!(guild(1, GuildCard::Shipowners, &ring(3), &c).value, 6);
    }

    #[test]
    fn test_per_own_divisor() {
        let c = cities(vec![full_city(0).with(SnapshotField::Coins, 8), full_city(0), full_city(0)]);
        assert_eq!(leader(1, LeaderCard::Midas, &ring(3), &c).value, 2);
        assert_eq!(guild(1, GuildCard::Gamers, &ring(3), &c).value, 2);
    }

    #[test]
    fn test_plato_needs_all_seven_colors() {
        let c = cities(vec![full_city(2).with_cards(CardColor::Green, 1), full_city(0), full_city(0)]);
        assert_eq!(leader(1, LeaderCard::Plato, &ring(3), &c).value, 7);

        let c = cities(vec![full_city(3).with_cards(CardColor::Red, 0), full_city(0), full_city(0)]);
        assert_eq!(leader(1, LeaderCard::Plato, &ring(3), &c).value, 0);
    }

    #[test]
    fn test_justinian_sets() {
        let c = cities(vec![
            full_city(0)
                .with_cards(CardColor::Blue, 3)
                .with_cards(CardColor::Green, 2)
                .with_cards(CardColor::Red, 4),
            full_city(0),
            full_city(0),
        ]);
        assert_eq!(leader(1, LeaderCard::Justinian, &ring(3), &c).value, 6);
    }

    #[test]
    fn test_beats_neighbors_is_strict() {
        let c = cities(vec![
            full_city(0).with_cards(CardColor::Red, 4),
            full_city(0).with_cards(CardColor::Red, 3),
            full_city(0).with_cards(CardColor::Red, 4),
        ]);
        assert_eq!(guild(1, GuildCard::Champions, &ring(3), &c).value, 0);

        let c = cities(vec![
            full_city(0).with_cards(CardColor::Red, 5),
            full_city(0).with_cards(CardColor::Red, 3),
            full_city(0).with_cards(CardColor::Red, 4),
        ]);
        assert_eq!(guild(1, GuildCard::Champions, &ring(3), &c).value, 4);
    }

    #[test]
    fn test_neighbor_coins_capped() {
        let c = cities(vec![
            full_city(0),
            full_city(0).with(SnapshotField::Coins, 7),
            full_city(0).with(SnapshotField::Coins, 5),
        ]);
        assert_eq!(leader(1, LeaderCard::Solomon, &ring(3), &c).value, 4);

        let c = cities(vec![
            full_city(0),
            full_city(0).with(SnapshotField::Coins, 20),
            full_city(0).with(SnapshotField::Coins, 20),
        ]);
        assert_eq!(leader(1, LeaderCard::Solomon, &ring(3), &c).value, 5);
    }

    #[test]
    fn test_aristotle_counts_optimized_sets() {
        let c = cities(vec![
            full_city(0)
                .with(SnapshotField::Tablets, 2)
                .with(SnapshotField::Compasses, 2)
                .with(SnapshotField::Gears, 1)
                .with_leader(LeaderCard::Euclid),
            full_city(0),
            full_city(0),
        ]);
        // Euclid's wildcard completes a second set
        assert_eq!(leader(1, LeaderCard::Aristotle, &ring(3), &c).value, 6);
    }

    #[test]
    fn test_wildcard_card_scores_zero_with_note() {
        let c = cities(vec![full_city(0), full_city(0), full_city(0)]);
        let entry = guild(1, GuildCard::Scientists, &ring(3), &c);
        assert_eq!(entry.value, 0);
        assert!(entry.note.is_some());
    }

    #[test]
    fn test_missing_neighbor_field_reported() {
        let c = cities(vec![
            CitySnapshot::new(),
            CitySnapshot::new().with_cards(CardColor::Red, 2),
            CitySnapshot::new(),
        ]);
        let entry = guild(1, GuildCard::Spies, &ring(3), &c);
        assert_eq!(entry.value, 2);
        assert_eq!(
            entry.missing_fields,
            vec![FieldRef { player: PlayerId(3), field: SnapshotField::RedCards }]
        );
    }

    #[test]
    fn test_zero_is_not_missing() {
        let c = cities(vec![full_city(0), full_city(0), full_city(0)]);
        let entry = guild(1, GuildCard::Spies, &ring(3), &c);
        assert_eq!(entry.value, 0);
        assert!(entry.missing_fields.is_empty());
    }

    #[test]
    fn test_unknown_card_is_zero_with_note() {
        let c = cities(vec![full_city(1), full_city(1), full_city(1)]);
        let entry = leader(1, LeaderCard::Unknown, &ring(3), &c);
        assert_eq!(entry.value, 0);
        assert!(entry.note.as_deref().is_some_and(|n| n.contains("unrecognized leader")));
    }

    #[test]
    fn test_score_guilds_totals_and_unions_missing() {
        let c = cities(vec![
            CitySnapshot::new()
                .with_guild(GuildCard::Workers)
                .with_guild(GuildCard::Traders)
                .with_guild(GuildCard::Unknown),
            CitySnapshot::new().with_cards(CardColor::Brown, 2).with_cards(CardColor::Yellow, 1),
            CitySnapshot::new().with_cards(CardColor::Brown, 3),
        ]);
        let score = score_guilds(PlayerId(1), &ring(3), &c, &ScoringRules::standard()).unwrap();
        assert_eq!(score.entries.len(), 3);
        assert_eq!(score.total, 5 + 1);
        assert!(!score.is_complete());
        assert_eq!(
            score.missing_fields,
            vec![FieldRef { player: PlayerId(3), field: SnapshotField::YellowCards }]
        );
    }

    #[test]
    fn test_score_leaders_unknown_player() {
        let c = cities(vec![full_city(0), full_city(0), full_city(0)]);
        assert!(score_leaders(PlayerId(9), &ring(3), &c, &ScoringRules::standard()).is_err());
    }

    #[test]
    fn test_idempotent() {
        let c = cities(vec![
            full_city(2).with_guild(GuildCard::Builders).with_leader(LeaderCard::Plato),
            full_city(3),
            full_city(4),
        ]);
        let rules = ScoringRules::standard();
        let a = score_guilds(PlayerId(1), &ring(3), &c, &rules).unwrap();
        let b = score_guilds(PlayerId(1), &ring(3), &c, &rules).unwrap();
        assert_eq!(a, b);
    }
}
