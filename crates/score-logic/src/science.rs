//! Science scoring and wildcard placement
//!
//! Science scores `set_bonus * sets + a² + b² + c²`. The set term rewards
//! spreading symbols while the squares reward piling them up, so wildcard
//! placement is searched exhaustively over every composition of the
//! wildcard count into three parts: `O(w²)` candidates.

use serde::{Deserialize, Serialize};

use crate::catalog::granted_wildcards;
use crate::city::{CitySnapshot, FieldRef, SnapshotField};
use crate::error::{Result, ScoreError};
use crate::ring::PlayerId;
use crate::rules::ScoringRules;

/// Bonus for each complete set under the standard rules.
pub const SET_BONUS: u32 = 7;

/// The three science symbols
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScienceSymbol {
    Tablet,
    Compass,
    Gear,
}

impl ScienceSymbol {
    pub const ALL: [ScienceSymbol; 3] = [ScienceSymbol::Tablet, ScienceSymbol::Compass, ScienceSymbol::Gear];

    pub fn label(self) -> &'static str {
        match self {
            ScienceSymbol::Tablet => "tablet",
            ScienceSymbol::Compass => "compass",
            ScienceSymbol::Gear => "gear",
        }
    }
}

/// Symbol counts before wildcard placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScienceInputs {
    pub tablets: u32,
    pub compasses: u32,
    pub gears: u32,
    pub wildcards: u32,
}

impl ScienceInputs {
    pub fn new(tablets: u32, compasses: u32, gears: u32, wildcards: u32) -> Self {
        Self { tablets, compasses, gears, wildcards }
    }

    /// Read a player's science from their snapshot.
    ///
    /// Wildcards granted by selected guild/leader cards are added to the
    /// entered wildcard count. Absent symbol fields are reported; an absent
    /// wildcard field simply means none.
    pub fn from_city(player: PlayerId, city: &CitySnapshot) -> (Self, Vec<FieldRef>) {
        let mut missing = Vec::new();
        let inputs = Self {
            tablets: city.lookup(player, SnapshotField::Tablets, &mut missing),
            compasses: city.lookup(player, SnapshotField::Compasses, &mut missing),
            gears: city.lookup(player, SnapshotField::Gears, &mut missing),
            wildcards: city.count(SnapshotField::ScienceWildcards) + granted_wildcards(city),
        };
        (inputs, missing)
    }

    /// True when no symbol or wildcard field of the snapshot was entered.
    ///
    /// Selected cards that grant wildcards do not count as an entry.
    pub fn is_unentered(city: &CitySnapshot) -> bool {
        [
            SnapshotField::Tablets,
            SnapshotField::Compasses,
            SnapshotField::Gears,
            SnapshotField::ScienceWildcards,
        ]
        .iter()
        .all(|f| city.get(*f).is_none())
    }

    /// Best placement under the standard set bonus
    pub fn score(&self) -> ScienceResult {
        self.score_with(SET_BONUS)
    }

    pub fn score_with_rules(&self, rules: &ScoringRules) -> ScienceResult {
        self.score_with(rules.set_bonus)
    }

    /// Best placement for a given set bonus.
    ///
    /// Ties keep the first candidate found, scanning tablet wildcards
    /// ascending and then compass wildcards ascending.
    pub fn score_with(&self, set_bonus: u32) -> ScienceResult {
        let w = self.wildcards;
        let mut best = [0u32, 0, w];
        let mut best_total = None;

        for wa in 0..=w {
            for wb in 0..=(w - wa) {
                let wc = w - wa - wb;
                let total = formula(
                    self.tablets.saturating_add(wa),
                    self.compasses.saturating_add(wb),
                    self.gears.saturating_add(wc),
                    set_bonus,
                );
                if best_total.map_or(true, |b| total > b) {
                    best_total = Some(total);
                    best = [wa, wb, wc];
                }
            }
        }

        ScienceResult::build(self, best, set_bonus)
    }
}

/// Optimal science outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScienceResult {
    pub tablets: u32,
    pub compasses: u32,
    pub gears: u32,
    /// Wildcards placed on tablet, compass, gear
    pub placement: [u32; 3],
    pub sets: u32,
    pub set_bonus: u64,
    pub squares: u64,
    pub total: u64,
    pub breakdown: String,
}

impl ScienceResult {
    fn build(inputs: &ScienceInputs, placement: [u32; 3], bonus: u32) -> Self {
        let tablets = inputs.tablets.saturating_add(placement[0]);
        let compasses = inputs.compasses.saturating_add(placement[1]);
        let gears = inputs.gears.saturating_add(placement[2]);
        let sets = tablets.min(compasses).min(gears);
        let set_bonus = u64::from(sets).saturating_mul(u64::from(bonus));
        let squares = square(tablets).saturating_add(square(compasses)).saturating_add(square(gears));
        let total = set_bonus.saturating_add(squares);

        let mut breakdown = format!("{} tablets, {} compasses, {} gears", tablets, compasses, gears);
        if inputs.wildcards > 0 {
            breakdown.push_str(&format!(
                " ({} wildcards as {}/{}/{})",
                inputs.wildcards, placement[0], placement[1], placement[2]
            ));
        }
        breakdown.push_str(&format!(
            ": {} sets x {} = {}, squares {} + {} + {} = {}, total {}",
            sets,
            bonus,
            set_bonus,
            square(tablets),
            square(compasses),
            square(gears),
            squares,
            total
        ));

        Self { tablets, compasses, gears, placement, sets, set_bonus, squares, total, breakdown }
    }

    /// Final count for a symbol
    pub fn count(&self, symbol: ScienceSymbol) -> u32 {
        match symbol {
            ScienceSymbol::Tablet => self.tablets,
            ScienceSymbol::Compass => self.compasses,
            ScienceSymbol::Gear => self.gears,
        }
    }
}

fn square(n: u32) -> u64 {
    u64::from(n).saturating_mul(u64::from(n))
}

fn formula(a: u32, b: u32, c: u32, bonus: u32) -> u64 {
    let sets = u64::from(a.min(b).min(c));
    sets.saturating_mul(u64::from(bonus))
        .saturating_add(square(a))
        .saturating_add(square(b))
        .saturating_add(square(c))
}

fn non_negative(field: &'static str, value: i32) -> Result<u32> {
    u32::try_from(value).map_err(|_| ScoreError::NegativeCount { field, value: i64::from(value) })
}

/// Place `wildcards` to maximize the standard science score.
///
/// # Arguments
/// * `tablets`, `compasses`, `gears` - symbols already in the city
/// * `wildcards` - freely assignable symbols
///
/// Negative counts are rejected; they point at a broken snapshot.
pub fn optimize(tablets: i32, compasses: i32, gears: i32, wildcards: i32) -> Result<ScienceResult> {
    let inputs = ScienceInputs::new(
        non_negative("tablets", tablets)?,
        non_negative("compasses", compasses)?,
        non_negative("gears", gears)?,
        non_negative("wildcards", wildcards)?,
    );
    Ok(inputs.score())
}

/// Classification of a finished distribution, for UI hints
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "hint", content = "symbol")]
pub enum ScienceHint {
    /// No symbols at all
    Empty,
    /// Counts within one of each other
    Balanced,
    /// Two symbols present, this one missing
    NeedsThirdSymbol(ScienceSymbol),
    /// Only this symbol present
    Concentrated(ScienceSymbol),
    Uneven,
}

impl ScienceHint {
    /// UI message; `set_bonus` is the game's VP per complete set.
    pub fn describe(&self, set_bonus: u32) -> String {
        match self {
            ScienceHint::Empty => "No science symbols yet.".to_string(),
            ScienceHint::Balanced => "Balanced: every symbol counts toward sets.".to_string(),
            ScienceHint::NeedsThirdSymbol(s) => {
                format!("One {} would complete a set worth {} extra points.", s.label(), set_bonus)
            }
            ScienceHint::Concentrated(s) => {
                format!("All-in on {}: scoring on squares only.", s.label())
            }
            ScienceHint::Uneven => "Uneven: sets are limited by the scarcest symbol.".to_string(),
        }
    }
}

/// Classify a distribution. Pure, no side effects.
pub fn hint(result: &ScienceResult) -> ScienceHint {
    let counts = ScienceSymbol::ALL.map(|s| (s, result.count(s)));
    let zeros: Vec<ScienceSymbol> = counts.iter().filter(|(_, c)| *c == 0).map(|(s, _)| *s).collect();
    let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let min = counts.iter().map(|(_, c)| *c).min().unwrap_or(0);

    match zeros.len() {
        3 => ScienceHint::Empty,
        2 => counts
            .iter()
            .find(|(_, c)| *c > 0)
            .map_or(ScienceHint::Empty, |(s, _)| ScienceHint::Concentrated(*s)),
        1 => ScienceHint::NeedsThirdSymbol(zeros[0]),
        _ if max - min <= 1 => ScienceHint::Balanced,
        _ => ScienceHint::Uneven,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_balanced_no_wildcards() {
        let r = optimize(2, 2, 2, 0).unwrap();
        assert_eq!(r.sets, 2);
        assert_eq!(r.set_bonus, 14);
        assert_eq!(r.squares, 12);
        assert_eq!(r.total, 26);
    }

    #[test]
    fn test_three_wildcards_make_a_set() {
        let r = optimize(0, 0, 0, 3).unwrap();
        assert_eq!(r.sets, 1);
        assert_eq!(r.placement, [1, 1, 1]);
        assert_eq!(r.total, 10);
    }

    #[test]
    fn test_wildcard_piles_when_squares_win() {
        // 5 tablets: a sixth tablet (+11) beats opening a set nowhere near
        let r = optimize(5, 0, 0, 1).unwrap();
        assert_eq!(r.placement, [1, 0, 0]);
        assert_eq!(r.total, 36);
    }

    #[test]
    fn test_wildcard_completes_set() {
        // 1/1/0: gear makes a set (7 + 3 = 10) vs tablet (4 + 1 = 5)
        let r = optimize(1, 1, 0, 1).unwrap();
        assert_eq!(r.placement, [0, 0, 1]);
        assert_eq!(r.total, 10);
    }

    #[test]
    fn test_tie_keeps_first_found() {
        // Single wildcard on 0/0/0: all placements score 1, the all-gear
        // composition is scanned first
        let r = optimize(0, 0, 0, 1).unwrap();
        assert_eq!(r.placement, [0, 0, 1]);
    }

    #[test]
    fn test_negative_rejected() {
        let err = optimize(1, -1, 0, 0).unwrap_err();
        assert!(matches!(err, ScoreError::NegativeCount { field: "compasses", value: -1 }));
        assert!(optimize(0, 0, 0, -3).is_err());
    }

    #[test]
    fn test_custom_set_bonus() {
        let r = ScienceInputs::new(1, 1, 1, 0).score_with(10);
        assert_eq!(r.total, 13);
    }

    #[test]
    fn test_breakdown_mentions_wildcards() {
        let r = optimize(1, 1, 0, 1).unwrap();
        assert!(r.breakdown.contains("1 wildcards as 0/0/1"), "{}", r.breakdown);
        assert!(r.breakdown.ends_with("total 10"), "{}", r.breakdown);
    }

    #[test]
    fn test_hints() {
        assert_eq!(hint(&optimize(0, 0, 0, 0).unwrap()), ScienceHint::Empty);
        assert_eq!(hint(&optimize(2, 3, 2, 0).unwrap()), ScienceHint::Balanced);
        assert_eq!(
            hint(&optimize(2, 2, 0, 0).unwrap()),
            ScienceHint::NeedsThirdSymbol(ScienceSymbol::Gear)
        );
        assert_eq!(
            hint(&optimize(0, 4, 0, 0).unwrap()),
            ScienceHint::Concentrated(ScienceSymbol::Compass)
        );
        assert_eq!(hint(&optimize(5, 1, 1, 0).unwrap()), ScienceHint::Uneven);
    }

    #[test]
    fn test_hint_describe_names_symbol() {
        let text = ScienceHint::NeedsThirdSymbol(ScienceSymbol::Gear).describe(SET_BONUS);
        assert!(text.contains("gear"));
        assert!(text.contains("worth 7"));

        let text = ScienceHint::NeedsThirdSymbol(ScienceSymbol::Tablet).describe(10);
        assert!(text.contains("worth 10"), "{}", text);
    }

    #[test]
    fn test_card_wildcards_are_not_an_entry() {
        use crate::catalog::LeaderCard;
        let city = CitySnapshot::new().with_leader(LeaderCard::Euclid);
        assert!(ScienceInputs::is_unentered(&city));
        let city = city.with(SnapshotField::ScienceWildcards, 0);
        assert!(!ScienceInputs::is_unentered(&city));
    }

    #[test]
    fn test_from_city_counts_granted_wildcards() {
        use crate::catalog::GuildCard;
        let city = CitySnapshot::new()
            .with(SnapshotField::Tablets, 2)
            .with(SnapshotField::Gears, 1)
            .with(SnapshotField::ScienceWildcards, 1)
            .with_guild(GuildCard::Scientists);
        let (inputs, missing) = ScienceInputs::from_city(PlayerId(3), &city);
        assert_eq!(inputs, ScienceInputs::new(2, 0, 1, 2));
        assert_eq!(
            missing,
            vec![FieldRef { player: PlayerId(3), field: SnapshotField::Compasses }]
        );
    }

    #[test]
    fn test_idempotent() {
        let a = optimize(3, 1, 2, 4).unwrap();
        let b = optimize(3, 1, 2, 4).unwrap();
        assert_eq!(a, b);
    }

    fn brute_force(a: u32, b: u32, c: u32, w: u32) -> u64 {
        let mut best = 0;
        for wa in 0..=w {
            for wb in 0..=w - wa {
                best = best.max(formula(a + wa, b + wb, c + w - wa - wb, SET_BONUS));
            }
        }
        best
    }

    proptest! {
        #[test]
        fn prop_adding_wildcard_never_hurts(a in 0i32..12, b in 0i32..12, c in 0i32..12, w in 0i32..10) {
            let before = optimize(a, b, c, w).unwrap().total;
            let after = optimize(a, b, c, w + 1).unwrap().total;
            prop_assert!(after >= before);
        }

        #[test]
        fn prop_placement_uses_every_wildcard(a in 0i32..12, b in 0i32..12, c in 0i32..12, w in 0i32..10) {
            let r = optimize(a, b, c, w).unwrap();
            prop_assert_eq!(r.placement.iter().sum::<u32>(), w as u32);
            prop_assert_eq!(r.total, r.set_bonus + r.squares);
        }

        #[test]
        fn prop_matches_brute_force(a in 0u32..8, b in 0u32..8, c in 0u32..8, w in 0u32..8) {
            let r = ScienceInputs::new(a, b, c, w).score();
            prop_assert_eq!(r.total, brute_force(a, b, c, w));
        }
    }
}
