//! Land and naval conflict resolution
//!
//! Land conflicts pair every active player with the nearest active player on
//! each side, plus one-sided boarding engagements two seats away. Naval
//! conflicts rank every participant of an age at once. Ages never interact.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, ScoreError};
use crate::ring::{PlayerId, SeatingRing};
use crate::rules::{Age, LandTable, NavalTable, AGES};

/// Boarding source active for one player in one age.
///
/// At most one side may be set: a boarding player gets a single extra edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Boarding {
    /// Engage the player two seats to the left
    pub left: bool,
    /// Engage the player two seats to the right
    pub right: bool,
}

/// One player's conflict data across the three ages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictEntry {
    pub strength: [u32; AGES],
    /// Diplomacy (land) or opt-out (naval) per age
    pub opted_out: [bool; AGES],
    /// Ignored by naval resolution
    pub boarding: [Boarding; AGES],
}

impl ConflictEntry {
    pub fn new(strength: [u32; AGES]) -> Self {
        Self { strength, ..Default::default() }
    }

    pub fn opt_out(mut self, age: Age) -> Self {
        self.opted_out[age.index()] = true;
        self
    }

    pub fn board_left(mut self, age: Age) -> Self {
        self.boarding[age.index()].left = true;
        self
    }

    pub fn board_right(mut self, age: Age) -> Self {
        self.boarding[age.index()].right = true;
        self
    }

    pub fn strength(&self, age: Age) -> u32 {
        self.strength[age.index()]
    }

    pub fn is_out(&self, age: Age) -> bool {
        self.opted_out[age.index()]
    }
}

/// Conflict entries for every seated player.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConflictInput {
    pub entries: BTreeMap<PlayerId, ConflictEntry>,
}

impl ConflictInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, player: PlayerId, entry: ConflictEntry) -> Self {
        self.entries.insert(player, entry);
        self
    }

    pub fn get(&self, player: PlayerId) -> Result<&ConflictEntry> {
        self.entries.get(&player).ok_or(ScoreError::MissingConflictEntry(player))
    }

    /// Every seated player needs an entry and every entry a seat.
    fn validate(&self, ring: &SeatingRing) -> Result<()> {
        for player in ring.players() {
            self.get(*player)?;
        }
        match self.entries.keys().find(|p| !ring.contains(**p)) {
            Some(stray) => Err(ScoreError::UnknownPlayer(*stray)),
            None => Ok(()),
        }
    }

    /// A player boards at most one side per age.
    fn validate_boarding(&self) -> Result<()> {
        for (player, entry) in &self.entries {
            for age in Age::ALL {
                let flags = entry.boarding[age.index()];
                if flags.left && flags.right {
                    return Err(ScoreError::ConflictingBoarding { player: *player, age });
                }
            }
        }
        Ok(())
    }
}

/// How two players came to fight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementKind {
    /// Adjacent in the active ring; both sides take a token
    Ring,
    /// Two seats away; only the boarding player takes a token
    Boarding,
}

/// Naval finishing place that earned points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavalPlace {
    First,
    Second,
    Last,
}

/// A resolution step, recorded so a result can be replayed and checked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum ConflictEvent {
    Engagement {
        age: Age,
        kind: EngagementKind,
        attacker: PlayerId,
        defender: PlayerId,
        /// `None` on equal strength
        winner: Option<PlayerId>,
    },
    Ranking {
        age: Age,
        player: PlayerId,
        place: NavalPlace,
        points: i32,
    },
}

/// One player's conflict points.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConflictResult {
    pub by_age: [i32; AGES],
    pub victories: [u32; AGES],
    pub defeats: [u32; AGES],
    pub total: i32,
}

impl PlayerConflictResult {
    fn win(&mut self, age: Age, points: i32) {
        self.victories[age.index()] += 1;
        self.add(age, points);
    }

    fn lose(&mut self, age: Age, points: i32) {
        self.defeats[age.index()] += 1;
        self.add(age, points);
    }

    fn add(&mut self, age: Age, points: i32) {
        self.by_age[age.index()] += points;
        self.total += points;
    }
}

/// Conflict points for the whole ring.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictOutcome {
    pub players: BTreeMap<PlayerId, PlayerConflictResult>,
    pub log: Vec<ConflictEvent>,
}

impl ConflictOutcome {
    fn for_ring(ring: &SeatingRing) -> Self {
        Self {
            players: ring.players().iter().map(|p| (*p, PlayerConflictResult::default())).collect(),
            log: Vec::new(),
        }
    }

    pub fn player(&self, player: PlayerId) -> Result<&PlayerConflictResult> {
        self.players.get(&player).ok_or(ScoreError::UnknownPlayer(player))
    }

    pub fn total_for(&self, player: PlayerId) -> Result<i32> {
        Ok(self.player(player)?.total)
    }

    fn entry(&mut self, player: PlayerId) -> &mut PlayerConflictResult {
        self.players.entry(player).or_default()
    }
}

// ──────────────────────────── Land ────────────────────────────

/// Resolve land conflicts for every age.
///
/// # Arguments
/// * `ring` - seating order
/// * `input` - strength, diplomacy and boarding flags per player
/// * `table` - victory/defeat values per age
pub fn resolve_land(ring: &SeatingRing, input: &ConflictInput, table: &LandTable) -> Result<ConflictOutcome> {
    input.validate(ring)?;
    input.validate_boarding()?;
    let mut outcome = ConflictOutcome::for_ring(ring);

    for age in Age::ALL {
        let pairs = active_pairs(ring, input, age)?;
        for (a, b) in &pairs {
            settle_ring(&mut outcome, input, table, age, *a, *b)?;
        }

        // Boarding ignores diplomacy on both sides
        let mut boardings = 0usize;
        for player in ring.players() {
            let flags = input.get(*player)?.boarding[age.index()];
            if flags.left {
                settle_boarding(&mut outcome, ring, input, table, age, *player, -2)?;
                boardings += 1;
            }
            if flags.right {
                settle_boarding(&mut outcome, ring, input, table, age, *player, 2)?;
                boardings += 1;
            }
        }

        tracing::debug!(?age, ring_pairs = pairs.len(), boardings, "resolved land conflicts");
    }

    Ok(outcome)
}

/// Unordered neighbor pairs among players without diplomacy, in seat order.
fn active_pairs(ring: &SeatingRing, input: &ConflictInput, age: Age) -> Result<Vec<(PlayerId, PlayerId)>> {
    let mut active = Vec::with_capacity(ring.len());
    for player in ring.players() {
        if !input.get(*player)?.is_out(age) {
            active.push(*player);
        }
    }

    let mut pairs: Vec<(PlayerId, PlayerId)> = Vec::with_capacity(active.len());
    if active.len() < 2 {
        return Ok(pairs);
    }
    for (i, a) in active.iter().enumerate() {
        let b = active[(i + 1) % active.len()];
        let seen = pairs.iter().any(|(x, y)| (*x == *a && *y == b) || (*x == b && *y == *a));
        if !seen {
            pairs.push((*a, b));
        }
    }
    Ok(pairs)
}

fn settle_ring(
    outcome: &mut ConflictOutcome,
    input: &ConflictInput,
    table: &LandTable,
    age: Age,
    a: PlayerId,
    b: PlayerId,
) -> Result<()> {
    let sa = input.get(a)?.strength(age);
    let sb = input.get(b)?.strength(age);
    let winner = match sa.cmp(&sb) {
        std::cmp::Ordering::Greater => Some((a, b)),
        std::cmp::Ordering::Less => Some((b, a)),
        std::cmp::Ordering::Equal => None,
    };
    if let Some((w, l)) = winner {
        outcome.entry(w).win(age, table.victory(age));
        outcome.entry(l).lose(age, table.defeat(age));
    }
    outcome.log.push(ConflictEvent::Engagement {
        age,
        kind: EngagementKind::Ring,
        attacker: a,
        defender: b,
        winner: winner.map(|(w, _)| w),
    });
    Ok(())
}

fn settle_boarding(
    outcome: &mut ConflictOutcome,
    ring: &SeatingRing,
    input: &ConflictInput,
    table: &LandTable,
    age: Age,
    attacker: PlayerId,
    steps: isize,
) -> Result<()> {
    let defender = ring.offset(attacker, steps)?;
    let sa = input.get(attacker)?.strength(age);
    let sd = input.get(defender)?.strength(age);
    let winner = match sa.cmp(&sd) {
        std::cmp::Ordering::Greater => {
            outcome.entry(attacker).win(age, table.victory(age));
            Some(attacker)
        }
        std::cmp::Ordering::Less => {
            outcome.entry(attacker).lose(age, table.defeat(age));
            Some(defender)
        }
        std::cmp::Ordering::Equal => None,
    };
    outcome.log.push(ConflictEvent::Engagement {
        age,
        kind: EngagementKind::Boarding,
        attacker,
        defender,
        winner,
    });
    Ok(())
}

// ──────────────────────────── Naval ────────────────────────────

/// Resolve naval rankings for every age.
///
/// Per age, over players who did not opt out:
/// - all tied (or fewer than two participants): nothing
/// - unique maximum: first; the unique second-highest value earns second
///   when it sits above the minimum, a tie there earns nothing
/// - maximum tied: each tied player earns second, nobody earns first
/// - everyone at the minimum earns last
pub fn resolve_naval(ring: &SeatingRing, input: &ConflictInput, table: &NavalTable) -> Result<ConflictOutcome> {
    input.validate(ring)?;
    let mut outcome = ConflictOutcome::for_ring(ring);

    for age in Age::ALL {
        let mut participants: Vec<(PlayerId, u32)> = Vec::with_capacity(ring.len());
        for player in ring.players() {
            let entry = input.get(*player)?;
            if !entry.is_out(age) {
                participants.push((*player, entry.strength(age)));
            }
        }

        let (Some(max), Some(min)) = (
            participants.iter().map(|(_, s)| *s).max(),
            participants.iter().map(|(_, s)| *s).min(),
        ) else {
            continue;
        };
        if participants.len() < 2 || max == min {
            tracing::debug!(?age, participants = participants.len(), "naval conflict settles nothing");
            continue;
        }

        let holders = |value: u32| -> Vec<PlayerId> {
            participants.iter().filter(|(_, s)| *s == value).map(|(p, _)| *p).collect()
        };

        let top = holders(max);
        if let [leader] = top[..] {
            award(&mut outcome, age, leader, NavalPlace::First, table.first(age));
            let runner_up = participants.iter().map(|(_, s)| *s).filter(|s| *s < max).max();
            if let Some(second) = runner_up.filter(|s| *s > min) {
                if let [runner] = holders(second)[..] {
                    award(&mut outcome, age, runner, NavalPlace::Second, table.second(age));
                }
            }
        } else {
            for player in &top {
                award(&mut outcome, age, *player, NavalPlace::Second, table.second(age));
            }
        }

        for player in holders(min) {
            award(&mut outcome, age, player, NavalPlace::Last, table.last(age));
        }

        tracing::debug!(?age, participants = participants.len(), max, min, "resolved naval ranking");
    }

    Ok(outcome)
}

fn award(outcome: &mut ConflictOutcome, age: Age, player: PlayerId, place: NavalPlace, points: i32) {
    let result = outcome.entry(player);
    match place {
        NavalPlace::First | NavalPlace::Second => result.win(age, points),
        NavalPlace::Last => result.lose(age, points),
    }
    outcome.log.push(ConflictEvent::Ranking { age, player, place, points });
}
