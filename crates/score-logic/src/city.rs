//! City snapshots
//!
//! A snapshot is the caller's record of one player's end-game city. Fields
//! are optional so "never entered" stays distinguishable from zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{GuildCard, LeaderCard};
use crate::error::{Result, ScoreError};
use crate::ring::PlayerId;
use crate::rules::{Age, AGES};

/// The seven card colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardColor {
    Brown,
    Grey,
    Blue,
    Yellow,
    Green,
    Red,
    Purple,
}

impl CardColor {
    pub const ALL: [CardColor; 7] = [
        CardColor::Brown,
        CardColor::Grey,
        CardColor::Blue,
        CardColor::Yellow,
        CardColor::Green,
        CardColor::Red,
        CardColor::Purple,
    ];
}

/// A countable field of a city snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotField {
    BrownCards,
    GreyCards,
    BlueCards,
    YellowCards,
    GreenCards,
    RedCards,
    PurpleCards,
    WonderStages,
    Coins,
    MilitaryVictories,
    MilitaryDefeats,
    NavalVictories,
    Tablets,
    Compasses,
    Gears,
    ScienceWildcards,
}

impl SnapshotField {
    /// Card count field for a color
    pub const fn cards(color: CardColor) -> Self {
        match color {
            CardColor::Brown => SnapshotField::BrownCards,
            CardColor::Grey => SnapshotField::GreyCards,
            CardColor::Blue => SnapshotField::BlueCards,
            CardColor::Yellow => SnapshotField::YellowCards,
            CardColor::Green => SnapshotField::GreenCards,
            CardColor::Red => SnapshotField::RedCards,
            CardColor::Purple => SnapshotField::PurpleCards,
        }
    }
}

/// An absent field, tied to the player whose snapshot lacks it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldRef {
    pub player: PlayerId,
    pub field: SnapshotField,
}

/// Snapshots of every seated player.
pub type Cities = BTreeMap<PlayerId, CitySnapshot>;

/// Snapshot of `player`, failing if the caller never supplied one.
pub fn city_of(cities: &Cities, player: PlayerId) -> Result<&CitySnapshot> {
    cities.get(&player).ok_or(ScoreError::MissingSnapshot(player))
}

/// One player's city at game end.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitySnapshot {
    pub counts: BTreeMap<SnapshotField, u32>,
    /// Diplomacy taken per age
    pub diplomacy: [bool; AGES],
    /// Contributed to the collaborative project of each age
    pub contributions: [bool; AGES],
    pub guilds: Vec<GuildCard>,
    pub leaders: Vec<LeaderCard>,
}

impl CitySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, field: SnapshotField, value: u32) -> Self {
        self.counts.insert(field, value);
        self
    }

    pub fn with_cards(self, color: CardColor, value: u32) -> Self {
        self.with(SnapshotField::cards(color), value)
    }

    pub fn with_guild(mut self, card: GuildCard) -> Self {
        self.guilds.push(card);
        self
    }

    pub fn with_leader(mut self, card: LeaderCard) -> Self {
        self.leaders.push(card);
        self
    }

    pub fn with_diplomacy(mut self, age: Age) -> Self {
        self.diplomacy[age.index()] = true;
        self
    }

    pub fn with_contribution(mut self, age: Age) -> Self {
        self.contributions[age.index()] = true;
        self
    }

    pub fn set(&mut self, field: SnapshotField, value: u32) {
        self.counts.insert(field, value);
    }

    /// Forget a field, making it "not entered" again.
    pub fn clear(&mut self, field: SnapshotField) {
        self.counts.remove(&field);
    }

    /// Entered value, `None` if never entered
    pub fn get(&self, field: SnapshotField) -> Option<u32> {
        self.counts.get(&field).copied()
    }

    /// Entered value or zero
    pub fn count(&self, field: SnapshotField) -> u32 {
        self.get(field).unwrap_or(0)
    }

    /// Value for scoring: absent fields read as zero and are appended to
    /// `missing` under `player`.
    pub fn lookup(&self, player: PlayerId, field: SnapshotField, missing: &mut Vec<FieldRef>) -> u32 {
        match self.get(field) {
            Some(v) => v,
            None => {
                let r = FieldRef { player, field };
                if !missing.contains(&r) {
                    missing.push(r);
                }
                0
            }
        }
    }

    pub fn took_diplomacy(&self, age: Age) -> bool {
        self.diplomacy[age.index()]
    }

    pub fn contributed(&self, age: Age) -> bool {
        self.contributions[age.index()]
    }
}
