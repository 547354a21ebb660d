//! Static payout tables
//!
//! Every number the engine awards lives here. `ScoringRules::standard()`
//! carries the published values; a rules revision is loaded with
//! `ScoringRules::from_json` instead of touching resolver code.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Number of ages in a game.
pub const AGES: usize = 3;

/// One of the three sequential scoring rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Age {
    I,
    II,
    III,
}

impl Age {
    pub const ALL: [Age; AGES] = [Age::I, Age::II, Age::III];

    /// Zero-based index into per-age arrays
    pub fn index(self) -> usize {
        match self {
            Age::I => 0,
            Age::II => 1,
            Age::III => 2,
        }
    }
}

/// Land conflict payouts per age.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandTable {
    pub victory: [i32; AGES],
    pub defeat: [i32; AGES],
}

impl LandTable {
    pub fn standard() -> Self {
        Self { victory: [1, 3, 5], defeat: [-1, -1, -1] }
    }

    pub fn victory(&self, age: Age) -> i32 {
        self.victory[age.index()]
    }

    pub fn defeat(&self, age: Age) -> i32 {
        self.defeat[age.index()]
    }
}

impl Default for LandTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Naval ranking payouts per age.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavalTable {
    pub first: [i32; AGES],
    pub second: [i32; AGES],
    pub last: [i32; AGES],
}

impl NavalTable {
    pub fn standard() -> Self {
        Self {
            first: [2, 4, 6],
            second: [1, 2, 3],
            last: [-1, -2, -3],
        }
    }

    pub fn first(&self, age: Age) -> i32 {
        self.first[age.index()]
    }

    pub fn second(&self, age: Age) -> i32 {
        self.second[age.index()]
    }

    pub fn last(&self, age: Age) -> i32 {
        self.last[age.index()]
    }
}

impl Default for NavalTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Complete rules configuration for one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub land: LandTable,
    pub naval: NavalTable,
    /// VP for each complete set of the three science symbols
    pub set_bonus: u32,
    /// Coins needed for one treasury VP
    pub coins_per_point: u32,
}

impl ScoringRules {
    /// Published base-game values
    pub fn standard() -> Self {
        Self {
            land: LandTable::standard(),
            naval: NavalTable::standard(),
            set_bonus: 7,
            coins_per_point: 3,
        }
    }

    /// Load a rules override. Fields left out keep their standard values.
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: ScoringRules = serde_json::from_str(json)?;
        tracing::debug!(
            set_bonus = rules.set_bonus,
            coins_per_point = rules.coins_per_point,
            "loaded scoring rules override"
        );
        Ok(rules)
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self::standard()
    }
}
