//! Scoring card catalogs
//!
//! Each card maps to a typed rule instead of being matched by display name.
//! Guilds mostly look at card colors in the neighboring cities; leaders
//! mostly look at tokens, coins and thresholds.

use serde::{Deserialize, Serialize};

use crate::city::{CardColor, CitySnapshot, SnapshotField};

/// How a card turns a city (and its neighbors) into VP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoringRule {
    /// `points` per `per` units of the summed own fields
    PerOwn { fields: &'static [SnapshotField], points: u32, per: u32 },
    /// `points` per unit of the fields in both neighbors, optionally self
    PerNeighbors { fields: &'static [SnapshotField], points: u32, include_self: bool },
    /// `points` per complete set: the minimum across own fields
    PerSet { fields: &'static [SnapshotField], points: u32 },
    /// `points` if own field is strictly greater than both neighbors'
    BeatsNeighbors { field: SnapshotField, points: u32 },
    /// 1 VP per `per` coins held by the two neighbors together, at most `cap`
    NeighborCoins { per: u32, cap: u32 },
    /// `points` per science set after optimal wildcard placement
    PerScienceSet { points: u32 },
    /// No VP of its own; adds one science wildcard
    ScienceWildcard,
    Flat { points: u32 },
}

/// Whose snapshot a required field is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Own,
    Neighbors,
    OwnAndNeighbors,
}

impl ScoringRule {
    /// Fields this rule reads, with the snapshots they are read from.
    pub fn required_fields(&self) -> Vec<(Scope, SnapshotField)> {
        match self {
            ScoringRule::PerOwn { fields, .. } | ScoringRule::PerSet { fields, .. } => {
                fields.iter().map(|f| (Scope::Own, *f)).collect()
            }
            ScoringRule::PerNeighbors { fields, include_self, .. } => {
                let scope = if *include_self { Scope::OwnAndNeighbors } else { Scope::Neighbors };
                fields.iter().map(|f| (scope, *f)).collect()
            }
            ScoringRule::BeatsNeighbors { field, .. } => vec![(Scope::OwnAndNeighbors, *field)],
            ScoringRule::NeighborCoins { .. } => vec![(Scope::Neighbors, SnapshotField::Coins)],
            ScoringRule::PerScienceSet { .. } => vec![
                (Scope::Own, SnapshotField::Tablets),
                (Scope::Own, SnapshotField::Compasses),
                (Scope::Own, SnapshotField::Gears),
            ],
            ScoringRule::ScienceWildcard | ScoringRule::Flat { .. } => Vec::new(),
        }
    }
}

/// A catalog card's display name and rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub rule: ScoringRule,
}

impl CatalogEntry {
    pub fn required_fields(&self) -> Vec<(Scope, SnapshotField)> {
        self.rule.required_fields()
    }
}

/// A card that can be selected in a city and scored by the resolver.
pub trait ScoringCard: Copy {
    /// Catalog name used in notes and logs
    const CATALOG: &'static str;

    /// `None` for ids this engine version does not know.
    fn entry(self) -> Option<CatalogEntry>;
}

const BROWN: &[SnapshotField] = &[SnapshotField::BrownCards];
const GREY: &[SnapshotField] = &[SnapshotField::GreyCards];
const BLUE: &[SnapshotField] = &[SnapshotField::BlueCards];
const YELLOW: &[SnapshotField] = &[SnapshotField::YellowCards];
const GREEN: &[SnapshotField] = &[SnapshotField::GreenCards];
const RED: &[SnapshotField] = &[SnapshotField::RedCards];
const PURPLE: &[SnapshotField] = &[SnapshotField::PurpleCards];
const STAGES: &[SnapshotField] = &[SnapshotField::WonderStages];
const COINS: &[SnapshotField] = &[SnapshotField::Coins];
const DEFEATS: &[SnapshotField] = &[SnapshotField::MilitaryDefeats];
const VICTORIES: &[SnapshotField] = &[SnapshotField::MilitaryVictories];
const RAW_AND_GUILDS: &[SnapshotField] = &[
    SnapshotField::BrownCards,
    SnapshotField::GreyCards,
    SnapshotField::PurpleCards,
];
const BLUE_GREEN_RED: &[SnapshotField] = &[
    SnapshotField::BlueCards,
    SnapshotField::GreenCards,
    SnapshotField::RedCards,
];
const ALL_COLORS: &[SnapshotField] = &[
    SnapshotField::cards(CardColor::Brown),
    SnapshotField::cards(CardColor::Grey),
    SnapshotField::cards(CardColor::Blue),
    SnapshotField::cards(CardColor::Yellow),
    SnapshotField::cards(CardColor::Green),
    SnapshotField::cards(CardColor::Red),
    SnapshotField::cards(CardColor::Purple),
];

// ──────────────────────────── Guilds ────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuildCard {
    Workers,
    Craftsmens,
    Traders,
    Philosophers,
    Spies,
    Magistrates,
    Builders,
    Strategists,
    Shipowners,
    Scientists,
    Gamers,
    Champions,
    Architects,
    #[serde(other)]
    Unknown,
}

impl GuildCard {
    pub const ALL: [GuildCard; 13] = [
        GuildCard::Workers,
        GuildCard::Craftsmens,
        GuildCard::Traders,
        GuildCard::Philosophers,
        GuildCard::Spies,
        GuildCard::Magistrates,
        GuildCard::Builders,
        GuildCard::Strategists,
        GuildCard::Shipowners,
        GuildCard::Scientists,
        GuildCard::Gamers,
        GuildCard::Champions,
        GuildCard::Architects,
    ];
}

impl ScoringCard for GuildCard {
    const CATALOG: &'static str = "guild";

    fn entry(self) -> Option<CatalogEntry> {
        let neighbors = |fields: &'static [SnapshotField], points: u32| {
            ScoringRule::PerNeighbors { fields, points, include_self: false }
        };
        let (name, rule) = match self {
            GuildCard::Workers => ("Workers Guild", neighbors(BROWN, 1)),
            GuildCard::Craftsmens => ("Craftsmens Guild", neighbors(GREY, 2)),
            GuildCard::Traders => ("Traders Guild", neighbors(YELLOW, 1)),
            GuildCard::Philosophers => ("Philosophers Guild", neighbors(GREEN, 1)),
            GuildCard::Spies => ("Spies Guild", neighbors(RED, 1)),
            GuildCard::Magistrates => ("Magistrates Guild", neighbors(BLUE, 1)),
            GuildCard::Builders => (
                "Builders Guild",
                ScoringRule::PerNeighbors { fields: STAGES, points: 1, include_self: true },
            ),
            GuildCard::Strategists => ("Strategists Guild", neighbors(DEFEATS, 1)),
            GuildCard::Shipowners => (
                "Shipowners Guild",
                ScoringRule::PerOwn { fields: RAW_AND_GUILDS, points: 1, per: 1 },
            ),
            GuildCard::Scientists => ("Scientists Guild", ScoringRule::ScienceWildcard),
            GuildCard::Gamers => ("Gamers Guild", ScoringRule::PerOwn { fields: COINS, points: 1, per: 3 }),
            GuildCard::Champions => (
                "Champions Guild",
                ScoringRule::BeatsNeighbors { field: SnapshotField::RedCards, points: 4 },
            ),
            GuildCard::Architects => ("Architects Guild", neighbors(PURPLE, 3)),
            GuildCard::Unknown => return None,
        };
        Some(CatalogEntry { name, rule })
    }
}

// ──────────────────────────── Leaders ────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderCard {
    Alexander,
    Amytis,
    Hiram,
    Midas,
    Nebuchadnezzar,
    Pericles,
    Phidias,
    Praxiteles,
    Varro,
    Sappho,
    Zenobia,
    Nefertiti,
    Cleopatra,
    Plato,
    Justinian,
    Aristotle,
    Euclid,
    Croesus,
    Solomon,
    #[serde(other)]
    Unknown,
}

impl LeaderCard {
    pub const ALL: [LeaderCard; 19] = [
        LeaderCard::Alexander,
        LeaderCard::Amytis,
        LeaderCard::Hiram,
        LeaderCard::Midas,
        LeaderCard::Nebuchadnezzar,
        LeaderCard::Pericles,
        LeaderCard::Phidias,
        LeaderCard::Praxiteles,
        LeaderCard::Varro,
        LeaderCard::Sappho,
        LeaderCard::Zenobia,
        LeaderCard::Nefertiti,
        LeaderCard::Cleopatra,
        LeaderCard::Plato,
        LeaderCard::Justinian,
        LeaderCard::Aristotle,
        LeaderCard::Euclid,
        LeaderCard::Croesus,
        LeaderCard::Solomon,
    ];
}

impl ScoringCard for LeaderCard {
    const CATALOG: &'static str = "leader";

    fn entry(self) -> Option<CatalogEntry> {
        let own = |fields: &'static [SnapshotField], points: u32| {
            ScoringRule::PerOwn { fields, points, per: 1 }
        };
        let (name, rule) = match self {
            LeaderCard::Alexander => ("Alexander", own(VICTORIES, 1)),
            LeaderCard::Amytis => ("Amytis", own(STAGES, 2)),
            LeaderCard::Hiram => ("Hiram", own(PURPLE, 2)),
            LeaderCard::Midas => ("Midas", ScoringRule::PerOwn { fields: COINS, points: 1, per: 3 }),
            LeaderCard::Nebuchadnezzar => ("Nebuchadnezzar", own(BLUE, 1)),
            LeaderCard::Pericles => ("Pericles", own(RED, 2)),
            LeaderCard::Phidias => ("Phidias", own(BROWN, 1)),
            LeaderCard::Praxiteles => ("Praxiteles", own(GREY, 2)),
            LeaderCard::Varro => ("Varro", own(YELLOW, 1)),
            LeaderCard::Sappho => ("Sappho", ScoringRule::Flat { points: 2 }),
            LeaderCard::Zenobia => ("Zenobia", ScoringRule::Flat { points: 3 }),
            LeaderCard::Nefertiti => ("Nefertiti", ScoringRule::Flat { points: 4 }),
            LeaderCard::Cleopatra => ("Cleopatra", ScoringRule::Flat { points: 5 }),
            LeaderCard::Plato => ("Plato", ScoringRule::PerSet { fields: ALL_COLORS, points: 7 }),
            LeaderCard::Justinian => ("Justinian", ScoringRule::PerSet { fields: BLUE_GREEN_RED, points: 3 }),
            LeaderCard::Aristotle => ("Aristotle", ScoringRule::PerScienceSet { points: 3 }),
            LeaderCard::Euclid => ("Euclid", ScoringRule::ScienceWildcard),
            LeaderCard::Croesus => (
                "Croesus",
                ScoringRule::BeatsNeighbors { field: SnapshotField::Coins, points: 5 },
            ),
            LeaderCard::Solomon => ("Solomon", ScoringRule::NeighborCoins { per: 3, cap: 5 }),
            LeaderCard::Unknown => return None,
        };
        Some(CatalogEntry { name, rule })
    }
}

/// Science wildcards granted by the cards selected in a city.
pub fn granted_wildcards(city: &CitySnapshot) -> u32 {
    let guilds = city.guilds.iter().filter_map(|c| c.entry());
    let leaders = city.leaders.iter().filter_map(|c| c.entry());
    guilds.chain(leaders).filter(|e| e.rule == ScoringRule::ScienceWildcard).count() as u32
}
