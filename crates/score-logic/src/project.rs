//! Collaborative projects
//!
//! Each age may put one project on the table. Players who paid in when the
//! project was completed collect the reward; players who stayed out of a
//! project that failed suffer the penalty. The other two combinations are
//! a no-op.

use serde::{Deserialize, Serialize};

use crate::city::{CardColor, CitySnapshot, FieldRef, SnapshotField};
use crate::ring::PlayerId;
use crate::rules::{Age, ScoringRules};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectId {
    Aqueduct,
    Lighthouse,
    Obelisk,
    Amphitheater,
    Forum,
    Bazaar,
    Colossus,
    Necropolis,
    Mausoleum,
    #[serde(other)]
    Unknown,
}

/// Military tokens a project can hand out or take away.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    MilitaryVictory,
    MilitaryDefeat,
}

/// End-game VP formulas read from the player's own city.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VpFormula {
    PerWonderStage { points: u32 },
    PerCard { color: CardColor, points: u32 },
    PerMilitaryVictory { points: u32 },
    PerCoins { coins: u32 },
}

/// Raw material a project produces each turn. Recorded, never scored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Stone,
    Wood,
    Ore,
    Clay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reward {
    Coins(u32),
    Tokens { kind: TokenKind, age: Age, count: u32 },
    Strength(u32),
    VpPer(VpFormula),
    Resource(Resource),
    Special(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Penalty {
    CoinLoss(u32),
    RemoveCard(CardColor),
    /// Lose a victory token, or take a defeat token, of `age`
    TokenLoss { kind: TokenKind, age: Age },
    Special(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ProjectDefinition {
    pub id: ProjectId,
    pub name: &'static str,
    pub age: Age,
    /// Coins each participant pays in
    pub cost: u32,
    pub reward: Reward,
    pub penalty: Penalty,
}

/// The nine collaborative projects, three per age.
pub const PROJECTS: [ProjectDefinition; 9] = [
    ProjectDefinition {
        id: ProjectId::Aqueduct,
        name: "Aqueduct",
        age: Age::I,
        cost: 2,
        reward: Reward::Resource(Resource::Stone),
        penalty: Penalty::CoinLoss(2),
    },
    ProjectDefinition {
        id: ProjectId::Lighthouse,
        name: "Lighthouse",
        age: Age::I,
        cost: 1,
        reward: Reward::Coins(4),
        penalty: Penalty::RemoveCard(CardColor::Brown),
    },
    ProjectDefinition {
        id: ProjectId::Obelisk,
        name: "Obelisk",
        age: Age::I,
        cost: 2,
        reward: Reward::Tokens { kind: TokenKind::MilitaryVictory, age: Age::I, count: 1 },
        penalty: Penalty::TokenLoss { kind: TokenKind::MilitaryDefeat, age: Age::I },
    },
    ProjectDefinition {
        id: ProjectId::Amphitheater,
        name: "Amphitheater",
        age: Age::II,
        cost: 3,
        reward: Reward::Strength(1),
        penalty: Penalty::CoinLoss(3),
    },
    ProjectDefinition {
        id: ProjectId::Forum,
        name: "Forum",
        age: Age::II,
        cost: 3,
        reward: Reward::VpPer(VpFormula::PerCard { color: CardColor::Blue, points: 1 }),
        penalty: Penalty::RemoveCard(CardColor::Grey),
    },
    ProjectDefinition {
        id: ProjectId::Bazaar,
        name: "Bazaar",
        age: Age::II,
        cost: 2,
        reward: Reward::VpPer(VpFormula::PerCoins { coins: 3 }),
        penalty: Penalty::TokenLoss { kind: TokenKind::MilitaryDefeat, age: Age::II },
    },
    ProjectDefinition {
        id: ProjectId::Colossus,
        name: "Colossus",
        age: Age::III,
        cost: 4,
        reward: Reward::VpPer(VpFormula::PerWonderStage { points: 2 }),
        penalty: Penalty::RemoveCard(CardColor::Red),
    },
    ProjectDefinition {
        id: ProjectId::Necropolis,
        name: "Necropolis",
        age: Age::III,
        cost: 3,
        reward: Reward::VpPer(VpFormula::PerMilitaryVictory { points: 1 }),
        penalty: Penalty::TokenLoss { kind: TokenKind::MilitaryVictory, age: Age::III },
    },
    ProjectDefinition {
        id: ProjectId::Mausoleum,
        name: "Mausoleum",
        age: Age::III,
        cost: 4,
        reward: Reward::Special("build one card from the discard pile for free"),
        penalty: Penalty::Special("discard one card of your choice from your city"),
    },
];

/// Catalog lookup; `None` for unknown ids
pub fn project(id: ProjectId) -> Option<&'static ProjectDefinition> {
    PROJECTS.iter().find(|p| p.id == id)
}

/// Every project that can be drawn in `age`
pub fn projects_for(age: Age) -> Vec<&'static ProjectDefinition> {
    PROJECTS.iter().filter(|p| p.age == age).collect()
}

/// Which side of a project applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Applied {
    Reward,
    Penalty,
    #[default]
    Nothing,
}

/// Token change caused by a project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDelta {
    pub kind: TokenKind,
    pub age: Age,
    /// Positive grants, negative removes
    pub delta: i32,
}

/// Payload of a project for one player.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectOutcome {
    pub applied: Applied,
    pub coins_delta: i32,
    pub tokens: Vec<TokenDelta>,
    pub strength_bonus: u32,
    pub vp: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
    pub card_removals: Vec<CardColor>,
    /// Effect left for the players to resolve by hand
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special: Option<String>,
    pub missing_fields: Vec<FieldRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ProjectOutcome {
    pub fn is_noop(&self) -> bool {
        *self == ProjectOutcome { note: self.note.clone(), ..Default::default() }
    }

    /// VP worth of the token deltas under the given land table.
    pub fn token_points(&self, rules: &ScoringRules) -> i32 {
        self.tokens
            .iter()
            .map(|t| {
                let value = match t.kind {
                    TokenKind::MilitaryVictory => rules.land.victory(t.age),
                    TokenKind::MilitaryDefeat => rules.land.defeat(t.age),
                };
                value.saturating_mul(t.delta)
            })
            .sum()
    }

    /// VP this outcome contributes at game end
    pub fn points(&self, rules: &ScoringRules) -> i32 {
        self.vp.saturating_add(self.token_points(rules))
    }

    /// Every applied effect as text, including the ones that carry no VP.
    pub fn effects(&self) -> Vec<String> {
        let mut effects = Vec::new();
        if self.vp != 0 {
            effects.push(format!("{:+} VP", self.vp));
        }
        for t in &self.tokens {
            let kind = match t.kind {
                TokenKind::MilitaryVictory => "victory",
                TokenKind::MilitaryDefeat => "defeat",
            };
            effects.push(format!("{:+} age {:?} {} token", t.delta, t.age, kind));
        }
        if self.coins_delta != 0 {
            effects.push(format!("{:+} coins", self.coins_delta));
        }
        if self.strength_bonus > 0 {
            effects.push(format!("+{} military strength", self.strength_bonus));
        }
        if let Some(resource) = self.resource {
            effects.push(format!("produces {}", format!("{:?}", resource).to_lowercase()));
        }
        for color in &self.card_removals {
            effects.push(format!("remove one {} card", format!("{:?}", color).to_lowercase()));
        }
        effects.extend(self.special.iter().cloned());
        effects.extend(self.note.iter().cloned());
        effects
    }
}

/// Evaluate a project for one player.
///
/// # Arguments
/// * `id` - project drawn for the age
/// * `completed` - whether the project was finished
/// * `contributed` - whether this player paid in
/// * `player` - owner of `city`, used in missing-field reports
/// * `city` - the player's snapshot, read by VP formulas
pub fn evaluate_project(
    id: ProjectId,
    completed: bool,
    contributed: bool,
    player: PlayerId,
    city: &CitySnapshot,
) -> ProjectOutcome {
    let Some(def) = project(id) else {
        tracing::warn!(%player, ?id, "unrecognized project scored as zero");
        return ProjectOutcome {
            note: Some("unrecognized project, no effect applied".to_string()),
            ..Default::default()
        };
    };

    match (completed, contributed) {
        (true, true) => apply_reward(def, player, city),
        (false, false) => apply_penalty(def),
        _ => ProjectOutcome::default(),
    }
}

fn apply_reward(def: &ProjectDefinition, player: PlayerId, city: &CitySnapshot) -> ProjectOutcome {
    let mut out = ProjectOutcome { applied: Applied::Reward, ..Default::default() };
    match def.reward {
        Reward::Coins(n) => out.coins_delta = i32::try_from(n).unwrap_or(i32::MAX),
        Reward::Tokens { kind, age, count } => {
            let delta = i32::try_from(count).unwrap_or(i32::MAX);
            out.tokens.push(TokenDelta { kind, age, delta })
        }
        Reward::Strength(n) => out.strength_bonus = n,
        Reward::VpPer(formula) => out.vp = formula_vp(formula, player, city, &mut out.missing_fields),
        Reward::Resource(r) => out.resource = Some(r),
        Reward::Special(text) => out.special = Some(text.to_string()),
    }
    out
}

fn apply_penalty(def: &ProjectDefinition) -> ProjectOutcome {
    let mut out = ProjectOutcome { applied: Applied::Penalty, ..Default::default() };
    match def.penalty {
        Penalty::CoinLoss(n) => out.coins_delta = -i32::try_from(n).unwrap_or(i32::MAX),
        Penalty::RemoveCard(color) => out.card_removals.push(color),
        Penalty::TokenLoss { kind: TokenKind::MilitaryDefeat, age } => {
            out.tokens.push(TokenDelta { kind: TokenKind::MilitaryDefeat, age, delta: 1 })
        }
        Penalty::TokenLoss { kind: TokenKind::MilitaryVictory, age } => {
            out.tokens.push(TokenDelta { kind: TokenKind::MilitaryVictory, age, delta: -1 })
        }
        Penalty::Special(text) => out.special = Some(text.to_string()),
    }
    out
}

fn formula_vp(formula: VpFormula, player: PlayerId, city: &CitySnapshot, missing: &mut Vec<FieldRef>) -> i32 {
    let value = match formula {
        VpFormula::PerWonderStage { points } => {
            city.lookup(player, SnapshotField::WonderStages, missing).saturating_mul(points)
        }
        VpFormula::PerCard { color, points } => {
            city.lookup(player, SnapshotField::cards(color), missing).saturating_mul(points)
        }
        VpFormula::PerMilitaryVictory { points } => {
            city.lookup(player, SnapshotField::MilitaryVictories, missing).saturating_mul(points)
        }
        VpFormula::PerCoins { coins } => city.lookup(player, SnapshotField::Coins, missing) / coins.max(1),
    };
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: PlayerId = PlayerId(1);

    fn city() -> CitySnapshot {
        CitySnapshot::new()
            .with(SnapshotField::WonderStages, 3)
            .with(SnapshotField::Coins, 10)
            .with(SnapshotField::MilitaryVictories, 4)
            .with_cards(CardColor::Blue, 5)
    }

    #[test]
    fn test_three_projects_per_age() {
        for age in Age::ALL {
            assert_eq!(projects_for(age).len(), 3);
        }
    }

    #[test]
    fn test_state_matrix() {
        let c = city();
        let reward = evaluate_project(ProjectId::Lighthouse, true, true, P, &c);
        assert_eq!(reward.applied, Applied::Reward);
        assert_eq!(reward.coins_delta, 4);

        let penalty = evaluate_project(ProjectId::Lighthouse, false, false, P, &c);
        assert_eq!(penalty.applied, Applied::Penalty);
        assert_eq!(penalty.card_removals, vec![CardColor::Brown]);

        for (completed, contributed) in [(false, true), (true, false)] {
            let none = evaluate_project(ProjectId::Lighthouse, completed, contributed, P, &c);
            assert_eq!(none, ProjectOutcome::default());
            assert!(none.is_noop());
        }
    }

    #[test]
    fn test_reward_applied_once() {
        let out = evaluate_project(ProjectId::Obelisk, true, true, P, &city());
        assert_eq!(
            out.tokens,
            vec![TokenDelta { kind: TokenKind::MilitaryVictory, age: Age::I, delta: 1 }]
        );
        assert_eq!(out.token_points(&ScoringRules::standard()), 1);
    }

    #[test]
    fn test_token_penalties() {
        let rules = ScoringRules::standard();
        let defeat = evaluate_project(ProjectId::Bazaar, false, false, P, &city());
        assert_eq!(defeat.points(&rules), -1);

        let lost_victory = evaluate_project(ProjectId::Necropolis, false, false, P, &city());
        assert_eq!(lost_victory.points(&rules), -5);
    }

    #[test]
    fn test_vp_formulas() {
        let c = city();
        assert_eq!(evaluate_project(ProjectId::Colossus, true, true, P, &c).vp, 6);
        assert_eq!(evaluate_project(ProjectId::Forum, true, true, P, &c).vp, 5);
        assert_eq!(evaluate_project(ProjectId::Necropolis, true, true, P, &c).vp, 4);
        assert_eq!(evaluate_project(ProjectId::Bazaar, true, true, P, &c).vp, 3);
    }

    #[test]
    fn test_vp_formula_reports_missing_field() {
        let out = evaluate_project(ProjectId::Colossus, true, true, P, &CitySnapshot::new());
        assert_eq!(out.vp, 0);
        assert_eq!(out.missing_fields, vec![FieldRef { player: P, field: SnapshotField::WonderStages }]);
    }

    #[test]
    fn test_strength_resource_special() {
        let c = city();
        assert_eq!(evaluate_project(ProjectId::Amphitheater, true, true, P, &c).strength_bonus, 1);
        assert_eq!(evaluate_project(ProjectId::Aqueduct, true, true, P, &c).resource, Some(Resource::Stone));
        assert_eq!(evaluate_project(ProjectId::Aqueduct, false, false, P, &c).coins_delta, -2);
        let special = evaluate_project(ProjectId::Mausoleum, true, true, P, &c);
        assert!(special.special.is_some());
        assert_eq!(special.points(&ScoringRules::standard()), 0);
    }

    #[test]
    fn test_effects_list_unscored_payload() {
        let c = city();
        let removal = evaluate_project(ProjectId::Lighthouse, false, false, P, &c);
        assert_eq!(removal.effects(), vec!["remove one brown card".to_string()]);

        let coins = evaluate_project(ProjectId::Lighthouse, true, true, P, &c);
        assert_eq!(coins.effects(), vec!["+4 coins".to_string()]);

        let stone = evaluate_project(ProjectId::Aqueduct, true, true, P, &c);
        assert_eq!(stone.effects(), vec!["produces stone".to_string()]);

        let strength = evaluate_project(ProjectId::Amphitheater, true, true, P, &c);
        assert_eq!(strength.effects(), vec!["+1 military strength".to_string()]);

        let token = evaluate_project(ProjectId::Obelisk, false, false, P, &c);
        assert_eq!(token.effects(), vec!["+1 age I defeat token".to_string()]);

        assert!(evaluate_project(ProjectId::Forum, true, false, P, &c).effects().is_empty());
    }

    #[test]
    fn test_large_token_count_saturates() {
        let def = ProjectDefinition {
            id: ProjectId::Obelisk,
            name: "Obelisk",
            age: Age::I,
            cost: 0,
            reward: Reward::Tokens { kind: TokenKind::MilitaryVictory, age: Age::I, count: u32::MAX },
            penalty: Penalty::CoinLoss(0),
        };
        let out = apply_reward(&def, P, &city());
        assert_eq!(out.tokens[0].delta, i32::MAX);
    }

    #[test]
    fn test_unknown_project_annotated() {
        let out = evaluate_project(ProjectId::Unknown, true, true, P, &city());
        assert_eq!(out.applied, Applied::Nothing);
        assert!(out.note.is_some());
        assert!(out.is_noop());
    }

    #[test]
    fn test_unknown_id_decodes() {
        let id: ProjectId = serde_json::from_str(r#""hanging_gardens""#).unwrap();
        assert_eq!(id, ProjectId::Unknown);
    }
}
