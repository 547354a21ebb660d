//! Per-game score aggregation
//!
//! A `Scoreboard` owns one game's inputs and a cache of category scores.
//! Every mutator invalidates the keys it can affect before returning, so a
//! read after a write never sees a stale value. Separate games use separate
//! scoreboards; nothing is shared between them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::city::{city_of, Cities, CitySnapshot, FieldRef, SnapshotField};
use crate::city_vp::{score_guilds, score_leaders, CatalogScore};
use crate::conflict::{resolve_land, resolve_naval, ConflictInput};
use crate::error::{Result, ScoreError};
use crate::project::{evaluate_project, project, ProjectId};
use crate::ring::{PlayerId, SeatingRing};
use crate::rules::{Age, ScoringRules, AGES};
use crate::science::ScienceInputs;

/// Scoring categories of the end-game score sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Military,
    Naval,
    Treasury,
    Wonder,
    Civilian,
    Commercial,
    Science,
    Guilds,
    Leaders,
    Projects,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Military,
        Category::Naval,
        Category::Treasury,
        Category::Wonder,
        Category::Civilian,
        Category::Commercial,
        Category::Science,
        Category::Guilds,
        Category::Leaders,
        Category::Projects,
    ];
}

/// Where a category value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySource {
    /// Computed by an evaluator
    Detailed,
    /// Single number typed in by the user
    DirectEntry,
    /// Neither; counts as zero
    Unscored,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub value: i32,
    pub source: CategorySource,
    pub missing_fields: Vec<FieldRef>,
    /// Human-readable explanation, when the evaluator produces one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CategoryScore {
    fn detailed(value: i32, missing_fields: Vec<FieldRef>, detail: Option<String>) -> Self {
        Self { value, source: CategorySource::Detailed, missing_fields, detail }
    }

    fn from_catalog(score: CatalogScore) -> Self {
        let notes: Vec<String> = score
            .entries
            .iter()
            .map(|e| match &e.note {
                Some(note) => format!("{} {} ({})", e.name, e.value, note),
                None => format!("{} {}", e.name, e.value),
            })
            .collect();
        Self::detailed(score.total, score.missing_fields, Some(notes.join(", ")))
    }
}

/// The project drawn in one age and whether it was finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSelection {
    pub age: Age,
    pub project: ProjectId,
    pub completed: bool,
}

/// Everything the caller knows about one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSheet {
    pub ring: SeatingRing,
    pub cities: Cities,
    #[serde(default)]
    pub land: Option<ConflictInput>,
    #[serde(default)]
    pub naval: Option<ConflictInput>,
    #[serde(default)]
    pub projects: Vec<ProjectSelection>,
    /// Totals typed in for categories the user chose not to detail
    #[serde(default)]
    pub direct: BTreeMap<PlayerId, BTreeMap<Category, i32>>,
}

impl GameSheet {
    pub fn new(ring: SeatingRing, cities: Cities) -> Self {
        Self {
            ring,
            cities,
            land: None,
            naval: None,
            projects: Vec::new(),
            direct: BTreeMap::new(),
        }
    }

    pub fn with_land(mut self, input: ConflictInput) -> Self {
        self.land = Some(input);
        self
    }

    pub fn with_naval(mut self, input: ConflictInput) -> Self {
        self.naval = Some(input);
        self
    }

    pub fn with_project(mut self, age: Age, project: ProjectId, completed: bool) -> Self {
        self.projects.push(ProjectSelection { age, project, completed });
        self
    }

    pub fn with_direct(mut self, player: PlayerId, category: Category, value: i32) -> Self {
        self.direct.entry(player).or_default().insert(category, value);
        self
    }

    fn direct_entry(&self, player: PlayerId, category: Category) -> Option<i32> {
        self.direct.get(&player).and_then(|m| m.get(&category)).copied()
    }

    /// One snapshot per seat, no snapshot without a seat, and at most one
    /// project per age drawn from that age.
    fn validate(&self) -> Result<()> {
        for player in self.ring.players() {
            city_of(&self.cities, *player)?;
        }
        let strays = self.cities.keys().chain(self.direct.keys());
        if let Some(stray) = strays.into_iter().find(|p| !self.ring.contains(**p)) {
            return Err(ScoreError::UnknownPlayer(*stray));
        }
        validate_projects(&self.projects)
    }
}

/// Unknown ids pass; they score zero with a note.
fn validate_projects(projects: &[ProjectSelection]) -> Result<()> {
    let mut seen = [false; AGES];
    for sel in projects {
        if std::mem::replace(&mut seen[sel.age.index()], true) {
            return Err(ScoreError::DuplicateProjectAge(sel.age));
        }
        if let Some(def) = project(sel.project) {
            if def.age != sel.age {
                return Err(ScoreError::ProjectAgeMismatch {
                    project: sel.project,
                    age: sel.age,
                    expected: def.age,
                });
            }
        }
    }
    Ok(())
}

/// Memoized category scores keyed by `(player, category)`.
#[derive(Clone, Debug, Default)]
pub struct ScoreCache {
    entries: HashMap<(PlayerId, Category), CategoryScore>,
}

impl ScoreCache {
    pub fn get(&self, player: PlayerId, category: Category) -> Option<&CategoryScore> {
        self.entries.get(&(player, category))
    }

    pub fn contains(&self, player: PlayerId, category: Category) -> bool {
        self.entries.contains_key(&(player, category))
    }

    pub fn insert(&mut self, player: PlayerId, category: Category, score: CategoryScore) {
        self.entries.insert((player, category), score);
    }

    pub fn invalidate(&mut self, player: PlayerId, category: Category) {
        if self.entries.remove(&(player, category)).is_some() {
            tracing::trace!(%player, ?category, "invalidated cached score");
        }
    }

    pub fn invalidate_player(&mut self, player: PlayerId) {
        self.entries.retain(|(p, _), _| *p != player);
    }

    pub fn invalidate_category(&mut self, category: Category) {
        self.entries.retain(|(_, c), _| *c != category);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All category scores of one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub player: PlayerId,
    pub categories: BTreeMap<Category, CategoryScore>,
    pub total: i32,
    /// Some category was computed with fields nobody entered
    pub incomplete: bool,
}

/// Final placing of one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based; players tied on total and coins share a rank
    pub rank: usize,
    pub player: PlayerId,
    pub total: i32,
    pub coins: u32,
}

/// Score sheet of one game with its own cache.
#[derive(Clone, Debug)]
pub struct Scoreboard {
    sheet: GameSheet,
    rules: ScoringRules,
    cache: ScoreCache,
}

impl Scoreboard {
    pub fn new(sheet: GameSheet, rules: ScoringRules) -> Result<Self> {
        sheet.validate()?;
        Ok(Self { sheet, rules, cache: ScoreCache::default() })
    }

    pub fn sheet(&self) -> &GameSheet {
        &self.sheet
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    pub fn cache(&self) -> &ScoreCache {
        &self.cache
    }

    // ──────────────────────────── Reads ────────────────────────────

    /// Score of one category, from the cache when possible.
    pub fn category(&mut self, player: PlayerId, category: Category) -> Result<CategoryScore> {
        self.sheet.ring.position(player)?;
        if let Some(hit) = self.cache.get(player, category) {
            tracing::trace!(%player, ?category, "score cache hit");
            return Ok(hit.clone());
        }

        if matches!(category, Category::Military | Category::Naval) {
            if let Some(all) = self.conflict_scores(category)? {
                for (p, score) in all {
                    self.cache.insert(p, category, score);
                }
                if let Some(score) = self.cache.get(player, category) {
                    return Ok(score.clone());
                }
            }
        }

        let score = match self.detailed(player, category)? {
            Some(score) => score,
            None => self.fallback(player, category),
        };
        tracing::debug!(%player, ?category, value = score.value, source = ?score.source, "computed category");
        self.cache.insert(player, category, score.clone());
        Ok(score)
    }

    pub fn total_for(&mut self, player: PlayerId) -> Result<i32> {
        Ok(self.breakdown_for(player)?.total)
    }

    pub fn breakdown_for(&mut self, player: PlayerId) -> Result<Breakdown> {
        let mut categories = BTreeMap::new();
        let mut total = 0i32;
        let mut incomplete = false;
        for category in Category::ALL {
            let score = self.category(player, category)?;
            total = total.saturating_add(score.value);
            incomplete |= !score.missing_fields.is_empty();
            categories.insert(category, score);
        }
        Ok(Breakdown { player, categories, total, incomplete })
    }

    /// Players by total, highest first. Ties go to the player with more
    /// coins; players still tied share a rank and keep seat order.
    pub fn rankings(&mut self) -> Result<Vec<Standing>> {
        let players = self.sheet.ring.players().to_vec();
        let mut standings = Vec::with_capacity(players.len());
        for player in players {
            let total = self.total_for(player)?;
            let coins = city_of(&self.sheet.cities, player)?.count(SnapshotField::Coins);
            standings.push(Standing { rank: 0, player, total, coins });
        }
        // stable sort keeps seat order among full ties
        standings.sort_by(|a, b| b.total.cmp(&a.total).then(b.coins.cmp(&a.coins)));

        for i in 0..standings.len() {
            standings[i].rank = if i > 0
                && standings[i].total == standings[i - 1].total
                && standings[i].coins == standings[i - 1].coins
            {
                standings[i - 1].rank
            } else {
                i + 1
            };
        }
        Ok(standings)
    }

    // ──────────────────────────── Writes ────────────────────────────

    /// Set or clear a typed-in category total.
    pub fn set_direct_entry(&mut self, player: PlayerId, category: Category, value: Option<i32>) -> Result<()> {
        self.sheet.ring.position(player)?;
        let entries = self.sheet.direct.entry(player).or_default();
        match value {
            Some(v) => entries.insert(category, v),
            None => entries.remove(&category),
        };
        self.cache.invalidate(player, category);
        Ok(())
    }

    /// Edit a player's snapshot in place.
    ///
    /// Drops every cached score of that player, the neighbor-dependent
    /// scores of both neighbors, and land conflicts (diplomacy lives in the
    /// snapshot).
    pub fn update_city(&mut self, player: PlayerId, edit: impl FnOnce(&mut CitySnapshot)) -> Result<()> {
        let (left, right) = self.sheet.ring.neighbors(player)?;
        let city = self.sheet.cities.get_mut(&player).ok_or(ScoreError::MissingSnapshot(player))?;
        edit(city);

        self.cache.invalidate_player(player);
        for neighbor in [left, right] {
            self.cache.invalidate(neighbor, Category::Guilds);
            self.cache.invalidate(neighbor, Category::Leaders);
        }
        self.cache.invalidate_category(Category::Military);
        Ok(())
    }

    pub fn set_land(&mut self, input: Option<ConflictInput>) {
        self.sheet.land = input;
        self.cache.invalidate_category(Category::Military);
    }

    pub fn set_naval(&mut self, input: Option<ConflictInput>) {
        self.sheet.naval = input;
        self.cache.invalidate_category(Category::Naval);
    }

    pub fn set_projects(&mut self, projects: Vec<ProjectSelection>) -> Result<()> {
        validate_projects(&projects)?;
        self.sheet.projects = projects;
        self.cache.invalidate_category(Category::Projects);
        Ok(())
    }

    pub fn invalidate(&mut self, player: PlayerId, category: Category) {
        self.cache.invalidate(player, category);
    }

    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }

    // ──────────────────────────── Evaluation ────────────────────────────

    /// Conflict points of every player, or `None` when no conflict input
    /// was supplied for this category.
    fn conflict_scores(&self, category: Category) -> Result<Option<BTreeMap<PlayerId, CategoryScore>>> {
        let ring = &self.sheet.ring;
        let outcome = match category {
            Category::Military => match &self.sheet.land {
                Some(input) => resolve_land(ring, &self.with_city_diplomacy(input), &self.rules.land)?,
                None => return Ok(None),
            },
            Category::Naval => match &self.sheet.naval {
                Some(input) => resolve_naval(ring, input, &self.rules.naval)?,
                None => return Ok(None),
            },
            _ => return Ok(None),
        };

        let scores = outcome
            .players
            .iter()
            .map(|(p, r)| {
                let detail = format!("ages {} / {} / {}", r.by_age[0], r.by_age[1], r.by_age[2]);
                (*p, CategoryScore::detailed(r.total, Vec::new(), Some(detail)))
            })
            .collect();
        Ok(Some(scores))
    }

    /// Diplomacy recorded in snapshots also removes players from land conflicts.
    fn with_city_diplomacy(&self, input: &ConflictInput) -> ConflictInput {
        let mut merged = input.clone();
        for (player, entry) in merged.entries.iter_mut() {
            if let Some(city) = self.sheet.cities.get(player) {
                for age in Age::ALL {
                    entry.opted_out[age.index()] |= city.took_diplomacy(age);
                }
            }
        }
        merged
    }

    /// Evaluator result, or `None` when the category has no detailed input.
    fn detailed(&self, player: PlayerId, category: Category) -> Result<Option<CategoryScore>> {
        let ring = &self.sheet.ring;
        let cities = &self.sheet.cities;
        let city = city_of(cities, player)?;

        let score = match category {
            Category::Treasury => city.get(SnapshotField::Coins).map(|coins| {
                let per = self.rules.coins_per_point.max(1);
                let value = i32::try_from(coins / per).unwrap_or(i32::MAX);
                CategoryScore::detailed(value, Vec::new(), Some(format!("{} coins", coins)))
            }),
            Category::Science if !ScienceInputs::is_unentered(city) => {
                let (inputs, missing) = ScienceInputs::from_city(player, city);
                let result = inputs.score_with_rules(&self.rules);
                let value = i32::try_from(result.total).unwrap_or(i32::MAX);
                Some(CategoryScore::detailed(value, missing, Some(result.breakdown)))
            }
            Category::Guilds if !city.guilds.is_empty() => {
                Some(CategoryScore::from_catalog(score_guilds(player, ring, cities, &self.rules)?))
            }
            Category::Leaders if !city.leaders.is_empty() => {
                Some(CategoryScore::from_catalog(score_leaders(player, ring, cities, &self.rules)?))
            }
            Category::Projects if !self.sheet.projects.is_empty() => {
                let mut value = 0i32;
                let mut missing = Vec::new();
                let mut notes = Vec::new();
                for sel in &self.sheet.projects {
                    let outcome = evaluate_project(sel.project, sel.completed, city.contributed(sel.age), player, city);
                    value = value.saturating_add(outcome.points(&self.rules));
                    for field in &outcome.missing_fields {
                        if !missing.contains(field) {
                            missing.push(*field);
                        }
                    }
                    let effects = outcome.effects();
                    if !effects.is_empty() {
                        let name = project(sel.project).map_or("unknown project", |d| d.name);
                        notes.push(format!("{}: {}", name, effects.join(", ")));
                    }
                }
                let detail = (!notes.is_empty()).then(|| notes.join("; "));
                Some(CategoryScore::detailed(value, missing, detail))
            }
            _ => None,
        };
        Ok(score)
    }

    fn fallback(&self, player: PlayerId, category: Category) -> CategoryScore {
        match self.sheet.direct_entry(player, category) {
            Some(value) => CategoryScore {
                value,
                source: CategorySource::DirectEntry,
                missing_fields: Vec::new(),
                detail: None,
            },
            None => CategoryScore {
                value: 0,
                source: CategorySource::Unscored,
                missing_fields: Vec::new(),
                detail: None,
            },
        }
    }
}

/// Every player's breakdown plus the final standings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameReport {
    pub breakdowns: Vec<Breakdown>,
    pub standings: Vec<Standing>,
}

/// Score a whole game in one pass.
///
/// # Arguments
/// * `sheet` - seating, snapshots and optional detailed inputs
/// * `rules` - scoring tables to apply
pub fn score_game(sheet: GameSheet, rules: ScoringRules) -> Result<GameReport> {
    let mut board = Scoreboard::new(sheet, rules)?;
    let players = board.sheet().ring.players().to_vec();
    let breakdowns = players
        .into_iter()
        .map(|p| board.breakdown_for(p))
        .collect::<Result<Vec<_>>>()?;
    let standings = board.rankings()?;
    tracing::debug!(players = breakdowns.len(), cached = board.cache().len(), "scored game");
    Ok(GameReport { breakdowns, standings })
}
