//! Difficulty tiers and the persistent level counter.
//!
//! Each mini-game registers a [`TierResolver`] (usually a [`LevelTable`]) with
//! the shared [`LevelResolver`] when it is launched. The resolver keeps the
//! current level of the active registration and writes it through to the host
//! store under `level.<resolver-id>`.
//!
//! # Level tables
//!
//! ```toml
//! id = "lit_cells"
//! total_levels = 12
//!
//! [[ranges]]
//! min = 1
//! max = 3
//! tier = "beginner"
//!
//! [[ranges]]
//! min = 4
//! max = 12
//! tier = "hard"
//!
//! [tiers.beginner]
//! level_time = 45.0
//! extras = { lit_cells = 3.0 }
//! ```
//!
//! Range bounds are inclusive. Ranges are tested in declaration order and the
//! first match wins; levels past every range fall back to the last range.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::KeyValueStore;
use crate::types::{DifficultyTier, DEFAULT_LEVEL_TIME_SECS, DEFAULT_TOTAL_LEVELS, FIRST_LEVEL};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelTableError {
    #[error("level table `{0}` has no ranges")]
    Empty(String),
    #[error("level table `{0}` declares zero levels")]
    NoLevels(String),
    #[error("range {index} is inverted ({min} > {max})")]
    Inverted { index: usize, min: u32, max: u32 },
    #[error("range {index} starts before the previous range")]
    NotAscending { index: usize },
    #[error("range {index} has an easier tier than the range before it")]
    TierRegression { index: usize },
    #[error("unknown difficulty tier `{0}`")]
    UnknownTier(String),
}

/// Inclusive `[min, max]` level span mapped to one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRange {
    pub min: u32,
    pub max: u32,
    pub tier: DifficultyTier,
}

impl LevelRange {
    pub const fn new(min: u32, max: u32, tier: DifficultyTier) -> Self {
        Self { min, max, tier }
    }

    pub fn contains(&self, level: u32) -> bool {
        level >= self.min && level <= self.max
    }
}

/// Tunables of one tier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TierParams {
    /// Round length in seconds.
    pub level_time: f32,
    /// Module-specific values (cell counts, speeds, ...).
    pub extras: BTreeMap<String, f64>,
}

impl Default for TierParams {
    fn default() -> Self {
        Self {
            level_time: DEFAULT_LEVEL_TIME_SECS,
            extras: BTreeMap::new(),
        }
    }
}

impl TierParams {
    pub fn with_level_time(level_time: f32) -> Self {
        Self {
            level_time,
            ..Self::default()
        }
    }

    pub fn with_extra(mut self, name: &str, value: f64) -> Self {
        self.extras.insert(name.to_string(), value);
        self
    }
}

/// Per-module difficulty lookup.
pub trait TierResolver {
    /// Stable identifier; keys the persistent level counter.
    fn id(&self) -> &str;

    fn total_levels(&self) -> u32;

    fn difficulty(&self, level: u32) -> DifficultyTier;

    fn level_time(&self, level: u32) -> f32;

    /// Named tier-specific value.
    fn param(&self, _level: u32, _name: &str) -> Option<f64> {
        None
    }
}

#[derive(Deserialize)]
struct RawRange {
    min: u32,
    max: u32,
    tier: String,
}

#[derive(Deserialize)]
struct RawLevelTable {
    id: String,
    total_levels: u32,
    ranges: Vec<RawRange>,
    #[serde(default)]
    tiers: BTreeMap<String, TierParams>,
}

/// Ordered range table plus per-tier parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawLevelTable")]
pub struct LevelTable {
    id: String,
    total_levels: u32,
    ranges: Vec<LevelRange>,
    tiers: [TierParams; 5],
}

impl TryFrom<RawLevelTable> for LevelTable {
    type Error = LevelTableError;

    fn try_from(raw: RawLevelTable) -> Result<Self, Self::Error> {
        let mut table = LevelTable::new(raw.id, raw.total_levels);
        for r in raw.ranges {
            let tier = DifficultyTier::from_str(&r.tier)
                .ok_or_else(|| LevelTableError::UnknownTier(r.tier.clone()))?;
            table = table.with_range(r.min, r.max, tier);
        }
        for (name, params) in raw.tiers {
            let tier =
                DifficultyTier::from_str(&name).ok_or(LevelTableError::UnknownTier(name))?;
            table = table.with_tier(tier, params);
        }
        table.validate()?;
        Ok(table)
    }
}

impl LevelTable {
    pub fn new(id: impl Into<String>, total_levels: u32) -> Self {
        Self {
            id: id.into(),
            total_levels,
            ranges: Vec::new(),
            tiers: Default::default(),
        }
    }

    pub fn with_range(mut self, min: u32, max: u32, tier: DifficultyTier) -> Self {
        self.ranges.push(LevelRange::new(min, max, tier));
        self
    }

    pub fn with_tier(mut self, tier: DifficultyTier, params: TierParams) -> Self {
        self.tiers[tier.index()] = params;
        self
    }

    pub fn ranges(&self) -> &[LevelRange] {
        &self.ranges
    }

    pub fn tier_params(&self, tier: DifficultyTier) -> &TierParams {
        &self.tiers[tier.index()]
    }

    /// Check the table for misconfiguration.
    ///
    /// Overlapping ranges are accepted; lookups resolve them first-declared-wins.
    pub fn validate(&self) -> Result<(), LevelTableError> {
        if self.ranges.is_empty() {
            return Err(LevelTableError::Empty(self.id.clone()));
        }
        if self.total_levels == 0 {
            return Err(LevelTableError::NoLevels(self.id.clone()));
        }
        for (index, r) in self.ranges.iter().enumerate() {
            if r.min > r.max {
                return Err(LevelTableError::Inverted {
                    index,
                    min: r.min,
                    max: r.max,
                });
            }
            if index > 0 {
                let prev = &self.ranges[index - 1];
                if r.min < prev.min {
                    return Err(LevelTableError::NotAscending { index });
                }
                if r.tier < prev.tier {
                    return Err(LevelTableError::TierRegression { index });
                }
            }
        }
        Ok(())
    }
}

impl TierResolver for LevelTable {
    fn id(&self) -> &str {
        &self.id
    }

    fn total_levels(&self) -> u32 {
        self.total_levels
    }

    fn difficulty(&self, level: u32) -> DifficultyTier {
        self.ranges
            .iter()
            .find(|r| r.contains(level))
            .or_else(|| self.ranges.last())
            .map(|r| r.tier)
            .unwrap_or(DifficultyTier::Hard)
    }

    fn level_time(&self, level: u32) -> f32 {
        self.tier_params(self.difficulty(level)).level_time
    }

    fn param(&self, level: u32, name: &str) -> Option<f64> {
        self.tier_params(self.difficulty(level))
            .extras
            .get(name)
            .copied()
    }
}

/// Store key of the level counter for a resolver id.
pub fn level_key(resolver_id: &str) -> String {
    format!("level.{resolver_id}")
}

/// Central level counter, delegating tier lookup to the active registration.
#[derive(Default)]
pub struct LevelResolver {
    active: Option<Box<dyn TierResolver>>,
    level: u32,
}

impl std::fmt::Debug for LevelResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelResolver")
            .field("active", &self.active_id())
            .field("level", &self.current_level())
            .finish()
    }
}

impl LevelResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `resolver` the active registration, replacing any previous one,
    /// and load its counter from `store`.
    pub fn register<R: TierResolver + 'static>(&mut self, resolver: R, store: &dyn KeyValueStore) {
        if let Some(prev) = &self.active {
            if prev.id() != resolver.id() {
                debug!(previous = prev.id(), next = resolver.id(), "level resolver replaced");
            }
        }
        self.active = Some(Box::new(resolver));
        self.load(store);
    }

    pub fn unregister(&mut self) {
        self.active = None;
        self.level = FIRST_LEVEL;
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref().map(|r| r.id())
    }

    /// Reload the counter of the active registration from `store`.
    pub fn load(&mut self, store: &dyn KeyValueStore) {
        let Some(id) = self.active_id().map(str::to_string) else {
            self.level = FIRST_LEVEL;
            return;
        };
        let raw = store.get_int(&level_key(&id), FIRST_LEVEL as i64);
        self.level = clamp_level(raw, self.total_levels());
        debug!(resolver = %id, level = self.level, "level counter loaded");
    }

    pub fn current_level(&self) -> u32 {
        self.level.max(FIRST_LEVEL)
    }

    pub fn total_levels(&self) -> u32 {
        self.active
            .as_deref()
            .map(|r| r.total_levels().max(FIRST_LEVEL))
            .unwrap_or(DEFAULT_TOTAL_LEVELS)
    }

    pub fn current_difficulty(&self) -> DifficultyTier {
        self.active
            .as_deref()
            .map(|r| r.difficulty(self.current_level()))
            .unwrap_or_default()
    }

    pub fn level_time(&self) -> f32 {
        self.active
            .as_deref()
            .map(|r| r.level_time(self.current_level()))
            .unwrap_or(DEFAULT_LEVEL_TIME_SECS)
    }

    pub fn param(&self, name: &str) -> Option<f64> {
        self.active
            .as_deref()
            .and_then(|r| r.param(self.current_level(), name))
    }

    /// Advance one level unless already at the last one. Returns whether the
    /// counter moved.
    pub fn next_level(&mut self, store: &mut dyn KeyValueStore) -> bool {
        let total = self.total_levels();
        if self.current_level() >= total {
            info!(level = self.current_level(), total, "already at the final level");
            return false;
        }
        self.level = self.current_level() + 1;
        self.persist(store);
        true
    }

    /// Set the counter, clamped to `[1, total_levels]`. Returns the stored level.
    pub fn set_current_level(&mut self, level: u32, store: &mut dyn KeyValueStore) -> u32 {
        let clamped = clamp_level(level as i64, self.total_levels());
        if clamped != level {
            warn!(requested = level, clamped, "level out of range; clamped");
        }
        self.level = clamped;
        self.persist(store);
        clamped
    }

    pub fn reset(&mut self, store: &mut dyn KeyValueStore) {
        self.level = FIRST_LEVEL;
        self.persist(store);
    }

    fn persist(&self, store: &mut dyn KeyValueStore) {
        match self.active.as_deref() {
            Some(r) => store.set_int(&level_key(r.id()), self.level as i64),
            None => debug!(level = self.level, "no level resolver registered; counter not persisted"),
        }
    }
}

fn clamp_level(raw: i64, total: u32) -> u32 {
    raw.clamp(FIRST_LEVEL as i64, total.max(FIRST_LEVEL) as i64) as u32
}
