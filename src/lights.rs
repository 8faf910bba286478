//! Lights: the bundled sample mini-game.
//!
//! One cell of a grid is lit at a time. Tapping it scores the tier's points
//! and lights another; tapping anything else is a miss. Swiping from the lit
//! cell carries the light along. The round is won on reaching the tier's
//! target and lost after too many misses or when time runs out short of it.
//! Played as a tutorial, the clock does not run.

use crate::core::level::{LevelTable, TierParams};
use crate::core::{Completion, GameContext, Lifecycle, MiniGame, PlayMode};
use crate::core::{AdvanceRule, Tutorial, TutorialStep};
use crate::input::GridLayout;
use crate::types::{DifficultyTier, GestureEvent, GestureKind, GridCell};
use crate::view::ViewKey;

pub const LIGHTS_ID: &str = "lights";
pub const LIGHTS_VIEW: &str = "lights";

pub const HIT_CUE: &str = "hit";
pub const MISS_CUE: &str = "miss";

const TARGET_PARAM: &str = "target";
const POINTS_PARAM: &str = "points";
const MAX_MISSES: u32 = 3;

/// Score that ends a tutorial round, whatever the stored level.
pub const TUTORIAL_TARGET: i64 = 30;

/// Level table used by [`Lights`]: ten levels over the five tiers.
pub fn level_table() -> LevelTable {
    let tier = |time: f32, target: f64, points: f64| {
        TierParams::with_level_time(time)
            .with_extra(TARGET_PARAM, target)
            .with_extra(POINTS_PARAM, points)
    };
    LevelTable::new(LIGHTS_ID, 10)
        .with_range(1, 3, DifficultyTier::Beginner)
        .with_range(4, 5, DifficultyTier::Easy)
        .with_range(6, 7, DifficultyTier::Medium)
        .with_range(8, 9, DifficultyTier::Advanced)
        .with_range(10, 10, DifficultyTier::Hard)
        .with_tier(DifficultyTier::Beginner, tier(30.0, 50.0, 10.0))
        .with_tier(DifficultyTier::Easy, tier(25.0, 80.0, 10.0))
        .with_tier(DifficultyTier::Medium, tier(20.0, 100.0, 10.0))
        .with_tier(DifficultyTier::Advanced, tier(15.0, 120.0, 10.0))
        .with_tier(DifficultyTier::Hard, tier(12.0, 150.0, 10.0))
}

/// Steps shown when [`Lights`] is played as the tutorial.
pub fn tutorial_steps() -> Vec<TutorialStep> {
    vec![
        TutorialStep::new("One cell is lit. Watch it.", AdvanceRule::AfterSeconds(2.0)),
        TutorialStep::new("Tap the lit cell.", AdvanceRule::OnGesture(GestureKind::GridTap)),
        TutorialStep::new(
            "Swipe from the lit cell to move it.",
            AdvanceRule::OnGesture(GestureKind::GridSwipe),
        ),
        TutorialStep::new(
            format!("Score {TUTORIAL_TARGET} to finish."),
            AdvanceRule::OnScoreAtLeast(TUTORIAL_TARGET),
        ),
    ]
}

/// The tutorial variant of [`Lights`].
pub fn tutorial(seed: u32) -> Tutorial<Lights> {
    Tutorial::new(Lights::new(seed), tutorial_steps())
}

/// Shuffled bag of cells: every cell is drawn once before any repeats.
#[derive(Debug, Clone)]
struct CellDeck {
    state: u32,
    bag: Vec<GridCell>,
}

impl CellDeck {
    fn new(seed: u32) -> Self {
        Self {
            // A zero state would stay at the additive constant forever.
            state: if seed == 0 { 1 } else { seed },
            bag: Vec::new(),
        }
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG.
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    fn refill(&mut self, grid: &GridLayout) {
        self.bag.clear();
        for row in 0..grid.rows {
            for col in 0..grid.columns {
                self.bag.push(GridCell::new(col, row));
            }
        }
        for i in (1..self.bag.len()).rev() {
            let j = (self.next_u32() % (i as u32 + 1)) as usize;
            self.bag.swap(i, j);
        }
    }

    /// Draw a cell other than `avoid` when the grid has more than one.
    fn draw(&mut self, grid: &GridLayout, avoid: Option<GridCell>) -> GridCell {
        loop {
            if self.bag.is_empty() {
                self.refill(grid);
            }
            let Some(cell) = self.bag.pop() else {
                return GridCell::new(0, 0);
            };
            if Some(cell) != avoid || grid.columns * grid.rows <= 1 {
                return cell;
            }
        }
    }
}

#[derive(Debug)]
pub struct Lights {
    lifecycle: Lifecycle,
    grid: GridLayout,
    deck: CellDeck,
    mode: PlayMode,
    lit: Option<GridCell>,
    hits: u32,
    misses: u32,
    time_left: f32,
    target: i64,
    points: i64,
    outcome: Option<bool>,
}

impl Lights {
    pub fn new(seed: u32) -> Self {
        Self {
            lifecycle: Lifecycle::new(),
            grid: GridLayout::new(4, 4),
            deck: CellDeck::new(seed),
            mode: PlayMode::Normal,
            lit: None,
            hits: 0,
            misses: 0,
            time_left: 0.0,
            target: 0,
            points: 0,
            outcome: None,
        }
    }

    pub fn with_grid(mut self, grid: GridLayout) -> Self {
        self.grid = grid;
        self
    }

    pub fn grid(&self) -> GridLayout {
        self.grid
    }

    pub fn lit(&self) -> Option<GridCell> {
        self.lit
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn misses_left(&self) -> u32 {
        MAX_MISSES.saturating_sub(self.misses)
    }

    pub fn score(&self) -> i64 {
        self.lifecycle.session_score()
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    /// Seconds left; `None` when the clock is off (tutorial).
    pub fn time_left(&self) -> Option<f32> {
        (!self.mode.is_tutorial()).then_some(self.time_left.max(0.0))
    }

    /// `Some(won)` once the round has completed.
    pub fn outcome(&self) -> Option<bool> {
        self.outcome
    }

    fn finish(&mut self, ctx: &mut GameContext<'_>, won: bool) {
        let score = self.score();
        self.complete_mini_game(ctx, score, won);
    }

    fn on_cell_tapped(&mut self, ctx: &mut GameContext<'_>, cell: GridCell) {
        if self.lit == Some(cell) {
            self.hits += 1;
            self.lifecycle.add_score(self.points);
            ctx.play_sfx(HIT_CUE);
            self.lit = Some(self.deck.draw(&self.grid, Some(cell)));
            if self.score() >= self.target {
                self.finish(ctx, true);
            }
        } else {
            self.misses += 1;
            ctx.play_sfx(MISS_CUE);
            if self.misses >= MAX_MISSES && !self.mode.is_tutorial() {
                self.finish(ctx, false);
            }
        }
    }
}

impl MiniGame for Lights {
    fn id(&self) -> &str {
        LIGHTS_ID
    }

    fn view_key(&self) -> ViewKey {
        ViewKey::from(LIGHTS_VIEW)
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    fn grid_layout(&self) -> Option<GridLayout> {
        Some(self.grid)
    }

    fn correct_answers(&self) -> Option<u32> {
        Some(self.hits)
    }

    fn on_initialize(&mut self, ctx: &mut GameContext<'_>) {
        self.mode = ctx.mode;
        ctx.levels.register(level_table(), &*ctx.store);
    }

    fn on_start(&mut self, ctx: &mut GameContext<'_>) {
        self.hits = 0;
        self.misses = 0;
        self.outcome = None;
        self.time_left = ctx.levels.level_time();
        self.target = if self.mode.is_tutorial() {
            TUTORIAL_TARGET
        } else {
            ctx.levels.param(TARGET_PARAM).unwrap_or(50.0) as i64
        };
        self.points = ctx.levels.param(POINTS_PARAM).unwrap_or(10.0) as i64;
        self.lit = Some(self.deck.draw(&self.grid, None));
    }

    fn on_gesture(&mut self, ctx: &mut GameContext<'_>, event: GestureEvent) {
        match event {
            GestureEvent::GridTap { cell } => self.on_cell_tapped(ctx, cell),
            GestureEvent::GridSwipe { from, to, .. } if self.lit == Some(from) => {
                self.lit = Some(to);
            }
            _ => {}
        }
    }

    fn on_tick(&mut self, ctx: &mut GameContext<'_>, dt: f32) {
        if self.mode.is_tutorial() {
            return;
        }
        self.time_left -= dt;
        if self.time_left <= 0.0 {
            let won = self.score() >= self.target;
            self.finish(ctx, won);
        }
    }

    fn on_complete(&mut self, _ctx: &mut GameContext<'_>, completion: &Completion) {
        self.outcome = Some(completion.won);
        self.lit = None;
    }

    fn on_reset(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.outcome = None;
        self.lit = None;
    }
}
