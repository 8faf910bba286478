//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (gesture classification, lifecycle logic, view
//! coordination, session orchestration).
//!
//! # Coordinate System
//!
//! Screen space is measured in pixels with the origin in the top-left corner:
//!
//! - **x** grows to the right
//! - **y** grows downwards
//! - Grid row 0 is the top row of the input area, column 0 the leftmost column
//!
//! # Gesture Defaults
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_TAP_MAX_MOVEMENT` | 12 px | Maximum drift for a tap |
//! | `DEFAULT_TAP_MAX_DURATION` | 0.25 s | Maximum press length for a tap |
//! | `DEFAULT_SWIPE_MIN_DISTANCE` | 50 px | Minimum travel for a swipe |
//! | `DEFAULT_HOLD_START_TIME` | 0.5 s | Press length before a hold fires |
//! | `DEFAULT_HOLD_MAX_WOBBLE` | 10 px | Drift that cancels hold detection |
//!
//! # Session Timing
//!
//! - `TICK_MS`: 16ms fixed frame (~60 FPS)
//! - `DEFAULT_COUNTDOWN_SECS`: 3s countdown before gameplay starts
//! - `DEFAULT_TRANSITION_SECS`: 0.3s fade/slide per view
//! - `DEFAULT_LEVEL_TIME_SECS`: 60s round time when no level table is registered
//!
//! # Examples
//!
//! ```
//! use playkit_types::{DifficultyTier, SwipeDirection, Vec2};
//!
//! // Tiers are ordered
//! assert!(DifficultyTier::Beginner < DifficultyTier::Hard);
//! assert_eq!(DifficultyTier::from_str("medium"), Some(DifficultyTier::Medium));
//!
//! // Swipe direction from a drag vector
//! let dir = SwipeDirection::from_delta(Vec2::new(80.0, 4.0));
//! assert_eq!(dir, SwipeDirection::Right);
//! ```

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Maximum pointer travel (pixels) still classified as a tap.
pub const DEFAULT_TAP_MAX_MOVEMENT: f32 = 12.0;

/// Maximum press duration (seconds) still classified as a tap.
pub const DEFAULT_TAP_MAX_DURATION: f32 = 0.25;

/// Minimum pointer travel (pixels) classified as a swipe.
pub const DEFAULT_SWIPE_MIN_DISTANCE: f32 = 50.0;

/// Press duration (seconds) after which a still pointer starts a hold.
pub const DEFAULT_HOLD_START_TIME: f32 = 0.5;

/// Pointer drift (pixels) that cancels hold detection for the press.
pub const DEFAULT_HOLD_MAX_WOBBLE: f32 = 10.0;

/// Countdown shown before a mini-game starts (seconds).
pub const DEFAULT_COUNTDOWN_SECS: f32 = 3.0;

/// Default fade/slide duration for a view (seconds).
pub const DEFAULT_TRANSITION_SECS: f32 = 0.3;

/// Round time used when no level table is registered (seconds).
pub const DEFAULT_LEVEL_TIME_SECS: f32 = 60.0;

/// Total level count reported when no level table is registered.
pub const DEFAULT_TOTAL_LEVELS: u32 = 1;

/// First level of every progression.
pub const FIRST_LEVEL: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gesture_defaults_are_consistent() {
        // A tap must never be able to cover swipe distance.
        assert!(DEFAULT_TAP_MAX_MOVEMENT < DEFAULT_SWIPE_MIN_DISTANCE);
        // With default thresholds a hold can never also be a tap.
        assert!(DEFAULT_HOLD_START_TIME > DEFAULT_TAP_MAX_DURATION);
        assert!(DEFAULT_HOLD_MAX_WOBBLE < DEFAULT_SWIPE_MIN_DISTANCE);
    }

    #[test]
    fn swipe_direction_prefers_dominant_axis() {
        assert_eq!(SwipeDirection::from_delta(Vec2::new(-60.0, 10.0)), SwipeDirection::Left);
        assert_eq!(SwipeDirection::from_delta(Vec2::new(10.0, 60.0)), SwipeDirection::Down);
        assert_eq!(SwipeDirection::from_delta(Vec2::new(10.0, -60.0)), SwipeDirection::Up);
    }

    #[test]
    fn rect_contains_is_inclusive_of_min_edge() {
        let r = Rect::new(10.0, 10.0, 100.0, 50.0);
        assert!(r.contains(Vec2::new(10.0, 10.0)));
        assert!(r.contains(Vec2::new(110.0, 60.0)));
        assert!(!r.contains(Vec2::new(9.9, 20.0)));
        assert!(!Rect::new(0.0, 0.0, 0.0, 10.0).contains(Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn tier_round_trips_through_str() {
        for tier in DifficultyTier::ALL {
            assert_eq!(DifficultyTier::from_str(tier.as_str()), Some(tier));
        }
    }
}

/// A point or vector in screen space (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Axis-aligned rectangle in screen space.
///
/// `x`/`y` is the top-left corner. A rectangle with a non-positive width or
/// height is degenerate and contains no points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Inclusive on all edges.
    pub fn contains(&self, p: Vec2) -> bool {
        !self.is_degenerate()
            && p.x >= self.x
            && p.x <= self.x + self.width
            && p.y >= self.y
            && p.y <= self.y + self.height
    }

    /// Position of `p` relative to this rectangle, `(0,0)` top-left and `(1,1)`
    /// bottom-right. Returns `None` for degenerate rectangles.
    pub fn normalize(&self, p: Vec2) -> Option<Vec2> {
        if self.is_degenerate() {
            return None;
        }
        Some(Vec2::new(
            (p.x - self.x) / self.width,
            (p.y - self.y) / self.height,
        ))
    }
}

/// Phase of a raw pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    /// Pointer pressed this frame
    Down,
    /// Pointer still pressed (moved or not)
    Held,
    /// Pointer released this frame
    Up,
}

/// One frame of raw pointer input.
///
/// `time` is in seconds on a monotonic clock chosen by the caller; only
/// differences between samples are meaningful.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub position: Vec2,
    pub phase: PointerPhase,
    pub time: f32,
}

impl PointerSample {
    pub fn new(position: Vec2, phase: PointerPhase, time: f32) -> Self {
        Self {
            position,
            phase,
            time,
        }
    }

    pub fn down(x: f32, y: f32, time: f32) -> Self {
        Self::new(Vec2::new(x, y), PointerPhase::Down, time)
    }

    pub fn held(x: f32, y: f32, time: f32) -> Self {
        Self::new(Vec2::new(x, y), PointerPhase::Held, time)
    }

    pub fn up(x: f32, y: f32, time: f32) -> Self {
        Self::new(Vec2::new(x, y), PointerPhase::Up, time)
    }
}

/// Cardinal swipe direction in screen space (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SwipeDirection {
    /// Classify a drag vector by its dominant axis.
    ///
    /// Ties between the axes resolve to the horizontal axis.
    pub fn from_delta(delta: Vec2) -> Self {
        if delta.x.abs() >= delta.y.abs() {
            if delta.x >= 0.0 {
                SwipeDirection::Right
            } else {
                SwipeDirection::Left
            }
        } else if delta.y >= 0.0 {
            SwipeDirection::Down
        } else {
            SwipeDirection::Up
        }
    }

    /// Column/row step towards the 4-neighbour in this direction.
    pub fn grid_step(&self) -> (i32, i32) {
        match self {
            SwipeDirection::Left => (-1, 0),
            SwipeDirection::Right => (1, 0),
            SwipeDirection::Up => (0, -1),
            SwipeDirection::Down => (0, 1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
            SwipeDirection::Up => "up",
            SwipeDirection::Down => "down",
        }
    }
}

/// Column/row index into a configured input grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub col: u32,
    pub row: u32,
}

impl GridCell {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// Classified semantic input event.
///
/// Produced by the gesture recognizer and consumed in the same frame by at
/// most one subscriber. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Short, still press
    Tap { position: Vec2 },
    /// Pointer stayed still past the hold threshold; `time` is the sample
    /// timestamp at which the hold started
    HoldStart { position: Vec2, time: f32 },
    /// Release of a press that had started a hold
    HoldEnd { position: Vec2, total_time: f32 },
    /// Release after travelling at least the swipe distance
    Swipe {
        start: Vec2,
        end: Vec2,
        direction: SwipeDirection,
    },
    /// Tap that mapped onto a grid cell
    GridTap { cell: GridCell },
    /// Swipe between two distinct grid cells
    GridSwipe {
        from: GridCell,
        to: GridCell,
        direction: SwipeDirection,
    },
}

impl GestureEvent {
    pub fn kind(&self) -> GestureKind {
        match self {
            GestureEvent::Tap { .. } => GestureKind::Tap,
            GestureEvent::HoldStart { .. } => GestureKind::HoldStart,
            GestureEvent::HoldEnd { .. } => GestureKind::HoldEnd,
            GestureEvent::Swipe { .. } => GestureKind::Swipe,
            GestureEvent::GridTap { .. } => GestureKind::GridTap,
            GestureEvent::GridSwipe { .. } => GestureKind::GridSwipe,
        }
    }
}

/// Discriminant of [`GestureEvent`], handy for filters and tutorial rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Tap,
    HoldStart,
    HoldEnd,
    Swipe,
    GridTap,
    GridSwipe,
}

impl GestureKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tap" => Some(GestureKind::Tap),
            "holdstart" | "hold_start" => Some(GestureKind::HoldStart),
            "holdend" | "hold_end" => Some(GestureKind::HoldEnd),
            "swipe" => Some(GestureKind::Swipe),
            "gridtap" | "grid_tap" => Some(GestureKind::GridTap),
            "gridswipe" | "grid_swipe" => Some(GestureKind::GridSwipe),
            _ => None,
        }
    }
}

/// Five ordered difficulty tiers.
///
/// Tiers are derived from a level number through a level table, never stored.
/// The derived `Ord` follows declaration order: Beginner < Easy < Medium <
/// Advanced < Hard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum DifficultyTier {
    #[default]
    Beginner,
    Easy,
    Medium,
    Advanced,
    Hard,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 5] = [
        DifficultyTier::Beginner,
        DifficultyTier::Easy,
        DifficultyTier::Medium,
        DifficultyTier::Advanced,
        DifficultyTier::Hard,
    ];

    /// Parse tier from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use playkit_types::DifficultyTier;
    ///
    /// assert_eq!(DifficultyTier::from_str("Beginner"), Some(DifficultyTier::Beginner));
    /// assert_eq!(DifficultyTier::from_str("HARD"), Some(DifficultyTier::Hard));
    /// assert_eq!(DifficultyTier::from_str("insane"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "beginner" => Some(DifficultyTier::Beginner),
            "easy" => Some(DifficultyTier::Easy),
            "medium" => Some(DifficultyTier::Medium),
            "advanced" => Some(DifficultyTier::Advanced),
            "hard" => Some(DifficultyTier::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Beginner => "beginner",
            DifficultyTier::Easy => "easy",
            DifficultyTier::Medium => "medium",
            DifficultyTier::Advanced => "advanced",
            DifficultyTier::Hard => "hard",
        }
    }

    /// Position in [`DifficultyTier::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Top-level session state, owned by the session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    None,
    MainMenu,
    LevelSelect,
    Playing,
    Paused,
    Results,
    Tutorial,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::None => "none",
            SessionState::MainMenu => "main_menu",
            SessionState::LevelSelect => "level_select",
            SessionState::Playing => "playing",
            SessionState::Paused => "paused",
            SessionState::Results => "results",
            SessionState::Tutorial => "tutorial",
        }
    }
}
