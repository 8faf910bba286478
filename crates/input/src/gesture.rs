//! Gesture recognizer for a single pointer.
//!
//! Per press the recognizer walks `Idle → Down → Held* → Up` and emits at most
//! one `HoldStart` while held, then on release exactly one of: a swipe (plus an
//! optional grid swipe), a tap (plus an optional grid tap), a hold end, or
//! nothing at all.
//!
//! Classification on release, with `m` the straight-line distance from the
//! down position and `t` the press duration:
//!
//! | Condition | Result |
//! |-----------|--------|
//! | `m >= swipe_min_distance` | `Swipe` (+ `GridSwipe`) |
//! | `m <= tap_max_movement && t <= tap_max_duration` | `Tap` (+ `GridTap`) |
//! | a hold fired during the press | `HoldEnd` |
//! | otherwise | silent |

use arrayvec::ArrayVec;
use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::grid::GridLayout;
use crate::types::{
    GestureEvent, PointerPhase, PointerSample, Rect, SwipeDirection, Vec2,
    DEFAULT_HOLD_MAX_WOBBLE, DEFAULT_HOLD_START_TIME, DEFAULT_SWIPE_MIN_DISTANCE,
    DEFAULT_TAP_MAX_DURATION, DEFAULT_TAP_MAX_MOVEMENT,
};

/// Events produced by one sample. A sample yields at most two events
/// (screen-space event plus its grid counterpart).
pub type GestureOutput = ArrayVec<GestureEvent, 4>;

/// Classification thresholds (pixels and seconds).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub tap_max_movement: f32,
    pub tap_max_duration: f32,
    pub swipe_min_distance: f32,
    pub hold_start_time: f32,
    pub hold_max_wobble: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_max_movement: DEFAULT_TAP_MAX_MOVEMENT,
            tap_max_duration: DEFAULT_TAP_MAX_DURATION,
            swipe_min_distance: DEFAULT_SWIPE_MIN_DISTANCE,
            hold_start_time: DEFAULT_HOLD_START_TIME,
            hold_max_wobble: DEFAULT_HOLD_MAX_WOBBLE,
        }
    }
}

/// State of the press currently being classified.
#[derive(Debug, Clone, Copy)]
struct Press {
    start: Vec2,
    start_time: f32,
    last: Vec2,
    hold_fired: bool,
    hold_cancelled: bool,
}

/// Converts a stream of pointer samples into [`GestureEvent`]s.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    config: GestureConfig,
    input_area: Option<Rect>,
    grid: Option<GridLayout>,
    press: Option<Press>,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::with_config(GestureConfig::default())
    }

    pub fn with_config(config: GestureConfig) -> Self {
        Self {
            config,
            input_area: None,
            grid: None,
            press: None,
        }
    }

    /// Only presses starting inside `area` are tracked. Without an area every
    /// press is accepted.
    pub fn with_input_area(mut self, area: Rect) -> Self {
        self.set_input_area(Some(area));
        self
    }

    /// Enable grid mapping. Requires an input area to produce grid events.
    pub fn with_grid(mut self, grid: GridLayout) -> Self {
        self.set_grid(Some(grid));
        self
    }

    pub fn set_input_area(&mut self, area: Option<Rect>) {
        if let Some(a) = area {
            if a.is_degenerate() {
                warn!(?a, "degenerate input area; every press will be ignored");
            }
        }
        self.input_area = area;
    }

    pub fn set_grid(&mut self, grid: Option<GridLayout>) {
        if let Some(g) = grid {
            if !g.is_valid() {
                warn!(?g, "invalid grid layout; grid mapping will always fail");
            } else if self.input_area.is_none() {
                debug!("grid mapping enabled without an input area");
            }
        }
        self.grid = grid;
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn input_area(&self) -> Option<Rect> {
        self.input_area
    }

    pub fn grid(&self) -> Option<GridLayout> {
        self.grid
    }

    /// True while a press is being tracked.
    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    /// Drop the in-flight press without emitting anything.
    pub fn reset(&mut self) {
        self.press = None;
    }

    /// Map a position onto the configured grid, if any.
    pub fn map_to_grid(&self, pos: Vec2) -> Option<crate::types::GridCell> {
        let grid = self.grid?;
        let area = self.input_area?;
        grid.map(&area, pos)
    }

    /// Feed one pointer sample and collect the events it produces.
    pub fn process(&mut self, sample: PointerSample) -> GestureOutput {
        let mut out = GestureOutput::new();
        match sample.phase {
            PointerPhase::Down => self.on_down(sample),
            PointerPhase::Held => self.on_held(sample, &mut out),
            PointerPhase::Up => self.on_up(sample, &mut out),
        }
        out
    }

    fn on_down(&mut self, sample: PointerSample) {
        if let Some(area) = self.input_area {
            if !area.contains(sample.position) {
                trace!(pos = ?sample.position, "press outside input area ignored");
                self.press = None;
                return;
            }
        }
        if self.press.is_some() {
            debug!("pointer down while a press was active; restarting press");
        }
        self.press = Some(Press {
            start: sample.position,
            start_time: sample.time,
            last: sample.position,
            hold_fired: false,
            hold_cancelled: false,
        });
    }

    fn on_held(&mut self, sample: PointerSample, out: &mut GestureOutput) {
        let config = self.config;
        let Some(press) = self.press.as_mut() else {
            return;
        };

        press.last = sample.position;
        if press.hold_fired || press.hold_cancelled {
            return;
        }

        let movement = press.start.distance(sample.position);
        if movement > config.hold_max_wobble {
            press.hold_cancelled = true;
            trace!(movement, "hold detection cancelled by drift");
            return;
        }

        let elapsed = sample.time - press.start_time;
        if elapsed >= config.hold_start_time {
            press.hold_fired = true;
            let _ = out.try_push(GestureEvent::HoldStart {
                position: sample.position,
                time: sample.time,
            });
        }
    }

    fn on_up(&mut self, sample: PointerSample, out: &mut GestureOutput) {
        let Some(press) = self.press.take() else {
            return;
        };

        let elapsed = sample.time - press.start_time;
        let delta = sample.position - press.start;
        let movement = delta.length();

        if movement >= self.config.swipe_min_distance {
            let direction = SwipeDirection::from_delta(delta);
            let _ = out.try_push(GestureEvent::Swipe {
                start: press.start,
                end: sample.position,
                direction,
            });
            if let Some(ev) = self.grid_swipe(press.start, sample.position, direction) {
                let _ = out.try_push(ev);
            }
            trace!(movement, elapsed, ?direction, "swipe");
            return;
        }

        if elapsed <= self.config.tap_max_duration && movement <= self.config.tap_max_movement {
            let _ = out.try_push(GestureEvent::Tap {
                position: sample.position,
            });
            if let Some(cell) = self.map_to_grid(sample.position) {
                let _ = out.try_push(GestureEvent::GridTap { cell });
            }
            trace!(movement, elapsed, "tap");
            return;
        }

        if press.hold_fired {
            let _ = out.try_push(GestureEvent::HoldEnd {
                position: sample.position,
                total_time: elapsed,
            });
            return;
        }

        trace!(movement, elapsed, "ambiguous press ignored");
    }

    fn grid_swipe(&self, start: Vec2, end: Vec2, direction: SwipeDirection) -> Option<GestureEvent> {
        let grid = self.grid?;
        let from = self.map_to_grid(start)?;
        let mut to = self.map_to_grid(end)?;
        if from == to {
            to = grid.neighbor(from, direction);
        }
        if from == to {
            return None;
        }
        Some(GestureEvent::GridSwipe {
            from,
            to,
            direction,
        })
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GridCell;

    fn press(r: &mut GestureRecognizer, samples: &[PointerSample]) -> Vec<GestureEvent> {
        samples.iter().flat_map(|s| r.process(*s)).collect()
    }

    #[test]
    fn test_quick_still_press_is_a_tap() {
        let mut r = GestureRecognizer::new();
        let events = press(
            &mut r,
            &[PointerSample::down(100.0, 100.0, 0.0), PointerSample::up(104.0, 103.0, 0.1)],
        );
        assert_eq!(
            events,
            vec![GestureEvent::Tap {
                position: Vec2::new(104.0, 103.0)
            }]
        );
        assert!(!r.is_pressed());
    }

    #[test]
    fn test_slow_still_press_without_hold_is_silent() {
        let mut r = GestureRecognizer::new();
        // 0.4s: too long for a tap, release arrives before any held frame fired a hold.
        let events = press(
            &mut r,
            &[PointerSample::down(0.0, 0.0, 0.0), PointerSample::up(1.0, 0.0, 0.4)],
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_drift_between_tap_and_swipe_is_silent() {
        let mut r = GestureRecognizer::new();
        let events = press(
            &mut r,
            &[PointerSample::down(0.0, 0.0, 0.0), PointerSample::up(30.0, 0.0, 0.1)],
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_hold_fires_once_then_ends() {
        let mut r = GestureRecognizer::new();
        let mut events = Vec::new();
        events.extend(r.process(PointerSample::down(50.0, 50.0, 0.0)));
        for i in 1..=40 {
            events.extend(r.process(PointerSample::held(51.0, 50.0, i as f32 * 0.016)));
        }
        events.extend(r.process(PointerSample::up(51.0, 50.0, 0.7)));

        let starts = events
            .iter()
            .filter(|e| matches!(e, GestureEvent::HoldStart { .. }))
            .count();
        assert_eq!(starts, 1);
        match events.last() {
            Some(GestureEvent::HoldEnd { total_time, .. }) => {
                assert!((*total_time - 0.7).abs() < 1e-5)
            }
            other => panic!("expected HoldEnd, got {other:?}"),
        }
    }

    #[test]
    fn test_wobble_cancels_hold_for_the_press() {
        let mut r = GestureRecognizer::new();
        let mut events = Vec::new();
        events.extend(r.process(PointerSample::down(50.0, 50.0, 0.0)));
        events.extend(r.process(PointerSample::held(70.0, 50.0, 0.1)));
        // Back inside the wobble radius: detection stays cancelled.
        events.extend(r.process(PointerSample::held(50.0, 50.0, 0.6)));
        events.extend(r.process(PointerSample::held(50.0, 50.0, 0.9)));
        events.extend(r.process(PointerSample::up(50.0, 50.0, 1.0)));
        assert!(events.is_empty(), "unexpected events: {events:?}");
    }

    #[test]
    fn test_swipe_direction_and_priority() {
        let config = GestureConfig {
            // Tap movement overlapping swipe distance: swipe must win.
            tap_max_movement: 100.0,
            ..GestureConfig::default()
        };
        let mut r = GestureRecognizer::with_config(config);
        let events = press(
            &mut r,
            &[PointerSample::down(100.0, 100.0, 0.0), PointerSample::up(100.0, 40.0, 0.1)],
        );
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            GestureEvent::Swipe {
                direction: SwipeDirection::Up,
                ..
            }
        ));
    }

    #[test]
    fn test_press_outside_input_area_is_ignored() {
        let mut r = GestureRecognizer::new().with_input_area(Rect::new(0.0, 0.0, 100.0, 100.0));
        let events = press(
            &mut r,
            &[PointerSample::down(150.0, 50.0, 0.0), PointerSample::up(150.0, 50.0, 0.05)],
        );
        assert!(events.is_empty());

        // The release position does not need to be inside the area.
        let events = press(
            &mut r,
            &[PointerSample::down(90.0, 50.0, 1.0), PointerSample::up(160.0, 50.0, 1.1)],
        );
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], GestureEvent::Swipe { .. }));
    }

    #[test]
    fn test_grid_tap_and_grid_swipe() {
        let mut r = GestureRecognizer::new()
            .with_input_area(Rect::new(0.0, 0.0, 400.0, 400.0))
            .with_grid(GridLayout::new(4, 4));

        let events = press(
            &mut r,
            &[PointerSample::down(150.0, 250.0, 0.0), PointerSample::up(152.0, 250.0, 0.1)],
        );
        assert_eq!(
            events[1],
            GestureEvent::GridTap {
                cell: GridCell::new(1, 2)
            }
        );

        // Crosses from column 0 into column 2.
        let events = press(
            &mut r,
            &[PointerSample::down(50.0, 50.0, 1.0), PointerSample::up(250.0, 60.0, 1.2)],
        );
        assert_eq!(
            events[1],
            GestureEvent::GridSwipe {
                from: GridCell::new(0, 0),
                to: GridCell::new(2, 0),
                direction: SwipeDirection::Right,
            }
        );
    }

    #[test]
    fn test_swipe_within_one_cell_snaps_to_neighbor() {
        let mut r = GestureRecognizer::new()
            .with_input_area(Rect::new(0.0, 0.0, 400.0, 400.0))
            .with_grid(GridLayout::new(2, 2));

        let events = press(
            &mut r,
            &[PointerSample::down(20.0, 300.0, 0.0), PointerSample::up(20.0, 230.0, 0.1)],
        );
        assert_eq!(
            events[1],
            GestureEvent::GridSwipe {
                from: GridCell::new(0, 1),
                to: GridCell::new(0, 0),
                direction: SwipeDirection::Up,
            }
        );
    }

    #[test]
    fn test_reset_drops_press() {
        let mut r = GestureRecognizer::new();
        r.process(PointerSample::down(0.0, 0.0, 0.0));
        r.reset();
        assert!(r.process(PointerSample::up(0.0, 0.0, 0.1)).is_empty());
    }

    #[test]
    fn test_config_from_toml_keeps_defaults_for_missing_keys() {
        let config: GestureConfig = toml::from_str("swipe_min_distance = 80.0").unwrap();
        assert_eq!(config.swipe_min_distance, 80.0);
        assert_eq!(config.tap_max_movement, DEFAULT_TAP_MAX_MOVEMENT);
        assert_eq!(config.hold_start_time, DEFAULT_HOLD_START_TIME);
    }
}
