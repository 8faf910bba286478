//! Easing curves and tweens for view transitions.

use serde::Deserialize;

use crate::types::{Vec2, DEFAULT_TRANSITION_SECS};

/// Easing function type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Linear interpolation.
    Linear,
    /// Cubic ease-in (accelerating).
    EaseIn,
    /// Cubic ease-out (decelerating).
    EaseOut,
    /// Cubic ease-in-out.
    #[default]
    EaseInOut,
    /// Instant (no animation).
    Instant,
}

impl Easing {
    /// Applies the easing function to a t value (0-1).
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::EaseIn => t * t * t,
            Self::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let k = -2.0 * t + 2.0;
                    1.0 - k * k * k / 2.0
                }
            }
            Self::Instant => 1.0,
        }
    }
}

/// How a view enters and leaves the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    #[default]
    Fade,
    Slide,
}

/// Screen edge a sliding view enters from (and leaves towards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideEdge {
    Left,
    #[default]
    Right,
    Top,
    Bottom,
}

impl SlideEdge {
    /// Offset, in screen sizes, of a view parked off-screen at this edge.
    pub fn offscreen_offset(&self) -> Vec2 {
        match self {
            SlideEdge::Left => Vec2::new(-1.0, 0.0),
            SlideEdge::Right => Vec2::new(1.0, 0.0),
            SlideEdge::Top => Vec2::new(0.0, -1.0),
            SlideEdge::Bottom => Vec2::new(0.0, 1.0),
        }
    }
}

/// Per-view transition parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    #[serde(alias = "style")]
    pub kind: TransitionKind,
    pub slide_from: SlideEdge,
    /// Seconds.
    pub duration: f32,
    pub easing: Easing,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            kind: TransitionKind::Fade,
            slide_from: SlideEdge::Right,
            duration: DEFAULT_TRANSITION_SECS,
            easing: Easing::EaseInOut,
        }
    }
}

impl TransitionConfig {
    pub fn fade(duration: f32) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    pub fn slide(from: SlideEdge, duration: f32) -> Self {
        Self {
            kind: TransitionKind::Slide,
            slide_from: from,
            duration,
            ..Self::default()
        }
    }

    pub fn instant() -> Self {
        Self {
            duration: 0.0,
            easing: Easing::Instant,
            ..Self::default()
        }
    }

    /// Negative durations behave like zero.
    pub fn duration(&self) -> f32 {
        self.duration.max(0.0)
    }
}

/// A single time-driven interpolation from 0 to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    elapsed: f32,
    duration: f32,
    easing: Easing,
}

impl Tween {
    pub fn new(duration: f32, easing: Easing) -> Self {
        Self {
            elapsed: 0.0,
            duration: duration.max(0.0),
            easing,
        }
    }

    /// Linear progress (0-1).
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }

    /// Eased progress (0-1).
    pub fn value(&self) -> f32 {
        if self.is_complete() {
            1.0
        } else {
            self.easing.apply(self.progress())
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Advance by `dt` seconds and return the time left over once the tween
    /// has completed.
    pub fn update(&mut self, dt: f32) -> f32 {
        let dt = dt.max(0.0);
        let remaining = (self.duration - self.elapsed).max(0.0);
        if dt >= remaining {
            self.elapsed = self.duration;
            dt - remaining
        } else {
            self.elapsed += dt;
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_in_out_is_symmetric() {
        let e = Easing::EaseInOut;
        assert_eq!(e.apply(0.0), 0.0);
        assert_eq!(e.apply(1.0), 1.0);
        assert!((e.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((e.apply(0.25) + e.apply(0.75) - 1.0).abs() < 1e-6);
        // Slow start.
        assert!(e.apply(0.1) < 0.1);
    }

    #[test]
    fn test_tween_reaches_target_and_returns_leftover() {
        let mut tw = Tween::new(0.3, Easing::EaseInOut);
        assert_eq!(tw.update(0.1), 0.0);
        assert!(!tw.is_complete());
        let left = tw.update(0.25);
        assert!((left - 0.05).abs() < 1e-5);
        assert!(tw.is_complete());
        assert_eq!(tw.value(), 1.0);
    }

    #[test]
    fn test_zero_duration_tween_is_complete() {
        let mut tw = Tween::new(0.0, Easing::Linear);
        assert!(tw.is_complete());
        assert_eq!(tw.update(0.016), 0.016);
    }

    #[test]
    fn test_transition_config_from_toml() {
        let cfg: TransitionConfig = toml::from_str(
            r#"
            kind = "slide"
            slide_from = "bottom"
            duration = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.kind, TransitionKind::Slide);
        assert_eq!(cfg.slide_from, SlideEdge::Bottom);
        assert_eq!(cfg.easing, Easing::EaseInOut);
    }
}
