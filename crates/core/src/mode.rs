//! Play modes and the tutorial decorator.
//!
//! A tutorial is not a separate game: [`Tutorial`] wraps any [`MiniGame`],
//! forwards the whole lifecycle to it, and layers step messages on top. Each
//! step advances on a gesture kind, after a delay, or once the module score
//! reaches a threshold. The inner module learns it is being played as a
//! tutorial through [`GameContext::mode`] at initialization.

use tracing::debug;

use crate::input::GridLayout;
use crate::lifecycle::{Completion, GameContext, Lifecycle, MiniGame};
use crate::types::{GestureEvent, GestureKind};
use crate::view::ViewKey;

/// How the rule logic of a module is being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayMode {
    #[default]
    Normal,
    Tutorial,
}

impl PlayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayMode::Normal => "normal",
            PlayMode::Tutorial => "tutorial",
        }
    }

    pub fn is_tutorial(&self) -> bool {
        matches!(self, PlayMode::Tutorial)
    }
}

/// Condition that moves a tutorial to its next step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdvanceRule {
    OnGesture(GestureKind),
    AfterSeconds(f32),
    OnScoreAtLeast(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TutorialStep {
    pub message: String,
    pub advance: AdvanceRule,
}

impl TutorialStep {
    pub fn new(message: impl Into<String>, advance: AdvanceRule) -> Self {
        Self {
            message: message.into(),
            advance,
        }
    }
}

/// Decorator adding step messaging and auto-advance to a module.
#[derive(Debug)]
pub struct Tutorial<G> {
    id: String,
    inner: G,
    steps: Vec<TutorialStep>,
    index: usize,
    step_elapsed: f32,
}

impl<G: MiniGame> Tutorial<G> {
    pub fn new(inner: G, steps: Vec<TutorialStep>) -> Self {
        Self {
            id: format!("{}.tutorial", inner.id()),
            inner,
            steps,
            index: 0,
            step_elapsed: 0.0,
        }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut G {
        &mut self.inner
    }

    pub fn step_index(&self) -> usize {
        self.index
    }

    pub fn steps(&self) -> &[TutorialStep] {
        &self.steps
    }

    /// Message of the current step; `None` once every step is done.
    pub fn current_message(&self) -> Option<&str> {
        self.steps.get(self.index).map(|s| s.message.as_str())
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.steps.len()
    }

    fn restart_steps(&mut self) {
        self.index = 0;
        self.step_elapsed = 0.0;
    }

    fn advance_if(&mut self, hit: impl Fn(&AdvanceRule) -> bool) {
        while let Some(step) = self.steps.get(self.index) {
            if !hit(&step.advance) {
                break;
            }
            self.index += 1;
            self.step_elapsed = 0.0;
            debug!(tutorial = %self.id, step = self.index, "tutorial step advanced");
        }
    }

    fn check_score(&mut self) {
        let score = self.inner.lifecycle().session_score();
        self.advance_if(|rule| matches!(rule, AdvanceRule::OnScoreAtLeast(min) if score >= *min));
    }
}

impl<G: MiniGame + 'static> MiniGame for Tutorial<G> {
    fn id(&self) -> &str {
        &self.id
    }

    fn view_key(&self) -> ViewKey {
        self.inner.view_key()
    }

    fn lifecycle(&self) -> &Lifecycle {
        self.inner.lifecycle()
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        self.inner.lifecycle_mut()
    }

    fn grid_layout(&self) -> Option<GridLayout> {
        self.inner.grid_layout()
    }

    fn wants_gestures(&self) -> bool {
        self.inner.wants_gestures()
    }

    fn correct_answers(&self) -> Option<u32> {
        self.inner.correct_answers()
    }

    fn on_initialize(&mut self, ctx: &mut GameContext<'_>) {
        ctx.mode = PlayMode::Tutorial;
        self.inner.on_initialize(ctx);
    }

    fn on_start(&mut self, ctx: &mut GameContext<'_>) {
        self.restart_steps();
        self.inner.on_start(ctx);
    }

    fn on_gesture(&mut self, ctx: &mut GameContext<'_>, event: GestureEvent) {
        self.inner.on_gesture(ctx, event);
        let kind = event.kind();
        // One gesture moves at most one step.
        if let Some(step) = self.steps.get(self.index) {
            if step.advance == AdvanceRule::OnGesture(kind) {
                self.index += 1;
                self.step_elapsed = 0.0;
                debug!(tutorial = %self.id, step = self.index, ?kind, "tutorial step advanced");
            }
        }
        self.check_score();
    }

    fn on_tick(&mut self, ctx: &mut GameContext<'_>, dt: f32) {
        self.inner.on_tick(ctx, dt);
        self.step_elapsed += dt;
        let elapsed = self.step_elapsed;
        self.advance_if(|rule| matches!(rule, AdvanceRule::AfterSeconds(s) if elapsed >= *s));
        self.check_score();
    }

    fn on_complete(&mut self, ctx: &mut GameContext<'_>, completion: &Completion) {
        self.inner.on_complete(ctx, completion);
    }

    fn on_reset(&mut self) {
        self.restart_steps();
        self.inner.on_reset();
    }

    fn on_exit(&mut self, ctx: &mut GameContext<'_>) {
        self.inner.on_exit(ctx);
    }

    fn on_resume(&mut self, ctx: &mut GameContext<'_>) {
        self.inner.on_resume(ctx);
    }
}
