//! Mini-game lifecycle contract.
//!
//! ```text
//! NotStarted ──start──▶ Active ──complete──▶ Complete
//!      ▲                  │  ▲                  │
//!      └──────reset───────┘  └──resume (pause)──┘
//!
//! any state ──exit──▶ Exited
//! ```
//!
//! Concrete modules implement the `on_*` hooks of [`MiniGame`] and hold a
//! [`Lifecycle`]; the provided methods (`start_mini_game`,
//! `complete_mini_game`, ...) carry the guards and must not be overridden.
//! Modules never hold references to shared services. Every call receives a
//! [`GameContext`] and reports to the session through its request outbox.

use crossbeam_channel::Receiver;
use tracing::{debug, info, warn};

use crate::input::{GestureBus, GridLayout, SubscriptionId};
use crate::level::LevelResolver;
use crate::mode::PlayMode;
use crate::store::KeyValueStore;
use crate::types::GestureEvent;
use crate::view::{AsAny, ViewCoordinator, ViewKey};

/// Audio cue played when a module completes with a win.
pub const WIN_CUE: &str = "win";

/// Audio cue played when a module completes with a loss.
pub const LOSE_CUE: &str = "lose";

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    NotStarted,
    Active,
    Complete,
    Exited,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::NotStarted => "not_started",
            LifecycleState::Active => "active",
            LifecycleState::Complete => "complete",
            LifecycleState::Exited => "exited",
        }
    }
}

/// Payload delivered to completion listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub final_score: i64,
    pub won: bool,
}

/// Token returned by [`Lifecycle::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&Completion)>;

/// Work a module asks the session to perform, applied in order after the
/// module call returns.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionRequest {
    PlaySfx(String),
    AddScore(i64),
    EndGame {
        won: bool,
        correct_answers: Option<u32>,
    },
    ShowView(ViewKey),
}

/// Shared services handed to a module for the duration of one call.
pub struct GameContext<'a> {
    pub levels: &'a mut LevelResolver,
    pub store: &'a mut dyn KeyValueStore,
    pub gestures: &'a mut GestureBus,
    pub views: &'a mut ViewCoordinator,
    pub mode: PlayMode,
    results_view: ViewKey,
    requests: &'a mut Vec<SessionRequest>,
}

impl<'a> GameContext<'a> {
    pub fn new(
        levels: &'a mut LevelResolver,
        store: &'a mut dyn KeyValueStore,
        gestures: &'a mut GestureBus,
        views: &'a mut ViewCoordinator,
        requests: &'a mut Vec<SessionRequest>,
    ) -> Self {
        Self {
            levels,
            store,
            gestures,
            views,
            mode: PlayMode::Normal,
            results_view: ViewKey::from("results"),
            requests,
        }
    }

    pub fn with_mode(mut self, mode: PlayMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_results_view(mut self, key: impl Into<ViewKey>) -> Self {
        self.results_view = key.into();
        self
    }

    pub fn results_view(&self) -> &ViewKey {
        &self.results_view
    }

    pub fn request(&mut self, request: SessionRequest) {
        self.requests.push(request);
    }

    pub fn play_sfx(&mut self, id: &str) {
        self.request(SessionRequest::PlaySfx(id.to_string()));
    }

    pub fn add_score(&mut self, amount: i64) {
        self.request(SessionRequest::AddScore(amount));
    }

    pub fn end_game(&mut self, won: bool, correct_answers: Option<u32>) {
        self.request(SessionRequest::EndGame {
            won,
            correct_answers,
        });
    }

    pub fn show_view(&mut self, key: impl Into<ViewKey>) {
        self.request(SessionRequest::ShowView(key.into()));
    }
}

/// Guard flags, module score, gesture subscription and listeners of one module.
#[derive(Default)]
pub struct Lifecycle {
    active: bool,
    complete: bool,
    exited: bool,
    session_score: i64,
    final_score: Option<i64>,
    subscription: Option<(SubscriptionId, Receiver<GestureEvent>)>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("state", &self.state())
            .field("session_score", &self.session_score)
            .field("final_score", &self.final_score)
            .field("subscribed", &self.subscription.is_some())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        if self.exited {
            LifecycleState::Exited
        } else if self.complete {
            LifecycleState::Complete
        } else if self.active {
            LifecycleState::Active
        } else {
            LifecycleState::NotStarted
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// True while player input should be acted on.
    pub fn accepts_input(&self) -> bool {
        self.active && !self.complete
    }

    pub fn session_score(&self) -> i64 {
        self.session_score
    }

    pub fn final_score(&self) -> Option<i64> {
        self.final_score
    }

    /// Adjust the module-local running score.
    pub fn add_score(&mut self, amount: i64) {
        self.session_score += amount;
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn add_listener(&mut self, listener: impl FnMut(&Completion) + 'static) -> ListenerId {
        self.next_listener = self.next_listener.wrapping_add(1);
        let id = ListenerId(self.next_listener);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn start(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.session_score = 0;
        self.final_score = None;
        self.active = true;
        self.complete = false;
        self.exited = false;
        true
    }

    fn complete(&mut self, final_score: i64, won: bool) -> Option<Completion> {
        if self.complete {
            return None;
        }
        self.complete = true;
        self.active = false;
        self.final_score = Some(final_score);
        let completion = Completion { final_score, won };
        for (_, listener) in &mut self.listeners {
            listener(&completion);
        }
        Some(completion)
    }

    fn reset(&mut self) {
        self.active = false;
        self.complete = false;
        self.session_score = 0;
        self.final_score = None;
    }

    fn resume(&mut self) {
        self.active = true;
        self.complete = false;
    }

    fn subscribe(&mut self, bus: &mut GestureBus) {
        if let Some((id, _)) = self.subscription.take() {
            bus.unsubscribe(id);
        }
        self.subscription = Some(bus.subscribe());
    }

    fn unsubscribe(&mut self, bus: &mut GestureBus) {
        if let Some((id, _)) = self.subscription.take() {
            bus.unsubscribe(id);
        }
    }

    fn drain_gestures(&self) -> Vec<GestureEvent> {
        self.subscription
            .as_ref()
            .map(|(_, rx)| rx.try_iter().collect())
            .unwrap_or_default()
    }
}

/// A mini-game module.
///
/// Implementors provide identity, the paired view, access to their
/// [`Lifecycle`], and any of the `on_*` hooks. The remaining methods are the
/// guarded contract the session drives. [`AsAny`] lets hosts recover the
/// concrete module for rendering.
pub trait MiniGame: AsAny {
    fn id(&self) -> &str;

    /// View shown when the module is launched.
    fn view_key(&self) -> ViewKey;

    fn lifecycle(&self) -> &Lifecycle;

    fn lifecycle_mut(&mut self) -> &mut Lifecycle;

    /// Grid the gesture recognizer maps onto while this module plays.
    fn grid_layout(&self) -> Option<GridLayout> {
        None
    }

    /// Whether the module wants gesture events delivered.
    fn wants_gestures(&self) -> bool {
        true
    }

    /// Correct answer count reported with the score, if the module tracks one.
    fn correct_answers(&self) -> Option<u32> {
        None
    }

    /// Register level tables, read the play mode.
    fn on_initialize(&mut self, _ctx: &mut GameContext<'_>) {}

    /// Build fresh game content.
    fn on_start(&mut self, _ctx: &mut GameContext<'_>) {}

    fn on_gesture(&mut self, _ctx: &mut GameContext<'_>, _event: GestureEvent) {}

    fn on_tick(&mut self, _ctx: &mut GameContext<'_>, _dt: f32) {}

    fn on_complete(&mut self, _ctx: &mut GameContext<'_>, _completion: &Completion) {}

    fn on_reset(&mut self) {}

    fn on_exit(&mut self, _ctx: &mut GameContext<'_>) {}

    /// Rebind presentation to the retained game state after a pause.
    fn on_resume(&mut self, _ctx: &mut GameContext<'_>) {}

    fn initialize(&mut self, ctx: &mut GameContext<'_>) {
        debug!(module = self.id(), mode = ctx.mode.as_str(), "initializing module");
        self.on_initialize(ctx);
    }

    /// Begin an activation. A second call while active is ignored.
    fn start_mini_game(&mut self, ctx: &mut GameContext<'_>) -> bool {
        if !self.lifecycle_mut().start() {
            warn!(module = self.id(), "start requested while already active; ignored");
            return false;
        }
        if self.wants_gestures() {
            self.lifecycle_mut().subscribe(ctx.gestures);
        }
        info!(module = self.id(), "mini-game started");
        self.on_start(ctx);
        true
    }

    /// Deliver queued gestures, then run the per-frame hook.
    fn tick_mini_game(&mut self, ctx: &mut GameContext<'_>, dt: f32) {
        for event in self.lifecycle().drain_gestures() {
            // A gesture may end the game; later events in the batch are dropped.
            if !self.lifecycle().accepts_input() {
                break;
            }
            self.on_gesture(ctx, event);
        }
        if self.lifecycle().accepts_input() {
            self.on_tick(ctx, dt);
        }
    }

    /// Report the outcome of this activation. Only the first call per
    /// activation has any effect.
    fn complete_mini_game(&mut self, ctx: &mut GameContext<'_>, final_score: i64, won: bool) -> bool {
        let Some(completion) = self.lifecycle_mut().complete(final_score, won) else {
            warn!(module = self.id(), final_score, won, "completion already reported; ignored");
            return false;
        };
        info!(module = self.id(), final_score, won, "mini-game complete");
        self.on_complete(ctx, &completion);
        ctx.play_sfx(if won { WIN_CUE } else { LOSE_CUE });
        ctx.add_score(final_score);
        let correct = self.correct_answers();
        ctx.end_game(won, correct);
        let results = ctx.results_view().clone();
        ctx.show_view(results);
        true
    }

    /// Clear flags and score for a replay. No requests are issued.
    fn reset_mini_game(&mut self) {
        self.lifecycle_mut().reset();
        self.on_reset();
        debug!(module = self.id(), "mini-game reset");
    }

    /// Teardown: releases the gesture subscription and completion listeners.
    fn on_mini_game_exit(&mut self, ctx: &mut GameContext<'_>) {
        self.on_exit(ctx);
        let lc = self.lifecycle_mut();
        lc.unsubscribe(ctx.gestures);
        lc.clear_listeners();
        lc.active = false;
        lc.exited = true;
        debug!(module = self.id(), "mini-game exited");
    }

    /// Soft resume: flags are restored, game content is left untouched.
    fn resume_from_pause(&mut self, ctx: &mut GameContext<'_>) {
        self.lifecycle_mut().resume();
        if self.wants_gestures() && !self.lifecycle().is_subscribed() {
            self.lifecycle_mut().subscribe(ctx.gestures);
        }
        self.on_resume(ctx);
        debug!(module = self.id(), "mini-game resumed");
    }
}
