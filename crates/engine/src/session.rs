//! Session controller.
//!
//! Owns the registered modules, the running score and [`SessionState`], and
//! drives the view coordinator, the gesture recognizer and the level resolver.
//! Everything advances from [`Session::tick`], one call per frame.
//!
//! Launching a module:
//!
//! ```text
//! start_mini_game(id)     initialize(ctx), show module view
//!   ├─ view transition    (wall-clock)
//!   ├─ countdown          session.countdown_secs
//!   └─ start_mini_game    module becomes Active; launch complete
//! ```
//!
//! Guard violations never surface as errors: they are logged and the call
//! returns `false`.

use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::core::store::TUTORIAL_SHOWN_KEY;
use crate::core::{
    Countdown, GameContext, KeyValueStore, LevelResolver, MemoryStore, MiniGame, PlayMode,
    SessionRequest,
};
use crate::input::{GestureBus, GestureConfig, GestureOutput, GestureRecognizer};
use crate::services::{AudioSink, NullAudio, PostHandle, ScoreSink, ScoreSubmission};
use crate::types::{PointerSample, Rect, SessionState};
use crate::view::{View, ViewCoordinator, ViewKey};

/// Index of a registered module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(usize);

/// Which entry point launches a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleRole {
    Main,
    Tutorial,
    Extra,
}

struct ModuleSlot {
    module: Box<dyn MiniGame>,
    role: ModuleRole,
}

#[derive(Debug, Clone, PartialEq)]
enum Launch {
    Idle,
    /// Waiting for the module view to be shown and fully faded in.
    ShowingView { key: ViewKey, requested: bool },
    CountingDown,
}

/// Top-level orchestrator.
pub struct Session {
    config: SessionConfig,
    state: SessionState,
    paused_from: SessionState,
    score: i64,
    correct_answers: Option<u32>,
    last_won: Option<bool>,
    ended: bool,
    tutorial_started: bool,
    resume_requested: bool,
    restart_requested: bool,
    /// Pause overlay waiting for a running transition to settle.
    pause_pending: bool,
    launch: Launch,
    current: Option<ModuleId>,
    mode: PlayMode,
    countdown: Countdown,
    modules: Vec<ModuleSlot>,
    views: ViewCoordinator,
    levels: LevelResolver,
    gestures: GestureBus,
    recognizer: GestureRecognizer,
    store: Box<dyn KeyValueStore>,
    audio: Box<dyn AudioSink>,
    scoring: Option<Box<dyn ScoreSink>>,
    posts: Vec<PostHandle>,
    requests: Vec<SessionRequest>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("score", &self.score)
            .field("ended", &self.ended)
            .field("launch", &self.launch)
            .field("current", &self.current)
            .field("modules", &self.modules.len())
            .field("views", &self.views)
            .finish()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let countdown = Countdown::new(config.countdown_secs);
        Self {
            config,
            state: SessionState::None,
            paused_from: SessionState::Playing,
            score: 0,
            correct_answers: None,
            last_won: None,
            ended: false,
            tutorial_started: false,
            resume_requested: false,
            restart_requested: false,
            pause_pending: false,
            launch: Launch::Idle,
            current: None,
            mode: PlayMode::Normal,
            countdown,
            modules: Vec::new(),
            views: ViewCoordinator::new(),
            levels: LevelResolver::new(),
            gestures: GestureBus::new(),
            recognizer: GestureRecognizer::new(),
            store: Box::new(MemoryStore::new()),
            audio: Box::new(NullAudio),
            scoring: None,
            posts: Vec::new(),
            requests: Vec::new(),
        }
    }

    pub fn with_store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    pub fn with_audio(mut self, audio: impl AudioSink + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    pub fn with_score_sink(mut self, sink: impl ScoreSink + 'static) -> Self {
        self.scoring = Some(Box::new(sink));
        self
    }

    pub fn with_gestures(mut self, config: GestureConfig) -> Self {
        self.recognizer = GestureRecognizer::with_config(config);
        self
    }

    // ---- registration -------------------------------------------------

    pub fn register_view<V: View>(&mut self, view: V) -> bool {
        self.views.register(view)
    }

    pub fn add_module<M: MiniGame>(&mut self, module: M, role: ModuleRole) -> ModuleId {
        let id = ModuleId(self.modules.len());
        if role != ModuleRole::Extra && self.modules.iter().any(|s| s.role == role) {
            warn!(module = module.id(), ?role, "role already taken; first registration wins");
        }
        debug!(module = module.id(), ?role, "module registered");
        self.modules.push(ModuleSlot {
            module: Box::new(module),
            role,
        });
        id
    }

    pub fn find_module(&self, id: &str) -> Option<ModuleId> {
        self.modules
            .iter()
            .position(|s| s.module.id() == id)
            .map(ModuleId)
    }

    fn module_for_role(&self, role: ModuleRole) -> Option<ModuleId> {
        self.modules
            .iter()
            .position(|s| s.role == role)
            .map(ModuleId)
    }

    // ---- queries --------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn correct_answers(&self) -> Option<u32> {
        self.correct_answers
    }

    /// Outcome of the last `end_game`, until the session is reset.
    pub fn last_won(&self) -> Option<bool> {
        self.last_won
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    pub fn is_launching(&self) -> bool {
        self.launch != Launch::Idle
    }

    /// Countdown before the current module starts, while it runs.
    pub fn countdown(&self) -> Option<&Countdown> {
        (self.launch == Launch::CountingDown).then_some(&self.countdown)
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn current_module(&self) -> Option<ModuleId> {
        self.current
    }

    pub fn module(&self, id: ModuleId) -> Option<&dyn MiniGame> {
        self.modules.get(id.0).map(|s| s.module.as_ref())
    }

    /// Concrete module `M` registered under `id`.
    pub fn module_as<M: MiniGame>(&self, id: ModuleId) -> Option<&M> {
        let module: &dyn MiniGame = self.modules.get(id.0)?.module.as_ref();
        module.as_any().downcast_ref::<M>()
    }

    pub fn views(&self) -> &ViewCoordinator {
        &self.views
    }

    pub fn views_mut(&mut self) -> &mut ViewCoordinator {
        &mut self.views
    }

    pub fn levels(&self) -> &LevelResolver {
        &self.levels
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn recognizer(&self) -> &GestureRecognizer {
        &self.recognizer
    }

    /// Update the pointer input area. Returns false when `area` is unchanged.
    pub fn set_input_area(&mut self, area: Option<Rect>) -> bool {
        if self.recognizer.input_area() == area {
            return false;
        }
        self.recognizer.set_input_area(area);
        true
    }

    pub fn tutorial_shown(&self) -> bool {
        self.store.get_int(TUTORIAL_SHOWN_KEY, 0) == 1
    }

    pub fn posts_in_flight(&self) -> usize {
        self.posts.len()
    }

    pub fn set_current_level(&mut self, level: u32) -> u32 {
        let level = self.levels.set_current_level(level, self.store.as_mut());
        self.flush_store();
        level
    }

    pub fn reset_levels(&mut self) {
        self.levels.reset(self.store.as_mut());
        self.flush_store();
    }

    // ---- flows ------------------------------------------------------------

    /// Show the main menu.
    pub fn open_menu(&mut self) -> bool {
        self.state = SessionState::MainMenu;
        let menu = self.config.menu_view.clone();
        self.present(menu)
    }

    pub fn start_main_game(&mut self) -> bool {
        let Some(id) = self.module_for_role(ModuleRole::Main) else {
            warn!("no main module registered");
            self.ensure_visible();
            return false;
        };
        self.start_mini_game(id)
    }

    /// Launch the tutorial module. Only the first call per run has effect.
    pub fn start_tutorial(&mut self) -> bool {
        if self.tutorial_started {
            debug!("tutorial already started; ignored");
            return false;
        }
        let Some(id) = self.module_for_role(ModuleRole::Tutorial) else {
            warn!("no tutorial module registered");
            self.ensure_visible();
            return false;
        };
        if self.is_launching() {
            debug!("launch in progress; tutorial request ignored");
            return false;
        }
        if !self.has_view_for(id) {
            self.ensure_visible();
            return false;
        }
        self.tutorial_started = true;
        self.views.hide_all();
        self.store.set_int(TUTORIAL_SHOWN_KEY, 1);
        self.flush_store();
        self.start_mini_game(id)
    }

    /// Centralized launch: initialize, show the module view, then count down.
    pub fn start_mini_game(&mut self, id: ModuleId) -> bool {
        if self.is_launching() {
            debug!(?id, "launch already in progress; ignored");
            return false;
        }
        let Some(slot) = self.modules.get(id.0) else {
            warn!(?id, "start requested for unknown module");
            self.ensure_visible();
            return false;
        };
        let role = slot.role;
        let key = slot.module.view_key();
        let grid = slot.module.grid_layout();
        if !self.has_view_for(id) {
            self.ensure_visible();
            return false;
        }

        if let Some(prev) = self.current.filter(|p| *p != id) {
            self.exit_module(prev);
        }

        self.mode = match role {
            ModuleRole::Tutorial => PlayMode::Tutorial,
            _ => PlayMode::Normal,
        };
        self.ended = false;
        self.correct_answers = None;
        self.last_won = None;
        self.recognizer.reset();
        self.recognizer.set_grid(grid);

        self.with_module(id, |m, ctx| m.initialize(ctx));
        self.current = Some(id);
        self.state = self.play_state();
        self.launch = Launch::ShowingView {
            key,
            requested: false,
        };
        info!(
            module = self.modules[id.0].module.id(),
            mode = self.mode.as_str(),
            "launching mini-game"
        );
        self.advance_launch(0.0);
        true
    }

    pub fn add_score(&mut self, amount: i64) {
        self.score += amount;
    }

    pub fn end_game(&mut self, won: bool) -> bool {
        self.end_game_with(won, None)
    }

    /// End the session. Only the first call after a launch has effect.
    pub fn end_game_with(&mut self, won: bool, correct_answers: Option<u32>) -> bool {
        if self.ended {
            warn!(won, "end_game called again; ignored");
            return false;
        }
        self.ended = true;
        self.state = SessionState::Results;
        self.correct_answers = correct_answers;
        self.last_won = Some(won);
        info!(score = self.score, won, "session ended");

        // Tutorial rounds are practice and never move the level counter.
        if won && !self.mode.is_tutorial() {
            self.levels.next_level(self.store.as_mut());
        }
        self.flush_store();
        self.post_score();
        true
    }

    pub fn return_to_menu(&mut self) {
        if let Some(id) = self.current {
            self.exit_module(id);
        }
        self.recognizer.reset();
        self.reset_scalars();
        self.flush_store();
        self.views.hide_overlays();
        self.open_menu();
    }

    /// Reset every mutable scalar. Registered views and modules are kept.
    pub fn reset_session(&mut self) {
        if let Some(id) = self.current {
            self.exit_module(id);
        }
        self.recognizer.reset();
        self.reset_scalars();
        self.state = SessionState::None;
    }

    /// Pause gameplay and show the pause overlay.
    pub fn pause(&mut self) -> bool {
        if !matches!(self.state, SessionState::Playing | SessionState::Tutorial) {
            debug!(state = self.state.as_str(), "pause ignored");
            return false;
        }
        self.paused_from = self.state;
        self.state = SessionState::Paused;
        self.recognizer.reset();
        let pause = self.config.pause_view.clone();
        if !self.views.show(pause.clone()) && self.views.contains(&ViewKey::from(pause)) {
            debug!("transition running; pause overlay deferred");
            self.pause_pending = true;
        }
        info!("session paused");
        true
    }

    /// Resume on the next tick that has no view transition running.
    pub fn request_resume(&mut self) -> bool {
        if self.state != SessionState::Paused {
            debug!(state = self.state.as_str(), "resume ignored");
            return false;
        }
        self.resume_requested = true;
        true
    }

    /// Reset the current module and run its countdown again on the next tick.
    pub fn request_restart(&mut self) -> bool {
        if self.current.is_none() {
            debug!("restart ignored; no current module");
            return false;
        }
        self.restart_requested = true;
        true
    }

    /// Classify a pointer sample and deliver the result to the active module.
    ///
    /// The classified gestures are returned so hosts can drive menus with them.
    pub fn handle_pointer(&mut self, sample: PointerSample) -> GestureOutput {
        if self.state == SessionState::Paused {
            return GestureOutput::new();
        }
        let out = self.recognizer.process(sample);
        if !out.is_empty() && !self.is_launching() && self.in_play() {
            self.gestures.publish(&out);
        }
        out
    }

    /// Advance one frame by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.views.tick(dt);

        if self.restart_requested {
            self.restart_requested = false;
            self.restart();
        }
        if self.resume_requested && !self.views.is_transitioning() {
            self.resume_requested = false;
            self.resume();
        }
        if self.pause_pending && !self.views.is_transitioning() {
            let pause = self.config.pause_view.clone();
            self.pause_pending = !self.views.show(pause);
        }

        if self.state != SessionState::Paused {
            self.advance_launch(dt);
            if !self.is_launching() && self.in_play() {
                if let Some(id) = self.current {
                    self.with_module(id, |m, ctx| m.tick_mini_game(ctx, dt));
                }
            }
        }

        self.apply_requests();
        self.poll_posts();
    }

    // ---- internals ----------------------------------------------------------

    fn play_state(&self) -> SessionState {
        match self.mode {
            PlayMode::Tutorial => SessionState::Tutorial,
            PlayMode::Normal => SessionState::Playing,
        }
    }

    fn in_play(&self) -> bool {
        matches!(self.state, SessionState::Playing | SessionState::Tutorial)
    }

    fn with_module<R>(
        &mut self,
        id: ModuleId,
        f: impl FnOnce(&mut dyn MiniGame, &mut GameContext<'_>) -> R,
    ) -> Option<R> {
        let Session {
            modules,
            levels,
            store,
            gestures,
            views,
            requests,
            config,
            mode,
            ..
        } = self;
        let slot = modules.get_mut(id.0)?;
        let mut ctx = GameContext::new(levels, store.as_mut(), gestures, views, requests)
            .with_mode(*mode)
            .with_results_view(config.results_view.clone());
        Some(f(slot.module.as_mut(), &mut ctx))
    }

    fn exit_module(&mut self, id: ModuleId) {
        self.with_module(id, |m, ctx| m.on_mini_game_exit(ctx));
        if self.current == Some(id) {
            self.current = None;
        }
    }

    fn reset_scalars(&mut self) {
        self.score = 0;
        self.correct_answers = None;
        self.last_won = None;
        self.ended = false;
        self.resume_requested = false;
        self.restart_requested = false;
        self.pause_pending = false;
        self.launch = Launch::Idle;
        self.countdown.cancel();
        self.current = None;
        self.tutorial_started = false;
        self.mode = PlayMode::Normal;
        self.requests.clear();
    }

    fn advance_launch(&mut self, dt: f32) {
        match &mut self.launch {
            Launch::Idle => {}
            Launch::ShowingView { key, requested } => {
                if !*requested {
                    if !self.views.contains(key) {
                        warn!(view = %key, "module view not registered; launch aborted");
                        self.return_to_menu();
                        return;
                    }
                    if self.views.show(key.clone()) {
                        *requested = true;
                    } else {
                        return;
                    }
                }
                if self.views.is_transitioning() {
                    return;
                }
                self.countdown = Countdown::new(self.config.countdown_secs);
                self.countdown.start();
                self.launch = Launch::CountingDown;
                self.advance_launch(0.0);
            }
            Launch::CountingDown => {
                if !self.countdown.tick(dt) {
                    return;
                }
                self.launch = Launch::Idle;
                if let Some(id) = self.current {
                    self.with_module(id, |m, ctx| m.start_mini_game(ctx));
                }
            }
        }
    }

    fn restart(&mut self) {
        let Some(id) = self.current else {
            return;
        };
        self.with_module(id, |m, _| m.reset_mini_game());
        let key = self.modules[id.0].module.view_key();
        info!(module = self.modules[id.0].module.id(), "restarting mini-game");
        self.score = 0;
        self.ended = false;
        self.correct_answers = None;
        self.last_won = None;
        self.resume_requested = false;
        self.pause_pending = false;
        self.recognizer.reset();
        self.countdown.cancel();
        self.views.hide_all();
        self.state = self.play_state();
        self.launch = Launch::ShowingView {
            key,
            requested: false,
        };
        self.advance_launch(0.0);
    }

    fn resume(&mut self) {
        if self.state != SessionState::Paused {
            return;
        }
        self.pause_pending = false;
        let pause = self.config.pause_view.clone();
        self.views.hide(pause);
        self.state = self.paused_from;
        // A module still counting down has not started yet.
        if !self.is_launching() {
            if let Some(id) = self.current {
                self.with_module(id, |m, ctx| m.resume_from_pause(ctx));
            }
        }
        info!("session resumed");
    }

    fn apply_requests(&mut self) {
        // Requests issued while applying (none today) are applied next frame.
        let requests = std::mem::take(&mut self.requests);
        for request in requests {
            match request {
                SessionRequest::PlaySfx(id) => self.audio.play_sfx(&id),
                SessionRequest::AddScore(amount) => self.add_score(amount),
                SessionRequest::EndGame {
                    won,
                    correct_answers,
                } => {
                    self.end_game_with(won, correct_answers);
                }
                SessionRequest::ShowView(key) => {
                    self.present(key);
                }
            }
        }
    }

    /// Show `key`, cutting a running transition short so that a screen is
    /// always reachable.
    fn present(&mut self, key: impl Into<ViewKey>) -> bool {
        let key = key.into();
        if self.views.show(key.clone()) {
            return true;
        }
        if self.views.contains(&key) && self.views.is_transitioning() {
            debug!(view = %key, "interrupting running transition");
            self.views.hide_all();
            return self.views.show(key);
        }
        false
    }

    /// A module can only launch onto a registered view.
    fn has_view_for(&self, id: ModuleId) -> bool {
        let Some(slot) = self.modules.get(id.0) else {
            return false;
        };
        let key = slot.module.view_key();
        if self.views.contains(&key) {
            return true;
        }
        warn!(module = slot.module.id(), view = %key, "module view not registered; launch refused");
        false
    }

    fn ensure_visible(&mut self) {
        if self.views.visible_ids().next().is_none() && !self.views.is_transitioning() {
            self.open_menu();
        }
    }

    fn flush_store(&mut self) {
        if let Err(e) = self.store.flush() {
            error!(error = %e, "failed to persist store");
        }
    }

    fn post_score(&mut self) {
        let Some(sink) = self.scoring.as_mut() else {
            return;
        };
        let submission = ScoreSubmission {
            score: self.score,
            correct_answers: self.correct_answers,
        };
        debug!(?submission, "posting score");
        self.posts.push(sink.post(submission));
    }

    fn poll_posts(&mut self) {
        self.posts.retain_mut(|handle| match handle.poll() {
            None => true,
            Some(Ok(())) => {
                info!("score posted");
                false
            }
            Some(Err(e)) => {
                warn!(error = %e, "score post failed");
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Lifecycle, LevelTable};
    use crate::types::{DifficultyTier, GestureEvent, Vec2};
    use crate::view::{TransitionConfig, ViewConfig};

    struct Screen(&'static str, bool);

    impl View for Screen {
        fn id(&self) -> &str {
            self.0
        }

        fn config(&self) -> ViewConfig {
            if self.1 {
                ViewConfig::overlay(TransitionConfig::fade(0.1))
            } else {
                ViewConfig::primary(TransitionConfig::fade(0.1))
            }
        }
    }

    #[derive(Default)]
    struct Quiz {
        lifecycle: Lifecycle,
        starts: u32,
        resumes: u32,
    }

    impl MiniGame for Quiz {
        fn id(&self) -> &str {
            "quiz"
        }

        fn view_key(&self) -> ViewKey {
            ViewKey::from("quiz")
        }

        fn lifecycle(&self) -> &Lifecycle {
            &self.lifecycle
        }

        fn lifecycle_mut(&mut self) -> &mut Lifecycle {
            &mut self.lifecycle
        }

        fn on_initialize(&mut self, ctx: &mut GameContext<'_>) {
            let table = LevelTable::new("quiz", 3)
                .with_range(1, 1, DifficultyTier::Beginner)
                .with_range(2, 3, DifficultyTier::Hard);
            ctx.levels.register(table, &*ctx.store);
        }

        fn on_start(&mut self, _ctx: &mut GameContext<'_>) {
            self.starts += 1;
        }

        fn on_gesture(&mut self, ctx: &mut GameContext<'_>, event: GestureEvent) {
            if let GestureEvent::Tap { .. } = event {
                self.complete_mini_game(ctx, 50, true);
            }
        }

        fn on_resume(&mut self, _ctx: &mut GameContext<'_>) {
            self.resumes += 1;
        }
    }

    fn session() -> (Session, ModuleId) {
        let mut s = Session::new(SessionConfig {
            countdown_secs: 0.5,
            ..SessionConfig::default()
        });
        s.register_view(Screen("main_menu", false));
        s.register_view(Screen("quiz", false));
        s.register_view(Screen("results", false));
        s.register_view(Screen("pause", true));
        let id = s.add_module(Quiz::default(), ModuleRole::Main);
        (s, id)
    }

    fn run(s: &mut Session, seconds: f32) {
        let frames = (seconds / 0.016).ceil() as usize;
        for _ in 0..frames {
            s.tick(0.016);
        }
    }

    fn tap(s: &mut Session) {
        s.handle_pointer(PointerSample::down(10.0, 10.0, 0.0));
        s.handle_pointer(PointerSample::up(11.0, 10.0, 0.05));
    }

    #[test]
    fn test_launch_waits_for_view_then_countdown() {
        let (mut s, id) = session();
        s.open_menu();
        run(&mut s, 0.5);

        assert!(s.start_main_game());
        assert_eq!(s.state(), SessionState::Playing);
        assert!(s.is_launching());
        // Re-entrant launch is ignored.
        assert!(!s.start_mini_game(id));

        run(&mut s, 0.25);
        assert!(s.countdown().is_some());
        assert_eq!(s.module_as::<Quiz>(id).unwrap().starts, 0);

        run(&mut s, 0.6);
        assert!(!s.is_launching());
        let quiz = s.module_as::<Quiz>(id).unwrap();
        assert_eq!(quiz.starts, 1);
        assert!(quiz.lifecycle().is_active());
    }

    #[test]
    fn test_completion_flows_into_results() {
        let (mut s, id) = session();
        s.start_main_game();
        run(&mut s, 1.0);

        tap(&mut s);
        s.tick(0.016);
        assert_eq!(s.state(), SessionState::Results);
        assert_eq!(s.score(), 50);
        assert_eq!(s.last_won(), Some(true));
        assert_eq!(s.levels().current_level(), 2);
        assert_eq!(s.store().get_int("level.quiz", 0), 2);

        run(&mut s, 0.5);
        assert_eq!(s.views().active_id(), Some("results"));
        assert!(s.module(id).unwrap().lifecycle().is_complete());
    }

    #[test]
    fn test_end_game_twice_is_ignored() {
        let (mut s, _) = session();
        s.start_main_game();
        run(&mut s, 1.0);
        s.add_score(10);

        assert!(s.end_game(true));
        assert!(!s.end_game(true));
        assert_eq!(s.levels().current_level(), 2);
    }

    #[test]
    fn test_pause_blocks_gestures_and_resume_keeps_state() {
        let (mut s, id) = session();
        s.start_main_game();
        run(&mut s, 1.0);

        assert!(s.pause());
        assert_eq!(s.state(), SessionState::Paused);
        tap(&mut s);
        run(&mut s, 0.3);
        assert!(s.module(id).unwrap().lifecycle().is_active());
        assert!(s.views().is_visible(&"pause".into()));

        assert!(s.request_resume());
        run(&mut s, 0.3);
        assert_eq!(s.state(), SessionState::Playing);
        assert!(!s.views().is_visible(&"pause".into()));
        let quiz = s.module_as::<Quiz>(id).unwrap();
        assert_eq!(quiz.resumes, 1);
        assert_eq!(quiz.starts, 1);
    }

    #[test]
    fn test_pause_overlay_waits_for_running_transition() {
        let (mut s, _) = session();
        s.start_main_game();
        s.tick(0.016);
        assert!(s.views().is_transitioning());

        assert!(s.pause());
        assert!(!s.views().is_visible(&"pause".into()));
        run(&mut s, 0.5);
        assert_eq!(s.state(), SessionState::Paused);
        assert!(s.views().is_visible(&"pause".into()));
        assert!(s.is_launching());

        assert!(s.request_resume());
        run(&mut s, 1.0);
        assert_eq!(s.state(), SessionState::Playing);
        assert!(!s.views().is_visible(&"pause".into()));
        assert!(!s.is_launching());
    }

    #[test]
    fn test_module_without_view_is_refused() {
        let mut s = Session::default();
        s.register_view(Screen("main_menu", false));
        let id = s.add_module(Quiz::default(), ModuleRole::Tutorial);
        s.open_menu();

        assert!(!s.start_tutorial());
        assert!(!s.start_mini_game(id));
        assert!(!s.tutorial_shown());
        assert_eq!(s.current_module(), None);
        assert_eq!(s.views().active_id(), Some("main_menu"));

        s.register_view(Screen("quiz", false));
        assert!(s.start_tutorial());
    }

    #[test]
    fn test_input_area_only_updates_on_change() {
        let (mut s, _) = session();
        let area = Rect::new(0.0, 0.0, 200.0, 100.0);
        assert!(s.set_input_area(Some(area)));
        assert!(!s.set_input_area(Some(area)));
        assert!(s.set_input_area(None));
        assert!(!s.set_input_area(None));
        assert_eq!(s.recognizer().input_area(), None);
    }

    #[test]
    fn test_restart_reruns_countdown() {
        let (mut s, id) = session();
        s.start_main_game();
        run(&mut s, 1.0);
        s.pause();
        assert!(s.request_restart());
        s.tick(0.016);

        assert!(s.is_launching());
        assert_eq!(s.state(), SessionState::Playing);
        assert!(!s.module(id).unwrap().lifecycle().is_active());
        run(&mut s, 1.0);
        assert_eq!(s.module_as::<Quiz>(id).unwrap().starts, 2);
    }

    #[test]
    fn test_return_to_menu_resets_scalars() {
        let (mut s, id) = session();
        s.start_main_game();
        run(&mut s, 1.0);
        s.add_score(25);
        s.pause();

        s.return_to_menu();
        assert_eq!(s.state(), SessionState::MainMenu);
        assert_eq!(s.score(), 0);
        assert_eq!(s.current_module(), None);
        assert!(!s.has_ended());
        assert!(!s.views().is_visible(&"pause".into()));
        assert_eq!(
            s.module(id).unwrap().lifecycle().state(),
            crate::core::LifecycleState::Exited
        );
        run(&mut s, 0.5);
        assert_eq!(s.views().active_id(), Some("main_menu"));
    }

    #[test]
    fn test_missing_modules_are_not_fatal() {
        let mut s = Session::default();
        s.register_view(Screen("main_menu", false));
        assert!(!s.start_main_game());
        assert!(!s.start_tutorial());
        assert_eq!(s.views().active_id(), Some("main_menu"));
        assert!(!s.start_mini_game(ModuleId(7)));
    }

    #[test]
    fn test_tutorial_starts_once_and_marks_store() {
        let mut s = Session::default();
        s.register_view(Screen("quiz", false));
        let id = s.add_module(Quiz::default(), ModuleRole::Tutorial);
        assert!(!s.tutorial_shown());

        assert!(s.start_tutorial());
        assert_eq!(s.state(), SessionState::Tutorial);
        assert_eq!(s.mode(), PlayMode::Tutorial);
        assert!(s.tutorial_shown());
        assert_eq!(s.current_module(), Some(id));

        run(&mut s, 4.0);
        assert!(!s.start_tutorial());
    }

    #[test]
    fn test_pointer_ignored_outside_play() {
        let (mut s, _) = session();
        s.open_menu();
        let out = s.handle_pointer(PointerSample::down(0.0, 0.0, 0.0));
        assert!(out.is_empty());
        let out = s.handle_pointer(PointerSample::up(0.0, 0.0, 0.1));
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], GestureEvent::Tap { position } if position == Vec2::ZERO));
    }
}
