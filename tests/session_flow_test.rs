use std::cell::RefCell;
use std::rc::Rc;

use playkit::core::{KeyValueStore, LifecycleState, MemoryStore};
use playkit::engine::{
    JsonFileStore, ModuleId, ModuleRole, PostHandle, ScoreSink, ScoreSubmission, Session,
    SessionConfig,
};
use playkit::lights::{self, Lights, LIGHTS_VIEW};
use playkit::screens::{self, MENU_VIEW, PAUSE_VIEW, RESULTS_VIEW};
use playkit::types::{DifficultyTier, GridCell, PointerSample, Rect, SessionState, Vec2};
use playkit::view::TransitionConfig;
use tempfile::TempDir;

const AREA: Rect = Rect::new(0.0, 0.0, 400.0, 400.0);
const FRAME: f32 = 0.016;

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<ScoreSubmission>>>);

impl Recorder {
    fn count(&self) -> usize {
        self.0.borrow().len()
    }
}

impl ScoreSink for Recorder {
    fn post(&mut self, submission: ScoreSubmission) -> PostHandle {
        self.0.borrow_mut().push(submission);
        PostHandle::ready(Ok(()))
    }
}

struct Harness {
    s: Session,
    main: ModuleId,
    tutorial: ModuleId,
    clock: f32,
}

impl Harness {
    fn new(store: impl KeyValueStore + 'static, sink: Option<Recorder>) -> Self {
        Self::with_transition(store, sink, TransitionConfig::instant())
    }

    fn with_transition(
        store: impl KeyValueStore + 'static,
        sink: Option<Recorder>,
        transition: TransitionConfig,
    ) -> Self {
        let mut s = Session::new(SessionConfig {
            countdown_secs: 0.2,
            ..SessionConfig::default()
        })
        .with_store(store);
        if let Some(sink) = sink {
            s = s.with_score_sink(sink);
        }
        screens::register_views(&mut s, transition);
        let main = s.add_module(Lights::new(11), ModuleRole::Main);
        let tutorial = s.add_module(lights::tutorial(5), ModuleRole::Tutorial);
        s.set_input_area(Some(AREA));
        s.open_menu();
        let mut h = Self {
            s,
            main,
            tutorial,
            clock: 0.0,
        };
        h.run(0.1);
        h
    }

    fn run(&mut self, seconds: f32) {
        let frames = (seconds / FRAME).ceil() as usize;
        for _ in 0..frames {
            self.clock += FRAME;
            self.s.tick(FRAME);
        }
    }

    fn launch_main(&mut self) {
        assert!(self.s.start_main_game());
        self.run(0.5);
        assert!(!self.s.is_launching());
    }

    fn game(&self) -> &Lights {
        let id = self.s.current_module().unwrap_or(self.main);
        screens::lights(&self.s, id).unwrap()
    }

    fn tap(&mut self, at: Vec2) {
        self.s.handle_pointer(PointerSample::down(at.x, at.y, self.clock));
        self.s
            .handle_pointer(PointerSample::up(at.x, at.y, self.clock + 0.05));
        self.clock += 0.05;
        self.run(FRAME);
    }

    fn swipe(&mut self, from: Vec2, to: Vec2) {
        self.s
            .handle_pointer(PointerSample::down(from.x, from.y, self.clock));
        self.s.handle_pointer(PointerSample::up(to.x, to.y, self.clock + 0.1));
        self.clock += 0.1;
        self.run(FRAME);
    }

    fn hit_lit(&mut self) {
        let cell = self.game().lit().unwrap();
        self.tap(center(cell));
    }

    fn miss(&mut self) {
        let lit = self.game().lit().unwrap();
        let other = if lit.col == 0 {
            GridCell::new(1, lit.row)
        } else {
            GridCell::new(0, lit.row)
        };
        self.tap(center(other));
    }
}

fn center(cell: GridCell) -> Vec2 {
    Vec2::new(cell.col as f32 * 100.0 + 50.0, cell.row as f32 * 100.0 + 50.0)
}

#[test]
fn winning_round_by_tapping_lit_cells() {
    let sink = Recorder::default();
    let mut h = Harness::new(MemoryStore::new(), Some(sink.clone()));
    h.launch_main();
    assert_eq!(h.s.state(), SessionState::Playing);
    assert_eq!(h.game().target(), 50);

    for _ in 0..5 {
        h.hit_lit();
    }

    assert_eq!(h.s.state(), SessionState::Results);
    assert_eq!(h.s.score(), 50);
    assert_eq!(h.s.correct_answers(), Some(5));
    assert_eq!(h.s.last_won(), Some(true));
    assert_eq!(h.s.levels().current_level(), 2);
    assert_eq!(h.s.store().get_int("level.lights", 0), 2);
    assert_eq!(
        sink.0.borrow().as_slice(),
        &[ScoreSubmission {
            score: 50,
            correct_answers: Some(5)
        }]
    );

    h.run(0.1);
    assert_eq!(h.s.views().active_id(), Some(RESULTS_VIEW));
    assert_eq!(h.s.posts_in_flight(), 0);
}

#[test]
fn completion_side_effects_happen_once() {
    let sink = Recorder::default();
    let mut h = Harness::new(MemoryStore::new(), Some(sink.clone()));
    h.launch_main();
    for _ in 0..5 {
        h.hit_lit();
    }
    assert_eq!(h.s.state(), SessionState::Results);

    for row in 0..4 {
        h.tap(center(GridCell::new(0, row)));
    }
    h.run(1.0);

    assert_eq!(sink.count(), 1);
    assert_eq!(h.s.score(), 50);
    assert_eq!(h.s.levels().current_level(), 2);
    assert_eq!(
        h.s.module(h.main).unwrap().lifecycle().state(),
        LifecycleState::Complete
    );
}

#[test]
fn second_start_keeps_running_score() {
    let mut h = Harness::new(MemoryStore::new(), None);
    h.launch_main();
    h.hit_lit();
    h.hit_lit();
    assert_eq!(h.game().score(), 20);

    // The module is still active; the relaunch reaches a guarded start.
    assert!(h.s.start_mini_game(h.main));
    h.run(0.5);

    assert!(!h.s.is_launching());
    assert_eq!(h.game().score(), 20);
    assert_eq!(h.game().hits(), 2);
    assert!(h.s.module(h.main).unwrap().lifecycle().is_active());
}

#[test]
fn end_game_twice_posts_and_advances_once() {
    let sink = Recorder::default();
    let mut h = Harness::new(MemoryStore::new(), Some(sink.clone()));
    h.launch_main();
    h.s.add_score(30);

    assert!(h.s.end_game(true));
    assert!(!h.s.end_game(true));
    assert!(!h.s.end_game(false));

    assert_eq!(sink.count(), 1);
    assert_eq!(h.s.levels().current_level(), 2);
    assert_eq!(h.s.last_won(), Some(true));
    assert_eq!(h.s.posts_in_flight(), 1);
    h.run(FRAME);
    assert_eq!(h.s.posts_in_flight(), 0);
}

#[test]
fn three_misses_lose_the_round() {
    let mut h = Harness::new(MemoryStore::new(), None);
    h.launch_main();
    h.miss();
    h.miss();
    assert_eq!(h.s.state(), SessionState::Playing);
    assert_eq!(h.game().misses_left(), 1);
    h.miss();

    assert_eq!(h.s.state(), SessionState::Results);
    assert_eq!(h.s.last_won(), Some(false));
    assert_eq!(h.s.levels().current_level(), 1);
}

#[test]
fn clock_runs_out_and_pause_stops_it() {
    let mut h = Harness::new(MemoryStore::new(), None);
    h.launch_main();
    let before = h.game().time_left().unwrap();

    assert!(h.s.pause());
    h.run(5.0);
    assert_eq!(h.game().time_left(), Some(before));
    h.hit_lit();
    assert_eq!(h.game().hits(), 0);

    assert!(h.s.request_resume());
    h.run(0.1);
    assert_eq!(h.s.state(), SessionState::Playing);
    assert!(h.game().time_left().unwrap() < before);

    h.run(31.0);
    assert_eq!(h.s.state(), SessionState::Results);
    assert_eq!(h.s.last_won(), Some(false));
}

#[test]
fn pause_while_game_view_fades_in_still_shows_overlay() {
    let mut h = Harness::with_transition(MemoryStore::new(), None, TransitionConfig::fade(0.3));
    h.run(0.5);
    assert!(h.s.start_main_game());
    h.run(FRAME);
    assert!(h.s.views().is_transitioning());

    assert!(h.s.pause());
    h.run(100.0 * FRAME);
    assert_eq!(h.s.state(), SessionState::Paused);
    assert!(h.s.views().is_visible(&PAUSE_VIEW.into()));
    assert!(h.s.views().is_visible(&LIGHTS_VIEW.into()));

    assert!(h.s.request_resume());
    h.run(1.5);
    assert_eq!(h.s.state(), SessionState::Playing);
    assert!(!h.s.views().is_visible(&PAUSE_VIEW.into()));
    assert!(!h.s.is_launching());
    assert!(h.s.module(h.main).unwrap().lifecycle().is_active());
}

#[test]
fn tutorial_without_its_view_stays_on_the_menu() {
    let mut s = Session::new(SessionConfig::default());
    s.register_view(screens::MenuView::new(TransitionConfig::instant()));
    s.add_module(lights::tutorial(1), ModuleRole::Tutorial);
    s.open_menu();

    assert!(!s.start_tutorial());
    for _ in 0..300 {
        s.tick(FRAME);
    }
    assert_eq!(s.state(), SessionState::MainMenu);
    assert_eq!(s.views().visible_ids().collect::<Vec<_>>(), vec![MENU_VIEW]);
    assert!(!s.tutorial_shown());
}

#[test]
fn restart_from_results_replays_fresh_round() {
    let mut h = Harness::new(MemoryStore::new(), None);
    h.launch_main();
    for _ in 0..5 {
        h.hit_lit();
    }
    assert_eq!(h.s.state(), SessionState::Results);

    assert!(h.s.request_restart());
    h.run(0.5);

    assert_eq!(h.s.state(), SessionState::Playing);
    assert_eq!(h.s.score(), 0);
    assert!(!h.s.has_ended());
    assert_eq!(h.game().hits(), 0);
    assert!(h.game().lit().is_some());
    // Level 2 is still a beginner level.
    assert_eq!(h.s.levels().current_difficulty(), DifficultyTier::Beginner);
}

#[test]
fn return_to_menu_then_play_again() {
    let mut h = Harness::new(MemoryStore::new(), None);
    h.launch_main();
    h.hit_lit();
    h.s.pause();

    h.s.return_to_menu();
    h.run(0.1);
    assert_eq!(h.s.state(), SessionState::MainMenu);
    assert_eq!(h.s.views().active_id(), Some(screens::MENU_VIEW));
    assert_eq!(
        h.s.module(h.main).unwrap().lifecycle().state(),
        LifecycleState::Exited
    );

    h.launch_main();
    assert_eq!(h.game().score(), 0);
    assert!(h.s.module(h.main).unwrap().lifecycle().is_active());
}

#[test]
fn tutorial_walks_through_its_steps() {
    let mut h = Harness::new(MemoryStore::new(), None);
    assert!(h.s.start_tutorial());
    h.run(0.5);
    assert_eq!(h.s.state(), SessionState::Tutorial);
    assert_eq!(h.s.current_module(), Some(h.tutorial));
    assert!(h.s.tutorial_shown());
    assert_eq!(h.game().time_left(), None);

    let message = |h: &Harness| {
        h.s.module_as::<playkit::core::Tutorial<Lights>>(h.tutorial)
            .and_then(|t| t.current_message())
            .map(str::to_string)
    };
    assert_eq!(message(&h).as_deref(), Some("One cell is lit. Watch it."));

    h.run(2.1);
    assert_eq!(message(&h).as_deref(), Some("Tap the lit cell."));

    h.hit_lit();
    assert_eq!(message(&h).as_deref(), Some("Swipe from the lit cell to move it."));

    let lit = h.game().lit().unwrap();
    let from = center(lit);
    let to = if lit.col < 3 {
        Vec2::new(from.x + 80.0, from.y)
    } else {
        Vec2::new(from.x - 80.0, from.y)
    };
    h.swipe(from, to);
    assert_ne!(h.game().lit(), Some(lit));
    assert_eq!(message(&h).as_deref(), Some("Score 30 to finish."));

    // Misses never end a tutorial.
    for _ in 0..4 {
        h.miss();
    }
    assert_eq!(h.s.state(), SessionState::Tutorial);

    // The tap step already scored one hit.
    h.hit_lit();
    assert_eq!(h.s.state(), SessionState::Tutorial);
    assert_eq!(h.game().target(), lights::TUTORIAL_TARGET);
    assert_eq!(message(&h).as_deref(), Some("Score 30 to finish."));

    // The last step and the round end on the same hit.
    h.hit_lit();
    assert_eq!(message(&h), None);
    assert_eq!(h.s.score(), lights::TUTORIAL_TARGET);
    assert_eq!(h.s.state(), SessionState::Results);
    assert_eq!(h.s.last_won(), Some(true));
    assert_eq!(h.s.levels().current_level(), 1);
    assert!(!h.s.start_tutorial());
}

#[test]
fn level_progress_survives_restart_of_the_app() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");

    {
        let mut h = Harness::new(JsonFileStore::open_versioned(&path, "1"), None);
        h.launch_main();
        assert_eq!(h.s.set_current_level(3), 3);
        for _ in 0..5 {
            h.hit_lit();
        }
        assert_eq!(h.s.levels().current_level(), 4);
    }

    let mut h = Harness::new(JsonFileStore::open_versioned(&path, "1"), None);
    h.launch_main();
    assert_eq!(h.s.levels().current_level(), 4);
    assert_eq!(h.s.levels().current_difficulty(), DifficultyTier::Easy);
    assert_eq!(h.game().target(), 80);

    // A new store version wipes saved progress.
    drop(h);
    let mut h = Harness::new(JsonFileStore::open_versioned(&path, "2"), None);
    h.launch_main();
    assert_eq!(h.s.levels().current_level(), 1);
}
