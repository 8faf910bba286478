//! Playkit demo runner (default binary).
//!
//! Plays the bundled Lights mini-game in the terminal with the mouse as the
//! pointer. `playkit collect` instead runs the score collector the game posts
//! results to.
//!
//! Logs go to the file named by `PLAYKIT_LOG_PATH` (the terminal belongs to
//! the game); `RUST_LOG` sets the filter, default `info`.

use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use playkit::adapter::{run_score_collector, TcpScoreSink};
use playkit::core::{LOSE_CUE, WIN_CUE};
use playkit::engine::{JsonFileStore, LogAudio, ModuleRole, PlaykitConfig, ScoringConfig, Session};
use playkit::input::PointerTracker;
use playkit::lights::{self, Lights, HIT_CUE, MISS_CUE};
use playkit::screens;
use playkit::term::{FrameBuffer, TerminalRenderer, Viewport};
use playkit::types::{SessionState, Vec2, TICK_MS};

/// Pixel size assumed for one terminal cell.
const PIXEL: Vec2 = Vec2::new(8.0, 16.0);

fn main() -> Result<()> {
    let collect = std::env::args().nth(1).as_deref() == Some("collect");
    init_logging(collect)?;
    let config = PlaykitConfig::from_env()?;

    if collect {
        return run_collector(config.scoring);
    }

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &config);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_logging(to_stderr: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_path = std::env::var("PLAYKIT_LOG_PATH")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    match log_path {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if to_stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        None => {}
    }
    Ok(())
}

fn run_collector(scoring: ScoringConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let (tx, mut rx) = mpsc::unbounded_channel::<playkit::adapter::ScoreSubmission>();
        tokio::spawn(async move {
            while let Some(submission) = rx.recv().await {
                println!(
                    "score={} correct={}",
                    submission.score,
                    submission
                        .correct_answers
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "-".to_string())
                );
            }
        });
        run_score_collector(scoring, tx, None).await
    })
}

fn build_session(config: &PlaykitConfig) -> Session {
    let store = JsonFileStore::open_versioned(&config.store.path, &config.store.version);
    let audio = LogAudio::new([WIN_CUE, LOSE_CUE, HIT_CUE, MISS_CUE]);
    let mut session = Session::new(config.session.clone())
        .with_store(store)
        .with_audio(audio)
        .with_gestures(config.gestures);

    if config.scoring.enabled {
        match TcpScoreSink::new(config.scoring.clone()) {
            Ok(sink) => session = session.with_score_sink(sink),
            Err(e) => warn!(error = %e, "score posting unavailable"),
        }
    }

    screens::register_views(&mut session, config.transitions);

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(1);
    session.add_module(Lights::new(seed), ModuleRole::Main);
    session.add_module(lights::tutorial(seed.rotate_left(13)), ModuleRole::Tutorial);
    session
}

fn run(term: &mut TerminalRenderer, config: &PlaykitConfig) -> Result<()> {
    let mut session = build_session(config);
    session.open_menu();
    info!("playkit started");

    let mut pointer = PointerTracker::new(PIXEL.x, PIXEL.y);
    let mut fb = FrameBuffer::new(0, 0);
    let clock = Instant::now();

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        session.set_input_area(screens::input_area(&session, viewport, PIXEL));
        screens::paint(&session, viewport, &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if !handle_key(&mut session, key) {
                        info!("playkit quit");
                        return Ok(());
                    }
                }
                Event::Mouse(ev) => {
                    if let Some(sample) = pointer.handle_mouse(ev, clock.elapsed().as_secs_f32()) {
                        session.handle_pointer(sample);
                    }
                }
                Event::Resize(..) => term.invalidate(),
                Event::FocusLost => {
                    pointer.reset();
                    session.pause();
                }
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            let dt = last_tick.elapsed().as_secs_f32();
            last_tick = Instant::now();

            if let Some(sample) = pointer.frame_sample(clock.elapsed().as_secs_f32()) {
                session.handle_pointer(sample);
            }
            pointer.begin_frame();
            session.tick(dt);
        }
    }
}

/// Apply one key press. Returns `false` to quit.
fn handle_key(session: &mut Session, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('q')
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
    {
        return false;
    }

    match (session.state(), key.code) {
        (SessionState::MainMenu, KeyCode::Enter) => {
            session.start_main_game();
        }
        (SessionState::MainMenu, KeyCode::Char('t')) => {
            session.start_tutorial();
        }
        (SessionState::Playing | SessionState::Tutorial, KeyCode::Char('p') | KeyCode::Esc) => {
            session.pause();
        }
        (SessionState::Paused, KeyCode::Char('r') | KeyCode::Esc) => {
            session.request_resume();
        }
        (SessionState::Paused, KeyCode::Char('x')) | (SessionState::Results, KeyCode::Enter) => {
            session.request_restart();
        }
        (SessionState::Paused | SessionState::Results, KeyCode::Char('m')) => {
            session.return_to_menu();
        }
        _ => {}
    }
    true
}
