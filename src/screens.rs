//! Terminal screens for the bundled demo: menu, Lights board, pause overlay
//! and results.
//!
//! Views carry no game state. Painters read the [`Session`] and draw every
//! visible view through a [`Layer`], primaries first, overlays on top.

use crate::core::Tutorial;
use crate::engine::{ModuleId, Session};
use crate::lights::{Lights, LIGHTS_VIEW};
use crate::term::{Board, CellStyle, FrameBuffer, Layer, Rgb, Viewport};
use crate::types::{GridCell, Rect, Vec2};
use crate::view::{TransitionConfig, View, ViewConfig, ViewKey};

pub const MENU_VIEW: &str = "main_menu";
pub const PAUSE_VIEW: &str = "pause";
pub const RESULTS_VIEW: &str = "results";

/// Terminal columns and rows per grid cell.
pub const CELL_W: u16 = 6;
pub const CELL_H: u16 = 3;

const TITLE: CellStyle = CellStyle::new(Rgb::new(255, 220, 120), Rgb::new(0, 0, 0)).bold();
const TEXT: CellStyle = CellStyle::new(Rgb::new(220, 220, 220), Rgb::new(0, 0, 0));
const HINT: CellStyle = CellStyle::new(Rgb::new(140, 140, 150), Rgb::new(0, 0, 0));
const FRAME: CellStyle = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
const UNLIT: CellStyle = CellStyle::new(Rgb::new(70, 70, 85), Rgb::new(30, 30, 40));
const LIT: CellStyle = CellStyle::new(Rgb::new(255, 230, 90), Rgb::new(120, 100, 20)).bold();
const PANEL: CellStyle = CellStyle::new(Rgb::new(230, 230, 230), Rgb::new(40, 40, 60));

macro_rules! screen {
    ($name:ident, $id:expr, $ctor:ident) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name {
            transition: TransitionConfig,
        }

        impl $name {
            pub fn new(transition: TransitionConfig) -> Self {
                Self { transition }
            }
        }

        impl View for $name {
            fn id(&self) -> &str {
                $id
            }

            fn config(&self) -> ViewConfig {
                ViewConfig::$ctor(self.transition)
            }
        }
    };
}

screen!(MenuView, MENU_VIEW, primary);
screen!(LightsView, LIGHTS_VIEW, primary);
screen!(PauseView, PAUSE_VIEW, overlay);
screen!(ResultsView, RESULTS_VIEW, primary);

/// Register the four demo views.
pub fn register_views(session: &mut Session, transition: TransitionConfig) {
    session.register_view(MenuView::new(transition));
    session.register_view(LightsView::new(transition));
    session.register_view(PauseView::new(TransitionConfig::fade(transition.duration)));
    session.register_view(ResultsView::new(transition));
}

/// The Lights game behind `id`, whether played directly or as the tutorial.
pub fn lights(session: &Session, id: ModuleId) -> Option<&Lights> {
    session
        .module_as::<Lights>(id)
        .or_else(|| session.module_as::<Tutorial<Lights>>(id).map(|t| t.inner()))
}

fn current_lights(session: &Session) -> Option<&Lights> {
    lights(session, session.current_module()?)
}

fn tutorial_message(session: &Session) -> Option<&str> {
    let id = session.current_module()?;
    session
        .module_as::<Tutorial<Lights>>(id)?
        .current_message()
}

/// Board placement for the current viewport.
pub fn board(session: &Session, viewport: Viewport) -> Option<Board> {
    let grid = current_lights(session)?.grid();
    Some(Board::centered(&grid, CELL_W, CELL_H, viewport))
}

/// Gesture input area for the current viewport, in pointer pixels.
pub fn input_area(session: &Session, viewport: Viewport, pixel: Vec2) -> Option<Rect> {
    board(session, viewport).map(|b| b.input_area(pixel))
}

/// Paint every visible view of `session` into `fb`.
pub fn paint(session: &Session, viewport: Viewport, fb: &mut FrameBuffer) {
    fb.resize(viewport.width, viewport.height);
    fb.clear(CellStyle::default().into_cell(' '));

    let views = session.views();
    let mut visible: Vec<(ViewKey, bool)> = views
        .visible_ids()
        .map(|id| ViewKey::id(id.to_string()))
        .filter_map(|key| {
            let overlay = views.presentation(&key)?.overlay;
            Some((key, overlay))
        })
        .collect();
    visible.sort_by_key(|(_, overlay)| *overlay);

    for (key, _) in visible {
        let Some(presentation) = views.presentation(&key) else {
            continue;
        };
        let mut layer = Layer::new(fb, viewport, &presentation);
        match key.to_string().as_str() {
            MENU_VIEW => paint_menu(session, &mut layer),
            LIGHTS_VIEW => paint_lights(session, &mut layer),
            PAUSE_VIEW => paint_pause(&mut layer),
            RESULTS_VIEW => paint_results(session, &mut layer),
            _ => {}
        }
    }
}

fn paint_menu(session: &Session, layer: &mut Layer<'_>) {
    let mid = layer.viewport().height / 2;
    layer.put_centered(mid.saturating_sub(4), "P L A Y K I T", TITLE);
    layer.put_centered(mid.saturating_sub(2), "Lights", TEXT);

    let levels = session.levels();
    if levels.active_id().is_some() {
        let line = format!(
            "level {} of {}  ({})",
            levels.current_level(),
            levels.total_levels(),
            levels.current_difficulty().as_str()
        );
        layer.put_centered(mid, &line, HINT);
    }

    layer.put_centered(mid + 2, "[enter] play    [t] tutorial    [q] quit", TEXT);
    if !session.tutorial_shown() {
        layer.put_centered(mid + 4, "new here? try the tutorial", HINT);
    }
}

fn paint_lights(session: &Session, layer: &mut Layer<'_>) {
    let Some(game) = current_lights(session) else {
        return;
    };
    let board = Board::centered(&game.grid(), CELL_W, CELL_H, layer.viewport());
    let (frame_w, frame_h) = board.frame_size();
    layer.border(board.x, board.y, frame_w, frame_h, FRAME);

    for row in 0..board.rows {
        for col in 0..board.columns {
            let cell = GridCell::new(col as u32, row as u32);
            let (x, y) = board.cell_origin(cell);
            let (ch, style) = if game.lit() == Some(cell) {
                ('█', LIT)
            } else {
                ('·', UNLIT)
            };
            layer.fill_rect(x, y, board.cell_w, board.cell_h, ' ', style);
            layer.put_str(x + board.cell_w / 2, y + board.cell_h / 2, &ch.to_string(), style);
        }
    }

    let hud_y = board.y.saturating_sub(2);
    let mut hud = format!("score {} / {}", game.score(), game.target());
    if let Some(time) = game.time_left() {
        hud.push_str(&format!("    time {:>4.1}", time));
    }
    hud.push_str(&format!("    misses left {}", game.misses_left()));
    layer.put_centered(hud_y, &hud, TEXT);

    let below = board.y + frame_h + 1;
    if let Some(message) = tutorial_message(session) {
        layer.put_centered(below, message, TITLE);
    } else {
        layer.put_centered(below, "[p] pause", HINT);
    }

    if let Some(countdown) = session.countdown() {
        let text = format!("  {}  ", countdown.seconds_left().max(1));
        let mid = board.y + frame_h / 2;
        layer.put_centered(mid, &text, PANEL.bold());
    }
}

fn paint_pause(layer: &mut Layer<'_>) {
    let vp = layer.viewport();
    let (w, h) = (36u16, 7u16);
    let x = vp.width.saturating_sub(w) / 2;
    let y = vp.height.saturating_sub(h) / 2;
    layer.fill_rect(x, y, w, h, ' ', PANEL);
    layer.border(x, y, w, h, PANEL);
    layer.put_centered(y + 2, "PAUSED", PANEL.bold());
    layer.put_centered(y + 4, "[r] resume  [x] restart  [m] menu", PANEL);
}

fn paint_results(session: &Session, layer: &mut Layer<'_>) {
    let mid = layer.viewport().height / 2;
    let headline = match session.last_won() {
        Some(true) => "CLEARED",
        Some(false) => "TRY AGAIN",
        None => "RESULTS",
    };
    layer.put_centered(mid.saturating_sub(3), headline, TITLE);
    layer.put_centered(mid.saturating_sub(1), &format!("score {}", session.score()), TEXT);
    if let Some(correct) = session.correct_answers() {
        layer.put_centered(mid, &format!("lights hit {correct}"), TEXT);
    }
    if session.posts_in_flight() > 0 {
        layer.put_centered(mid + 1, "submitting score...", HINT);
    }
    layer.put_centered(mid + 3, "[enter] play again    [m] menu", TEXT);
}
