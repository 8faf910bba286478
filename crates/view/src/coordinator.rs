//! View registry and sequential transition routine.

use std::any::TypeId;

use tracing::{debug, info, warn};

use crate::transition::{TransitionConfig, TransitionKind, Tween};
use crate::types::Vec2;
use crate::view::{View, ViewConfig, ViewKey, Visibility};

/// Current presentation of a registered view, for renderers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Presentation {
    pub visibility: Visibility,
    /// 0 = transparent, 1 = opaque.
    pub alpha: f32,
    /// Offset in screen sizes (slide transitions).
    pub offset: Vec2,
    pub accepts_input: bool,
    pub overlay: bool,
}

impl Presentation {
    fn hidden(overlay: bool) -> Self {
        Self {
            visibility: Visibility::Hidden,
            alpha: 0.0,
            offset: Vec2::ZERO,
            accepts_input: false,
            overlay,
        }
    }
}

struct ViewEntry {
    view: Box<dyn View>,
    id: String,
    type_id: TypeId,
    config: ViewConfig,
    presentation: Presentation,
}

impl ViewEntry {
    fn transition(&self) -> TransitionConfig {
        self.config.transition
    }

    /// Apply eased progress `t` of an entering (`entering = true`) or leaving view.
    fn apply_progress(&mut self, t: f32, entering: bool) {
        let tr = self.config.transition;
        let shown = if entering { t } else { 1.0 - t };
        match tr.kind {
            TransitionKind::Fade => {
                self.presentation.alpha = shown;
                self.presentation.offset = Vec2::ZERO;
            }
            TransitionKind::Slide => {
                let edge = tr.slide_from.offscreen_offset();
                let away = 1.0 - shown;
                self.presentation.alpha = 1.0;
                self.presentation.offset = Vec2::new(edge.x * away, edge.y * away);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    /// Outgoing view fading/sliding out; `then` is shown afterwards.
    Hiding {
        from: usize,
        then: Option<usize>,
        tween: Tween,
    },
    /// Incoming view fading/sliding in.
    Showing { to: usize, tween: Tween },
}

/// Registry of views plus the single in-flight transition.
#[derive(Default)]
pub struct ViewCoordinator {
    entries: Vec<ViewEntry>,
    /// Primary (non-overlay) view currently activated.
    active: Option<usize>,
    phase: Option<Phase>,
}

impl std::fmt::Debug for ViewCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewCoordinator")
            .field("views", &self.entries.iter().map(|e| &e.id).collect::<Vec<_>>())
            .field("active", &self.active_id())
            .field("transitioning", &self.is_transitioning())
            .finish()
    }
}

impl ViewCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a view to the registry. Duplicate identifiers are rejected.
    pub fn register<V: View>(&mut self, view: V) -> bool {
        let id = view.id().to_string();
        if self.entries.iter().any(|e| e.id == id) {
            warn!(view = %id, "view already registered; keeping the first one");
            return false;
        }
        let config = view.config();
        debug!(view = %id, overlay = config.overlay, "view registered");
        self.entries.push(ViewEntry {
            view: Box::new(view),
            id,
            type_id: TypeId::of::<V>(),
            config,
            presentation: Presentation::hidden(config.overlay),
        });
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &ViewKey) -> bool {
        self.resolve(key).is_some()
    }

    fn resolve(&self, key: &ViewKey) -> Option<usize> {
        match key {
            ViewKey::Id(id) => self.entries.iter().position(|e| e.id == id.as_ref()),
            ViewKey::Type(t) => self.entries.iter().position(|e| e.type_id == *t),
        }
    }

    /// Identifier of the active primary view.
    pub fn active_id(&self) -> Option<&str> {
        self.active.map(|i| self.entries[i].id.as_str())
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase.is_some()
    }

    pub fn presentation(&self, key: &ViewKey) -> Option<Presentation> {
        self.resolve(key).map(|i| self.entries[i].presentation)
    }

    pub fn is_visible(&self, key: &ViewKey) -> bool {
        self.presentation(key)
            .map(|p| p.visibility == Visibility::Showing)
            .unwrap_or(false)
    }

    /// Identifiers of every view currently showing, in registration order.
    pub fn visible_ids(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.presentation.visibility == Visibility::Showing)
            .map(|e| e.id.as_str())
    }

    /// Identifiers of primary views currently accepting input.
    pub fn interactive_primary_ids(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| !e.config.overlay && e.presentation.accepts_input)
            .map(|e| e.id.as_str())
    }

    pub fn view<V: View>(&self) -> Option<&V> {
        let i = self.resolve(&ViewKey::of::<V>())?;
        let view: &dyn View = &*self.entries[i].view;
        view.as_any().downcast_ref::<V>()
    }

    pub fn view_mut<V: View>(&mut self) -> Option<&mut V> {
        let i = self.resolve(&ViewKey::of::<V>())?;
        let view: &mut dyn View = &mut *self.entries[i].view;
        view.as_any_mut().downcast_mut::<V>()
    }

    pub fn show_type<V: View>(&mut self) -> bool {
        self.show(ViewKey::of::<V>())
    }

    /// Request `key` to become visible.
    ///
    /// Returns `false` when the view is unknown or another transition is
    /// running (the request is dropped). Showing a view that is already
    /// visible is accepted and does nothing.
    pub fn show(&mut self, key: impl Into<ViewKey>) -> bool {
        let key = key.into();
        let Some(to) = self.resolve(&key) else {
            warn!(view = %key, "show requested for unknown view");
            return false;
        };
        if let Some(phase) = &self.phase {
            debug!(view = %self.entries[to].id, ?phase, "transition in progress; show request dropped");
            return false;
        }
        if self.entries[to].presentation.visibility == Visibility::Showing {
            debug!(view = %self.entries[to].id, "view already showing");
            return true;
        }

        let overlay = self.entries[to].config.overlay;
        match self.active {
            Some(from) if !overlay => {
                info!(from = %self.entries[from].id, to = %self.entries[to].id, "view transition");
                self.begin_hide(from, Some(to));
            }
            _ => {
                info!(to = %self.entries[to].id, overlay, "view transition");
                self.begin_show(to);
            }
        }
        true
    }

    /// Request `key` to leave the screen with its transition. Intended for
    /// overlays; hiding the active primary view leaves no primary view.
    pub fn hide(&mut self, key: impl Into<ViewKey>) -> bool {
        let key = key.into();
        let Some(from) = self.resolve(&key) else {
            warn!(view = %key, "hide requested for unknown view");
            return false;
        };
        if self.phase.is_some() {
            debug!(view = %self.entries[from].id, "transition in progress; hide request dropped");
            return false;
        }
        if self.entries[from].presentation.visibility == Visibility::Hidden {
            return true;
        }
        self.begin_hide(from, None);
        true
    }

    /// Hide every view immediately, abandoning any running transition.
    pub fn hide_all(&mut self) {
        self.phase = None;
        self.active = None;
        for entry in &mut self.entries {
            if entry.presentation.visibility == Visibility::Showing {
                entry.view.on_hide();
            }
            entry.presentation = Presentation::hidden(entry.config.overlay);
        }
        debug!("all views hidden");
    }

    /// Hide every visible overlay immediately. A running transition that
    /// involves an overlay is abandoned.
    pub fn hide_overlays(&mut self) {
        let overlay_phase = match self.phase {
            Some(Phase::Hiding { from, then, .. }) => {
                self.entries[from].config.overlay
                    || then.is_some_and(|t| self.entries[t].config.overlay)
            }
            Some(Phase::Showing { to, .. }) => self.entries[to].config.overlay,
            None => false,
        };
        if overlay_phase {
            self.phase = None;
        }
        for entry in self.entries.iter_mut().filter(|e| e.config.overlay) {
            if entry.presentation.visibility == Visibility::Showing {
                entry.view.on_hide();
                entry.presentation = Presentation::hidden(true);
            }
        }
    }

    fn begin_hide(&mut self, from: usize, then: Option<usize>) {
        self.entries[from].presentation.accepts_input = false;
        if let Some(to) = then {
            self.entries[to].presentation.accepts_input = false;
        }
        self.entries[from].view.on_hide();
        let tr = self.entries[from].transition();
        self.phase = Some(Phase::Hiding {
            from,
            then,
            tween: Tween::new(tr.duration(), tr.easing),
        });
    }

    fn begin_show(&mut self, to: usize) {
        let entry = &mut self.entries[to];
        entry.presentation.visibility = Visibility::Showing;
        entry.presentation.accepts_input = false;
        entry.apply_progress(0.0, true);
        if !entry.config.overlay {
            self.active = Some(to);
        }
        let tr = self.entries[to].transition();
        self.entries[to].view.on_show();
        self.phase = Some(Phase::Showing {
            to,
            tween: Tween::new(tr.duration(), tr.easing),
        });
    }

    /// Advance the running transition by `dt` seconds of wall-clock time.
    pub fn tick(&mut self, dt: f32) {
        let mut dt = dt.max(0.0);
        while let Some(phase) = self.phase {
            match phase {
                Phase::Hiding {
                    from,
                    then,
                    mut tween,
                } => {
                    dt = tween.update(dt);
                    self.entries[from].apply_progress(tween.value(), false);
                    if !tween.is_complete() {
                        self.phase = Some(Phase::Hiding { from, then, tween });
                        return;
                    }
                    let overlay = self.entries[from].config.overlay;
                    self.entries[from].presentation = Presentation::hidden(overlay);
                    if self.active == Some(from) {
                        self.active = None;
                    }
                    self.phase = None;
                    if let Some(to) = then {
                        self.begin_show(to);
                    }
                }
                Phase::Showing { to, mut tween } => {
                    dt = tween.update(dt);
                    self.entries[to].apply_progress(tween.value(), true);
                    if !tween.is_complete() {
                        self.phase = Some(Phase::Showing { to, tween });
                        return;
                    }
                    self.entries[to].presentation.accepts_input = true;
                    self.phase = None;
                    debug!(view = %self.entries[to].id, "view fully shown");
                }
            }
        }
    }
}
