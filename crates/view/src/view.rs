//! View contract and lookup keys.

use std::any::{Any, TypeId};
use std::borrow::Cow;

use crate::transition::TransitionConfig;

/// Upcast helper so registered views can be recovered by concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A full-screen panel or overlay.
///
/// Hooks run synchronously inside the coordinator's transition routine:
/// `on_hide` when the view starts leaving, `on_show` when it starts entering.
pub trait View: AsAny {
    /// Identifier used for lookup. Must be unique within a coordinator.
    fn id(&self) -> &str;

    /// Read once, at registration.
    fn config(&self) -> ViewConfig {
        ViewConfig::default()
    }

    fn on_show(&mut self) {}

    fn on_hide(&mut self) {}
}

/// Registration-time settings of a view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewConfig {
    /// Overlays stack on top of the primary view without hiding it.
    pub overlay: bool,
    pub transition: TransitionConfig,
}

impl ViewConfig {
    pub fn primary(transition: TransitionConfig) -> Self {
        Self {
            overlay: false,
            transition,
        }
    }

    pub fn overlay(transition: TransitionConfig) -> Self {
        Self {
            overlay: true,
            transition,
        }
    }
}

/// Visibility of a registered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Hidden,
    Showing,
}

/// Lookup key: by identifier or by concrete Rust type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViewKey {
    Id(Cow<'static, str>),
    Type(TypeId),
}

impl ViewKey {
    pub fn id(id: impl Into<Cow<'static, str>>) -> Self {
        ViewKey::Id(id.into())
    }

    pub fn of<V: View>() -> Self {
        ViewKey::Type(TypeId::of::<V>())
    }
}

impl From<&'static str> for ViewKey {
    fn from(value: &'static str) -> Self {
        ViewKey::Id(Cow::Borrowed(value))
    }
}

impl From<String> for ViewKey {
    fn from(value: String) -> Self {
        ViewKey::Id(Cow::Owned(value))
    }
}

impl std::fmt::Display for ViewKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewKey::Id(id) => write!(f, "{id}"),
            ViewKey::Type(t) => write!(f, "{t:?}"),
        }
    }
}
