//! Engine - session orchestration on top of the core lifecycle
//!
//! The engine owns one [`Session`]: the registered mini-games, the view
//! coordinator, the gesture pipeline and the persistent level counter. Hosts
//! feed it pointer samples and frame ticks; it never blocks.
//!
//! # Module Structure
//!
//! - [`session`]: the [`Session`] controller and its flows
//! - [`config`]: `playkit.toml` loading with environment overrides
//! - [`services`]: audio and score posting contracts
//! - [`store`]: JSON file backed [`KeyValueStore`](crate::core::KeyValueStore)
//!
//! # Frame Order
//!
//! Each [`Session::tick`] runs, in order:
//!
//! 1. view transitions
//! 2. pending restart, then pending resume
//! 3. launch sequence (view, countdown) or the active module's tick
//! 4. requests the module issued (sfx, score, end, results view)
//! 5. score post completions

pub mod config;
pub mod services;
pub mod session;
pub mod store;

pub use playkit_core as core;
pub use playkit_input as input;
pub use playkit_types as types;
pub use playkit_view as view;

pub use config::{
    ConfigError, PlaykitConfig, ScoringConfig, SessionConfig, StoreConfig, DEFAULT_CONFIG_PATH,
};
pub use services::{
    AudioSink, LogAudio, NullAudio, PostError, PostHandle, PostResult, ScoreSink, ScoreSubmission,
};
pub use session::{ModuleId, ModuleRole, Session};
pub use store::JsonFileStore;
