//! Playkit (workspace facade crate).
//!
//! Re-exports the member crates under `crates/` as
//! `playkit::{adapter,core,engine,input,term,types,view}` and ships the demo
//! pieces the `playkit` binary is built from: the [`lights`] sample
//! mini-game and its terminal [`screens`].

pub use playkit_adapter as adapter;
pub use playkit_core as core;
pub use playkit_engine as engine;
pub use playkit_input as input;
pub use playkit_term as term;
pub use playkit_types as types;
pub use playkit_view as view;

pub mod lights;
pub mod screens;
