//! Core mini-game logic - lifecycle contract and difficulty progression
//!
//! This crate holds the rules every mini-game shares, independent of any
//! particular puzzle. It has no dependency on a terminal, network or file
//! system; hosts provide those through the traits declared here and in the
//! engine crate.
//!
//! # Module Structure
//!
//! - [`lifecycle`]: the [`MiniGame`] contract, its guard flags ([`Lifecycle`])
//!   and the per-call [`GameContext`]
//! - [`level`]: level tables, tier lookup and the persistent level counter
//! - [`mode`]: [`PlayMode`] and the [`Tutorial`] decorator
//! - [`countdown`]: the pre-game countdown timer
//! - [`store`]: the host key/value store contract
//!
//! # Guarantees
//!
//! | Operation | Guard |
//! |-----------|-------|
//! | `start_mini_game` | ignored (warn) while already active |
//! | `complete_mini_game` | side effects exactly once per activation |
//! | `tick_mini_game` | no-op unless active and not complete |
//! | `on_mini_game_exit` | releases gesture subscription and listeners |
//! | `LevelResolver::next_level` | never moves past the last level |
//!
//! # Example
//!
//! ```
//! use playkit_core::level::{LevelResolver, LevelTable};
//! use playkit_core::store::MemoryStore;
//! use playkit_core::types::DifficultyTier;
//!
//! let table = LevelTable::new("quiz", 10)
//!     .with_range(1, 3, DifficultyTier::Beginner)
//!     .with_range(4, 10, DifficultyTier::Hard);
//! assert!(table.validate().is_ok());
//!
//! let mut store = MemoryStore::new();
//! let mut levels = LevelResolver::new();
//! levels.register(table, &store);
//! assert_eq!(levels.current_difficulty(), DifficultyTier::Beginner);
//!
//! levels.set_current_level(4, &mut store);
//! assert_eq!(levels.current_difficulty(), DifficultyTier::Hard);
//! ```

pub mod countdown;
pub mod level;
pub mod lifecycle;
pub mod mode;
pub mod store;

pub use playkit_input as input;
pub use playkit_types as types;
pub use playkit_view as view;

pub use countdown::Countdown;
pub use level::{LevelRange, LevelResolver, LevelTable, LevelTableError, TierParams, TierResolver};
pub use lifecycle::{
    Completion, GameContext, Lifecycle, LifecycleState, ListenerId, MiniGame, SessionRequest,
    LOSE_CUE, WIN_CUE,
};
pub use mode::{AdvanceRule, PlayMode, Tutorial, TutorialStep};
pub use store::{KeyValueStore, MemoryStore, StoreError, StoreValue};
