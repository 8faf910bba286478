//! Adapter - score posting over TCP with a line-delimited JSON protocol
//!
//! When a session ends, the engine hands a [`ScoreSubmission`] to its
//! [`ScoreSink`](crate::engine::ScoreSink). [`TcpScoreSink`] is the network
//! implementation: it posts on a background tokio runtime so the frame loop
//! never blocks, and the session polls the returned handle each tick.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: the sink opens one TCP connection per post
//!    (default: 127.0.0.1:7780)
//! 2. **Submission**: one JSON line, `{"score":..,"correct_answers":..}`
//! 3. **Acknowledgement**: one JSON line, `{"status":"ok"}` or
//!    `{"status":"error","message":".."}`
//!
//! A post that does not complete within `scoring.timeout_ms` fails with
//! [`PostError::Timeout`](crate::engine::PostError::Timeout). Nothing is retried.
//!
//! # Environment Variables
//!
//! - `PLAYKIT_SCORE_HOST`: collector host (default: "127.0.0.1")
//! - `PLAYKIT_SCORE_PORT`: collector port (default: 7780)
//! - `PLAYKIT_SCORE_DISABLED`: set to "1" or "true" to disable posting
//!
//! # Testing
//!
//! Run the bundled collector and post by hand:
//!
//! ```bash
//! playkit collect
//! echo '{"score":120,"correct_answers":8}' | nc 127.0.0.1 7780
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use playkit_engine as engine;

pub use protocol::{AckStatus, ScoreAck, ScoreSubmission};
pub use runtime::{post_score, TcpScoreSink};
pub use server::run_score_collector;
