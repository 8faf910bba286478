//! Collaborator contracts consumed by the session: audio and score posting.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Fire-and-forget sound effects.
pub trait AudioSink {
    /// Play `id`. Unknown identifiers are logged and ignored.
    fn play_sfx(&mut self, id: &str);
}

/// Discards every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_sfx(&mut self, _id: &str) {}
}

/// Audio sink that only logs, rejecting identifiers it does not know.
#[derive(Debug, Clone, Default)]
pub struct LogAudio {
    known: HashSet<String>,
    played: Vec<String>,
}

impl LogAudio {
    pub fn new<I, S>(known: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: known.into_iter().map(Into::into).collect(),
            played: Vec::new(),
        }
    }

    /// Cues played so far, in order.
    pub fn played(&self) -> &[String] {
        &self.played
    }
}

impl AudioSink for LogAudio {
    fn play_sfx(&mut self, id: &str) {
        if !self.known.contains(id) {
            warn!(sfx = id, "unknown sound effect");
            return;
        }
        debug!(sfx = id, "sound effect");
        self.played.push(id.to_string());
    }
}

/// Payload posted to the scoring service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub score: i64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub correct_answers: Option<u32>,
}

#[derive(Debug, Error)]
pub enum PostError {
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("score post I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("score post timed out after {0} ms")]
    Timeout(u64),
    #[error("score rejected: {0}")]
    Rejected(String),
    #[error("score payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("score post task dropped before reporting")]
    Dropped,
}

pub type PostResult = Result<(), PostError>;

/// Completion signal of one asynchronous score post, polled every frame.
#[derive(Debug)]
pub struct PostHandle {
    rx: Option<oneshot::Receiver<PostResult>>,
}

impl PostHandle {
    /// A handle plus the sender the posting task reports through.
    pub fn channel() -> (oneshot::Sender<PostResult>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx: Some(rx) })
    }

    /// A handle that is already resolved.
    pub fn ready(result: PostResult) -> Self {
        let (tx, handle) = Self::channel();
        let _ = tx.send(result);
        handle
    }

    /// Non-blocking check. Yields the outcome exactly once.
    pub fn poll(&mut self) -> Option<PostResult> {
        let rx = self.rx.as_mut()?;
        let outcome = match rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => Err(PostError::Dropped),
        };
        self.rx = None;
        Some(outcome)
    }

    pub fn is_done(&self) -> bool {
        self.rx.is_none()
    }
}

/// Asynchronous score posting. Implementations must not block the caller.
pub trait ScoreSink {
    fn post(&mut self, submission: ScoreSubmission) -> PostHandle;
}
