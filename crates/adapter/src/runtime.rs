//! Sync bridge from the frame loop to async score posting.
//!
//! The session calls [`ScoreSink::post`] from its tick; the post runs on a
//! tokio runtime and reports through a [`PostHandle`] the session polls.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::debug;

use crate::engine::{PostError, PostHandle, PostResult, ScoreSink, ScoringConfig};
use crate::protocol::{encode_line, ScoreAck, ScoreSubmission};

/// Posts scores to a collector over TCP. Each post is one connection, one
/// line out, one acknowledgement back. Failed posts are not retried.
pub struct TcpScoreSink {
    config: ScoringConfig,
    handle: Handle,
    /// Present when the sink owns its runtime; dropping it stops the worker.
    _runtime: Option<Runtime>,
}

impl TcpScoreSink {
    /// Create a sink with its own single-worker runtime.
    pub fn new(config: ScoringConfig) -> std::io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("playkit-score")
            .enable_all()
            .build()?;
        Ok(Self {
            config,
            handle: runtime.handle().clone(),
            _runtime: Some(runtime),
        })
    }

    /// Create a sink that spawns onto an existing runtime.
    pub fn with_handle(config: ScoringConfig, handle: Handle) -> Self {
        Self {
            config,
            handle,
            _runtime: None,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }
}

impl ScoreSink for TcpScoreSink {
    fn post(&mut self, submission: ScoreSubmission) -> PostHandle {
        let (tx, handle) = PostHandle::channel();
        let addr = self.config.addr();
        let timeout = self.config.timeout();
        let timeout_ms = self.config.timeout_ms;
        self.handle.spawn(async move {
            let result = post_score(&addr, submission, timeout)
                .await
                .unwrap_or(Err(PostError::Timeout(timeout_ms)));
            let _ = tx.send(result);
        });
        handle
    }
}

/// Post one submission and wait for the acknowledgement, bounded by
/// `timeout`. The outer `Err` means the deadline passed.
pub async fn post_score(
    addr: &str,
    submission: ScoreSubmission,
    timeout: Duration,
) -> Result<PostResult, tokio::time::error::Elapsed> {
    tokio::time::timeout(timeout, exchange(addr, submission)).await
}

async fn exchange(addr: &str, submission: ScoreSubmission) -> PostResult {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| PostError::Connect {
            addr: addr.to_string(),
            source,
        })?;
    let (reader, mut writer) = stream.into_split();
    writer.write_all(&encode_line(&submission)?).await?;
    writer.flush().await?;

    let mut line = String::new();
    if BufReader::new(reader).read_line(&mut line).await? == 0 {
        return Err(PostError::Rejected("connection closed before ack".to_string()));
    }
    let ack: ScoreAck = serde_json::from_str(line.trim())
        .map_err(|e| PostError::Rejected(format!("malformed ack: {e}")))?;
    if !ack.is_ok() {
        return Err(PostError::Rejected(ack.message.unwrap_or_default()));
    }
    debug!(addr, score = submission.score, "score acknowledged");
    Ok(())
}
