//! Score collector.
//!
//! A small TCP service that accepts score lines, forwards each valid
//! submission to the host, and acknowledges it. The demo binary runs it with
//! `playkit collect`; tests run it on port 0.

use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::engine::ScoringConfig;
use crate::protocol::{encode_line, ScoreAck, ScoreSubmission};

/// Accept connections forever, forwarding every valid submission to
/// `received`.
///
/// The bound address is sent on `ready_tx` once the listener is up.
pub async fn run_score_collector(
    config: ScoringConfig,
    received: mpsc::UnboundedSender<ScoreSubmission>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.addr()).await?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "score collector listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let mut client_id_counter = 0usize;
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        debug!(client_id, %addr, "score client connected");

        let received = received.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, received).await {
                warn!(client_id, error = %e, "score client error");
            }
            debug!(client_id, "score client disconnected");
        });
    }
}

async fn handle_client(
    socket: TcpStream,
    received: mpsc::UnboundedSender<ScoreSubmission>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let ack = match serde_json::from_str::<ScoreSubmission>(line) {
            Ok(submission) => {
                info!(score = submission.score, correct = ?submission.correct_answers, "score received");
                if received.send(submission).is_err() {
                    ScoreAck::error("collector shutting down")
                } else {
                    ScoreAck::ok()
                }
            }
            Err(e) => {
                warn!(error = %e, "invalid score line");
                ScoreAck::error(format!("invalid submission: {e}"))
            }
        };
        writer.write_all(&encode_line(&ack)?).await?;
        writer.flush().await?;
    }
    Ok(())
}
