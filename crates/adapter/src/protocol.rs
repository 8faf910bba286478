//! Score wire protocol.
//!
//! One JSON object per line in each direction:
//!
//! ```text
//! client -> collector: {"score":120,"correct_answers":8}
//! collector -> client: {"status":"ok"}
//! collector -> client: {"status":"error","message":"invalid submission"}
//! ```

use serde::{Deserialize, Serialize};

pub use crate::engine::ScoreSubmission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Ok,
    Error,
}

/// Collector reply to one submission line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreAck {
    pub status: AckStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

impl ScoreAck {
    pub fn ok() -> Self {
        Self {
            status: AckStatus::Ok,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: AckStatus::Error,
            message: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == AckStatus::Ok
    }
}

/// Encode `value` as one protocol line, newline included.
pub fn encode_line<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_omits_missing_answer_count() {
        let line = encode_line(&ScoreSubmission {
            score: 42,
            correct_answers: None,
        })
        .unwrap();
        assert_eq!(line, b"{\"score\":42}\n");
    }

    #[test]
    fn test_ack_wire_shape() {
        let ok = serde_json::to_string(&ScoreAck::ok()).unwrap();
        assert_eq!(ok, r#"{"status":"ok"}"#);

        let err: ScoreAck =
            serde_json::from_str(r#"{"status":"error","message":"nope"}"#).unwrap();
        assert!(!err.is_ok());
        assert_eq!(err.message.as_deref(), Some("nope"));
    }
}
