//! Single-subscriber delivery of classified gestures.
//!
//! Exactly one consumer (the active mini-game) receives gestures at a time.
//! A new subscription replaces the previous one; the previous receiver is
//! disconnected so it can never observe events meant for a later launch.

use crossbeam_channel::{unbounded, Receiver, Sender, TrySendError};
use tracing::{debug, warn};

use crate::types::GestureEvent;

/// Token returned by [`GestureBus::subscribe`], required to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug)]
struct Subscriber {
    id: SubscriptionId,
    tx: Sender<GestureEvent>,
}

#[derive(Debug, Default)]
pub struct GestureBus {
    subscriber: Option<Subscriber>,
    next_id: u64,
}

impl GestureBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the sole consumer of gesture events.
    pub fn subscribe(&mut self) -> (SubscriptionId, Receiver<GestureEvent>) {
        if let Some(prev) = self.subscriber.take() {
            warn!(replaced = prev.id.0, "gesture subscription replaced without unsubscribe");
        }
        self.next_id = self.next_id.wrapping_add(1);
        let id = SubscriptionId(self.next_id);
        let (tx, rx) = unbounded();
        self.subscriber = Some(Subscriber { id, tx });
        debug!(id = id.0, "gesture subscriber registered");
        (id, rx)
    }

    /// Remove the subscription identified by `id`. Stale ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        match &self.subscriber {
            Some(sub) if sub.id == id => {
                self.subscriber = None;
                debug!(id = id.0, "gesture subscriber removed");
                true
            }
            _ => false,
        }
    }

    pub fn has_subscriber(&self) -> bool {
        self.subscriber.is_some()
    }

    /// Deliver events to the current subscriber, if any. Returns the number of
    /// events delivered.
    pub fn publish(&mut self, events: &[GestureEvent]) -> usize {
        let Some(sub) = &self.subscriber else {
            return 0;
        };
        let mut delivered = 0;
        for ev in events {
            match sub.tx.try_send(*ev) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Disconnected(_)) => {
                    warn!(id = sub.id.0, "gesture subscriber dropped its receiver");
                    self.subscriber = None;
                    break;
                }
                Err(TrySendError::Full(_)) => {}
            }
        }
        delivered
    }
}
