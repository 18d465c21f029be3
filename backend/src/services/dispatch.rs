use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::constants::DISPATCH_MAILBOX_CAPACITY;
use crate::models::ConnectOutgoingMessage;

/// A message queued for delivery to one recipient at one logical destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchedMessage {
    pub destination: String,
    pub payload: ConnectOutgoingMessage,
}

/// Push-messaging contract. Delivery is fire-and-forget from the caller's
/// perspective; a failed or dropped delivery never flows back into the
/// handshake outcome.
#[allow(async_fn_in_trait)]
pub trait MessageDispatcher {
    async fn send_to_user(
        &self,
        recipient_user_id: i64,
        destination: &str,
        message: ConnectOutgoingMessage,
    );
}

/// In-process dispatcher backed by bounded per-recipient mailboxes. Clients
/// poll their mailbox; when a mailbox overflows the oldest message is
/// dropped, matching the at-most-once posture of the push channel.
#[derive(Debug, Default)]
pub struct QueueDispatcher {
    mailboxes: DashMap<i64, VecDeque<DispatchedMessage>>,
}

impl QueueDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything queued for `user_id`.
    pub fn drain(&self, user_id: i64) -> Vec<DispatchedMessage> {
        self.mailboxes
            .remove(&user_id)
            .map(|(_, queue)| queue.into_iter().collect())
            .unwrap_or_default()
    }
}

impl MessageDispatcher for QueueDispatcher {
    async fn send_to_user(
        &self,
        recipient_user_id: i64,
        destination: &str,
        message: ConnectOutgoingMessage,
    ) {
        let mut mailbox = self.mailboxes.entry(recipient_user_id).or_default();
        if mailbox.len() >= DISPATCH_MAILBOX_CAPACITY {
            mailbox.pop_front();
            tracing::warn!(
                "Mailbox for user {} overflowed; dropped oldest message",
                recipient_user_id
            );
        }
        mailbox.push_back(DispatchedMessage {
            destination: destination.to_string(),
            payload: message,
        });
    }
}
