use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::db::RsvpStatus;

const CHANNEL_CAPACITY: usize = 256;

/// A guest's RSVP moved to a new status and the guest can be emailed.
#[derive(Debug, Clone, PartialEq)]
pub struct RsvpNotice {
    pub guest_id: String,
    pub guest_name: String,
    pub email: String,
    pub previous: RsvpStatus,
    pub current: RsvpStatus,
    pub event_title: String,
    pub event_start: DateTime<Utc>,
}

/// Side effects that may only run once the originating transaction committed.
#[derive(Debug, Clone, PartialEq)]
pub enum PostCommit {
    RsvpChanged(RsvpNotice),
}

/// Broadcast hub for post-commit side effects.
pub struct PostCommitHub {
    sender: broadcast::Sender<PostCommit>,
}

impl PostCommitHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PostCommit> {
        self.sender.subscribe()
    }

    /// Publish a notice. No-op if nobody is listening.
    pub fn publish(&self, notice: PostCommit) {
        if self.sender.send(notice).is_err() {
            tracing::debug!("No post-commit subscribers; notice dropped");
        }
    }
}

impl Default for PostCommitHub {
    fn default() -> Self {
        Self::new()
    }
}
