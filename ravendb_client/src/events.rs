//! Events published by a [`DocumentStore`](crate::DocumentStore).
use uuid::Uuid;

/// Lifecycle events for the sessions opened from a store.
///
/// Subscribe with [`DocumentStore::subscribe_session_events`](crate::DocumentStore::subscribe_session_events).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionEvent {
    /// A session was opened.
    SessionCreated { session_id: Uuid },
    /// A session was dropped and released its resources.
    SessionClosing { session_id: Uuid },
}

impl SessionEvent {
    pub fn session_id(&self) -> Uuid {
        match self {
            SessionEvent::SessionCreated { session_id }
            | SessionEvent::SessionClosing { session_id } => *session_id,
        }
    }
}
