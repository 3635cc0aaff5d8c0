use tokio::sync::broadcast::{Receiver, Sender};
use tracing::info;

use crate::utils::channel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    Logout,
}

impl AuthEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthEvent::Logout => "auth:logout",
        }
    }
}

/// Process-wide auth event bus.
///
/// Only explicit logout flows publish here. The request client never does,
/// a failed refresh is surfaced to the caller as its original 401.
#[derive(Debug, Clone)]
pub struct AuthEvents {
    sender: Sender<AuthEvent>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthEvents {
    pub fn new() -> Self {
        Self { sender: channel::run() }
    }

    pub fn subscribe(&self) -> Receiver<AuthEvent> {
        self.sender.subscribe()
    }

    /// Publish `auth:logout`; returns how many subscribers received it.
    pub fn logout(&self) -> usize {
        let delivered = self.sender.send(AuthEvent::Logout).unwrap_or(0);
        info!("{} published to {} subscriber(s)", AuthEvent::Logout.as_str(), delivered);
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn logout_reaches_subscribers() {
        let events = AuthEvents::new();
        let mut rx = events.subscribe();

        assert_eq!(events.logout(), 1);
        assert_eq!(rx.recv().await.unwrap(), AuthEvent::Logout);
    }

    #[test]
    fn logout_without_subscribers_is_noop() {
        assert_eq!(AuthEvents::new().logout(), 0);
    }
}
