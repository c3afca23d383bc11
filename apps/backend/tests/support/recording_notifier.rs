//! Notifier that remembers what it was asked to send.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use skate_backend::domain::PlayerId;
use skate_backend::services::notifier::NotifyError;
use skate_backend::services::{Notification, Notifier};

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(PlayerId, Notification)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every later `notify` fails, after recording the attempt.
    pub fn fail_deliveries(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<(PlayerId, Notification)> {
        std::mem::take(&mut *self.sent.lock())
    }

    pub fn kinds_for(&self, player: &str) -> Vec<&'static str> {
        self.sent
            .lock()
            .iter()
            .filter(|(to, _)| to.as_str() == player)
            .map(|(_, n)| n.kind())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, to: &PlayerId, notification: Notification) -> Result<(), NotifyError> {
        self.sent.lock().push((to.clone(), notification));
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Delivery("recording notifier set to fail".into()));
        }
        Ok(())
    }
}
