/// Notification side channel between controllers and the presentation layer
use std::fmt;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.level {
            NoticeLevel::Success => "✓",
            NoticeLevel::Error => "✗",
        };
        write!(f, "{} {}", marker, self.message)
    }
}

/// Capability injected into controllers to surface outcomes
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the tracing log
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!(target: "chezflora_admin::notice", "{}", notice.message),
            NoticeLevel::Error => warn!(target: "chezflora_admin::notice", "{}", notice.message),
        }
    }
}

/// Forwards notices to a receiver owned by the view
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        if self.sender.send(notice).is_err() {
            warn!("Notice dropped: view no longer listening");
        }
    }
}

/// Keeps every notice in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn errors(&self) -> Vec<Notice> {
        self.notices().into_iter().filter(Notice::is_error).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.clear();
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_notifier_delivers_in_order() {
        let (notifier, mut receiver) = ChannelNotifier::new();
        notifier.notify(Notice::success("Administrateur ajouté"));
        notifier.notify(Notice::error("Erreur lors du chargement"));

        assert_eq!(receiver.recv().await, Some(Notice::success("Administrateur ajouté")));
        let second = receiver.recv().await.unwrap();
        assert!(second.is_error());
    }

    #[test]
    fn test_channel_notifier_survives_closed_receiver() {
        let (notifier, receiver) = ChannelNotifier::new();
        drop(receiver);
        notifier.notify(Notice::error("personne n'écoute"));
    }

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notice::success("ok"));
        notifier.notify(Notice::error("ko"));
        assert_eq!(notifier.notices().len(), 2);
        assert_eq!(notifier.errors(), vec![Notice::error("ko")]);

        notifier.clear();
        assert!(notifier.notices().is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Notice::success("Enregistré").to_string(), "✓ Enregistré");
    }
}
