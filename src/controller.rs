//! Window hierarchy controller and its outbound notification channel.

use tokio::sync::mpsc::error::SendError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::Span;

pub mod error;
pub mod notifications;
pub mod windows;

pub use error::WindowError;
pub use notifications::Notification;
pub use windows::{CreateRequest, WindowController, WindowInfo, WindowMetadata};

pub struct NotificationSender(UnboundedSender<(Span, Notification)>);
pub type NotificationReceiver = UnboundedReceiver<(Span, Notification)>;

pub fn notification_channel() -> (NotificationSender, NotificationReceiver) {
    let (tx, rx) = unbounded_channel();
    (NotificationSender(tx), rx)
}

impl NotificationSender {
    pub fn send(&self, notification: Notification) {
        // Send errors just mean nobody is listening anymore.
        _ = self.try_send(notification)
    }

    pub fn try_send(
        &self,
        notification: Notification,
    ) -> Result<(), SendError<(Span, Notification)>> {
        self.0.send((Span::current(), notification))
    }
}

impl Clone for NotificationSender {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl std::fmt::Debug for NotificationSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NotificationSender(...)")
    }
}
