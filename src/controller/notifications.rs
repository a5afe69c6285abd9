use serde::Serialize;

use crate::geometry::Size;
use crate::model::WindowId;

/// Outbound events for the embedding application. Emitted without the
/// registry lock, best-effort, ordered per window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    WindowCreated { id: WindowId, parent: Option<WindowId> },
    /// The window's client size changed. The size is in logical pixels.
    WindowChanged { id: WindowId, size: Size },
    WindowDestroyed { id: WindowId },
    /// The window marked quit-on-close was destroyed; the application
    /// should shut down.
    QuitRequested,
}
