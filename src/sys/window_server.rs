//! Boundary traits for the native window system and the monitor/DPI
//! service. The hierarchy controller only talks to the OS through these, so
//! tests and the demo binary can substitute an in-memory implementation.

use std::fmt;
use std::sync::Weak;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Point, Rect, Size};
use crate::model::{Archetype, WindowId};

/// Opaque handle of a native window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hwnd#{:x}", self.0)
    }
}

#[derive(Debug, Error)]
#[error("window server error: {0}")]
pub struct WindowServerError(pub String);

/// Native style bits derived from the window archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowStyle {
    pub frameless: bool,
    pub resizable: bool,
    /// Whether showing or clicking the window may take activation away
    /// from its owner. Tips and satellites never do.
    pub activatable: bool,
}

impl WindowStyle {
    pub fn for_archetype(archetype: Archetype) -> Self {
        match archetype {
            Archetype::Regular | Archetype::FloatingRegular => {
                WindowStyle { frameless: false, resizable: true, activatable: true }
            }
            Archetype::Dialog => {
                WindowStyle { frameless: false, resizable: false, activatable: true }
            }
            Archetype::Satellite => {
                WindowStyle { frameless: false, resizable: false, activatable: false }
            }
            Archetype::Popup => {
                WindowStyle { frameless: true, resizable: false, activatable: true }
            }
            Archetype::Tip => {
                WindowStyle { frameless: true, resizable: false, activatable: false }
            }
        }
    }
}

/// Where to materialize a new native window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Platform-default position with the given frame size.
    Default(Size),
    /// Exact frame rectangle, already computed by the caller.
    At(Rect),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShowMode {
    Show,
    ShowNoActivate,
    Hide,
}

/// Result of a successful native window creation. The view id is assigned
/// by the adapter and identifies the window for the rest of its life.
#[derive(Clone, Copy, Debug)]
pub struct NativeWindow {
    pub handle: WindowHandle,
    pub view_id: WindowId,
}

/// Notifications delivered by the window system, per handle. These may
/// arrive synchronously from within a [`WindowSystem`] call on the same
/// thread; handlers must not assume they are the outermost frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowEvent {
    Activated,
    Deactivated,
    Moved(Point),
    Resized(Size),
    Destroyed,
    AppActivationChanged(bool),
}

pub trait WindowEventHandler: Send + Sync {
    fn handle_window_event(&self, handle: WindowHandle, event: WindowEvent);
}

pub trait WindowSystem: Send + Sync {
    fn create_window(
        &self,
        style: WindowStyle,
        placement: Placement,
        owner: Option<WindowHandle>,
    ) -> Result<NativeWindow, WindowServerError>;

    /// Requests destruction. The window system destroys owned windows as
    /// well and reports every destruction through a `Destroyed` event,
    /// which is the authoritative point of bookkeeping.
    fn destroy_window(&self, handle: WindowHandle);

    fn show_window(&self, handle: WindowHandle, mode: ShowMode);

    fn enable_window(&self, handle: WindowHandle, enabled: bool);

    fn move_window(&self, handle: WindowHandle, rect: Rect);

    fn focus_window(&self, handle: WindowHandle);

    /// Frame rectangle in physical pixels, or `None` for a dead handle.
    fn window_rect(&self, handle: WindowHandle) -> Option<Rect>;

    /// Client-area rectangle in physical pixels, or `None` for a dead
    /// handle.
    fn client_rect(&self, handle: WindowHandle) -> Option<Rect>;

    /// Suppresses non-client repaints of `handle`, so that closing a popup
    /// does not flicker the owner's title bar.
    fn suppress_frame_redraw(&self, handle: WindowHandle, suppress: bool);

    /// Forces a frame repaint after suppression ends.
    fn invalidate_frame(&self, handle: WindowHandle);

    fn set_event_handler(&self, handler: Weak<dyn WindowEventHandler>);
}

pub trait Displays: Send + Sync {
    /// Work area of the monitor overlapping `rect` the most, excluding
    /// reserved OS chrome. Falls back to the primary monitor when nothing
    /// overlaps.
    fn nearest_work_area(&self, rect: Rect) -> Rect;

    /// Scale factor from logical to physical pixels at `point`.
    fn scale_factor(&self, point: Point) -> f64;
}
