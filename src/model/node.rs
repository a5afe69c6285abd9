use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::collections::BTreeSet;
use crate::geometry::Point;
use crate::sys::window_server::WindowHandle;

/// Identifier of the view hosted by a window, assigned by the native window
/// adapter at creation. Never reused while the window is live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub i64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Window types. The archetype determines the native window style, the
/// ownership rules, and how hierarchy cascades treat the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Regular,
    FloatingRegular,
    Dialog,
    Satellite,
    Popup,
    Tip,
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Archetype::Regular => "regular",
            Archetype::FloatingRegular => "floating_regular",
            Archetype::Dialog => "dialog",
            Archetype::Satellite => "satellite",
            Archetype::Popup => "popup",
            Archetype::Tip => "tip",
        })
    }
}

impl Archetype {
    /// Whether a window of this archetype must be created with a live owner.
    /// Dialogs may be owned or ownerless.
    pub fn requires_owner(self) -> bool {
        matches!(self, Archetype::Satellite | Archetype::Popup | Archetype::Tip)
    }

    /// Whether a window of this archetype must be created without an owner.
    pub fn forbids_owner(self) -> bool {
        matches!(self, Archetype::Regular | Archetype::FloatingRegular)
    }
}

/// Per-window record held by the hierarchy controller's registry. `owner`
/// and `children` are relational references by id; the registry owns the
/// nodes themselves.
#[derive(Clone, Debug)]
pub struct WindowNode {
    pub id: WindowId,
    pub archetype: Archetype,
    pub handle: WindowHandle,
    pub owner: Option<WindowId>,
    pub children: BTreeSet<WindowId>,
    /// Number of direct children with archetype `Popup`.
    pub popup_child_count: usize,
    /// Closing this window shuts the whole application down.
    pub quit_on_close: bool,
    /// False while an open dialog elsewhere in the subtree keeps this
    /// window disabled.
    pub modal_enabled: bool,
    /// Frame offset relative to the owner's frame, kept for repositioning
    /// satellites when the owner moves.
    pub offset_from_owner: Point,
}

impl WindowNode {
    pub fn new(
        id: WindowId,
        archetype: Archetype,
        handle: WindowHandle,
        owner: Option<WindowId>,
    ) -> Self {
        WindowNode {
            id,
            archetype,
            handle,
            owner,
            children: BTreeSet::new(),
            popup_child_count: 0,
            quit_on_close: false,
            modal_enabled: true,
            offset_from_owner: Point::default(),
        }
    }
}
