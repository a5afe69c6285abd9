//! The window hierarchy controller.
//!
//! Owns the registry of window nodes and implements the creation and
//! destruction protocol, the modal cascade, the popup-close cascade and the
//! satellite visibility cascade. Native notifications may arrive
//! synchronously from within a window-system call on the same thread, so
//! the registry lock is never held across such calls: state is read or
//! committed under the lock, the lock is released, and only then is the
//! window system invoked.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::common::collections::BTreeSet;
use crate::controller::{
    Notification, NotificationReceiver, NotificationSender, WindowError, notification_channel,
};
use crate::geometry::{Point, Rect, Size};
use crate::model::{Archetype, Registry, WindowId, WindowNode};
use crate::placement::{Positioner, place};
use crate::sys::window_server::{
    Displays, Placement, ShowMode, WindowEvent, WindowEventHandler, WindowHandle, WindowStyle,
    WindowSystem,
};

/// A decoded window creation request. Sizes, anchor rectangles and offsets
/// are in logical pixels; the controller converts them to physical pixels
/// using the display service.
#[derive(Clone, Copy, Debug)]
pub struct CreateRequest {
    pub archetype: Archetype,
    pub size: Size,
    pub owner: Option<WindowId>,
    pub positioner: Option<Positioner>,
}

/// What a successful creation reports back. The size is the frame size in
/// logical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct WindowMetadata {
    pub id: WindowId,
    pub archetype: Archetype,
    pub size: Size,
    pub parent: Option<WindowId>,
}

/// Snapshot of one live window, for inspection and the demo binary.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct WindowInfo {
    pub id: WindowId,
    pub archetype: Archetype,
    pub owner: Option<WindowId>,
    pub popup_children: usize,
    pub quit_on_close: bool,
    pub modal_enabled: bool,
    pub frame: Option<Rect>,
}

#[derive(Default)]
struct ControllerState {
    registry: Registry,
    /// Set once the first window has ever been created; that window carries
    /// the quit-on-close flag.
    created_any: bool,
    /// True while the quit cascade is tearing down the remaining windows.
    quitting: bool,
    /// True while an owned dialog is being destroyed, so its satellites do
    /// not flicker between the destruction and the focus handoff.
    suppress_satellite_hiding: bool,
}

pub struct WindowController {
    system: Arc<dyn WindowSystem>,
    displays: Arc<dyn Displays>,
    state: Mutex<ControllerState>,
    notifications: NotificationSender,
}

fn scale_point(point: Point, factor: f64) -> Point {
    Point::new((point.x as f64 * factor).round() as i32, (point.y as f64 * factor).round() as i32)
}

fn scale_rect(rect: Rect, factor: f64) -> Rect {
    Rect::new(scale_point(rect.top_left, factor), rect.size.scaled(factor))
}

impl WindowController {
    /// Creates the controller and installs it as the window system's event
    /// handler. The receiver carries the outbound notifications.
    pub fn new(
        system: Arc<dyn WindowSystem>,
        displays: Arc<dyn Displays>,
    ) -> (Arc<Self>, NotificationReceiver) {
        let (notifications, receiver) = notification_channel();
        let controller = Arc::new(WindowController {
            system,
            displays,
            state: Mutex::new(ControllerState::default()),
            notifications,
        });
        let weak = Arc::downgrade(&controller) as Weak<dyn WindowEventHandler>;
        controller.system.set_event_handler(weak);
        (controller, receiver)
    }

    pub fn create_window(&self, request: CreateRequest) -> Result<WindowMetadata, WindowError> {
        if request.size.width < 0 || request.size.height < 0 {
            return Err(WindowError::InvalidArgument(format!(
                "window size must be non-negative, got {}x{}",
                request.size.width, request.size.height
            )));
        }
        match request.owner {
            None if request.archetype.requires_owner() => {
                return Err(WindowError::InvalidArgument(format!(
                    "{:?} windows require an owner",
                    request.archetype
                )));
            }
            Some(_) if request.archetype.forbids_owner() => {
                return Err(WindowError::InvalidArgument(format!(
                    "{:?} windows cannot have an owner",
                    request.archetype
                )));
            }
            _ => {}
        }
        if request.positioner.is_some() && request.owner.is_none() {
            return Err(WindowError::InvalidArgument(
                "a positioner requires an owner to anchor against".into(),
            ));
        }

        let owner_handle = match request.owner {
            Some(owner_id) => {
                let state = self.state.lock();
                match state.registry.get(owner_id) {
                    Some(owner) => Some(owner.handle),
                    None => return Err(WindowError::NotFound(owner_id)),
                }
            }
            None => None,
        };

        // Native queries and the creation itself run with the lock
        // released; the window system may reenter the controller
        // synchronously from any of these calls.
        let owner_frame = match owner_handle {
            Some(handle) => Some(self.system.window_rect(handle).ok_or_else(|| {
                WindowError::Unavailable("owner window vanished before creation".into())
            })?),
            None => None,
        };
        let scale =
            self.displays.scale_factor(owner_frame.map(|frame| frame.top_left).unwrap_or_default());
        let physical_size = request.size.scaled(scale);

        let placement = match (request.positioner, owner_handle, owner_frame) {
            (Some(positioner), Some(handle), Some(frame)) => {
                let rect = self.place_anchored(&positioner, physical_size, handle, frame, scale)?;
                Placement::At(rect)
            }
            (None, _, Some(frame)) if request.archetype == Archetype::Dialog => {
                Placement::At(frame.centered(physical_size))
            }
            _ => Placement::Default(physical_size),
        };

        let style = WindowStyle::for_archetype(request.archetype);
        let native = self
            .system
            .create_window(style, placement, owner_handle)
            .map_err(|err| WindowError::Unavailable(err.to_string()))?;
        let Some(frame) = self.system.window_rect(native.handle) else {
            return Err(WindowError::Unavailable(format!(
                "{} vanished during creation",
                native.view_id
            )));
        };

        {
            let mut state = self.state.lock();
            if let Some(owner_id) = request.owner
                && !state.registry.contains(owner_id)
            {
                // The owner went away while the native window was being
                // created. Roll back before anything references the orphan.
                drop(state);
                warn!(owner = %owner_id, "owner destroyed during window creation");
                self.system.destroy_window(native.handle);
                return Err(WindowError::Unavailable(format!(
                    "owner {owner_id} was destroyed during creation"
                )));
            }
            let mut node =
                WindowNode::new(native.view_id, request.archetype, native.handle, request.owner);
            node.quit_on_close = !state.created_any;
            state.created_any = true;
            if let Some(owner_frame) = owner_frame {
                node.offset_from_owner = frame.top_left - owner_frame.top_left;
            }
            state.registry.insert(node);
        }

        let mode = if style.activatable { ShowMode::Show } else { ShowMode::ShowNoActivate };
        self.system.show_window(native.handle, mode);

        if request.archetype == Archetype::Dialog && request.owner.is_some() {
            self.run_modal_cascade(native.view_id);
        }

        debug!(window = %native.view_id, archetype = ?request.archetype, "created");
        self.notifications
            .send(Notification::WindowCreated { id: native.view_id, parent: request.owner });

        Ok(WindowMetadata {
            id: native.view_id,
            archetype: request.archetype,
            size: frame.size.scaled(1.0 / scale),
            parent: request.owner,
        })
    }

    /// Resolves the anchor and reference rectangles for `positioner` and
    /// runs the placement solver. All solver inputs are physical pixels.
    fn place_anchored(
        &self,
        positioner: &Positioner,
        child_size: Size,
        owner_handle: WindowHandle,
        owner_frame: Rect,
        scale: f64,
    ) -> Result<Rect, WindowError> {
        let client = self.system.client_rect(owner_handle).ok_or_else(|| {
            WindowError::Unavailable("owner window vanished before creation".into())
        })?;
        let (anchor_rect, reference_rect) = match positioner.anchor_rect {
            Some(rect) => {
                // An explicit anchor rectangle is in logical coordinates
                // relative to the owner's client area; clamp it into the
                // client area and constrain the anchor point to it.
                let physical = scale_rect(rect, scale).translated(client.top_left);
                let top_left = client.clamp_point(physical.top_left);
                let bottom_right =
                    client.clamp_point(Point::new(physical.right(), physical.bottom()));
                let clamped = Rect::new(
                    top_left,
                    Size::new(bottom_right.x - top_left.x, bottom_right.y - top_left.y),
                );
                (clamped, clamped)
            }
            None => (owner_frame, client),
        };
        let output_rect = self.displays.nearest_work_area(anchor_rect);
        let scaled = Positioner {
            offset: scale_point(positioner.offset, scale),
            ..*positioner
        };
        Ok(place(&scaled, child_size, anchor_rect, reference_rect, output_rect))
    }

    /// Destroys `id` and, for the quit-on-close window, every other
    /// top-level window first, in reverse order of creation. Returns false
    /// for an unknown id. Unlinking happens when the window system reports
    /// the destruction.
    pub fn destroy_window(&self, id: WindowId) -> bool {
        let (handle, is_owned_dialog, quit_targets) = {
            let mut state = self.state.lock();
            let Some(node) = state.registry.get(id) else { return false };
            let handle = node.handle;
            let is_owned_dialog = node.archetype == Archetype::Dialog && node.owner.is_some();
            let quit_targets = if node.quit_on_close && !state.quitting {
                state.quitting = true;
                let roots: Vec<WindowId> = state
                    .registry
                    .ids()
                    .into_iter()
                    .rev()
                    .filter(|&root| {
                        root != id
                            && state.registry.get(root).is_some_and(|node| node.owner.is_none())
                    })
                    .collect();
                Some(roots)
            } else {
                None
            };
            if is_owned_dialog {
                // Keep satellites up while the dialog goes down and focus
                // moves back to the owner, otherwise they flicker.
                state.suppress_satellite_hiding = true;
            }
            (handle, is_owned_dialog, quit_targets)
        };

        if let Some(roots) = quit_targets {
            debug!(window = %id, "quit-on-close window closing, destroying all other windows");
            for root in roots {
                self.destroy_window(root);
            }
            self.state.lock().quitting = false;
        }

        self.system.destroy_window(handle);

        if is_owned_dialog {
            self.state.lock().suppress_satellite_hiding = false;
        }
        true
    }

    pub fn metadata(&self, id: WindowId) -> Option<WindowMetadata> {
        let (handle, archetype, parent) = {
            let state = self.state.lock();
            let node = state.registry.get(id)?;
            (node.handle, node.archetype, node.owner)
        };
        let frame = self.system.window_rect(handle)?;
        let scale = self.displays.scale_factor(frame.top_left);
        Some(WindowMetadata { id, archetype, size: frame.size.scaled(1.0 / scale), parent })
    }

    /// Snapshots of all live windows, in creation order.
    pub fn window_info(&self) -> Vec<WindowInfo> {
        let nodes: Vec<(WindowInfo, WindowHandle)> = {
            let state = self.state.lock();
            state
                .registry
                .iter()
                .map(|node| {
                    (
                        WindowInfo {
                            id: node.id,
                            archetype: node.archetype,
                            owner: node.owner,
                            popup_children: node.popup_child_count,
                            quit_on_close: node.quit_on_close,
                            modal_enabled: node.modal_enabled,
                            frame: None,
                        },
                        node.handle,
                    )
                })
                .collect()
        };
        nodes
            .into_iter()
            .map(|(mut info, handle)| {
                info.frame = self.system.window_rect(handle);
                info
            })
            .collect()
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.state.lock().registry.contains(id)
    }

    pub fn window_count(&self) -> usize {
        self.state.lock().registry.len()
    }

    pub fn handle_of(&self, id: WindowId) -> Option<WindowHandle> {
        self.state.lock().registry.get(id).map(|node| node.handle)
    }

    /// Renders the live hierarchy as an ASCII tree, one tree per top-level
    /// window, in creation order.
    pub fn render_tree(&self) -> String {
        let state = self.state.lock();
        let roots: Vec<WindowId> =
            state.registry.iter().filter(|node| node.owner.is_none()).map(|node| node.id).collect();
        let mut out = String::new();
        for root in roots {
            let tree = Self::tree_of(&state.registry, root);
            _ = ascii_tree::write_tree(&mut out, &tree);
        }
        out
    }

    fn tree_of(registry: &Registry, id: WindowId) -> ascii_tree::Tree {
        let Some(node) = registry.get(id) else {
            return ascii_tree::Tree::Leaf(vec![format!("{id} (missing)")]);
        };
        let mut label = format!("{} {}", node.id, node.archetype);
        if node.quit_on_close {
            label.push_str(" [quit-on-close]");
        }
        if !node.modal_enabled {
            label.push_str(" [disabled]");
        }
        if node.children.is_empty() {
            ascii_tree::Tree::Leaf(vec![label])
        } else {
            let children =
                node.children.iter().map(|child| Self::tree_of(registry, *child)).collect();
            ascii_tree::Tree::Node(label, children)
        }
    }

    fn on_destroyed(&self, handle: WindowHandle) {
        let (node, owner_handle, quit_remaining) = {
            let mut state = self.state.lock();
            let Some(id) = state.registry.id_of_handle(handle) else { return };
            let Some(node) = state.registry.remove(id) else { return };
            let owner_handle =
                node.owner.and_then(|owner| state.registry.get(owner)).map(|owner| owner.handle);
            let quit_remaining = if node.quit_on_close && !state.quitting {
                state.quitting = true;
                let roots: Vec<WindowId> = state
                    .registry
                    .ids()
                    .into_iter()
                    .rev()
                    .filter(|&root| {
                        state.registry.get(root).is_some_and(|node| node.owner.is_none())
                    })
                    .collect();
                Some(roots)
            } else {
                None
            };
            (node, owner_handle, quit_remaining)
        };

        debug!(window = %node.id, archetype = ?node.archetype, "destroyed");
        self.notifications.send(Notification::WindowDestroyed { id: node.id });

        // A closed dialog releases its modal hold and hands focus back to
        // its former owner.
        if node.archetype == Archetype::Dialog
            && let Some(owner) = node.owner
        {
            self.run_modal_cascade(owner);
            if let Some(owner_handle) = owner_handle {
                self.system.focus_window(owner_handle);
            }
        }

        if let Some(roots) = quit_remaining {
            for root in roots {
                self.destroy_window(root);
            }
            self.state.lock().quitting = false;
            self.notifications.send(Notification::QuitRequested);
        }
    }

    fn on_activated(&self, id: WindowId) {
        let archetype = {
            let state = self.state.lock();
            match state.registry.get(id) {
                Some(node) => node.archetype,
                None => return,
            }
        };

        // An activation outside any popup invalidates every outstanding
        // popup; activating a popup only invalidates the popups it owns.
        if archetype != Archetype::Popup {
            self.close_all_popups();
        }
        self.close_popup_descendants(id);

        self.show_ancestor_satellites(id);
        if archetype != Archetype::Satellite {
            self.hide_other_satellites(Some(id));
        }
    }

    fn on_app_deactivated(&self) {
        self.close_all_popups();
        self.hide_other_satellites(None);
    }

    /// The window moved: refresh its stored offset from its owner and drag
    /// its satellites along by their own stored offsets, sizes preserved.
    fn on_moved(&self, id: WindowId) {
        let (handle, owner_handle, satellites) = {
            let state = self.state.lock();
            let Some(node) = state.registry.get(id) else { return };
            let owner_handle =
                node.owner.and_then(|owner| state.registry.get(owner)).map(|owner| owner.handle);
            let satellites: Vec<(WindowHandle, Point)> = node
                .children
                .iter()
                .filter_map(|child| state.registry.get(*child))
                .filter(|child| child.archetype == Archetype::Satellite)
                .map(|child| (child.handle, child.offset_from_owner))
                .collect();
            (node.handle, owner_handle, satellites)
        };

        let Some(frame) = self.system.window_rect(handle) else { return };

        if let Some(owner_handle) = owner_handle
            && let Some(owner_frame) = self.system.window_rect(owner_handle)
        {
            let offset = frame.top_left - owner_frame.top_left;
            if let Some(node) = self.state.lock().registry.get_mut(id) {
                node.offset_from_owner = offset;
            }
        }

        for (satellite_handle, offset) in satellites {
            let Some(satellite_frame) = self.system.window_rect(satellite_handle) else { continue };
            let target = Rect::new(frame.top_left + offset, satellite_frame.size);
            if target != satellite_frame {
                self.system.move_window(satellite_handle, target);
            }
        }
    }

    fn on_resized(&self, id: WindowId) {
        let handle = {
            let state = self.state.lock();
            match state.registry.get(id) {
                Some(node) => node.handle,
                None => return,
            }
        };
        let Some(frame) = self.system.window_rect(handle) else { return };
        let scale = self.displays.scale_factor(frame.top_left);
        self.notifications
            .send(Notification::WindowChanged { id, size: frame.size.scaled(1.0 / scale) });
    }

    /// Closes the popups of every window in the subtree rooted at `id`.
    pub fn close_popup_descendants(&self, id: WindowId) {
        let parents: Vec<WindowId> = {
            let state = self.state.lock();
            if !state.registry.contains(id) {
                return;
            }
            state
                .registry
                .descendants(id)
                .into_iter()
                .filter(|wid| {
                    state.registry.get(*wid).is_some_and(|node| node.popup_child_count > 0)
                })
                .collect()
        };
        for parent in parents {
            self.close_direct_popups(parent);
        }
    }

    /// Closes popups everywhere in the registry.
    pub fn close_all_popups(&self) {
        let parents: Vec<WindowId> = {
            let state = self.state.lock();
            state
                .registry
                .iter()
                .filter(|node| node.popup_child_count > 0)
                .map(|node| node.id)
                .collect()
        };
        for parent in parents {
            self.close_direct_popups(parent);
        }
    }

    fn close_direct_popups(&self, id: WindowId) {
        let (parent_handle, popups) = {
            let state = self.state.lock();
            let Some(node) = state.registry.get(id) else { return };
            if node.popup_child_count == 0 {
                return;
            }
            let popups: Vec<WindowHandle> = node
                .children
                .iter()
                .filter_map(|child| state.registry.get(*child))
                .filter(|child| child.archetype == Archetype::Popup)
                .map(|child| child.handle)
                .collect();
            (node.handle, popups)
        };
        if popups.is_empty() {
            return;
        }
        // The parent's frame decoration toggles with each popup going away;
        // suppress its redraw per destruction and repaint once at the end.
        for popup in popups {
            self.system.suppress_frame_redraw(parent_handle, true);
            self.system.destroy_window(popup);
            self.system.suppress_frame_redraw(parent_handle, false);
        }
        self.system.invalidate_frame(parent_handle);
    }

    /// Disables the whole subtree containing `id` except the deepest dialog
    /// and its descendants. With no dialog in the subtree, everything is
    /// enabled.
    fn run_modal_cascade(&self, id: WindowId) {
        let changes: Vec<(WindowHandle, bool)> = {
            let mut state = self.state.lock();
            if !state.registry.contains(id) {
                return;
            }
            let root = state.registry.root_of(id);
            let subtree = state.registry.descendants(root);
            let enabled: BTreeSet<WindowId> = match state.registry.deepest_dialog(root) {
                Some(dialog) => state.registry.descendants(dialog).into_iter().collect(),
                None => subtree.iter().copied().collect(),
            };
            let mut changes = Vec::new();
            for wid in subtree {
                let enable = enabled.contains(&wid);
                if let Some(node) = state.registry.get_mut(wid)
                    && node.modal_enabled != enable
                {
                    node.modal_enabled = enable;
                    changes.push((node.handle, enable));
                }
            }
            changes
        };
        for (handle, enable) in changes {
            self.system.enable_window(handle, enable);
        }
    }

    /// Shows the satellites of `id` and of every ancestor on its owner
    /// chain, without stealing activation.
    fn show_ancestor_satellites(&self, id: WindowId) {
        let satellites: Vec<WindowHandle> = {
            let state = self.state.lock();
            let mut handles = Vec::new();
            let mut current = Some(id);
            while let Some(wid) = current {
                let Some(node) = state.registry.get(wid) else { break };
                for child in &node.children {
                    if let Some(child_node) = state.registry.get(*child)
                        && child_node.archetype == Archetype::Satellite
                    {
                        handles.push(child_node.handle);
                    }
                }
                current = node.owner;
            }
            handles
        };
        for handle in satellites {
            self.system.show_window(handle, ShowMode::ShowNoActivate);
        }
    }

    /// Hides every satellite except those owned by `keep` or its ancestors,
    /// and those with an open dialog somewhere below them.
    fn hide_other_satellites(&self, keep: Option<WindowId>) {
        let satellites: Vec<WindowHandle> = {
            let state = self.state.lock();
            if state.suppress_satellite_hiding {
                return;
            }
            let mut handles = Vec::new();
            for node in state.registry.iter() {
                if let Some(keep) = keep
                    && (node.id == keep || state.registry.is_ancestor_of(node.id, keep))
                {
                    continue;
                }
                for child in &node.children {
                    let Some(satellite) = state.registry.get(*child) else { continue };
                    if satellite.archetype != Archetype::Satellite {
                        continue;
                    }
                    // Hiding a satellite with an open dialog would visually
                    // orphan the modal.
                    let has_dialog = state.registry.descendants(satellite.id).iter().any(|wid| {
                        state.registry.get(*wid).is_some_and(|n| n.archetype == Archetype::Dialog)
                    });
                    if !has_dialog {
                        handles.push(satellite.handle);
                    }
                }
            }
            handles
        };
        for handle in satellites {
            self.system.show_window(handle, ShowMode::Hide);
        }
    }
}

impl WindowEventHandler for WindowController {
    fn handle_window_event(&self, handle: WindowHandle, event: WindowEvent) {
        // The guard must not outlive this statement; the handlers below
        // take the lock themselves.
        let id = self.state.lock().registry.id_of_handle(handle);
        match event {
            WindowEvent::Activated => {
                if let Some(id) = id {
                    self.on_activated(id);
                }
            }
            WindowEvent::Deactivated => {}
            WindowEvent::Moved(_) => {
                if let Some(id) = id {
                    self.on_moved(id);
                }
            }
            WindowEvent::Resized(_) => {
                if let Some(id) = id {
                    self.on_resized(id);
                }
            }
            WindowEvent::Destroyed => self.on_destroyed(handle),
            WindowEvent::AppActivationChanged(active) => {
                if !active {
                    self.on_app_deactivated();
                }
            }
        }
    }
}
