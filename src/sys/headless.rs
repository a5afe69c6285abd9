//! In-memory window system and display service.
//!
//! Backs the demo binary and the controller tests. Deliberately mimics the
//! awkward parts of a real window system: owned windows are destroyed
//! together with their owner, and events are delivered synchronously from
//! within the call that caused them, so callers get reentered on the same
//! thread exactly like they would by a native message pump.

use std::sync::Weak;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use parking_lot::Mutex;
use slotmap::{DefaultKey, Key, KeyData, SlotMap};

use crate::geometry::{Point, Rect};
use crate::model::WindowId;
use crate::sys::window_server::{
    NativeWindow, Placement, ShowMode, WindowEvent, WindowEventHandler, WindowHandle,
    WindowServerError, WindowStyle, WindowSystem,
};

#[derive(Clone, Debug)]
pub struct SimWindow {
    pub view_id: WindowId,
    pub rect: Rect,
    pub style: WindowStyle,
    pub owner: Option<WindowHandle>,
    pub visible: bool,
    pub enabled: bool,
    pub redraw_suppressed: bool,
    pub invalidate_count: u32,
}

#[derive(Default)]
struct State {
    windows: SlotMap<DefaultKey, SimWindow>,
    focused: Option<WindowHandle>,
    created: i32,
}

pub struct HeadlessWindowSystem {
    state: Mutex<State>,
    handler: Mutex<Option<Weak<dyn WindowEventHandler>>>,
    next_view_id: AtomicI64,
    /// When set, creating an activatable window synchronously delivers an
    /// `Activated` event from inside `create_window`, reproducing the
    /// nested-message-pump reentrancy of real window systems.
    activate_on_create: AtomicBool,
}

impl Default for HeadlessWindowSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessWindowSystem {
    pub fn new() -> Self {
        HeadlessWindowSystem {
            state: Mutex::new(State::default()),
            handler: Mutex::new(None),
            next_view_id: AtomicI64::new(1),
            activate_on_create: AtomicBool::new(false),
        }
    }

    pub fn set_activate_on_create(&self, value: bool) {
        self.activate_on_create.store(value, Ordering::SeqCst);
    }

    /// Delivers an event to the installed handler, as the OS would. Public
    /// so tests and the demo can simulate user interaction.
    pub fn send_event(&self, handle: WindowHandle, event: WindowEvent) {
        let handler = self.handler.lock().clone();
        if let Some(handler) = handler.and_then(|weak| weak.upgrade()) {
            handler.handle_window_event(handle, event);
        }
    }

    pub fn view_handle(&self, id: WindowId) -> Option<WindowHandle> {
        let state = self.state.lock();
        state
            .windows
            .iter()
            .find(|(_, window)| window.view_id == id)
            .map(|(key, _)| handle_of(key))
    }

    pub fn window_state(&self, handle: WindowHandle) -> Option<SimWindow> {
        self.state.lock().windows.get(key_of(handle)).cloned()
    }

    pub fn focused(&self) -> Option<WindowHandle> {
        self.state.lock().focused
    }

    pub fn window_count(&self) -> usize {
        self.state.lock().windows.len()
    }
}

fn handle_of(key: DefaultKey) -> WindowHandle {
    WindowHandle(key.data().as_ffi())
}

fn key_of(handle: WindowHandle) -> DefaultKey {
    DefaultKey::from(KeyData::from_ffi(handle.0))
}

impl WindowSystem for HeadlessWindowSystem {
    fn create_window(
        &self,
        style: WindowStyle,
        placement: Placement,
        owner: Option<WindowHandle>,
    ) -> Result<NativeWindow, WindowServerError> {
        let view_id = WindowId(self.next_view_id.fetch_add(1, Ordering::SeqCst));
        let handle = {
            let mut state = self.state.lock();
            if let Some(owner) = owner
                && !state.windows.contains_key(key_of(owner))
            {
                return Err(WindowServerError(format!("owner {owner} is not a live window")));
            }
            let rect = match placement {
                Placement::At(rect) => rect,
                Placement::Default(size) => {
                    // Deterministic stand-in for the platform's cascading
                    // default position.
                    let step = 64 + 32 * state.created;
                    Rect::new(Point::new(step, step), size)
                }
            };
            state.created += 1;
            let key = state.windows.insert(SimWindow {
                view_id,
                rect,
                style,
                owner,
                visible: false,
                enabled: true,
                redraw_suppressed: false,
                invalidate_count: 0,
            });
            handle_of(key)
        };

        if style.activatable && self.activate_on_create.load(Ordering::SeqCst) {
            self.state.lock().focused = Some(handle);
            self.send_event(handle, WindowEvent::Activated);
        }

        Ok(NativeWindow { handle, view_id })
    }

    fn destroy_window(&self, handle: WindowHandle) {
        // Owned windows go down with their owner, deepest first.
        let owned: Vec<WindowHandle> = {
            let state = self.state.lock();
            if !state.windows.contains_key(key_of(handle)) {
                return;
            }
            state
                .windows
                .iter()
                .filter(|(_, window)| window.owner == Some(handle))
                .map(|(key, _)| handle_of(key))
                .collect()
        };
        for child in owned {
            self.destroy_window(child);
        }

        let removed = {
            let mut state = self.state.lock();
            if state.focused == Some(handle) {
                state.focused = None;
            }
            state.windows.remove(key_of(handle)).is_some()
        };
        if removed {
            self.send_event(handle, WindowEvent::Destroyed);
        }
    }

    fn show_window(&self, handle: WindowHandle, mode: ShowMode) {
        let activated = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let Some(window) = state.windows.get_mut(key_of(handle)) else { return };
            match mode {
                ShowMode::Show => {
                    window.visible = true;
                    if window.style.activatable {
                        state.focused = Some(handle);
                        true
                    } else {
                        false
                    }
                }
                ShowMode::ShowNoActivate => {
                    window.visible = true;
                    false
                }
                ShowMode::Hide => {
                    window.visible = false;
                    false
                }
            }
        };
        if activated {
            self.send_event(handle, WindowEvent::Activated);
        }
    }

    fn enable_window(&self, handle: WindowHandle, enabled: bool) {
        if let Some(window) = self.state.lock().windows.get_mut(key_of(handle)) {
            window.enabled = enabled;
        }
    }

    fn move_window(&self, handle: WindowHandle, rect: Rect) {
        let (moved, resized) = {
            let mut state = self.state.lock();
            let Some(window) = state.windows.get_mut(key_of(handle)) else { return };
            let moved = window.rect.top_left != rect.top_left;
            let resized = window.rect.size != rect.size;
            window.rect = rect;
            (moved, resized)
        };
        if moved {
            self.send_event(handle, WindowEvent::Moved(rect.top_left));
        }
        if resized {
            self.send_event(handle, WindowEvent::Resized(rect.size));
        }
    }

    fn focus_window(&self, handle: WindowHandle) {
        let focusable = {
            let mut state = self.state.lock();
            let focusable = state
                .windows
                .get(key_of(handle))
                .is_some_and(|window| window.enabled && window.visible);
            if focusable {
                state.focused = Some(handle);
            }
            focusable
        };
        if focusable {
            self.send_event(handle, WindowEvent::Activated);
        }
    }

    fn window_rect(&self, handle: WindowHandle) -> Option<Rect> {
        self.state.lock().windows.get(key_of(handle)).map(|window| window.rect)
    }

    fn client_rect(&self, handle: WindowHandle) -> Option<Rect> {
        // Headless windows have no non-client area.
        self.window_rect(handle)
    }

    fn suppress_frame_redraw(&self, handle: WindowHandle, suppress: bool) {
        if let Some(window) = self.state.lock().windows.get_mut(key_of(handle)) {
            window.redraw_suppressed = suppress;
        }
    }

    fn invalidate_frame(&self, handle: WindowHandle) {
        if let Some(window) = self.state.lock().windows.get_mut(key_of(handle)) {
            window.invalidate_count += 1;
        }
    }

    fn set_event_handler(&self, handler: Weak<dyn WindowEventHandler>) {
        *self.handler.lock() = Some(handler);
    }
}

pub struct HeadlessDisplays {
    work_areas: Vec<Rect>,
    scale: f64,
}

impl HeadlessDisplays {
    pub fn new(work_areas: Vec<Rect>, scale: f64) -> Self {
        assert!(!work_areas.is_empty(), "at least one display is required");
        HeadlessDisplays { work_areas, scale }
    }

    pub fn single(work_area: Rect) -> Self {
        Self::new(vec![work_area], 1.0)
    }
}

impl crate::sys::window_server::Displays for HeadlessDisplays {
    fn nearest_work_area(&self, rect: Rect) -> Rect {
        let mut best: Option<(i64, Rect)> = None;
        for area in &self.work_areas {
            let overlap = area.overlap_area(&rect);
            if best.is_none_or(|(best_overlap, _)| overlap > best_overlap) {
                best = Some((overlap, *area));
            }
        }
        // The constructor guarantees a primary display.
        best.map(|(_, area)| area).unwrap_or_default()
    }

    fn scale_factor(&self, _point: Point) -> f64 {
        self.scale
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::{Rect, Size};
    use crate::model::Archetype;
    use crate::sys::window_server::Displays;

    use super::*;

    fn style() -> WindowStyle {
        WindowStyle::for_archetype(Archetype::Regular)
    }

    #[test]
    fn create_and_query_roundtrip() {
        let system = HeadlessWindowSystem::new();
        let window = system
            .create_window(style(), Placement::At(Rect::from_xywh(10, 20, 300, 200)), None)
            .unwrap();

        assert_eq!(system.window_rect(window.handle), Some(Rect::from_xywh(10, 20, 300, 200)));
        assert_eq!(system.view_handle(window.view_id), Some(window.handle));
    }

    #[test]
    fn default_placement_cascades() {
        let system = HeadlessWindowSystem::new();
        let first =
            system.create_window(style(), Placement::Default(Size::new(100, 100)), None).unwrap();
        let second =
            system.create_window(style(), Placement::Default(Size::new(100, 100)), None).unwrap();
        let first_rect = system.window_rect(first.handle).unwrap();
        let second_rect = system.window_rect(second.handle).unwrap();
        assert_ne!(first_rect.top_left, second_rect.top_left);
    }

    #[test]
    fn destroying_owner_destroys_owned_windows() {
        let system = HeadlessWindowSystem::new();
        let owner = system
            .create_window(style(), Placement::Default(Size::new(100, 100)), None)
            .unwrap();
        let owned = system
            .create_window(style(), Placement::Default(Size::new(50, 50)), Some(owner.handle))
            .unwrap();

        system.destroy_window(owner.handle);
        assert_eq!(system.window_count(), 0);
        assert_eq!(system.window_rect(owned.handle), None);
    }

    #[test]
    fn create_with_dead_owner_fails() {
        let system = HeadlessWindowSystem::new();
        let owner = system
            .create_window(style(), Placement::Default(Size::new(100, 100)), None)
            .unwrap();
        system.destroy_window(owner.handle);

        let result = system.create_window(
            style(),
            Placement::Default(Size::new(50, 50)),
            Some(owner.handle),
        );
        assert!(result.is_err());
    }

    #[test]
    fn nearest_work_area_picks_most_overlap() {
        let displays = HeadlessDisplays::new(
            vec![Rect::from_xywh(0, 0, 1000, 1000), Rect::from_xywh(1000, 0, 1000, 1000)],
            1.0,
        );
        assert_eq!(
            displays.nearest_work_area(Rect::from_xywh(900, 0, 300, 100)),
            Rect::from_xywh(1000, 0, 1000, 1000)
        );
        assert_eq!(
            displays.nearest_work_area(Rect::from_xywh(100, 100, 10, 10)),
            Rect::from_xywh(0, 0, 1000, 1000)
        );
        // Off-screen anchors fall back to the primary display.
        assert_eq!(
            displays.nearest_work_area(Rect::from_xywh(-5000, -5000, 10, 10)),
            Rect::from_xywh(0, 0, 1000, 1000)
        );
    }
}
