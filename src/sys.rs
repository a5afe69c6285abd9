pub mod headless;
pub mod window_server;

pub use window_server::{
    Displays, NativeWindow, Placement, ShowMode, WindowEvent, WindowEventHandler, WindowHandle,
    WindowServerError, WindowStyle, WindowSystem,
};
