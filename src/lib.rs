//! Core of a multi-window desktop shell: anchored placement of auxiliary
//! windows (popups, tooltips, satellites, dialogs) and the runtime hierarchy
//! and activation state of the windows they attach to.

pub mod common;
pub mod controller;
pub mod geometry;
pub mod model;
pub mod placement;
pub mod sys;
