//! Application layer for Lifestyle Lens.
//!
//! Wires the history store and the concept generator around the working
//! session. Frontends (currently the CLI) drive everything through
//! [`SessionController`].

pub mod session_controller;

pub use session_controller::{ControllerSettings, SessionController};
