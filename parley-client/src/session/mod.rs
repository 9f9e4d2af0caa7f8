mod session;
mod session_command;
mod session_config;
mod session_controller;
mod session_event;

pub(crate) use session::*;
pub(crate) use session_command::*;
pub use session_config::*;
pub use session_controller::*;
pub use session_event::*;
