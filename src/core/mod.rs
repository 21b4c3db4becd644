//! Core types shared by every pipeline.

mod driver;
mod state;
mod target;

pub use driver::{BuildMode, ModeFlags};
pub use state::{is_serving, is_shutdown, register_server, set_serving, setup_shutdown_handler};
pub use target::Target;
