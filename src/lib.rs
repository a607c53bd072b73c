// Library surface for the engine, adapters and headless/integration tests.
// Terminal drawing stays in the binary.
pub mod app_dirs;
pub mod board;
pub mod config;
pub mod contact;
pub mod input;
pub mod logging;
pub mod palette;
pub mod render;
pub mod runtime;
pub mod selector;
pub mod timer;
pub mod tracker;

pub use contact::{ContactId, Position};
pub use tracker::{RoundState, Tracker};
