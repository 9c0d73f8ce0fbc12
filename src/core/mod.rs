//! Core types - pure abstractions shared across the pipeline.

mod mode;
mod outcome;
mod state;

pub use mode::BuildMode;
pub use outcome::TaskOutcome;
pub use state::{
    is_serving, is_shutdown, register_server, set_serving, setup_shutdown_handler,
};
