// Public API for integration tests and potential library usage

pub mod broadcast;
pub mod error;
pub mod prompt;
pub mod protocol;
pub mod state;
pub mod types;
pub mod ws;
