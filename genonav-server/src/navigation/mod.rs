//! Coordinate validation, gene navigation and history

mod history;
mod orchestrator;
mod outcome;
mod validator;

pub use history::{NavigationEntry, NavigationHistory};
pub use orchestrator::{NavigationOrchestrator, DEFAULT_WINDOW};
pub use outcome::{NavigationErrorCode, NavigationOutcome};
pub use validator::{validate_coordinates, Rejection};
