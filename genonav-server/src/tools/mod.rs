//! Navigation tools exposed to the model
//!
//! Three tools are declared: coordinate navigation, gene navigation and
//! history lookup. Calls are executed sequentially in request order and
//! every outcome is rendered as text.

mod definitions;
mod dispatcher;
mod error;
mod protocol;

pub use definitions::{
    get_tool_definitions, is_known_tool, GET_NAVIGATION_HISTORY, NAVIGATE_BY_COORDINATE,
    NAVIGATE_BY_GENE,
};
pub use dispatcher::{format_thousands, ToolDispatcher, DEFAULT_HISTORY_LIMIT};
pub use error::ToolError;
pub use protocol::{NavigationTarget, Tool, ToolInvocationRequest, ToolInvocationResult};
