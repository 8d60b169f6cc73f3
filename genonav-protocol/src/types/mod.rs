pub mod command;
pub mod location;
pub mod model;
pub mod tool;

pub use command::*;
pub use location::*;
pub use model::*;
pub use tool::*;
