pub mod error;
pub mod executor;

pub use error::ToolError;
pub use executor::{RealExecutor, ToolExecutor};
