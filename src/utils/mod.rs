//! Utility modules for the lifecycle tool.

pub mod error;
pub mod explorer;
mod logging;

pub use error::{Error, Result};
pub use explorer::Cluster;
pub use logging::init_logging;
