pub mod catalog;
pub mod config;
pub mod contract;
pub mod error;
pub mod guidance;
pub mod model;
pub mod prompt;
pub mod types;

pub use error::{GuidanceError, GuidanceResult};
pub use types::*;
