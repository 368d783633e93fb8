//! Data models

pub mod features;
pub mod prediction;
pub mod prediction_log;

pub use features::*;
pub use prediction::*;
pub use prediction_log::*;
