// Re-export all model types from submodules
mod common;
mod packages;
mod rankings;
mod stats;

pub use common::*;
pub use packages::*;
pub use rankings::*;
pub use stats::*;
