pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use error::EvWaterfallError;
pub use types::*;

/// Standard result type for all ev-waterfall operations
pub type EvWaterfallResult<T> = Result<T, EvWaterfallError>;
