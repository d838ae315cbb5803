pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "projection")]
pub mod projection;

#[cfg(feature = "prioritization")]
pub mod prioritization;

pub use error::BusinessCaseError;
pub use types::*;

/// Standard result type for all business-case operations
pub type BusinessCaseResult<T> = Result<T, BusinessCaseError>;
