pub mod engine;
pub mod error;
pub mod records;
pub mod results;
pub mod thresholds;

pub use error::GateError;
