mod calculator;
mod error;
mod types;

pub use calculator::CalculatorService;
pub use error::ServiceError;
pub use types::{ServiceOptions, ServiceState, ServiceStatus};
