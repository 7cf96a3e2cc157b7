pub mod estimates;
pub mod health;

pub use estimates::summarize_estimate;
pub use health::{health_check, metrics_endpoint};
