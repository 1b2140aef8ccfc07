mod app;
mod config;
mod metrics;
mod plot;
mod remote;
mod validation;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use metrics::MetricsError;
pub use plot::PlotError;
pub use remote::RemoteError;
pub use validation::ValidationError;
