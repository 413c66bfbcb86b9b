pub mod config;
pub mod controller;
pub mod error;
pub mod metrics;
pub mod registry;

pub use config::{default_cache_key, ControllerConfig, DEFAULT_MAX_CONCURRENCY, DEFAULT_TICK_INTERVAL};
pub use controller::{Clock, Controller, ControllerBuilder, SystemClock};
pub use error::{CheckError, ConfigError};
pub use metrics::ControllerMetrics;
pub use registry::MonitorRegistry;
