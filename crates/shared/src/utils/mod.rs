mod logs;
mod metrics;
mod otel;
mod shutdown;
mod tracer;

pub use self::logs::{LoggerOptions, init_logger};
pub use self::metrics::{Method, Metrics, Status};
pub use self::otel::{Telemetry, TracingContext};
pub use self::shutdown::shutdown_signal;
pub use self::tracer::ServiceTracer;
