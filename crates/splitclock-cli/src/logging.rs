//! Logging setup for the CLI.
//!
//! Logs go to stderr so JSON on stdout stays machine-readable. The filter
//! comes from `SPLITCLOCK_LOG` (standard `EnvFilter` directives) and
//! defaults to `warn`. Set `SPLITCLOCK_LOG=splitclock_core=debug` to trace
//! engine transitions.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

pub fn init() {
    let filter = EnvFilter::try_from_env("SPLITCLOCK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .init();
}
