//! Log output of the accompanying binaries.
//!
//! Logs go to stderr so that stdout stays machine readable.
//! Verbosity follows `RUST_LOG` and defaults to `info`.
//! At `debug` and above, the acquisition run and each frame
//! log their busy and idle time when they close.
use tracing_subscriber::prelude::*;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    EnvFilter,
};

fn span_events(filter: &EnvFilter) -> FmtSpan {
    let directives = filter.to_string();
    if directives.contains("debug") || directives.contains("trace") {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let events = span_events(&filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_timer(fmt::time::uptime())
                .with_span_events(events),
        )
        .init();
}
