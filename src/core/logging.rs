//! Tracing setup for the binary
//!
//! Logs go to stderr so records printed on stdout stay machine readable.

use tracing_subscriber::{fmt, EnvFilter};

/// Filter directive for a plain level, or `level` itself if it already is one
pub fn filter_directive(level: &str) -> String {
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("tender={level},warn")
    }
}

/// Install the global subscriber; later calls are ignored
pub fn init(level: &str) {
    let _ = fmt()
        .with_env_filter(EnvFilter::new(filter_directive(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
