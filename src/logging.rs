//! Logging setup
//!
//! Diagnostics go to stderr through `tracing`; reports go to stdout.

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter for a `-v` count
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "coursesync=warn",
        1 => "coursesync=info",
        2 => "coursesync=debug",
        _ => "coursesync=trace",
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `verbosity`.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(0), "coursesync=warn");
        assert_eq!(default_filter(2), "coursesync=debug");
        assert_eq!(default_filter(9), "coursesync=trace");
    }

    #[test]
    fn test_init_twice() {
        init(0);
        init(1);
    }
}
