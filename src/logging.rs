//! Diagnostic logging on stderr
//!
//! Operator-facing output goes to stdout through `colored`; engine decisions
//! (recovery repairs, checkpoint writes, export triggers) are `tracing`
//! events written here.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::models::constants::LOG_FILTER_ENV;

/// Filter used when `ANNOTRACK_LOG` is unset or unparseable.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "annotrack=debug"
    } else {
        "annotrack=info"
    }
}

fn build_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_new(default_directive(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "annotrack=info");
        assert_eq!(default_directive(true), "annotrack=debug");
    }

    #[test]
    #[serial]
    fn test_env_filter_overrides_default() {
        std::env::set_var(LOG_FILTER_ENV, "annotrack=trace");
        let filter = build_filter(false);
        std::env::remove_var(LOG_FILTER_ENV);

        assert_eq!(filter.to_string(), "annotrack=trace");
    }

    #[test]
    #[serial]
    fn test_unset_env_uses_default() {
        std::env::remove_var(LOG_FILTER_ENV);
        assert_eq!(build_filter(true).to_string(), "annotrack=debug");
    }

    #[test]
    #[serial]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
