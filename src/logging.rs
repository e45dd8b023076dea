use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when RUST_LOG is not set
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "podium=debug,warn"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Logs go to stderr so table and TSV
/// output on stdout stays clean.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // A second init (tests, repeated calls) is ignored
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_enables_crate_debug() {
        assert!(default_directive(true).contains("podium=debug"));
        assert_eq!(default_directive(false), "warn");
    }

    #[test]
    fn test_directives_parse() {
        for verbose in [true, false] {
            EnvFilter::try_new(default_directive(verbose)).unwrap();
        }
    }
}
