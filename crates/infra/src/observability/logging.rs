//! Tracing subscriber setup

use launder_domain::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Output goes to
/// stderr, as JSON lines when `config.json` is set. Subsequent calls are
/// no-ops.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = build_filter(&config.level);

    if config.json {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .try_init();
    }
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_a_no_op() {
        let config = LoggingConfig::default();
        init_tracing(&config);
        init_tracing(&LoggingConfig { level: "debug".into(), json: true });
        tracing::info!("still logging after second init");
    }

    #[test]
    fn invalid_level_falls_back_to_info() {
        let filter = build_filter("not a [valid directive");
        assert!(!filter.to_string().is_empty());
    }
}
