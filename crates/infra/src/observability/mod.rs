//! Tracing subscriber setup
//!
//! Libraries in this workspace only emit `tracing` events; the process that
//! embeds them calls [`init_tracing`] once at startup.

use leadpipe_domain::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured filter directive.
pub const LOG_ENV: &str = "LEADPIPE_LOG";

/// Install the global fmt subscriber.
///
/// `LEADPIPE_LOG` wins over `config.filter`; an unparsable directive falls
/// back to `info`. Returns `false` when a global subscriber was already set,
/// which makes repeated calls harmless.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = build_filter(config);
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.compact().try_init()
    };

    match installed {
        Ok(()) => {
            tracing::debug!(json = config.json, "tracing subscriber installed");
            true
        }
        Err(_) => false,
    }
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_no_op() {
        let config = LoggingConfig::default();
        init_tracing(&config);
        assert!(!init_tracing(&LoggingConfig { json: true, ..config }));
    }

    #[test]
    fn configured_filter_is_used_without_override() {
        if std::env::var(LOG_ENV).is_ok() {
            return;
        }
        let config = LoggingConfig { filter: "leadpipe_core=debug".into(), json: false };
        assert_eq!(build_filter(&config).to_string(), "leadpipe_core=debug");
    }

    #[test]
    fn invalid_directive_falls_back_to_info() {
        if std::env::var(LOG_ENV).is_ok() {
            return;
        }
        let config = LoggingConfig { filter: "leadpipe=loud".into(), json: false };
        assert_eq!(build_filter(&config).to_string(), "info");
    }
}
