use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogFormat, LoggingConfig};

/// Level used when `RUST_LOG` is unset: the configured one, raised by `-v`.
fn default_directive(cfg: &LoggingConfig, verbose: u8) -> &str {
    match verbose {
        0 => cfg.level.as_str(),
        1 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber.
///
/// # Errors
/// Fails when a subscriber is already installed.
pub fn init_logging(cfg: &LoggingConfig, verbose: u8) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(cfg, verbose)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (text, json) = match cfg.format {
        LogFormat::Text => (Some(tracing_subscriber::fmt::layer().compact()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_the_level() {
        let cfg = LoggingConfig {
            level: "warn".to_owned(),
            format: LogFormat::Text,
        };
        assert_eq!(default_directive(&cfg, 0), "warn");
        assert_eq!(default_directive(&cfg, 1), "debug");
        assert_eq!(default_directive(&cfg, 3), "trace");
    }
}
