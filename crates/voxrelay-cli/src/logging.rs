//! Tracing subscriber setup from the `logging` config section.

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use voxrelay_core::config::LoggingConfig;

/// Filter directives: `--verbose` beats `logging.level`, per-crate filters
/// are appended after the base level.
fn filter_directives(config: &LoggingConfig, verbose: bool) -> String {
    let level = if verbose {
        "debug"
    } else {
        config.level.as_deref().unwrap_or("info")
    };

    std::iter::once(level.to_string())
        .chain(config.filters.iter().cloned())
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber. `RUST_LOG` overrides the config when set.
pub fn init(config: Option<&LoggingConfig>, verbose: bool) -> anyhow::Result<()> {
    let config = config.cloned().unwrap_or_else(|| LoggingConfig {
        format: "plain".into(),
        output: "stderr".into(),
        ..LoggingConfig::default()
    });

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) if !verbose => filter,
        _ => EnvFilter::try_new(filter_directives(&config, verbose))?,
    };

    let writer = match config.output.as_str() {
        "stdout" => BoxMakeWriter::new(std::io::stdout),
        _ => BoxMakeWriter::new(std::io::stderr),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);

    let result = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(level: Option<&str>, filters: &[&str]) -> LoggingConfig {
        LoggingConfig {
            format: "plain".into(),
            level: level.map(str::to_string),
            filters: filters.iter().map(|f| f.to_string()).collect(),
            output: "stderr".into(),
        }
    }

    #[test]
    fn test_default_level_is_info() {
        assert_eq!(filter_directives(&config(None, &[]), false), "info");
    }

    #[test]
    fn test_verbose_overrides_level() {
        assert_eq!(filter_directives(&config(Some("warn"), &[]), true), "debug");
    }

    #[test]
    fn test_filters_are_appended() {
        let directives = filter_directives(
            &config(Some("warn"), &["voxrelay_gateway=debug", "tower_http=trace"]),
            false,
        );
        assert_eq!(directives, "warn,voxrelay_gateway=debug,tower_http=trace");
        assert!(EnvFilter::try_new(directives).is_ok());
    }
}
