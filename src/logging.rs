use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "ORDERGRID_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Pick the filter: `ORDERGRID_LOG`, then the configured directive, then `warn`.
/// An unparsable directive is skipped with a warning.
fn build_filter(configured: Option<&str>, warnings: &mut Vec<String>) -> EnvFilter {
    if let Ok(directive) = std::env::var(LOG_ENV) {
        match EnvFilter::try_new(&directive) {
            Ok(filter) => return filter,
            Err(err) => warnings.push(format!("Ignoring {}={}: {}", LOG_ENV, directive, err)),
        }
    }
    if let Some(directive) = configured {
        match EnvFilter::try_new(directive) {
            Ok(filter) => return filter,
            Err(err) => warnings.push(format!("Ignoring log_filter {}: {}", directive, err)),
        }
    }
    EnvFilter::new(DEFAULT_FILTER)
}

/// Install the global subscriber, writing to stderr so stdout stays clean
/// for command output.
pub fn init(configured: Option<&str>) -> Vec<String> {
    let mut warnings = Vec::new();
    let filter = build_filter(configured, &mut warnings);
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if let Err(err) = result {
        warnings.push(format!("Logging not initialised: {}", err));
    }
    warnings
}
