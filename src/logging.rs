use tracing::{info_span, Span};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Initialize the global tracing subscriber.
///
/// Verbosity comes from RUST_LOG when set, otherwise from LOG_LEVEL,
/// defaulting to `info`. Setting LOG_FORMAT=json switches to the JSON
/// formatter so each record is one structured line.
pub fn init() {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_writer(std::io::stderr);

    if json_format() {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn env_filter() -> EnvFilter {
    if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() {
        return EnvFilter::from_default_env();
    }
    match std::env::var("LOG_LEVEL") {
        Ok(level) => EnvFilter::new(level.to_lowercase()),
        Err(_) => EnvFilter::new("info"),
    }
}

fn json_format() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Root span carrying a fresh run id. The whole invocation runs inside it
/// so every record can be correlated back to a single run.
pub fn run_span() -> Span {
    info_span!("run", run_id = %Uuid::new_v4())
}
