use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "shopping_list=debug,sqlx=warn";

/// Installs the global subscriber. `RUST_LOG` picks the filter and
/// `LOG_FORMAT=json` switches to JSON lines.
pub fn init() {
    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::new(env_filter));
    let res = if json_logs {
        builder.with_target(false).json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = res {
        tracing::warn!(error = %e, "tracing subscriber already installed");
    }
}
