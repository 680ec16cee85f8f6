use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins when set and valid; otherwise the configured level, then `info`.
pub fn env_filter(rust_log: Option<&str>, log_level: &str) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(log_level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
