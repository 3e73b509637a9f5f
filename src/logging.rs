use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
/// `RUST_LOG` wins over the configured filter when set.
pub fn init(default_filter: &str) {
  let filter = EnvFilter::try_from_default_env()
    .or_else(|_| EnvFilter::try_new(default_filter))
    .unwrap_or_else(|_| EnvFilter::new("info"));

  // A second init (tests, embedding apps) keeps the first subscriber
  let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
