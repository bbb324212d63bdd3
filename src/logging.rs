use crate::config::StoreConfig;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

/// Install the global tracing subscriber and route `log` records (sqlx
/// statement logging) through it. Format follows `config.log_format`.
pub fn init_subscriber(config: &StoreConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let result = if config.log_format == "pretty" {
        let subscriber = Registry::default().with(filter).with(fmt::layer().pretty());
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(filter).with(fmt::layer().json());
        tracing::subscriber::set_global_default(subscriber)
    };

    result.expect("Failed to set global default subscriber");

    let _ = tracing_log::LogTracer::init();
}
