use crate::layer::DbLogLayer;
use crate::logger::AsyncDbLogger;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the global `tracing` setup.
///
/// **Fields**
/// - `max_level`: most verbose level forwarded to the database.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   stacked on top of [`DbLogLayer`] so events are also printed, including
///   the logger's own worker diagnostics.
#[derive(Clone, Debug)]
pub struct TracingConfig {
    pub max_level: Level,
    pub enable_stdout: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            max_level: Level::INFO,
            enable_stdout: true,
        }
    }
}

/// Error returned when the global subscriber cannot be installed.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install a global `tracing` subscriber that forwards events to `logger`.
///
/// **Parameters**
/// - `logger`: a started [`AsyncDbLogger`]; the layer keeps a clone.
/// - `config`: [`TracingConfig`] controlling level filter and stdout output.
///
/// **Effects**
///
/// Installs a [`Registry`] combined with [`DbLogLayer`] as the global
/// default subscriber, so all `tracing` events in the process are observed
/// by the layer.
pub fn init_tracing_with_config(
    logger: &AsyncDbLogger,
    config: TracingConfig,
) -> Result<(), InitError> {
    let layer = DbLogLayer::with_max_level(logger.clone(), config.max_level);

    // The two subscriber shapes have different types, so each branch
    // installs its own.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

/// Initialize tracing with sensible defaults.
///
/// Equivalent to calling [`init_tracing_with_config`] with
/// [`TracingConfig::default`].
pub fn init_tracing(logger: &AsyncDbLogger) -> Result<(), InitError> {
    init_tracing_with_config(logger, TracingConfig::default())
}
