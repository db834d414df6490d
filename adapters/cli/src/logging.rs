use env_logger::{Builder, Env};
use log::LevelFilter;

/// Installs the global logger.
///
/// `RUST_LOG` takes precedence; otherwise `verbose` selects debug output
/// over the default info level.
pub(crate) fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    // Fails only when a logger is already installed.
    let _ = Builder::from_env(env).format_timestamp(None).try_init();
}
