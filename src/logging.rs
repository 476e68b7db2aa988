use log::LevelFilter;
use once_cell::sync::OnceCell;

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Initialize the global logger.
///
/// Respects `RUST_LOG` when set, defaults to `info` otherwise. Safe to call
/// more than once; only the first call installs the logger.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .filter_module("sled", LevelFilter::Warn)
            .try_init()
            .ok();
    });
}
