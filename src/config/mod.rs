mod structs;

pub use structs::*;

use once_cell::sync::OnceCell;

static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// Load configuration from the environment.
///
/// Repeat calls keep the first loaded configuration.
pub fn init_config() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::from_env)
}
