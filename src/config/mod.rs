mod loader;
mod scope;

pub use loader::{load_config, CaptureConfig, CaptureProfileConfig, LoadedConfig, CONFIG_FILE_NAME};
pub use scope::{
    normalize_origin, CaptureSettings, ScopeBuilder, ScopeConfig, ScopeOverrides,
};
