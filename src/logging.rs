//! Logger initialization for host and Android builds

use log::LevelFilter;

use crate::config::HfpConfig;

/// Inits logging for Android
#[cfg(target_os = "android")]
pub fn init_logging_with_config(config: &HfpConfig) {
    android_logger::init_once(
        android_logger::Config::default().with_tag("bt_hfp").with_max_level(config.log_level),
    );
    log::set_max_level(config.log_level)
}

/// Inits logging for host
#[cfg(not(target_os = "android"))]
pub fn init_logging_with_config(config: &HfpConfig) {
    env_logger::Builder::new()
        .filter(None, config.log_level)
        .parse_default_env()
        .try_init()
        .ok();
    log::set_max_level(config.log_level)
}

/// Inits logging at the default level. Calling this more than once is harmless.
pub fn init_logging() {
    init_logging_with_config(&HfpConfig::default())
}

/// Map a system-property style log level ("debug", "4", ...) onto a filter
pub fn parse_log_level(value: &str) -> Option<LevelFilter> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" | "0" => Some(LevelFilter::Off),
        "fatal" | "error" | "1" => Some(LevelFilter::Error),
        "warn" | "warning" | "2" => Some(LevelFilter::Warn),
        "notice" | "info" | "3" => Some(LevelFilter::Info),
        "debug" | "4" => Some(LevelFilter::Debug),
        "verbose" | "trace" | "5" => Some(LevelFilter::Trace),
        _ => None,
    }
}
