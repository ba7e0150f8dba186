use log::LevelFilter;
use simplelog::*;
use std::fs::File;
use std::path::PathBuf;

/// Logging configuration for the Meetup client.
///
/// The terminal is in raw mode while the client runs, so everything goes to
/// a file rather than stderr.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Master switch to enable/disable all logging
    pub enabled: bool,
    /// Path to the log file
    pub log_file: PathBuf,
    /// Whether to clear the log file on startup
    pub clear_on_startup: bool,
    /// Feature flags for specific logging categories
    pub features: LogFeatures,
    /// Overall log level
    pub level: LevelFilter,
}

/// Feature flags for specific logging categories
#[derive(Debug, Clone)]
pub struct LogFeatures {
    /// Comment page requests, completions and discards
    pub pagination: bool,
    /// Carousel index transitions
    pub carousel: bool,
    /// Local comment inserts, deletes and confirmations
    pub mutations: bool,
    /// Raw key and mouse events
    pub gestures: bool,
    /// Rendering operations
    pub rendering: bool,
    /// General debug messages
    pub general: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_file: PathBuf::from("meetup_debug.log"),
            clear_on_startup: true,
            features: LogFeatures::default(),
            level: LevelFilter::Info,
        }
    }
}

impl Default for LogFeatures {
    fn default() -> Self {
        Self {
            pagination: true,
            carousel: true,
            mutations: true,
            gestures: false,
            rendering: false,
            general: true,
        }
    }
}

impl LogConfig {
    /// Create a new log configuration with all features disabled
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Create a minimal log configuration (only errors and warnings)
    pub fn minimal() -> Self {
        Self {
            enabled: true,
            level: LevelFilter::Warn,
            features: LogFeatures {
                pagination: false,
                carousel: false,
                mutations: false,
                gestures: false,
                rendering: false,
                general: false,
            },
            ..Default::default()
        }
    }

    /// Create a verbose log configuration (all features enabled)
    pub fn verbose() -> Self {
        Self {
            enabled: true,
            level: LevelFilter::Trace,
            features: LogFeatures {
                pagination: true,
                carousel: true,
                mutations: true,
                gestures: true,
                rendering: true,
                general: true,
            },
            ..Default::default()
        }
    }
}

/// Initialize the logging system with the given configuration
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    if !config.enabled {
        let _ = WriteLogger::init(LevelFilter::Off, Config::default(), std::io::sink());
        return Ok(());
    }

    if config.clear_on_startup {
        let _ = File::create(&config.log_file)?;
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|builder| builder)
        .build();

    WriteLogger::init(config.level, log_config, log_file)?;

    log::info!(
        "Logging initialized: file={}, level={:?}",
        config.log_file.display(),
        config.level
    );
    log::debug!("Log features: {:?}", config.features);

    Ok(())
}

/// Macro for logging pagination activity
#[macro_export]
macro_rules! log_pagination {
    ($config:expr, $($arg:tt)*) => {
        if $config.enabled && $config.features.pagination {
            log::debug!(target: "pagination", $($arg)*);
        }
    };
}

/// Macro for logging carousel transitions
#[macro_export]
macro_rules! log_carousel {
    ($config:expr, $($arg:tt)*) => {
        if $config.enabled && $config.features.carousel {
            log::debug!(target: "carousel", $($arg)*);
        }
    };
}

/// Macro for logging local comment mutations
#[macro_export]
macro_rules! log_mutation {
    ($config:expr, $($arg:tt)*) => {
        if $config.enabled && $config.features.mutations {
            log::debug!(target: "mutations", $($arg)*);
        }
    };
}

/// Macro for logging key and mouse events
#[macro_export]
macro_rules! log_gesture {
    ($config:expr, $($arg:tt)*) => {
        if $config.enabled && $config.features.gestures {
            log::debug!(target: "gestures", $($arg)*);
        }
    };
}

/// Macro for logging rendering operations
#[macro_export]
macro_rules! log_rendering {
    ($config:expr, $($arg:tt)*) => {
        if $config.enabled && $config.features.rendering {
            log::debug!(target: "rendering", $($arg)*);
        }
    };
}

/// Macro for general debug logging
#[macro_export]
macro_rules! log_debug {
    ($config:expr, $($arg:tt)*) => {
        if $config.enabled && $config.features.general {
            log::debug!(target: "general", $($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_turns_off_every_category() {
        let config = LogConfig::minimal();
        assert_eq!(config.level, LevelFilter::Warn);
        assert!(!config.features.pagination);
        assert!(!config.features.general);
    }

    #[test]
    fn test_verbose_turns_on_gestures() {
        let config = LogConfig::verbose();
        assert!(config.features.gestures);
        assert!(config.features.rendering);
        assert_eq!(config.level, LevelFilter::Trace);
    }

    #[test]
    fn test_macros_respect_disabled_config() {
        // Only checks that the macros expand against a LogConfig
        let config = LogConfig::disabled();
        log_pagination!(config, "page {}", 1);
        log_carousel!(config, "index {}", 0);
        log_mutation!(config, "insert");
        log_gesture!(config, "key");
        log_rendering!(config, "frame");
        log_debug!(config, "general");
    }
}
