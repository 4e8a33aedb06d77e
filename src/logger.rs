use crate::config::Config;
use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::env;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

static STUDIO_LOGGER: Lazy<StudioLogger> = Lazy::new(StudioLogger::default);

pub fn init() -> Result<(), String> {
    init_with_config(LoggerConfig::from_env())
}

pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let level = config.level;
    STUDIO_LOGGER.replace_config(config);

    log::set_logger(&*STUDIO_LOGGER).map_err(|e| format!("Failed to set logger: {:?}", e))?;
    log::set_max_level(level);
    Ok(())
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Trace => Color::Cyan,
        Level::Debug => Color::Blue,
        Level::Info => Color::Green,
        Level::Warn => Color::Yellow,
        Level::Error => Color::Red,
    }
}

/// One line of structured output, as written in JSON mode.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    fn from_record(record: &Record) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: LevelFilter,
    pub colors: bool,
    pub show_target: bool,
    pub json: bool,
    pub timestamp_format: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl LoggerConfig {
    /// Colored console lines at debug level.
    pub fn development() -> Self {
        Self {
            level: LevelFilter::Debug,
            colors: true,
            show_target: true,
            json: false,
            timestamp_format: "%H:%M:%S%.3f".to_string(),
        }
    }

    /// One JSON object per line at info level.
    pub fn production() -> Self {
        Self {
            level: LevelFilter::Info,
            colors: false,
            show_target: true,
            json: true,
            timestamp_format: "%Y-%m-%dT%H:%M:%S%.3fZ".to_string(),
        }
    }

    /// `APP_ENV=production` selects [`LoggerConfig::production`]; `RUST_LOG`
    /// overrides the level when it names one.
    pub fn from_env() -> Self {
        let config = match env::var("APP_ENV").as_deref() {
            Ok("production") => Self::production(),
            _ => Self::development(),
        };

        match env::var("RUST_LOG").ok().as_deref().and_then(parse_level) {
            Some(level) => config.with_level(level),
            None => config,
        }
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.colors = enabled;
        self
    }

    pub fn with_json(mut self, enabled: bool) -> Self {
        self.json = enabled;
        self
    }
}

/// Accepts plain level names such as `debug` or `WARN`.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.trim() {
        n if n.eq_ignore_ascii_case("warning") => Some(LevelFilter::Warn),
        n => LevelFilter::from_str(n).ok(),
    }
}

#[derive(Default)]
pub struct StudioLogger {
    config: Mutex<LoggerConfig>,
}

impl StudioLogger {
    pub fn replace_config(&self, new_config: LoggerConfig) {
        if let Ok(mut config) = self.config.lock() {
            *config = new_config;
        }
    }

    fn render(entry: &LogEntry, config: &LoggerConfig) -> String {
        if config.json {
            return serde_json::to_string(entry).unwrap_or_default();
        }

        let timestamp = entry.timestamp.format(&config.timestamp_format).to_string();
        let target = if config.show_target {
            format!("{} ", entry.target)
        } else {
            String::new()
        };

        if !config.colors {
            return format!("{} {:<5} {}{}", timestamp, entry.level, target, entry.message);
        }

        format!(
            "{} {} {}{}",
            timestamp.dimmed(),
            format!("{:<5}", entry.level).color(level_color(entry.level)).bold(),
            target.bright_blue(),
            entry.message
        )
    }
}

impl log::Log for StudioLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.config
            .lock()
            .map(|config| metadata.level() <= config.level)
            .unwrap_or(true)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry::from_record(record);
        if let Ok(config) = self.config.lock() {
            let line = Self::render(&entry, &config);
            if entry.level <= Level::Warn {
                eprintln!("{}", line);
            } else {
                println!("{}", line);
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }
}

/// Logs how long a named step took when dropped.
pub struct Timer {
    start: Instant,
    label: String,
}

impl Timer {
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::debug!("{} took {}ms", self.label, self.elapsed().as_millis());
    }
}

pub fn timer(label: impl Into<String>) -> Timer {
    Timer {
        start: Instant::now(),
        label: label.into(),
    }
}

pub fn log_startup_info(app_name: &str, version: &str, config: &Config) {
    log::info!("Starting {} v{}", app_name, version);
    log::info!("Listening on http://{}:{}", config.host, config.port);
}

/// Reports which providers are enabled. Key values are never logged.
pub fn log_config_info(config: &Config) {
    let flag = |enabled: bool| if enabled { "enabled" } else { "disabled" };
    log::info!(
        "fal (primary): {} at {}",
        flag(config.fal.is_configured()),
        config.fal.base_url
    );
    log::info!(
        "openai (secondary): {} at {}",
        flag(config.openai.is_configured()),
        config.openai.base_url
    );
    log::info!("provider timeout: {}s", config.request_timeout.as_secs());
    if !config.has_any_provider() {
        log::warn!("No FAL_KEY or OPENAI_API_KEY set; generation requests will fail");
    }
}
