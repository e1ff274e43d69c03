//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// README page listing the supported boards.
pub const DEFAULT_SOURCE_URL: &str = "https://github.com/BitMaker-hub/NerdMiner_v2";

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Page that lists the boards and their marketplace links
    #[serde(default = "default_source_url")]
    pub source_url: String,

    /// Proxy URL for the README fetch (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Directory the export file is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Export format
    #[serde(default)]
    pub format: OutputFormat,

    /// Browser session settings
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Per-link timeout profiles
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            proxy: None,
            output_dir: default_output_dir(),
            format: OutputFormat::Xlsx,
            browser: BrowserConfig::default(),
            timeouts: TimeoutsConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("board-prices.toml");
        if local_config.exists() {
            debug!("Found board-prices.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("board-prices").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("BOARD_PRICES_SOURCE_URL") {
            self.source_url = url;
        }

        if let Ok(proxy) = std::env::var("BOARD_PRICES_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(webdriver) = std::env::var("BOARD_PRICES_WEBDRIVER") {
            self.browser.webdriver_url = webdriver;
        }

        if let Ok(headless) = std::env::var("BOARD_PRICES_HEADLESS") {
            if let Ok(h) = headless.parse() {
                self.browser.headless = h;
            }
        }

        if let Ok(dir) = std::env::var("BOARD_PRICES_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }

        self
    }
}

/// WebDriver session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// WebDriver endpoint (chromedriver)
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run Chrome without a visible window
    #[serde(default)]
    pub headless: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    720
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: false,
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

/// Navigation and selector-wait bounds for one price fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutProfile {
    pub navigation_ms: u64,
    pub selector_ms: u64,
}

impl TimeoutProfile {
    pub const fn new(navigation_ms: u64, selector_ms: u64) -> Self {
        Self { navigation_ms, selector_ms }
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn selector(&self) -> Duration {
        Duration::from_millis(self.selector_ms)
    }
}

/// Cold-start and steady-state timeout profiles.
///
/// The first `warmup_count` links absorb browser start-up and cold caches,
/// so they get the generous `cold` profile. Every later link fails fast with
/// the `warm` profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    #[serde(default = "default_warmup_count")]
    pub warmup_count: usize,

    #[serde(default = "default_cold_profile")]
    pub cold: TimeoutProfile,

    #[serde(default = "default_warm_profile")]
    pub warm: TimeoutProfile,
}

fn default_warmup_count() -> usize {
    1
}

fn default_cold_profile() -> TimeoutProfile {
    TimeoutProfile::new(60_000, 60_000)
}

fn default_warm_profile() -> TimeoutProfile {
    TimeoutProfile::new(7_000, 2_000)
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            warmup_count: default_warmup_count(),
            cold: default_cold_profile(),
            warm: default_warm_profile(),
        }
    }
}

impl TimeoutsConfig {
    /// Profile for the link at zero-based `position` in the batch.
    pub fn profile_for(&self, position: usize) -> TimeoutProfile {
        if position < self.warmup_count {
            self.cold
        } else {
            self.warm
        }
    }
}

/// Export format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
    Json,
}

impl OutputFormat {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(OutputFormat::Xlsx),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use: xlsx, csv, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source_url, DEFAULT_SOURCE_URL);
        assert!(config.proxy.is_none());
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.format, OutputFormat::Xlsx);
        assert_eq!(config.browser.webdriver_url, "http://localhost:9515");
        assert!(!config.browser.headless);
        assert_eq!((config.browser.window_width, config.browser.window_height), (1280, 720));
        assert_eq!(config.timeouts.warmup_count, 1);
        assert_eq!(config.timeouts.cold, TimeoutProfile::new(60_000, 60_000));
        assert_eq!(config.timeouts.warm, TimeoutProfile::new(7_000, 2_000));
    }

    #[test]
    fn test_profile_for_first_link_is_cold() {
        let timeouts = TimeoutsConfig::default();
        assert_eq!(timeouts.profile_for(0), timeouts.cold);
        assert_eq!(timeouts.profile_for(1), timeouts.warm);
        assert_eq!(timeouts.profile_for(42), timeouts.warm);
    }

    #[test]
    fn test_profile_for_custom_warmup() {
        let timeouts = TimeoutsConfig { warmup_count: 3, ..TimeoutsConfig::default() };
        assert_eq!(timeouts.profile_for(2), timeouts.cold);
        assert_eq!(timeouts.profile_for(3), timeouts.warm);

        let no_warmup = TimeoutsConfig { warmup_count: 0, ..TimeoutsConfig::default() };
        assert_eq!(no_warmup.profile_for(0), no_warmup.warm);
    }

    #[test]
    fn test_timeout_profile_durations() {
        let profile = TimeoutProfile::new(7_000, 2_000);
        assert_eq!(profile.navigation(), Duration::from_secs(7));
        assert_eq!(profile.selector(), Duration::from_secs(2));
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("xlsx".parse::<OutputFormat>().unwrap(), OutputFormat::Xlsx);
        assert_eq!("EXCEL".parse::<OutputFormat>().unwrap(), OutputFormat::Xlsx);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);

        let err = "table".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Unknown format"));
        assert!(err.contains("xlsx, csv, json"));
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Xlsx.to_string(), "xlsx");
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_output_format_serde() {
        let json = serde_json::to_string(&OutputFormat::Csv).unwrap();
        assert_eq!(json, "\"csv\"");

        let parsed: OutputFormat = serde_json::from_str("\"xlsx\"").unwrap();
        assert_eq!(parsed, OutputFormat::Xlsx);
    }

    #[test]
    fn test_config_from_toml_partial() {
        let toml = r#"
            format = "csv"

            [browser]
            headless = true

            [timeouts]
            warmup_count = 2
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.format, OutputFormat::Csv);
        assert!(config.browser.headless);
        assert_eq!(config.browser.webdriver_url, "http://localhost:9515");
        assert_eq!(config.timeouts.warmup_count, 2);
        assert_eq!(config.timeouts.warm, TimeoutProfile::new(7_000, 2_000));
        assert_eq!(config.source_url, DEFAULT_SOURCE_URL);
    }

    #[test]
    fn test_config_from_toml_all_fields() {
        let toml = r#"
            source_url = "https://github.com/example/boards"
            proxy = "socks5://localhost:1080"
            output_dir = "/tmp/prices"
            format = "json"

            [browser]
            webdriver_url = "http://localhost:4444"
            headless = true
            window_width = 1920
            window_height = 1080

            [timeouts]
            warmup_count = 2
            cold = { navigation_ms = 90000, selector_ms = 45000 }
            warm = { navigation_ms = 10000, selector_ms = 3000 }
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.source_url, "https://github.com/example/boards");
        assert_eq!(config.proxy, Some("socks5://localhost:1080".to_string()));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/prices"));
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.browser.webdriver_url, "http://localhost:4444");
        assert_eq!(config.browser.window_width, 1920);
        assert_eq!(config.timeouts.cold, TimeoutProfile::new(90_000, 45_000));
        assert_eq!(config.timeouts.warm, TimeoutProfile::new(10_000, 3_000));
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            source_url = "https://github.com/example/boards"
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.source_url, "https://github.com/example/boards");
    }

    #[test]
    fn test_config_from_file_not_found() {
        let result = Config::from_file("/nonexistent/path/config.toml");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let err = Config::from_file(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [timeouts]
            warmup_count = 4
            "#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.timeouts.warmup_count, 4);
    }

    #[test]
    fn test_config_with_env() {
        let keys = [
            "BOARD_PRICES_SOURCE_URL",
            "BOARD_PRICES_PROXY",
            "BOARD_PRICES_WEBDRIVER",
            "BOARD_PRICES_HEADLESS",
            "BOARD_PRICES_OUTPUT_DIR",
        ];
        let originals: Vec<_> = keys.iter().map(|k| std::env::var(k).ok()).collect();

        std::env::set_var("BOARD_PRICES_SOURCE_URL", "https://github.com/example/boards");
        std::env::set_var("BOARD_PRICES_PROXY", "http://proxy:8080");
        std::env::set_var("BOARD_PRICES_WEBDRIVER", "http://chromedriver:9515");
        std::env::set_var("BOARD_PRICES_HEADLESS", "not_a_bool");
        std::env::set_var("BOARD_PRICES_OUTPUT_DIR", "/tmp/out");

        let config = Config::default().with_env();
        assert_eq!(config.source_url, "https://github.com/example/boards");
        assert_eq!(config.proxy, Some("http://proxy:8080".to_string()));
        assert_eq!(config.browser.webdriver_url, "http://chromedriver:9515");
        // Invalid values are ignored
        assert!(!config.browser.headless);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));

        std::env::set_var("BOARD_PRICES_HEADLESS", "true");
        assert!(Config::default().with_env().browser.headless);

        for (key, original) in keys.iter().zip(originals) {
            match original {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}
