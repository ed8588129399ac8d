use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_archive_url")]
    pub archive_url: String,
    /// Name of the environment variable holding the API credential.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// First day the imagery archive has data for (`YYYY-MM-DD`).
    #[serde(default = "default_earliest_date")]
    pub earliest_date: String,
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_font_path")]
    pub font_path: PathBuf,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Caption anchor is `(width - caption_offset_x, height - caption_offset_y)`.
    #[serde(default = "default_caption_offset_x")]
    pub caption_offset_x: u32,
    #[serde(default = "default_caption_offset_y")]
    pub caption_offset_y: u32,
    /// Wrap width is `width - caption_margin`.
    #[serde(default = "default_caption_margin")]
    pub caption_margin: u32,
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f32,
    /// Per-frame display time in hundredths of a second.
    #[serde(default = "default_frame_delay_cs")]
    pub frame_delay_cs: u16,
    #[serde(default)]
    pub loop_mode: LoopMode,
}

/// How the NETSCAPE loop extension of the animation is filled in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopMode {
    /// Loop count equals the number of frames.
    #[default]
    FrameCount,
    Infinite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_gif_path")]
    pub gif_path: PathBuf,
    /// Where the most recently downloaded raw frame is kept. Empty disables it.
    #[serde(default = "default_last_frame_path")]
    pub last_frame_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            archive_url: default_archive_url(),
            api_key_env: default_api_key_env(),
            earliest_date: default_earliest_date(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_path: default_font_path(),
            font_size: default_font_size(),
            caption_offset_x: default_caption_offset_x(),
            caption_offset_y: default_caption_offset_y(),
            caption_margin: default_caption_margin(),
            line_spacing: default_line_spacing(),
            frame_delay_cs: default_frame_delay_cs(),
            loop_mode: LoopMode::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            gif_path: default_gif_path(),
            last_frame_path: default_last_frame_path(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        let config = Self::parse(&content)?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read the API credential from the environment variable named in `[catalog]`.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        match std::env::var(&self.catalog.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey(self.catalog.api_key_env.clone())),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("there is no {0} set in the environment")]
    MissingApiKey(String),
}

// Default value functions
fn default_base_url() -> String {
    "https://api.nasa.gov/EPIC/api/natural".into()
}
fn default_archive_url() -> String {
    "https://api.nasa.gov/EPIC/archive/natural".into()
}
fn default_api_key_env() -> String {
    "API_KEY".into()
}
fn default_earliest_date() -> String {
    "2015-06-13".into()
}
fn default_max_concurrent_fetches() -> usize {
    8
}
fn default_font_path() -> PathBuf {
    PathBuf::from("assets/fonts/DejaVuSans.ttf")
}
fn default_font_size() -> f32 {
    100.0
}
fn default_caption_offset_x() -> u32 {
    500
}
fn default_caption_offset_y() -> u32 {
    80
}
fn default_caption_margin() -> u32 {
    60
}
fn default_line_spacing() -> f32 {
    1.5
}
fn default_frame_delay_cs() -> u16 {
    50
}
fn default_gif_path() -> PathBuf {
    PathBuf::from("earth.gif")
}
fn default_last_frame_path() -> PathBuf {
    PathBuf::from("earth.png")
}
fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}
