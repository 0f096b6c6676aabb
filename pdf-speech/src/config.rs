//! pdf-speech configuration management.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

// Defaults matching the conversion pipeline
const DEFAULT_RATE: u32 = 175;
const DEFAULT_VOLUME: f32 = 1.0;
const DEFAULT_CHUNK_SIZE: usize = 1500;
const DEFAULT_RETRIES: u32 = 3;
const DEFAULT_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfSpeechConfig {
    /// Default voice (index into the voice list, or a voice name)
    #[serde(default)]
    pub voice: Option<String>,

    /// Speech rate in words per minute
    #[serde(default = "default_rate")]
    pub rate: u32,

    /// Volume (0.0-1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Max characters per TTS chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Attempts per chunk before giving up on a page
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Pause after a failed attempt, in milliseconds
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Output folder for WAV files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// File name prefix for page outputs
    #[serde(default = "default_page_prefix")]
    pub page_prefix: String,

    /// espeak-ng program name or path. None means look up on PATH.
    #[serde(default)]
    pub espeak_program: Option<String>,
}

fn default_rate() -> u32 {
    DEFAULT_RATE
}

fn default_volume() -> f32 {
    DEFAULT_VOLUME
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}

fn default_backoff_ms() -> u64 {
    DEFAULT_BACKOFF_MS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("tts_output")
}

fn default_page_prefix() -> String {
    "page".to_string()
}

impl Default for PdfSpeechConfig {
    fn default() -> Self {
        Self {
            voice: None,
            rate: default_rate(),
            volume: default_volume(),
            chunk_size: default_chunk_size(),
            retries: default_retries(),
            backoff_ms: default_backoff_ms(),
            output_dir: default_output_dir(),
            page_prefix: default_page_prefix(),
            espeak_program: None,
        }
    }
}

impl PdfSpeechConfig {
    /// Get the config file path: ~/.config/cli-programs/pdf-speech.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("pdf-speech.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: PdfSpeechConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PdfSpeechConfig::default();
        assert_eq!(config.rate, 175);
        assert_eq!(config.volume, 1.0);
        assert_eq!(config.chunk_size, 1500);
        assert_eq!(config.retries, 3);
        assert_eq!(config.backoff_ms, 1000);
        assert_eq!(config.output_dir, PathBuf::from("tts_output"));
        assert_eq!(config.page_prefix, "page");
        assert!(config.voice.is_none());
        assert!(config.espeak_program.is_none());
    }

    #[test]
    fn test_config_path() {
        let path = PdfSpeechConfig::config_path();
        assert!(path.is_ok());
        let path = path.unwrap();
        assert!(path.ends_with("cli-programs/pdf-speech.toml"));
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
voice = "en-us"
rate = 150
volume = 0.8
chunk_size = 900
retries = 5
backoff_ms = 250
output_dir = "/tmp/audio"
page_prefix = "book"
espeak_program = "/usr/local/bin/espeak-ng"
"#;
        let config: PdfSpeechConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.voice, Some("en-us".to_string()));
        assert_eq!(config.rate, 150);
        assert_eq!(config.volume, 0.8);
        assert_eq!(config.chunk_size, 900);
        assert_eq!(config.retries, 5);
        assert_eq!(config.backoff_ms, 250);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/audio"));
        assert_eq!(config.page_prefix, "book");
        assert_eq!(
            config.espeak_program.as_deref(),
            Some("/usr/local/bin/espeak-ng")
        );
    }

    #[test]
    fn test_parse_empty_config() {
        let config: PdfSpeechConfig = toml::from_str("").unwrap();
        assert_eq!(config.rate, 175);
        assert_eq!(config.chunk_size, 1500);
        assert_eq!(config.page_prefix, "page");
    }

    #[test]
    fn test_round_trip() {
        let mut config = PdfSpeechConfig::default();
        config.voice = Some("2".to_string());
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: PdfSpeechConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.voice, Some("2".to_string()));
        assert_eq!(parsed.rate, config.rate);
    }
}
