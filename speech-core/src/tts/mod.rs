//! TTS backend trait, engine factory, and voice settings.

pub mod espeak;
pub mod mock;
mod retry;

pub use espeak::{EspeakBackend, EspeakFactory};
pub use mock::{MockFactory, MockFailure};
pub use retry::{RetryPolicy, SynthesisClient};

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;

/// Voice selection for an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Voice {
    /// Position in the engine's voice list
    Index(usize),
    /// Engine-specific voice identifier
    Name(String),
}

impl Voice {
    /// Parse a voice argument: digits select by index, anything else by name.
    pub fn parse(s: &str) -> Self {
        match s.trim().parse::<usize>() {
            Ok(index) => Voice::Index(index),
            Err(_) => Voice::Name(s.trim().to_string()),
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Voice::Index(i) => write!(f, "#{}", i),
            Voice::Name(name) => f.write_str(name),
        }
    }
}

/// Engine settings applied at initialization.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    /// Voice to use; `None` keeps the engine default
    pub voice: Option<Voice>,
    /// Speech rate in words per minute; `None` keeps the engine default
    pub rate: Option<u32>,
    /// Volume (0.0-1.0)
    pub volume: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self::defaults()
    }
}

impl VoiceSettings {
    /// Engine defaults, used whenever an engine is re-initialized after a
    /// failure.
    pub fn defaults() -> Self {
        Self {
            voice: None,
            rate: None,
            volume: 1.0,
        }
    }

    /// Set the voice.
    pub fn with_voice(mut self, voice: Voice) -> Self {
        self.voice = Some(voice);
        self
    }

    /// Set the speech rate.
    pub fn with_rate(mut self, rate: u32) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Set the volume.
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }
}

/// A voice offered by an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    /// Identifier passed back to the engine
    pub id: String,
    /// Display name
    pub name: String,
    /// Language tag
    pub language: String,
}

/// TTS backend trait - all TTS engines implement this.
///
/// A backend is stateful and never invoked concurrently.
#[async_trait]
pub trait TtsBackend: Send {
    /// Render text to an audio file at `output_path`.
    async fn render_to_file(&mut self, text: &str, output_path: &Path) -> Result<()>;

    /// Engine name for display.
    fn name(&self) -> &str;
}

/// Creates fresh backend instances.
///
/// The retry loop asks for a new instance after a failed render, since a
/// failed call may leave engine state corrupted.
pub trait BackendFactory: Send + Sync {
    /// Build a backend configured with `settings`.
    fn create(&self, settings: &VoiceSettings) -> Result<Box<dyn TtsBackend>>;

    /// Voices the engine offers.
    fn voices(&self) -> Result<Vec<VoiceInfo>> {
        Ok(Vec::new())
    }
}
