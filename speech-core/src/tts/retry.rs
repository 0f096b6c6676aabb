//! Synthesis with bounded retries and engine re-initialization.

use super::{BackendFactory, TtsBackend, VoiceSettings};
use crate::error::{ConvertError, Result};
use log::{debug, warn};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Default number of attempts per chunk.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default pause after a failed attempt.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// How failed renders are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per chunk (at least 1)
    pub retries: u32,
    /// Fixed pause after each failed attempt
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, backoff: Duration) -> Self {
        Self {
            retries: retries.max(1),
            backoff,
        }
    }
}

/// Renders text to audio files through an exclusively owned engine.
///
/// After a failed attempt the engine is discarded and rebuilt from the
/// factory with default settings before the next attempt.
pub struct SynthesisClient {
    factory: Arc<dyn BackendFactory>,
    backend: Option<Box<dyn TtsBackend>>,
    policy: RetryPolicy,
}

impl SynthesisClient {
    /// Create a client, initializing the engine with `settings`.
    pub fn new(
        factory: Arc<dyn BackendFactory>,
        settings: &VoiceSettings,
        policy: RetryPolicy,
    ) -> Result<Self> {
        let backend = factory.create(settings)?;
        debug!("Initialized TTS engine {}", backend.name());

        Ok(Self {
            factory,
            backend: Some(backend),
            policy,
        })
    }

    /// The retry policy in effect.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Save TTS output to `output_path`, retrying on failure.
    ///
    /// An attempt succeeds only if the engine returns without error and the
    /// output file exists and is non-empty.
    pub async fn render_to_file(&mut self, text: &str, output_path: &Path) -> Result<()> {
        let retries = self.policy.retries.max(1);
        let mut last_error = String::new();

        for attempt in 1..=retries {
            // Remove existing partial file if any
            if output_path.exists() {
                let _ = fs::remove_file(output_path);
            }

            match self.attempt(text, output_path).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(
                        "TTS save failed (attempt {}/{}): {}",
                        attempt, retries, e
                    );
                    last_error = e.to_string();

                    tokio::time::sleep(self.policy.backoff).await;

                    if attempt < retries {
                        self.reinitialize();
                    }
                }
            }
        }

        Err(ConvertError::Synthesis {
            path: output_path.to_path_buf(),
            attempts: retries,
            message: last_error,
        })
    }

    async fn attempt(&mut self, text: &str, output_path: &Path) -> Result<()> {
        let backend = self
            .backend
            .as_mut()
            .ok_or_else(|| ConvertError::Engine("TTS engine is not initialized".to_string()))?;

        backend.render_to_file(text, output_path).await?;

        match fs::metadata(output_path) {
            Ok(meta) if meta.len() > 0 => Ok(()),
            _ => Err(ConvertError::Engine("No output or zero-byte file.".to_string())),
        }
    }

    /// Drop the current engine and build a fresh one with default settings.
    fn reinitialize(&mut self) {
        self.backend = None;
        match self.factory.create(&VoiceSettings::defaults()) {
            Ok(backend) => {
                debug!("Re-initialized TTS engine {}", backend.name());
                self.backend = Some(backend);
            }
            Err(e) => warn!("Could not re-initialize TTS engine: {}", e),
        }
    }
}
