//! Mock TTS engine for testing
//!
//! Provides a configurable engine factory that can simulate failures,
//! zero-byte output, and format changes, and records every call.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{BackendFactory, TtsBackend, VoiceInfo, VoiceSettings};
use crate::audio::{AudioFormat, SampleFormat};
use crate::error::{ConvertError, Result};

/// How a mock render fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// The engine returns an error
    Error,
    /// The engine reports success but leaves a zero-byte file
    ZeroByte,
}

/// State shared by the factory and every backend it creates.
struct MockState {
    /// Number of renders to fail before succeeding
    fail_count: AtomicUsize,
    /// Renders whose text contains this marker always fail
    fail_marker: Mutex<Option<String>>,
    failure: MockFailure,
    /// Formats used for successful renders, cycled by call index
    formats: Vec<AudioFormat>,
    render_count: AtomicUsize,
    create_count: AtomicUsize,
    rendered: Mutex<Vec<String>>,
    settings: Mutex<Vec<VoiceSettings>>,
}

/// A mock engine factory for testing retry and resume behavior
#[derive(Clone)]
pub struct MockFactory {
    state: Arc<MockState>,
}

/// Default format of mock output: 16 kHz mono 16-bit PCM.
pub const MOCK_FORMAT: AudioFormat = AudioFormat {
    sample_rate: 16000,
    channels: 1,
    bits_per_sample: 16,
    sample_format: SampleFormat::Int,
};

impl MockFactory {
    fn build(fail_count: usize, failure: MockFailure) -> Self {
        Self {
            state: Arc::new(MockState {
                fail_count: AtomicUsize::new(fail_count),
                fail_marker: Mutex::new(None),
                failure,
                formats: vec![MOCK_FORMAT],
                render_count: AtomicUsize::new(0),
                create_count: AtomicUsize::new(0),
                rendered: Mutex::new(Vec::new()),
                settings: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Create an engine that always succeeds
    pub fn always_succeeds() -> Self {
        Self::build(0, MockFailure::Error)
    }

    /// Create an engine that fails `n` renders, then succeeds
    pub fn fails_then_succeeds(n: usize, failure: MockFailure) -> Self {
        Self::build(n, failure)
    }

    /// Create an engine that always fails
    pub fn always_fails(failure: MockFailure) -> Self {
        Self::build(usize::MAX, failure)
    }

    /// Fail every render whose text contains `marker`
    pub fn failing_on(marker: &str) -> Self {
        let factory = Self::always_succeeds();
        *factory.state.fail_marker.lock().unwrap() = Some(marker.to_string());
        factory
    }

    /// Use these output formats, one per render call in rotation
    pub fn with_formats(self, formats: Vec<AudioFormat>) -> Self {
        assert!(!formats.is_empty(), "at least one format is required");
        let state = Arc::try_unwrap(self.state)
            .unwrap_or_else(|_| panic!("with_formats must be called before sharing"));
        Self {
            state: Arc::new(MockState { formats, ..state }),
        }
    }

    /// Number of render calls across all backends
    pub fn render_count(&self) -> usize {
        self.state.render_count.load(Ordering::SeqCst)
    }

    /// Number of backends created
    pub fn create_count(&self) -> usize {
        self.state.create_count.load(Ordering::SeqCst)
    }

    /// Texts passed to render, in call order
    pub fn rendered_texts(&self) -> Vec<String> {
        self.state.rendered.lock().unwrap().clone()
    }

    /// Settings passed to each `create` call, in order
    pub fn created_settings(&self) -> Vec<VoiceSettings> {
        self.state.settings.lock().unwrap().clone()
    }
}

impl BackendFactory for MockFactory {
    fn create(&self, settings: &VoiceSettings) -> Result<Box<dyn TtsBackend>> {
        self.state.create_count.fetch_add(1, Ordering::SeqCst);
        self.state.settings.lock().unwrap().push(settings.clone());
        Ok(Box::new(MockBackend {
            state: Arc::clone(&self.state),
        }))
    }

    fn voices(&self) -> Result<Vec<VoiceInfo>> {
        Ok(vec![VoiceInfo {
            id: "mock".to_string(),
            name: "Mock Voice".to_string(),
            language: "en".to_string(),
        }])
    }
}

/// Backend handed out by [`MockFactory`]
struct MockBackend {
    state: Arc<MockState>,
}

#[async_trait]
impl TtsBackend for MockBackend {
    async fn render_to_file(&mut self, text: &str, output_path: &Path) -> Result<()> {
        let call_num = self.state.render_count.fetch_add(1, Ordering::SeqCst);
        self.state.rendered.lock().unwrap().push(text.to_string());

        let marked = self
            .state
            .fail_marker
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|m| text.contains(m));

        if marked || call_num < self.state.fail_count.load(Ordering::SeqCst) {
            return match self.state.failure {
                MockFailure::Error => Err(ConvertError::Engine("mock engine failure".to_string())),
                MockFailure::ZeroByte => {
                    std::fs::write(output_path, b"")?;
                    Ok(())
                }
            };
        }

        let format = self.state.formats[call_num % self.state.formats.len()];
        write_speech(output_path, format, text)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Write one sample per character of `text`.
fn write_speech(path: &Path, format: AudioFormat, text: &str) -> Result<()> {
    let mut writer = hound::WavWriter::create(path, format.into())?;
    for c in text.chars() {
        for _ in 0..format.channels {
            match format.sample_format {
                SampleFormat::Float => writer.write_sample(c as u32 as f32 / 1_114_112.0)?,
                SampleFormat::Int => writer.write_sample((c as u32 % 128) as i16)?,
            }
        }
    }
    writer.finalize()?;
    Ok(())
}
