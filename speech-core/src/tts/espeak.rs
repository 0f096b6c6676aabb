//! eSpeak NG backend.
//!
//! Runs the `espeak-ng` command-line synthesizer as a subprocess, feeding the
//! text on stdin and letting it write a WAV file directly.

use super::{BackendFactory, TtsBackend, Voice, VoiceInfo, VoiceSettings};
use crate::error::{ConvertError, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Default program name looked up on `PATH`.
pub const DEFAULT_PROGRAM: &str = "espeak-ng";

/// Factory for eSpeak NG backends.
pub struct EspeakFactory {
    program: PathBuf,
}

impl EspeakFactory {
    /// Locate the synthesizer program.
    ///
    /// `program` may be a bare name searched on `PATH` or a path.
    pub fn new(program: Option<&str>) -> Result<Self> {
        let name = program.unwrap_or(DEFAULT_PROGRAM);
        let program = which::which(name).map_err(|_| {
            ConvertError::Engine(format!(
                "{} not found. Install espeak-ng or set espeak_program in the config.",
                name
            ))
        })?;

        Ok(Self { program })
    }

    /// Resolved program path.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Turn a voice selection into the identifier passed to `-v`.
    fn resolve_voice(&self, voice: &Voice) -> Option<String> {
        match voice {
            Voice::Name(name) => Some(name.clone()),
            Voice::Index(index) => match self.voices() {
                Ok(voices) => match voices.get(*index) {
                    Some(v) => Some(v.id.clone()),
                    None => {
                        warn!(
                            "Could not set voice index {} (only {} voices). Using default.",
                            index,
                            voices.len()
                        );
                        None
                    }
                },
                Err(e) => {
                    warn!("Could not set voice index {} ({}). Using default.", index, e);
                    None
                }
            },
        }
    }
}

impl BackendFactory for EspeakFactory {
    fn create(&self, settings: &VoiceSettings) -> Result<Box<dyn TtsBackend>> {
        let voice = settings.voice.as_ref().and_then(|v| self.resolve_voice(v));
        debug!(
            "Initializing espeak-ng (voice={:?}, rate={:?}, volume={})",
            voice, settings.rate, settings.volume
        );

        Ok(Box::new(EspeakBackend {
            program: self.program.clone(),
            voice,
            rate: settings.rate,
            amplitude: (settings.volume.clamp(0.0, 1.0) * 100.0).round() as u32,
        }))
    }

    fn voices(&self) -> Result<Vec<VoiceInfo>> {
        let output = std::process::Command::new(&self.program)
            .arg("--voices")
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConvertError::Engine(format!(
                "Listing voices failed: {}",
                stderr.trim()
            )));
        }

        Ok(parse_voice_list(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// A configured eSpeak NG invocation.
pub struct EspeakBackend {
    program: PathBuf,
    voice: Option<String>,
    rate: Option<u32>,
    /// espeak amplitude, 100 is normal volume
    amplitude: u32,
}

impl EspeakBackend {
    fn args(&self, output_path: &Path) -> Vec<String> {
        let mut args = vec![
            "-w".to_string(),
            output_path.to_string_lossy().into_owned(),
            "-a".to_string(),
            self.amplitude.to_string(),
        ];
        if let Some(rate) = self.rate {
            args.push("-s".to_string());
            args.push(rate.to_string());
        }
        if let Some(voice) = &self.voice {
            args.push("-v".to_string());
            args.push(voice.clone());
        }
        args.push("--stdin".to_string());
        args
    }
}

#[async_trait]
impl TtsBackend for EspeakBackend {
    async fn render_to_file(&mut self, text: &str, output_path: &Path) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut child = Command::new(&self.program)
            .args(self.args(output_path))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ConvertError::Engine(format!("Failed to execute: {}", e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConvertError::Engine(format!(
                "espeak-ng failed: {}",
                stderr.trim()
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "espeak-ng"
    }
}

/// Parse the table printed by `espeak-ng --voices`.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  af              --/M      Afrikaans          gmw/af
/// ```
pub fn parse_voice_list(output: &str) -> Vec<VoiceInfo> {
    let voices: Vec<VoiceInfo> = output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 4 {
                return None;
            }
            Some(VoiceInfo {
                id: fields[1].to_string(),
                name: fields[3].replace('_', " "),
                language: fields[1].to_string(),
            })
        })
        .collect();

    info!("Found {} espeak-ng voice(s)", voices.len());
    voices
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOICES: &str = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af              --/M      Afrikaans          gmw/af
 2  en-gb           --/M      English_(Great_Britain) gmw/en           (en 2)
 2  en-us           --/M      English_(America)  gmw/en-US            (en 3)
";

    #[test]
    fn test_parse_voice_list() {
        let voices = parse_voice_list(VOICES);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[0].id, "af");
        assert_eq!(voices[0].name, "Afrikaans");
        assert_eq!(voices[2].id, "en-us");
        assert_eq!(voices[2].name, "English (America)");
    }

    #[test]
    fn test_parse_voice_list_empty() {
        assert!(parse_voice_list("").is_empty());
        assert!(parse_voice_list("Pty Language Age/Gender VoiceName File\n").is_empty());
    }

    #[test]
    fn test_backend_args() {
        let backend = EspeakBackend {
            program: PathBuf::from("espeak-ng"),
            voice: Some("en-us".to_string()),
            rate: Some(175),
            amplitude: 100,
        };
        let args = backend.args(Path::new("/tmp/out.wav"));
        assert_eq!(
            args,
            vec!["-w", "/tmp/out.wav", "-a", "100", "-s", "175", "-v", "en-us", "--stdin"]
        );
    }

    #[test]
    fn test_backend_args_defaults() {
        let backend = EspeakBackend {
            program: PathBuf::from("espeak-ng"),
            voice: None,
            rate: None,
            amplitude: 100,
        };
        let args = backend.args(Path::new("out.wav"));
        assert_eq!(args, vec!["-w", "out.wav", "-a", "100", "--stdin"]);
    }

    #[test]
    fn test_missing_program() {
        let result = EspeakFactory::new(Some("definitely-not-a-real-tts-program"));
        match result {
            Err(ConvertError::Engine(msg)) => assert!(msg.contains("not found"), "{}", msg),
            _ => panic!("expected engine error"),
        }
    }
}
