use std::io::Cursor;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use hound::{SampleFormat, WavSpec, WavWriter};
use tokio::sync::Semaphore;

use crate::error::AppError;

/// The external voice-cloning model. Calls may block for seconds to minutes
/// and the backend may not tolerate concurrent inference.
pub trait Synthesizer: Send + Sync {
    fn synthesize(
        &self,
        text: &str,
        reference_audio: &Path,
        language: &str,
    ) -> Result<Vec<u8>, AppError>;
}

/// Serializing front for the synthesizer: inference runs on the blocking
/// pool, one call at a time.
pub struct CloneService {
    synthesizer: Arc<dyn Synthesizer>,
    slot: Semaphore,
}

impl CloneService {
    pub fn new(synthesizer: Arc<dyn Synthesizer>) -> Self {
        Self {
            synthesizer,
            slot: Semaphore::new(1),
        }
    }

    pub async fn synthesize(
        &self,
        text: &str,
        reference_audio: &Path,
        language: &str,
    ) -> Result<Vec<u8>, AppError> {
        let _permit = self
            .slot
            .acquire()
            .await
            .map_err(|_| AppError::SynthesisError("synthesizer is shut down".to_string()))?;

        let synthesizer = Arc::clone(&self.synthesizer);
        let text = text.to_string();
        let reference = reference_audio.to_path_buf();
        let language = language.to_string();

        tokio::task::spawn_blocking(move || synthesizer.synthesize(&text, &reference, &language))
            .await
            .map_err(|e| AppError::SynthesisError(format!("synthesis task panicked: {}", e)))?
    }
}

/// Invokes an external voice-cloning CLI, capturing WAV bytes on stdout.
pub struct CommandSynthesizer {
    program: String,
}

impl CommandSynthesizer {
    pub fn new(program: String) -> Self {
        Self { program }
    }
}

impl Synthesizer for CommandSynthesizer {
    fn synthesize(
        &self,
        text: &str,
        reference_audio: &Path,
        language: &str,
    ) -> Result<Vec<u8>, AppError> {
        let output = Command::new(&self.program)
            .arg("--text")
            .arg(text)
            .arg("--speaker-wav")
            .arg(reference_audio)
            .arg("--language")
            .arg(language)
            .output()
            .map_err(|e| {
                AppError::SynthesisError(format!(
                    "Failed to run {} (is it installed?): {}",
                    self.program, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::SynthesisError(format!(
                "{} failed: {}",
                self.program, stderr
            )));
        }

        Ok(output.stdout)
    }
}

/// Development fallback that renders a short sine tone instead of cloning a
/// voice. Useful for exercising the pipeline without a model installed.
pub struct ToneSynthesizer {
    sample_rate: u32,
}

impl ToneSynthesizer {
    pub fn new() -> Self {
        Self { sample_rate: 22050 }
    }
}

impl Default for ToneSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synthesizer for ToneSynthesizer {
    fn synthesize(
        &self,
        text: &str,
        reference_audio: &Path,
        _language: &str,
    ) -> Result<Vec<u8>, AppError> {
        tracing::debug!(
            "Tone synthesizer ignoring reference file {}",
            reference_audio.display()
        );

        // Roughly 2.5 words per second of tone, capped at 10 seconds.
        let secs = (text.split_whitespace().count() as f32 / 2.5).clamp(1.0, 10.0);
        let sample_count = (secs * self.sample_rate as f32) as usize;
        let samples: Vec<f32> = (0..sample_count)
            .map(|i| {
                let t = i as f32 / self.sample_rate as f32;
                0.2 * (2.0 * std::f32::consts::PI * 220.0 * t).sin()
            })
            .collect();

        samples_to_wav(&samples, self.sample_rate)
    }
}

/// Convert audio samples to WAV format
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, AppError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut buffer = Vec::new();
    {
        let cursor = Cursor::new(&mut buffer);
        let mut writer = WavWriter::new(cursor, spec)
            .map_err(|e| AppError::SynthesisError(format!("Failed to create WAV writer: {}", e)))?;

        for sample in samples {
            let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(scaled)
                .map_err(|e| AppError::SynthesisError(format!("Failed to write sample: {}", e)))?;
        }

        writer
            .finalize()
            .map_err(|e| AppError::SynthesisError(format!("Failed to finalize WAV: {}", e)))?;
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_to_wav_empty() {
        let wav = samples_to_wav(&[], 22050).unwrap();
        // Should produce valid WAV header even for empty audio
        assert!(wav.starts_with(b"RIFF"));
    }

    #[test]
    fn test_samples_to_wav_valid() {
        let samples: Vec<f32> = vec![0.0, 0.5, -0.5, 1.0, -1.0];
        let wav = samples_to_wav(&samples, 22050).unwrap();
        assert!(wav.starts_with(b"RIFF"));
        assert!(wav.len() > 44); // Header + some data
    }

    #[test]
    fn tone_synthesizer_produces_nonempty_wav() {
        let synth = ToneSynthesizer::new();
        let wav = synth
            .synthesize("Hello world", Path::new("unused.wav"), "en")
            .unwrap();
        assert!(wav.starts_with(b"RIFF"));
        assert!(wav.len() > 44);
    }

    #[tokio::test]
    async fn clone_service_runs_synthesizer() {
        let service = CloneService::new(Arc::new(ToneSynthesizer::new()));
        let wav = service
            .synthesize("Hello", Path::new("unused.wav"), "en")
            .await
            .unwrap();
        assert!(wav.starts_with(b"RIFF"));
    }
}
