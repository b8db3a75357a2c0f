//! Bundled energy-based voice detector.
//!
//! RMS thresholding with minimum speech and silence durations. Good enough
//! to drive the pipeline in quiet environments; swap in a model-based
//! [`VoiceDetector`] for production acoustics.

use voce_core::{AudioFrame, VadEvent, VoiceDetector};

/// Tunables for [`EnergyVad`].
#[derive(Debug, Clone, Copy)]
pub struct EnergyVadConfig {
    /// RMS energy above this counts as speech.
    pub threshold_rms: f32,
    /// Sustained high energy required before start-of-speech, in ms.
    pub min_speech_ms: u64,
    /// Sustained silence required before end-of-speech, in ms.
    pub min_silence_ms: u64,
}

impl Default for EnergyVadConfig {
    fn default() -> Self {
        Self { threshold_rms: 0.03, min_speech_ms: 120, min_silence_ms: 500 }
    }
}

/// Energy-based voice detector.
#[derive(Debug)]
pub struct EnergyVad {
    config: EnergyVadConfig,
    speaking: bool,
    high_energy_ms: u64,
    low_energy_ms: u64,
}

impl EnergyVad {
    /// Create a detector with the default tuning.
    pub fn new() -> Self {
        Self::with_config(EnergyVadConfig::default())
    }

    /// Create a detector with explicit tuning.
    pub fn with_config(config: EnergyVadConfig) -> Self {
        Self { config, speaking: false, high_energy_ms: 0, low_energy_ms: 0 }
    }

    /// Whether the detector currently considers the input to be speech.
    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    fn rms(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sq_sum: f32 = samples.iter().map(|&x| x * x).sum();
        (sq_sum / samples.len() as f32).sqrt()
    }
}

impl Default for EnergyVad {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceDetector for EnergyVad {
    fn push_frame(&mut self, frame: &AudioFrame) -> Option<VadEvent> {
        let mono = frame.to_mono_f32();
        if mono.is_empty() {
            return None;
        }
        let frame_ms = (mono.len() as u64 * 1000) / frame.sample_rate as u64;

        if Self::rms(&mono) > self.config.threshold_rms {
            self.high_energy_ms += frame_ms;
            self.low_energy_ms = 0;
            if !self.speaking && self.high_energy_ms >= self.config.min_speech_ms {
                self.speaking = true;
                return Some(VadEvent::StartOfSpeech);
            }
        } else {
            self.low_energy_ms += frame_ms;
            self.high_energy_ms = 0;
            if self.speaking && self.low_energy_ms >= self.config.min_silence_ms {
                self.speaking = false;
                return Some(VadEvent::EndOfSpeech);
            }
        }

        None
    }
}
