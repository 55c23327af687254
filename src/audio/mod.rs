//! WAV input/output and the in-memory clip type shared by the pipeline.

pub mod converter;

pub use converter::{
    downmix_to_mono, preprocess, preprocess_file, AudioConverter, TARGET_CHANNELS,
    TARGET_SAMPLE_RATE,
};

use crate::error::{KwsError, Result};
use std::path::Path;

pub type AudioSample = f32;

/// Interleaved samples normalized to [-1.0, 1.0]
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub samples: Vec<AudioSample>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioClip {
    pub fn new(samples: Vec<AudioSample>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Number of sample frames (one sample per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Load a WAV file of any bit depth and channel layout hound understands
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<AudioClip> {
    let path = path.as_ref();

    // hound rejects a zero channel count while parsing the header
    let mut reader = hound::WavReader::open(path).map_err(|e| match e {
        hound::Error::FormatError(msg) if msg.contains("zero channels") => {
            KwsError::InvalidInput(format!("Audio file {} has no channels", path.display()))
        }
        e => KwsError::Audio(format!("Failed to open WAV file {}: {}", path.display(), e)),
    })?;
    let spec = reader.spec();

    if spec.sample_rate == 0 {
        return Err(KwsError::InvalidInput(format!(
            "Audio file {} has a sample rate of 0Hz",
            path.display()
        )));
    }

    let read_err = |e: hound::Error| {
        KwsError::Audio(format!(
            "Failed to read audio sample from {}: {}",
            path.display(),
            e
        ))
    };

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale).map_err(read_err))
                .collect::<Result<Vec<_>>>()?
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map_err(read_err))
            .collect::<Result<Vec<_>>>()?,
    };

    log::debug!(
        "Loaded {} samples from {} ({}Hz, {} channels, {} bits)",
        samples.len(),
        path.display(),
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample
    );

    Ok(AudioClip::new(samples, spec.sample_rate, spec.channels))
}

/// Write a clip as 16-bit signed PCM
pub fn write_wav<P: AsRef<Path>>(path: P, clip: &AudioClip) -> Result<()> {
    let path = path.as_ref();
    let spec = hound::WavSpec {
        channels: clip.channels,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in &clip.samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clamped * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;

    log::debug!(
        "Wrote {} samples to {} ({:.2}s)",
        clip.samples.len(),
        path.display(),
        clip.duration_secs()
    );
    Ok(())
}
