use super::{load_wav, write_wav, AudioClip};
use crate::error::{KwsError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::path::Path;

/// Sample rate the transcription service is fed with
pub const TARGET_SAMPLE_RATE: u32 = 16000;
pub const TARGET_CHANNELS: u16 = 1;

const CHUNK_SIZE: usize = 1024;

/// Average every frame of an interleaved buffer into a single channel
pub fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let channels = channels as usize;
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Mono sample-rate converter
pub struct AudioConverter {
    input_rate: u32,
    output_rate: u32,
    resampler: Option<SincFixedIn<f32>>,
}

impl AudioConverter {
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(KwsError::InvalidInput(format!(
                "Invalid sample rate conversion {}Hz -> {}Hz",
                input_rate, output_rate
            )));
        }

        let resampler = if input_rate != output_rate {
            let ratio = output_rate as f64 / input_rate as f64;
            log::info!(
                "AudioConverter: Creating resampler from {}Hz to {}Hz (ratio: {})",
                input_rate,
                output_rate,
                ratio
            );
            let params = SincInterpolationParameters {
                sinc_len: 256,
                f_cutoff: 0.95,
                interpolation: SincInterpolationType::Linear,
                oversampling_factor: 128,
                window: WindowFunction::BlackmanHarris2,
            };
            let resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, CHUNK_SIZE, 1)
                .map_err(|e| KwsError::Audio(format!("Failed to create resampler: {}", e)))?;
            Some(resampler)
        } else {
            log::info!("AudioConverter: No resampling needed (same sample rate)");
            None
        };

        Ok(Self {
            input_rate,
            output_rate,
            resampler,
        })
    }

    /// Number of output frames a buffer of `input_frames` converts to
    pub fn expected_output_len(&self, input_frames: usize) -> usize {
        let ratio = self.output_rate as f64 / self.input_rate as f64;
        (input_frames as f64 * ratio).round() as usize
    }

    /// Resample a whole mono buffer. The resampler's delay is trimmed so the
    /// output starts aligned with the input and has the same duration.
    pub fn convert(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        let expected = self.expected_output_len(input.len());
        let resampler = match &mut self.resampler {
            Some(resampler) => resampler,
            None => return Ok(input.to_vec()),
        };
        if input.is_empty() {
            return Ok(Vec::new());
        }

        resampler.reset();
        let delay = resampler.output_delay();
        let mut output: Vec<f32> = Vec::with_capacity(expected + delay + CHUNK_SIZE);

        let mut offset = 0;
        while output.len() < expected + delay {
            let mut chunk = vec![0.0f32; CHUNK_SIZE];
            if offset < input.len() {
                let end = (offset + CHUNK_SIZE).min(input.len());
                chunk[..end - offset].copy_from_slice(&input[offset..end]);
            }
            offset += CHUNK_SIZE;

            let input_chunks = vec![chunk];
            let out = resampler
                .process(&input_chunks, None)
                .map_err(|e| KwsError::Audio(format!("Resampling error: {}", e)))?;
            output.extend_from_slice(&out[0]);
        }

        log::debug!(
            "AudioConverter: {} frames -> {} frames (delay {})",
            input.len(),
            expected,
            delay
        );

        Ok(output[delay..delay + expected].to_vec())
    }
}

/// Convert a clip to 16kHz mono
pub fn preprocess(clip: &AudioClip) -> Result<AudioClip> {
    let mono = downmix_to_mono(&clip.samples, clip.channels);
    let mut converter = AudioConverter::new(clip.sample_rate, TARGET_SAMPLE_RATE)?;
    let samples = converter.convert(&mono)?;
    Ok(AudioClip::new(samples, TARGET_SAMPLE_RATE, TARGET_CHANNELS))
}

/// Load `input`, convert it to 16kHz mono and write the result to `output` as 16-bit PCM
pub fn preprocess_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<AudioClip> {
    let input = input.as_ref();
    let output = output.as_ref();

    let clip = load_wav(input)?;
    log::info!(
        "Preprocessing {} ({}Hz, {} channels, {:.2}s)",
        input.display(),
        clip.sample_rate,
        clip.channels,
        clip.duration_secs()
    );

    let processed = preprocess(&clip)?;
    write_wav(output, &processed)?;

    log::info!(
        "Wrote preprocessed audio to {} ({:.2}s)",
        output.display(),
        processed.duration_secs()
    );
    Ok(processed)
}
