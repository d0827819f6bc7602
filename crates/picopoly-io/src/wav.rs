//! WAV file reading and writing.
//!
//! Rendered audio is always interleaved stereo 16-bit PCM.

use crate::Result;
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let total_samples = u64::from(reader.len());
    let num_frames = total_samples / u64::from(spec.channels.max(1));
    let duration_secs = num_frames as f64 / f64::from(spec.sample_rate);

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
    })
}

/// Write interleaved stereo 16-bit samples to a WAV file.
///
/// A trailing odd sample is dropped.
///
/// # Example
/// ```ignore
/// let samples = vec![0i16; 2 * 44_100]; // 1 second of stereo silence
/// write_wav_stereo("silence.wav", &samples, 44_100)?;
/// ```
pub fn write_wav_stereo<P: AsRef<Path>>(path: P, samples: &[i16], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;

    let frames = samples.len() / 2;
    for &sample in &samples[..frames * 2] {
        writer.write_sample(sample)?;
    }

    writer.finalize()?;
    Ok(())
}

/// Read a WAV file as interleaved stereo 16-bit samples.
///
/// Mono files are duplicated to both channels; files with more than two
/// channels keep the first two. Float and wider integer files are converted
/// to 16 bits. Returns the samples and the sample rate.
pub fn read_wav_stereo<P: AsRef<Path>>(path: P) -> Result<(Vec<i16>, u32)> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let all_samples: Vec<i16> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(|v| (v * 32768.0).clamp(-32768.0, 32767.0) as i16))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let shift = u32::from(spec.bits_per_sample.saturating_sub(16));
            let widen = 16u32.saturating_sub(u32::from(spec.bits_per_sample));
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| ((v >> shift) << widen) as i16))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let stereo = match channels {
        1 => all_samples.iter().flat_map(|&s| [s, s]).collect(),
        2 => all_samples,
        _ => all_samples
            .chunks(channels)
            .flat_map(|chunk| [chunk[0], chunk.get(1).copied().unwrap_or(chunk[0])])
            .collect(),
    };

    Ok((stereo, spec.sample_rate))
}
