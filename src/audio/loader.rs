use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::audio::types::{AudioData, AudioFormat};
use crate::error::{AudioError, Result};

/// Audio file loader supporting multiple formats
pub struct AudioLoader;

impl AudioLoader {
    /// Load an audio file and return raw audio data
    ///
    /// Samples stay at the file's native sample rate; no resampling happens
    /// here or anywhere downstream.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<AudioData> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(AudioError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "wav" => Self::load_wav(path),
            "mp3" | "flac" | "ogg" | "m4a" | "aac" => Self::load_with_symphonia(path),
            _ => Err(AudioError::UnsupportedFormat { format: extension }.into()),
        }
    }

    /// Load WAV files using the hound crate (most reliable for WAV)
    fn load_wav(path: &Path) -> Result<AudioData> {
        let reader = hound::WavReader::open(path).map_err(|_| AudioError::LoadFailed {
            path: path.display().to_string(),
        })?;

        let spec = reader.spec();
        let sample_rate = spec.sample_rate;
        let channels = spec.channels;

        // Convert samples to f32
        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| AudioError::LoadFailed {
                    path: path.display().to_string(),
                })?,
            hound::SampleFormat::Int => {
                let bit_depth = spec.bits_per_sample;
                let samples: std::result::Result<Vec<i32>, _> = reader.into_samples().collect();

                samples
                    .map_err(|_| AudioError::LoadFailed {
                        path: path.display().to_string(),
                    })?
                    .into_iter()
                    .map(|sample| Self::int_to_float(sample, bit_depth))
                    .collect()
            }
        };

        let duration = samples.len() as f64 / (sample_rate * channels as u32) as f64;

        Ok(AudioData {
            samples,
            sample_rate,
            channels,
            duration,
            file_path: path.to_path_buf(),
            format: AudioFormat {
                extension: "wav".to_string(),
                bit_depth: Some(spec.bits_per_sample),
                compression: None,
            },
        })
    }

    /// Load various formats using Symphonia
    fn load_with_symphonia(path: &Path) -> Result<AudioData> {
        let file = File::open(path).map_err(|_| AudioError::LoadFailed {
            path: path.display().to_string(),
        })?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a probe hint using the file extension
        let mut hint = Hint::new();
        if let Some(extension) = path.extension() {
            if let Some(extension_str) = extension.to_str() {
                hint.with_extension(extension_str);
            }
        }

        let meta_opts: MetadataOptions = Default::default();
        let fmt_opts: FormatOptions = Default::default();

        // Probe the media source
        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &fmt_opts, &meta_opts)
            .map_err(|_| AudioError::LoadFailed {
                path: path.display().to_string(),
            })?;

        let mut format = probed.format;

        // Find the first audio track with a known (decodable) codec
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::LoadFailed {
                path: path.display().to_string(),
            })?;

        let track_id = track.id;

        // Get codec parameters and store needed values before mutably borrowing format
        let codec_params = &track.codec_params;
        let sample_rate = codec_params
            .sample_rate
            .ok_or_else(|| AudioError::InvalidParameters {
                details: "No sample rate found".to_string(),
            })?;

        let channels = codec_params
            .channels
            .ok_or_else(|| AudioError::InvalidParameters {
                details: "No channel information found".to_string(),
            })?
            .count() as u16;

        let bits_per_sample = codec_params.bits_per_sample;
        let codec_type = codec_params.codec;

        // Create a decoder for the track
        let dec_opts: DecoderOptions = Default::default();
        let mut decoder = symphonia::default::get_codecs()
            .make(codec_params, &dec_opts)
            .map_err(|_| AudioError::LoadFailed {
                path: path.display().to_string(),
            })?;

        // Decode all packets and collect samples
        let mut samples = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(SymphoniaError::IoError(_)) => break, // End of stream
                Err(_) => break,
            };

            // Consume any new metadata
            while !format.metadata().is_latest() {
                format.metadata().pop();
            }

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    Self::convert_audio_buffer_to_f32(&decoded, &mut samples);
                }
                Err(SymphoniaError::IoError(_)) => break,
                Err(SymphoniaError::DecodeError(_)) => continue,
                Err(_) => break,
            }
        }

        if samples.is_empty() {
            return Err(AudioError::DecodeFailed {
                reason: format!("no decodable audio in {}", path.display()),
            }
            .into());
        }

        let duration = samples.len() as f64 / (sample_rate * channels as u32) as f64;

        let format_info = AudioFormat {
            extension: path
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or("unknown")
                .to_string(),
            bit_depth: bits_per_sample.map(|b| b as u16),
            compression: Some(format!("{:?}", codec_type)),
        };

        Ok(AudioData {
            samples,
            sample_rate,
            channels,
            duration,
            file_path: path.to_path_buf(),
            format: format_info,
        })
    }

    /// Convert integer sample to float (-1.0 to 1.0)
    fn int_to_float(sample: i32, bit_depth: u16) -> f32 {
        match bit_depth {
            8 => (sample as f32 - 128.0) / 128.0,
            16 => sample as f32 / 32768.0,
            24 => sample as f32 / 8388608.0,
            32 => sample as f32 / 2147483648.0,
            _ => sample as f32 / 32768.0, // Default to 16-bit
        }
    }

    /// Convert Symphonia audio buffer to interleaved f32 samples
    fn convert_audio_buffer_to_f32(buffer: &AudioBufferRef, output: &mut Vec<f32>) {
        match buffer {
            AudioBufferRef::F32(buf) => {
                let channels = buf.spec().channels.count();
                let frames = buf.frames();

                for frame_idx in 0..frames {
                    for ch in 0..channels {
                        output.push(buf.chan(ch)[frame_idx]);
                    }
                }
            }
            AudioBufferRef::F64(buf) => {
                let channels = buf.spec().channels.count();
                let frames = buf.frames();

                for frame_idx in 0..frames {
                    for ch in 0..channels {
                        output.push(buf.chan(ch)[frame_idx] as f32);
                    }
                }
            }
            AudioBufferRef::S32(buf) => {
                let channels = buf.spec().channels.count();
                let frames = buf.frames();

                for frame_idx in 0..frames {
                    for ch in 0..channels {
                        output.push(buf.chan(ch)[frame_idx] as f32 / 2147483648.0);
                    }
                }
            }
            AudioBufferRef::S16(buf) => {
                let channels = buf.spec().channels.count();
                let frames = buf.frames();

                for frame_idx in 0..frames {
                    for ch in 0..channels {
                        output.push(buf.chan(ch)[frame_idx] as f32 / 32768.0);
                    }
                }
            }
            _ => {
                tracing::warn!("Unsupported audio buffer format, skipping packet");
            }
        }
    }

    /// Detect audio format from file extension
    pub fn detect_format<P: AsRef<Path>>(path: P) -> Option<String> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Check if a file format is supported
    pub fn is_format_supported(extension: &str) -> bool {
        matches!(
            extension.to_lowercase().as_str(),
            "wav" | "mp3" | "flac" | "ogg" | "m4a" | "aac"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_test_wav(path: &Path, sample_rate: u32, samples: &[f32]) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &sample in samples {
            let value = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
            writer.write_sample(value).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            AudioLoader::detect_format("test.wav"),
            Some("wav".to_string())
        );
        assert_eq!(
            AudioLoader::detect_format("test.MP3"),
            Some("mp3".to_string())
        );
        assert_eq!(AudioLoader::detect_format("test"), None);
    }

    #[test]
    fn test_format_support() {
        assert!(AudioLoader::is_format_supported("wav"));
        assert!(AudioLoader::is_format_supported("mp3"));
        assert!(AudioLoader::is_format_supported("FLAC"));
        assert!(!AudioLoader::is_format_supported("xyz"));
    }

    #[test]
    fn test_int_to_float_conversion() {
        // Test 16-bit conversion
        assert_eq!(AudioLoader::int_to_float(0, 16), 0.0);
        assert_eq!(AudioLoader::int_to_float(32767, 16), 32767.0 / 32768.0);
        assert_eq!(AudioLoader::int_to_float(-32768, 16), -1.0);

        // Test 8-bit conversion
        assert_eq!(AudioLoader::int_to_float(128, 8), 0.0);
        assert_eq!(AudioLoader::int_to_float(255, 8), 127.0 / 128.0);
        assert_eq!(AudioLoader::int_to_float(0, 8), -1.0);
    }

    #[test]
    fn test_load_wav_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("tone.wav");

        let sample_rate = 8000;
        let samples: Vec<f32> = (0..8000)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                0.5 * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
            })
            .collect();
        write_test_wav(&file_path, sample_rate, &samples);

        let audio = AudioLoader::load(&file_path).unwrap();
        assert_eq!(audio.sample_rate, sample_rate);
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.samples.len(), samples.len());
        assert!((audio.duration - 1.0).abs() < 1e-9);

        // 16-bit quantization noise only
        let max_err = audio
            .samples
            .iter()
            .zip(&samples)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        assert!(max_err < 1e-3);
    }

    #[test]
    fn test_missing_file_names_path() {
        let result = AudioLoader::load("no/such/file.wav");
        assert!(result.is_err());

        let message = result.unwrap_err().to_string();
        assert!(message.contains("no/such/file.wav"));
    }

    #[test]
    fn test_unsupported_format() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("test.xyz");

        // Create a dummy file
        let mut file = File::create(&file_path).unwrap();
        file.write_all(b"dummy content").unwrap();

        let result = AudioLoader::load(&file_path);
        assert!(result.is_err());

        if let Err(crate::error::AnalyzerError::Audio(AudioError::UnsupportedFormat { format })) =
            result
        {
            assert_eq!(format, "xyz");
        } else {
            panic!("Expected UnsupportedFormat error");
        }
    }
}
