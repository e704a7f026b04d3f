/// Audio payload decoding using Symphonia
use crate::error::{AudioError, Result};
use chord_core::{AudioBuffer, AudioFormat, SampleRate};
use std::io::Cursor;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// ITU-R BS.775-1 coefficient for folding non-front channels into stereo (-3dB)
const SURROUND_MIX: f32 = 0.707;

/// Decode a complete audio payload into interleaved stereo f32 PCM
///
/// Probes the container from an in-memory cursor (no filename hint is
/// available for uploaded bytes), decodes every packet of the default track,
/// and downmixes multichannel audio to stereo.
///
/// # Errors
/// Returns an error if the payload cannot be probed, contains no audio
/// track, or yields no decodable frames.
pub fn decode_bytes(bytes: &[u8]) -> Result<AudioBuffer> {
    if bytes.is_empty() {
        return Err(AudioError::EmptyPayload("zero-length payload".to_string()));
    }

    let cursor = Cursor::new(bytes.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::UnsupportedFormat(format!("failed to probe payload: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| AudioError::DecodeError("no audio tracks found".to_string()))?;

    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Symphonia(format!("failed to create decoder: {}", e)))?;

    // Decode all packets and collect into a single interleaved stereo buffer
    let mut all_samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(AudioError::Symphonia(format!("error reading packet: {}", e)));
            }
        };

        // Skip packets that are not for the default track
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| AudioError::DecodeError(format!("decode error: {}", e)))?;

        append_as_stereo(&decoded, &mut all_samples);
    }

    if all_samples.is_empty() {
        return Err(AudioError::EmptyPayload(
            "payload contained no decodable audio frames".to_string(),
        ));
    }

    // Output is always stereo since downmixing happens per packet
    let format = AudioFormat::new(SampleRate::new(sample_rate), 2, 32);
    Ok(AudioBuffer::new(all_samples, format))
}

/// Convert one decoded packet to interleaved stereo f32 and append it
///
/// Uses symmetric scaling for signed integers (divide by 2^(N-1)) so the
/// [-1.0, 1.0] range is symmetric.
fn append_as_stereo(decoded: &AudioBufferRef, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::F32(buf) => downmix_to_stereo(buf, |s| s.clamp(-1.0, 1.0), out),
        AudioBufferRef::F64(buf) => {
            downmix_to_stereo(buf, |s| (s as f32).clamp(-1.0, 1.0), out);
        }
        AudioBufferRef::S32(buf) => {
            downmix_to_stereo(buf, |s| s as f32 / 2_147_483_648.0, out);
        }
        AudioBufferRef::S24(buf) => {
            downmix_to_stereo(buf, |s| s.inner() as f32 / 8_388_608.0, out);
        }
        AudioBufferRef::S16(buf) => downmix_to_stereo(buf, |s| s as f32 / 32_768.0, out),
        AudioBufferRef::S8(buf) => downmix_to_stereo(buf, |s| s as f32 / 128.0, out),
        AudioBufferRef::U32(buf) => {
            downmix_to_stereo(buf, |s| (s as f32 / u32::MAX as f32) * 2.0 - 1.0, out);
        }
        AudioBufferRef::U24(buf) => {
            downmix_to_stereo(buf, |s| (s.inner() as f32 / 16_777_215.0) * 2.0 - 1.0, out);
        }
        AudioBufferRef::U16(buf) => {
            downmix_to_stereo(buf, |s| (s as f32 / u16::MAX as f32) * 2.0 - 1.0, out);
        }
        AudioBufferRef::U8(buf) => {
            downmix_to_stereo(buf, |s| (s as f32 / u8::MAX as f32) * 2.0 - 1.0, out);
        }
    }
}

/// Downmix a planar packet buffer to interleaved stereo
///
/// Mono is duplicated to both channels. For more than two channels, the
/// first two map to left/right and the remainder fold into both sides at
/// -3dB.
fn downmix_to_stereo<T, F>(
    buf: &symphonia::core::audio::AudioBuffer<T>,
    normalize: F,
    out: &mut Vec<f32>,
) where
    T: symphonia::core::sample::Sample + Copy,
    F: Fn(T) -> f32,
{
    let frames = buf.frames();
    let channels = buf.spec().channels.count();
    out.reserve(frames * 2);

    match channels {
        0 => {
            out.extend(std::iter::repeat(0.0).take(frames * 2));
        }
        1 => {
            let mono = buf.chan(0);
            for i in 0..frames {
                let sample = normalize(mono[i]);
                out.push(sample);
                out.push(sample);
            }
        }
        _ => {
            let left = buf.chan(0);
            let right = buf.chan(1);
            for i in 0..frames {
                let mut l = normalize(left[i]);
                let mut r = normalize(right[i]);
                for ch in 2..channels {
                    let bleed = normalize(buf.chan(ch)[i]) * SURROUND_MIX;
                    l += bleed;
                    r += bleed;
                }
                out.push(l.clamp(-1.0, 1.0));
                out.push(r.clamp(-1.0, 1.0));
            }
        }
    }
}

/// Stateless decoder handle implementing the core seam
///
/// Gain analysis calls [`decode_bytes`] directly; this type exists for
/// callers wired through `chord_core::AudioDecoder`.
#[derive(Debug, Default)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self
    }
}

impl chord_core::AudioDecoder for SymphoniaDecoder {
    fn decode_bytes(&mut self, bytes: &[u8]) -> chord_core::Result<AudioBuffer> {
        Ok(decode_bytes(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_is_rejected() {
        assert!(matches!(decode_bytes(&[]), Err(AudioError::EmptyPayload(_))));
    }

    #[test]
    fn garbage_payload_is_rejected() {
        let garbage = vec![0xABu8; 512];
        assert!(decode_bytes(&garbage).is_err());
    }
}
