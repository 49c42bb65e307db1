use super::{AudioCodec, AudioSegment, CodecError};
use std::time::Duration;

const MPEG1_LAYER3_BITRATES: [u32; 15] = [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320];
const MPEG2_LAYER3_BITRATES: [u32; 15] = [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160];

const ID3V2_HEADER_LEN: usize = 10;
const ID3V1_TAG_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MpegVersion {
    V1,
    V2,
    V25,
}

/// Parsed MPEG audio Layer III frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameHeader {
    version: MpegVersion,
    has_crc: bool,
    bitrate_kbps: u32,
    sample_rate: u32,
    padding: bool,
    mono: bool,
}

impl FrameHeader {
    fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] & 0xE0 != 0xE0 {
            return None;
        }

        let version = match (bytes[1] >> 3) & 0b11 {
            0b00 => MpegVersion::V25,
            0b10 => MpegVersion::V2,
            0b11 => MpegVersion::V1,
            _ => return None,
        };

        // Layer III only
        if (bytes[1] >> 1) & 0b11 != 0b01 {
            return None;
        }

        // 0 is free format, 15 is reserved
        let bitrate_index = (bytes[2] >> 4) as usize;
        if bitrate_index == 0 || bitrate_index == 15 {
            return None;
        }

        let sample_rate_index = ((bytes[2] >> 2) & 0b11) as usize;
        if sample_rate_index == 3 {
            return None;
        }

        let bitrate_kbps = match version {
            MpegVersion::V1 => MPEG1_LAYER3_BITRATES[bitrate_index],
            MpegVersion::V2 | MpegVersion::V25 => MPEG2_LAYER3_BITRATES[bitrate_index],
        };
        let sample_rate = match version {
            MpegVersion::V1 => [44100, 48000, 32000][sample_rate_index],
            MpegVersion::V2 => [22050, 24000, 16000][sample_rate_index],
            MpegVersion::V25 => [11025, 12000, 8000][sample_rate_index],
        };

        Some(Self {
            version,
            has_crc: bytes[1] & 0x01 == 0,
            bitrate_kbps,
            sample_rate,
            padding: (bytes[2] >> 1) & 0x01 == 1,
            mono: bytes[3] >> 6 == 0b11,
        })
    }

    fn frame_len(&self) -> usize {
        let coefficient = match self.version {
            MpegVersion::V1 => 144,
            MpegVersion::V2 | MpegVersion::V25 => 72,
        };
        (coefficient * self.bitrate_kbps * 1000 / self.sample_rate) as usize + usize::from(self.padding)
    }

    fn samples_per_frame(&self) -> u64 {
        match self.version {
            MpegVersion::V1 => 1152,
            MpegVersion::V2 | MpegVersion::V25 => 576,
        }
    }

    fn duration(&self) -> Duration {
        Duration::from_nanos(self.samples_per_frame() * 1_000_000_000 / u64::from(self.sample_rate))
    }

    fn side_info_len(&self) -> usize {
        match (self.version, self.mono) {
            (MpegVersion::V1, false) => 32,
            (MpegVersion::V1, true) => 17,
            (_, false) => 17,
            (_, true) => 9,
        }
    }

    /// Xing/Info/VBRI frames describe the whole original stream and would
    /// mislead players once streams are concatenated.
    fn is_metadata_frame(&self, frame: &[u8]) -> bool {
        let xing_offset = 4 + if self.has_crc { 2 } else { 0 } + self.side_info_len();
        let tag_at = |offset: usize| frame.get(offset..offset + 4);

        matches!(tag_at(xing_offset), Some(b"Xing") | Some(b"Info")) || matches!(tag_at(4 + 32), Some(b"VBRI"))
    }
}

/// Length of a leading ID3v2 tag, or 0 if there is none
fn id3v2_len(bytes: &[u8]) -> usize {
    if bytes.len() < ID3V2_HEADER_LEN || &bytes[..3] != b"ID3" {
        return 0;
    }

    // Synchsafe integer, 7 bits per byte
    let size = bytes[6..10]
        .iter()
        .fold(0usize, |acc, byte| (acc << 7) | usize::from(byte & 0x7F));
    let footer = if bytes[5] & 0x10 != 0 { ID3V2_HEADER_LEN } else { 0 };

    (ID3V2_HEADER_LEN + size + footer).min(bytes.len())
}

/// End offset of the stream once a trailing ID3v1 tag is removed
fn audio_end(bytes: &[u8]) -> usize {
    if bytes.len() >= ID3V1_TAG_LEN && &bytes[bytes.len() - ID3V1_TAG_LEN..][..3] == b"TAG" {
        bytes.len() - ID3V1_TAG_LEN
    } else {
        bytes.len()
    }
}

/// MP3 codec working at the frame level.
///
/// Decoding keeps only MPEG Layer III audio frames, so segments coming from
/// separate responses can be concatenated into one well-formed stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mp3Codec;

impl Mp3Codec {
    pub fn new() -> Self {
        Self
    }
}

impl AudioCodec for Mp3Codec {
    fn decode(&self, bytes: &[u8]) -> Result<AudioSegment, CodecError> {
        for (magic, container) in [(&b"RIFF"[..], "wav"), (&b"OggS"[..], "ogg"), (&b"fLaC"[..], "flac")] {
            if bytes.starts_with(magic) {
                return Err(CodecError::Unsupported(format!(
                    "expected mp3, got {} container",
                    container
                )));
            }
        }

        let end = audio_end(bytes);
        let mut pos = id3v2_len(bytes);
        let mut data = Vec::with_capacity(end.saturating_sub(pos));
        let mut frame_count = 0;
        let mut duration = Duration::ZERO;
        let mut skipped_bytes = 0;
        let mut metadata_frames = 0;

        while pos + 4 <= end {
            let Some(header) = FrameHeader::parse(&bytes[pos..end]) else {
                pos += 1;
                skipped_bytes += 1;
                continue;
            };

            let frame_len = header.frame_len();
            if pos + frame_len > end {
                tracing::debug!(
                    offset = pos,
                    frame_len = frame_len,
                    available = end - pos,
                    "Dropping truncated trailing MP3 frame"
                );
                break;
            }

            let frame = &bytes[pos..pos + frame_len];
            if header.is_metadata_frame(frame) {
                metadata_frames += 1;
            } else {
                data.extend_from_slice(frame);
                frame_count += 1;
                duration += header.duration();
            }
            pos += frame_len;
        }

        if frame_count == 0 {
            return Err(CodecError::NoFrames(bytes.len()));
        }

        if skipped_bytes > 0 || metadata_frames > 0 {
            tracing::debug!(
                skipped_bytes = skipped_bytes,
                metadata_frames = metadata_frames,
                "Ignored non-audio data while decoding MP3"
            );
        }

        Ok(AudioSegment::new(data, frame_count, duration))
    }

    fn encode(&self, segment: &AudioSegment) -> Vec<u8> {
        segment.data().to_vec()
    }

    fn extension(&self) -> &'static str {
        "mp3"
    }

    fn content_type(&self) -> &'static str {
        "audio/mpeg"
    }
}
