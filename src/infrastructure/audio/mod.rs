pub mod mp3;

pub use mp3::Mp3Codec;

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("no decodable audio frames in {0} bytes")]
    NoFrames(usize),
    #[error("unsupported audio stream: {0}")]
    Unsupported(String),
}

/// Decoded, in-memory audio for one or more fragments.
///
/// A segment owns its frame data; concatenation always produces a new
/// segment and leaves the inputs untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioSegment {
    data: Vec<u8>,
    frame_count: usize,
    duration: Duration,
}

impl AudioSegment {
    pub fn new(data: Vec<u8>, frame_count: usize, duration: Duration) -> Self {
        Self {
            data,
            frame_count,
            duration,
        }
    }

    /// Join segments in order into one new segment, copying each frame stream once
    pub fn concat(segments: &[AudioSegment]) -> AudioSegment {
        let total_len = segments.iter().map(|segment| segment.data.len()).sum();
        let mut combined = AudioSegment {
            data: Vec::with_capacity(total_len),
            ..Default::default()
        };

        for segment in segments {
            combined.data.extend_from_slice(&segment.data);
            combined.frame_count += segment.frame_count;
            combined.duration += segment.duration;
        }

        combined
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

/// Decode/encode primitives for the fixed output container
pub trait AudioCodec: Send + Sync {
    /// Decode a compressed byte stream into a segment
    fn decode(&self, bytes: &[u8]) -> Result<AudioSegment, CodecError>;

    /// Encode a segment into a compressed byte stream ready to be written to disk
    fn encode(&self, segment: &AudioSegment) -> Vec<u8>;

    /// File extension of the container, without the dot
    fn extension(&self) -> &'static str;

    /// MIME type of the container
    fn content_type(&self) -> &'static str;
}
