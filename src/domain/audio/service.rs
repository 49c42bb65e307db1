use super::error::AudioServiceError;
use super::model::ScriptPart;
use crate::domain::job::{Job, JobRepository};
use crate::infrastructure::audio::{AudioCodec, AudioSegment};
use crate::infrastructure::repositories::{SegmentRequest, TtsRepository};
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Names produced by `create_output_file`, used to validate download requests
pub const GENERATED_FILE_PATTERN: &str = r"^(full|simple)_audio_\d{14}(_\d+)?\.[a-z0-9]+$";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedPart {
    pub index: usize,
    pub part: ScriptPart,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct GeneratedAudio {
    /// History entry of a script run
    pub job_id: Option<Uuid>,
    pub output_file: PathBuf,
    /// Ordered diagnostic trace of the run
    pub debug_info: Vec<String>,
    pub failed_parts: Vec<FailedPart>,
    pub segment_count: usize,
    pub duration: Duration,
}

/// Stitching context for one fragment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StitchContext {
    pub previous_text: Option<String>,
    pub next_text: Option<String>,
}

/// Space-joined text before and after `index`; absent at the edges.
///
/// Empty texts are kept in the join so every fragment sees the same
/// surrounding script.
pub fn stitch_context(all_texts: &[String], index: usize) -> StitchContext {
    let is_first = index == 0;
    let is_last = index + 1 >= all_texts.len();

    StitchContext {
        previous_text: (!is_first).then(|| all_texts[..index].join(" ")),
        next_text: (!is_last).then(|| all_texts[index + 1..].join(" ")),
    }
}

/// Create a new, empty `<prefix>_<timestamp>.<extension>` in `output_dir`.
///
/// An existing file is never replaced: when the name is taken a numeric
/// suffix is added (`<prefix>_<timestamp>_1.<extension>`, ...).
async fn create_output_file(
    output_dir: &Path,
    prefix: &str,
    extension: &str,
) -> std::io::Result<(PathBuf, tokio::fs::File)> {
    let stem = format!("{}_{}", prefix, chrono::Local::now().format("%Y%m%d%H%M%S"));
    let mut suffix = 0u32;

    loop {
        let file_name = match suffix {
            0 => format!("{}.{}", stem, extension),
            n => format!("{}_{}.{}", stem, n, extension),
        };
        let path = output_dir.join(file_name);

        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(e),
        }
    }
}

/// What happened to one fragment
#[derive(Debug)]
enum PartOutcome {
    Skipped,
    Generated {
        request_id: String,
        segment: AudioSegment,
    },
    Failed {
        request_id: Option<String>,
        error: String,
    },
}

/// State owned by a single `generate_full_audio` call
#[derive(Debug, Default)]
struct StitchRun {
    segments: Vec<AudioSegment>,
    request_ids: Vec<String>,
    failed_parts: Vec<FailedPart>,
    debug_info: Vec<String>,
}

impl StitchRun {
    fn trace(&mut self, line: impl Into<String>) {
        self.debug_info.push(line.into());
    }

    fn record(&mut self, index: usize, part: &ScriptPart, outcome: PartOutcome) {
        match outcome {
            PartOutcome::Skipped => {
                tracing::debug!(part_index = index, "Skipping part with empty text");
                self.trace(format!("Skipping part {}: empty text", index));
            }
            PartOutcome::Generated {
                request_id,
                segment,
            } => {
                tracing::info!(
                    part_index = index,
                    request_id = %request_id,
                    frames = segment.frame_count(),
                    duration_ms = segment.duration().as_millis() as u64,
                    "Part generated"
                );
                self.trace(format!("Successfully generated audio for part {}", index));
                self.request_ids.push(request_id);
                self.segments.push(segment);
            }
            PartOutcome::Failed { request_id, error } => {
                tracing::warn!(part_index = index, error = %error, "Part failed, continuing");
                self.trace(format!("Error generating audio for part {}: {}", index, error));
                // A call that succeeded upstream still conditions later parts
                if let Some(request_id) = request_id {
                    self.request_ids.push(request_id);
                }
                self.failed_parts.push(FailedPart {
                    index,
                    part: part.clone(),
                    error,
                });
            }
        }
    }

    /// All segments joined in input order, or `None` if nothing was generated
    fn combined(&self) -> Option<AudioSegment> {
        (!self.segments.is_empty()).then(|| AudioSegment::concat(&self.segments))
    }
}

pub struct AudioService {
    tts_repo: Arc<dyn TtsRepository>,
    codec: Arc<dyn AudioCodec>,
    job_repo: Arc<dyn JobRepository>,
    default_voice_id: String,
}

impl AudioService {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        codec: Arc<dyn AudioCodec>,
        job_repo: Arc<dyn JobRepository>,
        default_voice_id: String,
    ) -> Self {
        Self {
            tts_repo,
            codec,
            job_repo,
            default_voice_id,
        }
    }
}

#[async_trait]
pub trait AudioServiceApi: Send + Sync {
    /// Synthesize every script part in order and stitch the results into one file.
    ///
    /// Parts are processed strictly sequentially: each request is conditioned
    /// on the surrounding text and on the request ids of the parts generated
    /// before it. A failing part is recorded and skipped; the run only fails
    /// when no audio at all was produced. Progress is tracked as a job in
    /// the generation history.
    async fn generate_full_audio(
        &self,
        parts: &[ScriptPart],
        output_dir: &Path,
    ) -> Result<GeneratedAudio, AudioServiceError>;

    /// Synthesize a single fragment without stitching context
    async fn generate_simple_audio(
        &self,
        text: &str,
        voice_id: Option<&str>,
        output_dir: &Path,
    ) -> Result<GeneratedAudio, AudioServiceError>;

    fn model_id(&self) -> &str;

    fn content_type(&self) -> &'static str;
}

#[async_trait]
impl AudioServiceApi for AudioService {
    async fn generate_full_audio(
        &self,
        parts: &[ScriptPart],
        output_dir: &Path,
    ) -> Result<GeneratedAudio, AudioServiceError> {
        let mut job = Job::new(parts.to_vec());
        self.job_repo.save(&job);

        let result = self.stitch(parts, output_dir, &mut job).await;

        match &result {
            Ok(generated) => job.complete(generated.output_file.clone()),
            Err(e) => job.fail(e.to_string()),
        }
        self.job_repo.save(&job);
        tracing::debug!(job_id = %job.id, status = ?job.status, "Job finished");

        result
    }

    async fn generate_simple_audio(
        &self,
        text: &str,
        voice_id: Option<&str>,
        output_dir: &Path,
    ) -> Result<GeneratedAudio, AudioServiceError> {
        if text.is_empty() {
            return Err(AudioServiceError::Invalid("Text cannot be empty".to_string()));
        }

        self.ensure_output_dir(output_dir).await?;
        // Reserve the name; the repository fills the file with the raw response
        let (output_file, _) = create_output_file(output_dir, "simple_audio", self.codec.extension())
            .await
            .with_context(|| format!("failed to create output file in {}", output_dir.display()))?;

        let voice_id = voice_id
            .filter(|voice| !voice.is_empty())
            .unwrap_or(&self.default_voice_id)
            .to_string();

        let mut debug_info = vec![
            "Starting generate_simple_audio".to_string(),
            format!("Using voice ID: {}", voice_id),
        ];

        let request = SegmentRequest {
            text: text.to_string(),
            voice_id,
            output_file: Some(output_file.clone()),
            ..Default::default()
        };

        let result = match self.tts_repo.synthesize(request, &mut debug_info).await {
            Ok(result) => result,
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&output_file).await {
                    tracing::warn!(
                        output_file = %output_file.display(),
                        error = %remove_err,
                        "Could not remove unused output file"
                    );
                }
                return Err(e.into());
            }
        };
        debug_info.push(format!("Request ID: {}", result.request_id));

        let duration = match self.codec.decode(&result.audio) {
            Ok(segment) => segment.duration(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not measure generated audio");
                debug_info.push(format!("Could not measure audio duration: {}", e));
                Duration::ZERO
            }
        };
        debug_info.push(format!("Model: {}", self.tts_repo.model_id()));

        Ok(GeneratedAudio {
            job_id: None,
            output_file,
            debug_info,
            failed_parts: Vec::new(),
            segment_count: 1,
            duration,
        })
    }

    fn model_id(&self) -> &str {
        self.tts_repo.model_id()
    }

    fn content_type(&self) -> &'static str {
        self.codec.content_type()
    }
}

impl AudioService {
    /// One stitching run, reporting progress on `job`
    async fn stitch(
        &self,
        parts: &[ScriptPart],
        output_dir: &Path,
        job: &mut Job,
    ) -> Result<GeneratedAudio, AudioServiceError> {
        let start_time = std::time::Instant::now();
        self.ensure_output_dir(output_dir).await?;

        job.start();
        self.job_repo.save(job);

        tracing::info!(
            job_id = %job.id,
            parts = parts.len(),
            model = %self.tts_repo.model_id(),
            output_dir = %output_dir.display(),
            "Starting stitched audio generation"
        );

        let mut run = StitchRun::default();
        run.trace("Starting generate_full_audio");
        run.trace(format!(
            "Input script_parts: [{}]",
            parts.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        ));

        let all_texts: Vec<String> = parts.iter().map(|part| part.text.clone()).collect();
        run.trace(format!("Final all_texts: {:?}", all_texts));

        for (index, part) in parts.iter().enumerate() {
            run.trace(format!("Processing part {}: {}", index, part));

            let voice_id = part
                .voice_override()
                .unwrap_or(&self.default_voice_id)
                .to_string();

            let outcome = if part.text.is_empty() {
                PartOutcome::Skipped
            } else {
                match &part.actor {
                    Some(actor) => run.trace(format!("Using voice ID: {} (actor: {})", voice_id, actor)),
                    None => run.trace(format!("Using voice ID: {}", voice_id)),
                }

                let context = stitch_context(&all_texts, index);
                let request = SegmentRequest {
                    text: part.text.clone(),
                    voice_id,
                    previous_text: context.previous_text,
                    next_text: context.next_text,
                    previous_request_ids: run.request_ids.clone(),
                    output_file: None,
                };

                self.synthesize_part(request, &mut run.debug_info).await
            };

            run.record(index, part, outcome);
            job.advance();
            self.job_repo.save(job);
        }

        let Some(combined) = run.combined() else {
            tracing::error!(
                job_id = %job.id,
                parts = parts.len(),
                failed_parts = run.failed_parts.len(),
                "No audio segments were generated"
            );
            return Err(AudioServiceError::NoAudioGenerated {
                debug_info: run.debug_info,
            });
        };

        let (output_file, mut file) = create_output_file(output_dir, "full_audio", self.codec.extension())
            .await
            .with_context(|| format!("failed to create output file in {}", output_dir.display()))?;
        file.write_all(&self.codec.encode(&combined))
            .await
            .with_context(|| format!("failed to write {}", output_file.display()))?;
        file.flush()
            .await
            .with_context(|| format!("failed to write {}", output_file.display()))?;

        if run.failed_parts.is_empty() {
            run.trace("All parts generated successfully");
        } else {
            let failed = run
                .failed_parts
                .iter()
                .map(|failed| format!("part {} {}", failed.index, failed.part))
                .collect::<Vec<_>>()
                .join(", ");
            run.trace(format!("Failed parts: [{}]", failed));
        }
        run.trace(format!("Model: {}", self.tts_repo.model_id()));

        tracing::info!(
            job_id = %job.id,
            output_file = %output_file.display(),
            segments = run.segments.len(),
            failed_parts = run.failed_parts.len(),
            audio_duration_secs = combined.duration().as_secs_f64(),
            latency_ms = start_time.elapsed().as_millis() as u64,
            "Stitched audio written"
        );

        Ok(GeneratedAudio {
            job_id: Some(job.id),
            output_file,
            segment_count: run.segments.len(),
            duration: combined.duration(),
            failed_parts: run.failed_parts,
            debug_info: run.debug_info,
        })
    }

    async fn ensure_output_dir(&self, output_dir: &Path) -> Result<(), AudioServiceError> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;
        Ok(())
    }

    /// Call the synthesis repository and decode its audio into a segment
    async fn synthesize_part(&self, request: SegmentRequest, debug_info: &mut Vec<String>) -> PartOutcome {
        let result = match self.tts_repo.synthesize(request, debug_info).await {
            Ok(result) => result,
            Err(e) => {
                return PartOutcome::Failed {
                    request_id: None,
                    error: e.to_string(),
                }
            }
        };

        match self.codec.decode(&result.audio) {
            Ok(segment) => PartOutcome::Generated {
                request_id: result.request_id,
                segment,
            },
            Err(e) => PartOutcome::Failed {
                request_id: Some(result.request_id),
                error: format!("Failed to decode audio: {}", e),
            },
        }
    }
}
