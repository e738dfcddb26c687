//! Per-upload unit of work: transcription, per-language subtitle tracks and
//! progress reporting.
//!
//! One job per upload; jobs share only the term index, the translation cache
//! and the tracker, all injected as handles.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{error, info};

use crate::asr::{Transcriber, TranscriberFactory};
use crate::config::Config;
use crate::error::{JamakError, Result};
use crate::job::{JobState, JobTracker};
use crate::lang::canonicalize_code;
use crate::subtitle::{SubtitleDocument, translate_document};
use crate::translate::TranslationService;

pub struct Workflow {
    config: Config,
    transcriber: Box<dyn Transcriber>,
    translator: Arc<TranslationService>,
    tracker: Arc<JobTracker>,
}

impl Workflow {
    pub fn new(config: Config, translator: Arc<TranslationService>, tracker: Arc<JobTracker>) -> Self {
        let transcriber = TranscriberFactory::create(config.asr.clone());
        Self {
            config,
            transcriber,
            translator,
            tracker,
        }
    }

    pub fn tracker(&self) -> &Arc<JobTracker> {
        &self.tracker
    }

    fn task_dir(&self, job_id: &str) -> PathBuf {
        PathBuf::from(&self.config.storage.root)
            .join("tasks")
            .join(job_id)
    }

    /// Run a media job to completion, recording failure on the job instead of
    /// surfacing it; the job boundary never leaves an unhandled fault.
    pub async fn run_media_job(
        &self,
        job_id: &str,
        input: &Path,
        src_lang: &str,
        target_langs: &[String],
    ) {
        if let Err(e) = self.process_media(job_id, input, src_lang, target_langs).await {
            error!("Job {} failed: {}", job_id, e);
            self.tracker
                .update(job_id, JobState::Failed, 1.0, &format!("Error: {e}"));
        }
    }

    /// Run a subtitle-only job to completion, recording failure on the job.
    pub async fn run_subtitle_job(
        &self,
        job_id: &str,
        srt_path: &Path,
        src_lang: &str,
        target_langs: &[String],
    ) {
        if let Err(e) = self
            .process_subtitle(job_id, srt_path, src_lang, target_langs)
            .await
        {
            error!("Job {} failed: {}", job_id, e);
            self.tracker
                .update(job_id, JobState::Failed, 1.0, &format!("Error: {e}"));
        }
    }

    /// Full pipeline for one uploaded video: transcribe, write the source
    /// track, then translate into each target language.
    async fn process_media(
        &self,
        job_id: &str,
        input: &Path,
        src_lang: &str,
        target_langs: &[String],
    ) -> Result<()> {
        if !input.exists() {
            return Err(JamakError::FileNotFound(input.display().to_string()));
        }
        let src_lang = canonicalize_code(src_lang);

        self.tracker
            .update(job_id, JobState::Running, 0.05, "Transcribing audio");
        let segments = self.transcriber.transcribe(input, &src_lang).await?;
        let source_doc = SubtitleDocument::from_segments(&segments);

        self.write_track(job_id, &source_doc, &src_lang).await?;
        self.tracker.update(
            job_id,
            JobState::Running,
            0.5,
            &format!("Source track ready ({} cues)", source_doc.cues.len()),
        );

        self.translate_targets(job_id, &source_doc, &src_lang, target_langs)
            .await?;

        self.tracker
            .update(job_id, JobState::Succeeded, 1.0, "Completed");
        Ok(())
    }

    /// Translate-only pipeline for an uploaded subtitle file.
    async fn process_subtitle(
        &self,
        job_id: &str,
        srt_path: &Path,
        src_lang: &str,
        target_langs: &[String],
    ) -> Result<()> {
        if !srt_path.exists() {
            return Err(JamakError::FileNotFound(srt_path.display().to_string()));
        }
        let src_lang = canonicalize_code(src_lang);

        self.tracker
            .update(job_id, JobState::Running, 0.1, "Parsing subtitle file");
        let content = fs::read_to_string(srt_path).await?;
        let source_doc = SubtitleDocument::parse_srt(&content);
        if source_doc.cues.is_empty() {
            return Err(JamakError::Subtitle(format!(
                "no valid cues in {}",
                srt_path.display()
            )));
        }

        self.write_track(job_id, &source_doc, &src_lang).await?;
        self.tracker
            .update(job_id, JobState::Running, 0.5, "Source track ready");

        self.translate_targets(job_id, &source_doc, &src_lang, target_langs)
            .await?;

        self.tracker
            .update(job_id, JobState::Succeeded, 1.0, "Completed");
        Ok(())
    }

    /// Produce one translated track per target language, registering each
    /// artifact as soon as it is written.
    async fn translate_targets(
        &self,
        job_id: &str,
        source_doc: &SubtitleDocument,
        src_lang: &str,
        target_langs: &[String],
    ) -> Result<()> {
        let total = target_langs.len().max(1);
        for (i, target) in target_langs.iter().enumerate() {
            let target = canonicalize_code(target);
            if target != *src_lang {
                info!("Translating {} -> {} for job {}", src_lang, target, job_id);
                let translated =
                    translate_document(source_doc, &self.translator, src_lang, &target).await;
                self.write_track(job_id, &translated, &target).await?;
            }
            self.tracker.update(
                job_id,
                JobState::Running,
                0.5 + 0.45 * ((i + 1) as f64 / total as f64),
                &format!("Translated {}/{} ({})", i + 1, total, target),
            );
        }
        Ok(())
    }

    /// Write SRT and strict VTT artifacts for one language track and record
    /// them on the job.
    async fn write_track(
        &self,
        job_id: &str,
        doc: &SubtitleDocument,
        lang: &str,
    ) -> Result<()> {
        let dir = self.task_dir(job_id);
        fs::create_dir_all(dir.join("srt")).await?;
        fs::create_dir_all(dir.join("vtt")).await?;

        let srt_path = dir.join("srt").join(format!("sub_{lang}.srt"));
        let vtt_path = dir.join("vtt").join(format!("sub_{lang}.vtt"));
        fs::write(&srt_path, doc.to_srt()).await?;
        fs::write(&vtt_path, doc.to_vtt()).await?;

        self.tracker
            .add_output(job_id, lang, &vtt_path.display().to_string());
        info!("Wrote {} track for job {}", lang, job_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobState;
    use crate::translate::TranslationCache;
    use crate::translate::backend::MockTranslateBackend;

    fn english_translator() -> Arc<TranslationService> {
        let mut direct = MockTranslateBackend::new();
        direct.expect_id().return_const("opus");
        direct.expect_supports().returning(|src, tgt| src == "ko" && tgt == "en");
        direct.expect_translate_batch().returning(|batch, _, _| {
            Ok(batch.iter().map(|t| format!("english({t})")).collect())
        });
        let mut multilingual = MockTranslateBackend::new();
        multilingual.expect_id().return_const("m2m");
        multilingual.expect_supports().returning(|_, _| false);
        multilingual.expect_translate_batch().never();
        Arc::new(TranslationService::new(
            Box::new(direct),
            Box::new(multilingual),
            Arc::new(TranslationCache::new()),
            240,
        ))
    }

    fn workflow_in(dir: &Path) -> Workflow {
        let mut config = Config::default();
        config.storage.root = dir.display().to_string();
        Workflow::new(config, english_translator(), Arc::new(JobTracker::new()))
    }

    #[tokio::test]
    async fn test_subtitle_job_writes_tracks_and_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let srt = dir.path().join("uploaded.srt");
        std::fs::write(&srt, "1\n00:00:00,000 --> 00:00:01,000\n안녕\n\n").unwrap();

        let workflow = workflow_in(dir.path());
        let job_id = workflow.tracker().create();
        workflow
            .run_subtitle_job(&job_id, &srt, "ko", &["en".to_string()])
            .await;

        let status = workflow.tracker().get(&job_id).unwrap();
        assert_eq!(status.state, JobState::Succeeded);
        assert_eq!(status.progress, 1.0);
        assert!(status.outputs.contains_key("ko"));
        assert!(status.outputs.contains_key("en"));

        let en_srt = dir
            .path()
            .join("tasks")
            .join(&job_id)
            .join("srt")
            .join("sub_en.srt");
        let content = std::fs::read_to_string(en_srt).unwrap();
        assert!(content.contains("english(안녕)"));

        let en_vtt = dir
            .path()
            .join("tasks")
            .join(&job_id)
            .join("vtt")
            .join("sub_en.vtt");
        let content = std::fs::read_to_string(en_vtt).unwrap();
        assert!(content.starts_with("WEBVTT"));
    }

    #[tokio::test]
    async fn test_missing_input_marks_job_failed() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = workflow_in(dir.path());
        let job_id = workflow.tracker().create();
        workflow
            .run_subtitle_job(&job_id, Path::new("no/such.srt"), "ko", &["en".to_string()])
            .await;

        let status = workflow.tracker().get(&job_id).unwrap();
        assert_eq!(status.state, JobState::Failed);
        assert!(status.message.contains("Error"));
    }

    #[tokio::test]
    async fn test_source_language_target_is_not_retranslated() {
        let dir = tempfile::tempdir().unwrap();
        let srt = dir.path().join("uploaded.srt");
        std::fs::write(&srt, "1\n00:00:00,000 --> 00:00:01,000\n안녕\n\n").unwrap();

        let workflow = workflow_in(dir.path());
        let job_id = workflow.tracker().create();
        workflow
            .run_subtitle_job(&job_id, &srt, "ko", &["ko".to_string(), "en".to_string()])
            .await;

        let status = workflow.tracker().get(&job_id).unwrap();
        assert_eq!(status.state, JobState::Succeeded);
        let ko_srt = dir
            .path()
            .join("tasks")
            .join(&job_id)
            .join("srt")
            .join("sub_ko.srt");
        assert!(std::fs::read_to_string(ko_srt).unwrap().contains("안녕"));
    }
}
