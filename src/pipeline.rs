use crate::audio::preprocess_file;
use crate::detection::{detect_keywords, DetectionMode, KeywordSet};
use crate::error::Result;
use crate::metrics::{keyword_metrics, overall_scores, Scores};
use crate::plot::{write_waveform_svg, PlotConfig};
use crate::report::Report;
use crate::stt::Transcriber;
use crate::timeline::to_time_intervals;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub processed_output: PathBuf,
    pub keywords: Vec<String>,
    pub language: Option<String>,
    pub mode: DetectionMode,
    pub plot_output: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>, keywords: Vec<String>) -> Self {
        Self {
            input: input.into(),
            processed_output: PathBuf::from("processed_audio.wav"),
            keywords,
            language: None,
            mode: DetectionMode::default(),
            plot_output: None,
        }
    }
}

/// Preprocess, transcribe, detect, score, and plot one audio file
pub struct Pipeline {
    config: PipelineConfig,
    transcriber: Arc<dyn Transcriber>,
    plot_config: PlotConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            config,
            transcriber,
            plot_config: PlotConfig::default(),
        }
    }

    pub fn with_plot_config(mut self, plot_config: PlotConfig) -> Self {
        self.plot_config = plot_config;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn run(&self) -> Result<Report> {
        let config = &self.config;
        let keywords = KeywordSet::new(&config.keywords)?;
        log::info!(
            "Spotting {} keyword(s) in {} ({} mode)",
            keywords.len(),
            config.input.display(),
            config.mode
        );

        let clip = preprocess_file(&config.input, &config.processed_output)?;
        let audio_duration = clip.duration_secs();

        let transcript = self
            .transcriber
            .transcribe(&config.processed_output)
            .await?;

        let mut report = Report {
            input: config.input.clone(),
            processed_audio: config.processed_output.clone(),
            language: config.language.clone(),
            detected_language: None,
            keywords: keywords.keywords().to_vec(),
            transcript: None,
            audio_duration_secs: audio_duration,
            matches: Vec::new(),
            missing: Vec::new(),
            overall: Scores::default(),
            keyword_metrics: Vec::new(),
            intervals: Vec::new(),
            plot: None,
            generated_at: Utc::now(),
        };

        let transcript = match transcript {
            Some(transcript) => transcript,
            None => {
                log::warn!("No transcription available for {}", config.input.display());
                return Ok(report);
            }
        };
        log::info!("Transcription: {}", transcript.text);

        let detection = detect_keywords(&transcript.text, &keywords, config.mode);
        report.overall = overall_scores(&detection.detected, keywords.keywords());
        report.keyword_metrics = keyword_metrics(&detection.positions, keywords.keywords());
        report.intervals =
            to_time_intervals(&detection.matches, detection.transcript_chars, audio_duration);

        log::info!(
            "Detected {}/{} keywords (precision {:.2}, recall {:.2}, f1 {:.2})",
            detection.detected.len(),
            keywords.len(),
            report.overall.precision,
            report.overall.recall,
            report.overall.f1
        );

        if let Some(plot_path) = &config.plot_output {
            write_waveform_svg(plot_path, &clip, &report.intervals, &self.plot_config)?;
            report.plot = Some(plot_path.clone());
        }

        report.detected_language = transcript.language;
        report.transcript = Some(transcript.text);
        report.matches = detection.matches;
        report.missing = detection.missing;
        Ok(report)
    }
}
