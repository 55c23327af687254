use crate::detection::KeywordMatch;
use crate::error::Result;
use crate::metrics::{KeywordMetrics, Scores};
use crate::timeline::TimeInterval;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use strum::{Display, EnumString};

pub const NO_TRANSCRIPTION_MESSAGE: &str = "No transcription available. Check if the audio file contains clear speech and is in a compatible format.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Outcome of one keyword spotting run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub input: PathBuf,
    pub processed_audio: PathBuf,
    pub language: Option<String>,
    pub detected_language: Option<String>,
    pub keywords: Vec<String>,
    pub transcript: Option<String>,
    pub audio_duration_secs: f64,
    pub matches: Vec<KeywordMatch>,
    pub missing: Vec<String>,
    pub overall: Scores,
    pub keyword_metrics: Vec<KeywordMetrics>,
    pub intervals: Vec<TimeInterval>,
    pub plot: Option<PathBuf>,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    pub fn has_transcript(&self) -> bool {
        self.transcript.is_some()
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    /// Human readable summary
    pub fn render_text(&self) -> String {
        let transcript = match &self.transcript {
            Some(transcript) => transcript,
            None => return format!("{}\n", NO_TRANSCRIPTION_MESSAGE),
        };

        let mut out = format!("Transcription: {}\n", transcript);
        if let Some(language) = &self.detected_language {
            out.push_str(&format!("Detected language: {}\n", language));
        }
        for keyword in &self.missing {
            out.push_str(&format!("Keyword '{}' not found.\n", keyword));
        }
        out.push_str(&format!("Overall Precision: {:.2}\n", self.overall.precision));
        out.push_str(&format!("Overall Recall: {:.2}\n", self.overall.recall));
        out.push_str(&format!("Overall F1 Score: {:.2}\n", self.overall.f1));

        for metrics in &self.keyword_metrics {
            out.push_str(&format!(
                "Keyword '{}':\n  Precision: {:.2}\n  Recall: {:.2}\n  F1 Score: {:.2}\n",
                metrics.keyword, metrics.scores.precision, metrics.scores.recall, metrics.scores.f1
            ));
            out.push_str(&format!(
                "  True Positives: {}\n  False Positives: {}\n  False Negatives: {}\n",
                metrics.true_positives, metrics.false_positives, metrics.false_negatives
            ));
        }

        for interval in &self.intervals {
            out.push_str(&format!(
                "Keyword '{}' found between {:.2} and {:.2} seconds.\n",
                interval.keyword, interval.start_secs, interval.end_secs
            ));
        }

        if let Some(plot) = &self.plot {
            out.push_str(&format!("Waveform plot: {}\n", plot.display()));
        }
        out
    }
}
