use crate::error::{KwsError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_STT_MODEL: &str = "whisper-large-v3";

#[derive(Debug, Clone)]
pub struct STTConfig {
    pub model: String,
    pub language: Option<String>,
    pub temperature: Option<f32>,
    pub prompt: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for STTConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_STT_MODEL.to_string(),
            language: None,
            temperature: Some(0.0),
            prompt: None, // No biasing prompt - let it transcribe naturally
            base_url: GROQ_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Text recognized from an audio file
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub text: String,
    /// Language reported by the service, when it reports one
    pub language: Option<String>,
}

impl Transcript {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
        }
    }
}

/// A speech-to-text backend working on files.
///
/// `Ok(None)` means the service ran but could not make out any speech.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<Option<Transcript>>;
}

/// Reduce a locale tag such as `en-US` or `pt_BR` to the ISO-639-1 code Whisper accepts.
///
/// Empty tags and `auto` map to `None` so the service detects the language itself.
pub fn normalize_language(tag: &str) -> Option<String> {
    let primary = tag.trim().split(['-', '_']).next().unwrap_or("").to_lowercase();
    if primary.is_empty() || primary == "auto" {
        None
    } else {
        Some(primary)
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
    language: Option<String>,
}

/// Whisper transcription through Groq's OpenAI-compatible endpoint
pub struct GroqWhisperSTT {
    client: Client,
    api_key: String,
    endpoint: Url,
    config: STTConfig,
}

impl GroqWhisperSTT {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_config(api_key, STTConfig::default())
    }

    pub fn with_config(api_key: String, config: STTConfig) -> Result<Self> {
        let endpoint = Url::parse(&format!(
            "{}/audio/transcriptions",
            config.base_url.trim_end_matches('/')
        ))
        .map_err(|e| KwsError::Config(format!("Invalid STT base URL '{}': {}", config.base_url, e)))?;

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key,
            endpoint,
            config,
        })
    }

    pub fn config(&self) -> &STTConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn build_form(&self, audio: Vec<u8>, file_name: String) -> Result<Form> {
        let file = Part::bytes(audio)
            .file_name(file_name)
            .mime_str("audio/wav")?;

        let mut form = Form::new()
            .part("file", file)
            .text("model", self.config.model.clone())
            .text("response_format", "verbose_json");

        if let Some(language) = &self.config.language {
            form = form.text("language", language.clone());
        }
        if let Some(temperature) = self.config.temperature {
            form = form.text("temperature", temperature.to_string());
        }
        if let Some(prompt) = &self.config.prompt {
            form = form.text("prompt", prompt.clone());
        }
        Ok(form)
    }
}

#[async_trait]
impl Transcriber for GroqWhisperSTT {
    async fn transcribe(&self, audio_path: &Path) -> Result<Option<Transcript>> {
        let audio = tokio::fs::read(audio_path).await.map_err(|e| {
            KwsError::Audio(format!(
                "Failed to read audio file {}: {}",
                audio_path.display(),
                e
            ))
        })?;
        log::info!(
            "STT: Sending {} bytes from {} to {} (model {}, language {})",
            audio.len(),
            audio_path.display(),
            self.endpoint,
            self.config.model,
            self.config.language.as_deref().unwrap_or("auto")
        );

        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.wav".to_string());
        let form = self.build_form(audio, file_name)?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            log::error!("STT: API returned {}: {}", status, body);
            return Err(KwsError::Stt(format!(
                "API error: {} - {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: TranscriptionResponse = serde_json::from_str(&body)
            .map_err(|e| KwsError::Stt(format!("Response parsing error: {}", e)))?;

        let text = parsed.text.trim();
        if text.is_empty() {
            log::warn!("STT: Service could not understand the audio");
            return Ok(None);
        }

        log::info!("STT: Recognized text: '{}'", text);
        Ok(Some(Transcript {
            text: text.to_string(),
            language: parsed.language,
        }))
    }
}

/// Returns a transcript known up front, for offline runs
#[derive(Debug, Clone)]
pub struct FixedTranscriber {
    text: String,
}

impl FixedTranscriber {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl Transcriber for FixedTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Option<Transcript>> {
        log::debug!(
            "Using fixed transcript for {} ({} chars)",
            audio_path.display(),
            self.text.chars().count()
        );
        if self.text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(Transcript::new(self.text.clone())))
    }
}
