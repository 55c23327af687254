use httpmock::prelude::*;
use keyword_spotter::{
    audio::load_wav,
    detection::DetectionMode,
    pipeline::{Pipeline, PipelineConfig},
    report::{OutputFormat, NO_TRANSCRIPTION_MESSAGE},
    stt::{FixedTranscriber, GroqWhisperSTT, STTConfig},
    KwsError,
};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Two seconds of a quiet stereo tone at 44.1kHz
fn write_test_wav(path: &Path) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..44100 * 2 {
        let t = i as f32 / 44100.0;
        let sample = ((2.0 * std::f32::consts::PI * 220.0 * t).sin() * 8000.0) as i16;
        writer.write_sample(sample).unwrap();
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

fn setup(keywords: &[&str]) -> (TempDir, PipelineConfig) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.wav");
    write_test_wav(&input);

    let mut config = PipelineConfig::new(input, keywords.iter().map(|k| k.to_string()).collect());
    config.processed_output = dir.path().join("processed_audio.wav");
    (dir, config)
}

#[test_log::test(tokio::test)]
async fn test_pipeline_with_fixed_transcript() {
    let (_dir, config) = setup(&["Hello", "world", "missing"]);
    let processed = config.processed_output.clone();
    let transcriber = Arc::new(FixedTranscriber::new("hello big world"));

    let report = Pipeline::new(config, transcriber).run().await.unwrap();

    // Preprocessed file is 16kHz mono with the input's duration
    let clip = load_wav(&processed).unwrap();
    assert_eq!(clip.sample_rate, 16000);
    assert_eq!(clip.channels, 1);
    assert_eq!(clip.frames(), 32000);
    assert!((report.audio_duration_secs - 2.0).abs() < 1e-9);

    assert_eq!(report.keywords, vec!["hello", "world", "missing"]);
    assert_eq!(report.transcript.as_deref(), Some("hello big world"));
    assert_eq!(report.missing, vec!["missing"]);
    assert_eq!(report.overall.precision, 1.0);
    assert!((report.overall.recall - 2.0 / 3.0).abs() < 1e-12);

    assert_eq!(report.keyword_metrics.len(), 3);
    assert_eq!(report.keyword_metrics[0].true_positives, 1);
    assert_eq!(report.keyword_metrics[0].false_positives, 1);
    assert_eq!(report.keyword_metrics[2].false_negatives, 1);

    // "world" spans characters 10..15 of 15, i.e. the last third of two seconds
    let world = &report.intervals[1];
    assert_eq!(world.keyword, "world");
    assert!((world.start_secs - 4.0 / 3.0).abs() < 1e-9);
    assert!((world.end_secs - 2.0).abs() < 1e-9);
    assert!(report.plot.is_none());
}

#[test_log::test(tokio::test)]
async fn test_pipeline_all_occurrences_and_plot() {
    let (dir, mut config) = setup(&["la"]);
    let plot = dir.path().join("waveform.svg");
    config.mode = DetectionMode::All;
    config.plot_output = Some(plot.clone());

    let report = Pipeline::new(config, Arc::new(FixedTranscriber::new("la la la")))
        .run()
        .await
        .unwrap();

    assert_eq!(report.matches.len(), 3);
    assert_eq!(report.keyword_metrics[0].true_positives, 3);
    assert_eq!(report.intervals.len(), 3);
    assert_eq!(report.plot.as_deref(), Some(plot.as_path()));

    let svg = std::fs::read_to_string(&plot).unwrap();
    assert_eq!(svg.matches("class=\"keyword\"").count(), 3);
}

#[test_log::test(tokio::test)]
async fn test_pipeline_without_transcript() {
    let (_dir, config) = setup(&["hello"]);
    let report = Pipeline::new(config, Arc::new(FixedTranscriber::new("")))
        .run()
        .await
        .unwrap();

    assert!(!report.has_transcript());
    assert!(report.intervals.is_empty());
    assert!(report
        .render(OutputFormat::Text)
        .unwrap()
        .contains(NO_TRANSCRIPTION_MESSAGE));
}

#[test_log::test(tokio::test)]
async fn test_invalid_keywords_fail_before_audio() {
    let config = PipelineConfig::new("/nonexistent/input.wav", vec!["".to_string()]);
    let result = Pipeline::new(config, Arc::new(FixedTranscriber::new("x")))
        .run()
        .await;
    assert!(matches!(result, Err(KwsError::InvalidInput(_))));
}

#[test_log::test(tokio::test)]
async fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = PipelineConfig::new(dir.path().join("absent.wav"), vec!["x".to_string()]);
    config.processed_output = dir.path().join("out.wav");

    let result = Pipeline::new(config, Arc::new(FixedTranscriber::new("x")))
        .run()
        .await;
    assert!(matches!(result, Err(KwsError::Audio(_))));
}

#[test_log::test(tokio::test)]
async fn test_pipeline_against_mock_transcription_service() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/audio/transcriptions")
                .header("authorization", "Bearer gsk_integration");
            then.status(200).json_body(json!({
                "text": "Open The Pod Bay Doors",
                "language": "english",
                "duration": 2.0
            }));
        })
        .await;

    let stt = GroqWhisperSTT::with_config(
        "gsk_integration".to_string(),
        STTConfig {
            language: Some("en".to_string()),
            base_url: server.base_url(),
            ..STTConfig::default()
        },
    )
    .unwrap();

    let (_dir, config) = setup(&["pod bay", "airlock"]);
    let report = Pipeline::new(config, Arc::new(stt)).run().await.unwrap();

    mock.assert_async().await;
    assert_eq!(report.transcript.as_deref(), Some("Open The Pod Bay Doors"));
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].start, 9);
    assert_eq!(report.missing, vec!["airlock"]);
    assert_eq!(report.overall.recall, 0.5);
    assert_eq!(report.language.as_deref(), Some("en"));
    assert_eq!(report.detected_language.as_deref(), Some("english"));
}
