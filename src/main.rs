use anyhow::{Context, Result};
use clap::Parser;
use keyword_spotter::{
    config::load_config,
    detection::DetectionMode,
    pipeline::{Pipeline, PipelineConfig},
    report::OutputFormat,
    stt::{normalize_language, FixedTranscriber, GroqWhisperSTT, STTConfig, Transcriber},
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// WAV file to search for keywords
    #[arg(short, long)]
    input: PathBuf,

    /// Keyword to detect (repeat for several)
    #[arg(short, long = "keyword", required = true)]
    keywords: Vec<String>,

    /// Where the 16kHz mono copy of the input is written
    #[arg(short, long, default_value = "processed_audio.wav")]
    output: PathBuf,

    /// Spoken language, e.g. en-US or te ("auto" to let the service decide)
    #[arg(short, long, default_value = "en-US")]
    language: String,

    /// Report every occurrence of a keyword instead of only the first
    #[arg(long)]
    all_occurrences: bool,

    /// Write an SVG waveform plot with keyword intervals highlighted
    #[arg(long)]
    plot: Option<PathBuf>,

    /// Use this transcript instead of calling the transcription service
    #[arg(long)]
    transcript: Option<String>,

    /// Report format: text or json
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Transcription model
    #[arg(long, default_value = keyword_spotter::stt::DEFAULT_STT_MODEL)]
    stt_model: String,

    /// Base URL of the OpenAI-compatible transcription API
    #[arg(long, default_value = keyword_spotter::stt::GROQ_BASE_URL)]
    stt_url: String,
}

fn build_transcriber(args: &Args, language: Option<String>) -> Result<Arc<dyn Transcriber>> {
    if let Some(text) = &args.transcript {
        log::info!("Using transcript supplied on the command line");
        return Ok(Arc::new(FixedTranscriber::new(text.clone())));
    }

    let config = load_config().context("Failed to load configuration")?;
    let stt_config = STTConfig {
        model: args.stt_model.clone(),
        language,
        base_url: args.stt_url.clone(),
        ..STTConfig::default()
    };
    let stt = GroqWhisperSTT::with_config(config.groq_key().to_string(), stt_config)
        .context("Failed to create transcription client")?;
    log::info!("🎤 Transcription client ready ({})", stt.endpoint());
    Ok(Arc::new(stt))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    log::info!("🚀 Initializing keyword spotter");

    let language = normalize_language(&args.language);
    let transcriber = build_transcriber(&args, language.clone())?;

    let mode = if args.all_occurrences {
        DetectionMode::All
    } else {
        DetectionMode::First
    };
    let config = PipelineConfig {
        input: args.input.clone(),
        processed_output: args.output.clone(),
        keywords: args.keywords.clone(),
        language,
        mode,
        plot_output: args.plot.clone(),
    };

    let report = Pipeline::new(config, transcriber)
        .run()
        .await
        .with_context(|| format!("Keyword spotting failed for {}", args.input.display()))?;

    print!("{}", report.render(args.format)?);
    if args.format == OutputFormat::Json {
        println!();
    }
    Ok(())
}
