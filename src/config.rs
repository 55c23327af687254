use secrecy::{ExposeSecret, SecretBox};
use std::env;
use thiserror::Error;

pub const GROQ_API_KEY_VAR: &str = "GROQ_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid API key format for {service}: {reason}")]
    InvalidKeyFormat { service: String, reason: String },
}

impl From<ConfigError> for crate::error::KwsError {
    fn from(e: ConfigError) -> Self {
        crate::error::KwsError::Config(e.to_string())
    }
}

/// Credentials for the transcription service
#[derive(Debug)]
pub struct ApiConfig {
    groq_key: SecretBox<String>,
}

impl ApiConfig {
    /// Load API configuration from the environment, reading `.env` first if present
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let groq_key = Self::load_api_key(GROQ_API_KEY_VAR, "Groq")?;
        Ok(Self { groq_key })
    }

    /// Build a configuration from an already known key
    pub fn from_key(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        Self::check_key(&key, "Groq")?;
        Ok(Self {
            groq_key: SecretBox::new(Box::new(key)),
        })
    }

    fn load_api_key(env_var: &str, service_name: &str) -> Result<SecretBox<String>, ConfigError> {
        let key = env::var(env_var).map_err(|_| ConfigError::MissingEnvVar(env_var.to_string()))?;
        Self::check_key(&key, service_name)?;
        Ok(SecretBox::new(Box::new(key)))
    }

    fn check_key(key: &str, service_name: &str) -> Result<(), ConfigError> {
        if key.trim().is_empty() {
            return Err(ConfigError::InvalidKeyFormat {
                service: service_name.to_string(),
                reason: "API key cannot be empty".to_string(),
            });
        }
        // Groq keys typically start with "gsk_"
        if !key.starts_with("gsk_") {
            return Err(ConfigError::InvalidKeyFormat {
                service: service_name.to_string(),
                reason: "Groq keys should start with 'gsk_'".to_string(),
            });
        }
        Ok(())
    }

    /// Get Groq API key (use only when making API calls)
    pub fn groq_key(&self) -> &str {
        self.groq_key.expose_secret()
    }
}

/// Load configuration with helpful error messages for development
pub fn load_config() -> Result<ApiConfig, ConfigError> {
    match ApiConfig::load() {
        Ok(config) => {
            log::info!("Successfully loaded API configuration");
            Ok(config)
        }
        Err(ConfigError::MissingEnvVar(var)) => {
            log::error!("Missing required environment variable: {}", var);
            log::error!("Create a .env file in the project root with:");
            log::error!("{}=your_api_key_here", var);
            log::error!("or pass --transcript to run without a transcription service");
            Err(ConfigError::MissingEnvVar(var))
        }
        Err(e) => {
            log::error!("Configuration error: {}", e);
            Err(e)
        }
    }
}
