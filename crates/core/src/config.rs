use providers::GenerationOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/notes.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Registry name: `gemini`, `openai` or `noop`.
    pub name: String,
    pub model: String,
    pub base_url: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: "gemini".to_string(),
            model: "gemini-1.5-flash".to_string(),
            base_url: None,
        }
    }
}

/// Sampling parameters for the note generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_k: Option<u32>,
    pub top_p: Option<f32>,
    /// Temperature of the language correction pass.
    pub correction_temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 8192,
            top_k: Some(40),
            top_p: Some(0.95),
            correction_temperature: 0.3,
        }
    }
}

impl GenerationConfig {
    pub fn notes_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            top_k: self.top_k,
            top_p: self.top_p,
        }
    }

    pub fn correction_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.correction_temperature,
            ..self.notes_options()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_audio_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_audio_bytes: 20 * 1024 * 1024,
        }
    }
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("LECTURE_NOTES")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
