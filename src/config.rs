// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub database: DatabaseConfig,
    pub pipeline: PipelineConfig,
    pub prompts: PromptConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub chat_model: String,
    pub embedding_model: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub uri: String,
    pub table_name: String,
    pub batch_size: usize,
    pub embedding_dim: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    pub parallel_workers: usize,
    pub skip_patterns: Vec<String>,
    pub max_file_size_mb: usize,
    /// Characters of the first page handed to the metadata prompt.
    pub metadata_window_chars: usize,
    #[serde(default = "default_true")]
    pub include_notes: bool,
    #[serde(default = "default_true")]
    pub normalize_text: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PromptConfig {
    pub path: PathBuf,
}

fn default_true() -> bool {
    true
}

fn env_layer() -> config::Environment {
    config::Environment::with_prefix("LITREVIEW")
        .separator("__")
        .try_parsing(true)
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        Self::build(builder.add_source(env_layer()))
    }

    /// Built-in defaults overlaid with `LITREVIEW__SECTION__KEY` variables,
    /// for runs without a config file.
    pub fn load_defaults() -> Result<Self> {
        dotenv().ok();
        Self::defaults_with_env(env_layer())
    }

    fn defaults_with_env(env: config::Environment) -> Result<Self> {
        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        Self::build(config::Config::builder().add_source(defaults).add_source(env))
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            llm: LlmConfig {
                api_base: "https://api.openai.com/v1".to_string(),
                api_key: None,
                chat_model: "gpt-4-turbo".to_string(),
                embedding_model: "text-embedding-ada-002".to_string(),
                temperature: 0.0,
                request_timeout_secs: 60,
            },
            database: DatabaseConfig {
                uri: "data/lancedb".to_string(),
                table_name: "sentences".to_string(),
                batch_size: 64,
                embedding_dim: 1536,
            },
            pipeline: PipelineConfig {
                parallel_workers: 4,
                skip_patterns: vec![".git/*".to_string(), "*.zip".to_string()],
                max_file_size_mb: 50,
                metadata_window_chars: 1000,
                include_notes: true,
                normalize_text: true,
            },
            prompts: PromptConfig {
                path: PathBuf::from("config/prompts.yaml"),
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.pipeline.parallel_workers == 0 {
            return Err(PipelineError::Config(
                "parallel_workers must be greater than 0".to_string(),
            ));
        }

        if self.database.batch_size == 0 {
            return Err(PipelineError::Config(
                "batch_size must be greater than 0".to_string(),
            ));
        }

        if self.database.embedding_dim == 0 {
            return Err(PipelineError::Config(
                "embedding_dim must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.metadata_window_chars == 0 {
            return Err(PipelineError::Config(
                "metadata_window_chars must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
