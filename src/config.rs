// Lectern Runtime Configuration
// Copyright (c) 2026 The Lectern Authors
//
// All vendor credentials and endpoints are resolved once at startup and
// handed to each collaborator at construction time. Missing credentials
// are fatal here rather than surfacing later as opaque vendor 401s.

use anyhow::{Context, Result};
use std::path::PathBuf;

const DEFAULT_LLM_URL: &str = "https://dashscope-intl.aliyuncs.com/compatible-mode/v1";
const DEFAULT_LLM_MODEL: &str = "qwen3-max-preview";
const DEFAULT_HF_URL: &str = "https://platform.higgsfield.ai";
const DEFAULT_AVATAR_URL: &str =
    "https://d3snorpfx4xhv8.cloudfront.net/c2906af4-60bf-416c-95e0-639aa06d11cd/37657c2a-3962-4575-bb80-89c2864f0be9.jpeg";

#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the OpenAI-compatible chat-completions endpoint.
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,

    /// Higgsfield media-generation credentials.
    pub hf_api_key: String,
    pub hf_secret: String,
    pub hf_base_url: String,

    /// Presenter portrait used by the avatar image/video variants.
    pub avatar_url: String,

    /// Scratch directory for downloaded clips and the merged output.
    pub output_dir: PathBuf,
}

impl Config {
    /// Build the configuration from the process environment.
    ///
    /// `DASHSCOPE_API_KEY`, `HF_API_KEY` and `HF_SECRET` are required;
    /// everything else has a production default and a `LECTERN_*`
    /// override so tests can point collaborators at a local stub.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            llm_api_key: required("DASHSCOPE_API_KEY")?,
            llm_base_url: optional("LECTERN_LLM_URL", DEFAULT_LLM_URL),
            llm_model: optional("LECTERN_LLM_MODEL", DEFAULT_LLM_MODEL),
            hf_api_key: required("HF_API_KEY")?,
            hf_secret: required("HF_SECRET")?,
            hf_base_url: optional("LECTERN_HF_URL", DEFAULT_HF_URL),
            avatar_url: optional("LECTERN_AVATAR_URL", DEFAULT_AVATAR_URL),
            output_dir: PathBuf::from(optional("LECTERN_OUTPUT_DIR", "videos")),
        })
    }
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} environment variable is required"))
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_required_and_defaults() {
        std::env::set_var("DASHSCOPE_API_KEY", "llm-key");
        std::env::set_var("HF_API_KEY", "hf-key");
        std::env::set_var("HF_SECRET", "hf-secret");
        std::env::remove_var("LECTERN_LLM_MODEL");

        let config = Config::from_env().unwrap();
        assert_eq!(config.llm_api_key, "llm-key");
        assert_eq!(config.llm_model, DEFAULT_LLM_MODEL);
        assert_eq!(config.hf_base_url, DEFAULT_HF_URL);
        assert_eq!(config.output_dir, PathBuf::from("videos"));

        // Missing credential is a startup error, not a placeholder.
        std::env::remove_var("HF_SECRET");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("HF_SECRET"));
        std::env::set_var("HF_SECRET", "hf-secret");
    }
}
