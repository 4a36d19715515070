use super::base::ProviderConfig;
use anyhow::Result;

pub const OPENROUTER_DEFAULT_HOST: &str = "https://openrouter.ai";

pub struct OpenRouterProviderConfig {
    pub api_key: String,
    pub host: String,
}

impl OpenRouterProviderConfig {
    pub fn new(api_key: String, host: String) -> Self {
        Self { api_key, host }
    }
}

impl ProviderConfig for OpenRouterProviderConfig {
    fn from_env() -> Result<Self> {
        let api_key = Self::get_env("OPENROUTER_API_KEY", true, None)?
            .ok_or_else(|| anyhow::anyhow!("OpenRouter API key should be present"))?;

        let host = Self::get_env(
            "OPENROUTER_API_HOST",
            false,
            Some(OPENROUTER_DEFAULT_HOST.to_string()),
        )?
        .unwrap_or_else(|| OPENROUTER_DEFAULT_HOST.to_string());

        Ok(Self::new(api_key, host))
    }
}
