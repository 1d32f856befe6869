use anyhow::{Context, Result, anyhow};
use std::env;

use super::builder::ConfigBuilder;

pub fn apply_env_overrides(mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
    if let Some(api_key) = env_string("GEMINI_API_KEY")? {
        builder = builder.with_gemini(|gemini| gemini.api_key = api_key.clone());
    }

    if let Some(base_url) = env_string("SHANSHI_BASE_URL")? {
        builder = builder.with_gemini(|gemini| gemini.base_url = base_url.clone());
    }

    if let Some(timeout) = env_u64("SHANSHI_TIMEOUT_SECS")? {
        builder = builder.with_gemini(|gemini| gemini.timeout_secs = timeout);
    }

    if let Some(plan) = env_string("SHANSHI_PLAN_MODEL")? {
        builder = builder.with_models(|models| models.plan = plan.clone());
    }

    if let Some(chat) = env_string("SHANSHI_CHAT_MODEL")? {
        builder = builder.with_models(|models| models.chat = chat.clone());
    }

    if let Some(image) = env_string("SHANSHI_IMAGE_MODEL")? {
        builder = builder.with_models(|models| models.image = image.clone());
    }

    Ok(builder)
}

pub fn env_string(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(anyhow!("{key} contains invalid UTF-8")),
    }
}

pub fn env_u64(key: &str) -> Result<Option<u64>> {
    if let Some(value) = env_string(key)? {
        let parsed = value
            .parse::<u64>()
            .with_context(|| format!("Failed to parse {key} as u64"))?;
        Ok(Some(parsed))
    } else {
        Ok(None)
    }
}
