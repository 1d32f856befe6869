use super::constants::*;
use super::types::{GeminiSettings, ModelSettings};

pub fn default_user_agent() -> String {
    format!("shanshi/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            plan: DEFAULT_PLAN_MODEL.to_string(),
            chat: DEFAULT_CHAT_MODEL.to_string(),
            image: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}
