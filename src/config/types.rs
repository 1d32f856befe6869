/// Runtime configuration, assembled from defaults plus environment
/// overrides. Nothing is persisted.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiSettings,
    pub models: ModelSettings,
}

/// Connection settings for the Gemini API.
///
/// `api_key` may be empty: a missing credential must not fail startup, it
/// fails each upstream call instead.
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// Model identifiers per concern.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub plan: String,
    pub chat: String,
    pub image: String,
}
