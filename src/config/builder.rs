use anyhow::Result;

use super::types::{Config, GeminiSettings, ModelSettings};

#[derive(Debug)]
pub struct ConfigBuilder {
    pub(super) gemini: GeminiSettings,
    pub(super) models: ModelSettings,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            gemini: GeminiSettings::default(),
            models: ModelSettings::default(),
        }
    }

    pub fn with_gemini<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut GeminiSettings),
    {
        update(&mut self.gemini);
        self
    }

    pub fn with_models<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut ModelSettings),
    {
        update(&mut self.models);
        self
    }

    pub fn build(self) -> Result<Config> {
        Ok(Config {
            gemini: self.gemini,
            models: self.models,
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
