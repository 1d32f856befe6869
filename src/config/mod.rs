//! Configuration for the shanshi assistant.
//!
//! Built from defaults plus environment variable overrides. There is no
//! config file: nothing in this system persists across runs. A missing API
//! key is deliberately not a load error; upstream calls fail with a
//! credential error instead, so the UI stays interactive.

use anyhow::Result;

mod builder;
mod constants;
mod defaults;
mod environment;
mod types;

pub use builder::ConfigBuilder;
pub use types::{Config, GeminiSettings, ModelSettings};

use environment::apply_env_overrides;


impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn load() -> Result<Self> {
        let builder = apply_env_overrides(Self::builder())?;
        builder.build()
    }
}
