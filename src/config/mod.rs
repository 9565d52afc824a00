pub mod cli;
pub mod toml_config;

use crate::adapters::tmdb::DEFAULT_BASE_URL;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

/// TMDb 單一列表最多可翻的頁數
pub const MAX_PAGES_LIMIT: u32 = 500;

#[cfg(feature = "cli")]
#[derive(Clone, Serialize, Deserialize, Parser)]
#[command(name = "movies-import")]
#[command(about = "Import popular movies, directors and genres from TMDb")]
pub struct CliConfig {
    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "5")]
    pub max_pages: u32,

    #[arg(long, help = "Also import upcoming movies for each page")]
    pub include_upcoming: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

// 手寫 Debug 以免把金鑰寫進日誌
#[cfg(feature = "cli")]
impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("output_path", &self.output_path)
            .field("max_pages", &self.max_pages)
            .field("include_upcoming", &self.include_upcoming)
            .field("verbose", &self.verbose)
            .finish()
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_base_url(&self) -> &str {
        &self.base_url
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn max_pages(&self) -> u32 {
        self.max_pages
    }

    fn include_upcoming(&self) -> bool {
        self.include_upcoming
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_path("output_path", &self.output_path)?;
        validate_range("max_pages", self.max_pages, 1, MAX_PAGES_LIMIT)?;
        if let Some(key) = &self.api_key {
            validate_non_empty_string("api_key", key)?;
        }
        Ok(())
    }
}
