pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::tmdb::TmdbClient;
pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::{
    engine::{ImportEngine, ImportReport},
    import_pipeline::ImportPipeline,
};
pub use utils::error::{ImportError, Result};
