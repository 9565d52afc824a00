pub mod engine;
pub mod import_pipeline;

pub use crate::domain::model::{Catalog, RawCatalog};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
