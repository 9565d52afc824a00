use crate::domain::model::{Catalog, RawCatalog};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    /// 未設定時由 client 改讀 `TMDB_API_KEY`
    fn api_key(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn max_pages(&self) -> u32;
    fn include_upcoming(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<RawCatalog>;
    async fn transform(&self, data: RawCatalog) -> Result<Catalog>;
    async fn load(&self, catalog: Catalog) -> Result<String>;
}
