use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub output_path: String,
    pub genres: usize,
    pub authors: usize,
    pub films: usize,
    pub elapsed: Duration,
}

pub struct ImportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ImportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// 依序執行 extract → transform → load；任何錯誤都會中止整次匯入
    pub async fn run(&self) -> Result<ImportReport> {
        let started = Instant::now();
        tracing::info!("Starting import...");

        tracing::info!("Extracting from catalog API...");
        let raw = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} genres, {} directors, {} movies",
            raw.genres.len(),
            raw.directors.len(),
            raw.movies.len()
        );

        tracing::info!("Mapping onto catalog entities...");
        let catalog = self.pipeline.transform(raw).await?;
        let (genres, authors, films) = (
            catalog.genres.len(),
            catalog.authors.len(),
            catalog.films.len(),
        );
        tracing::info!(
            "Mapped {} genres, {} authors, {} films",
            genres,
            authors,
            films
        );

        tracing::info!("Loading...");
        let output_path = self.pipeline.load(catalog).await?;
        let elapsed = started.elapsed();
        tracing::info!("Output saved to: {} ({:?})", output_path, elapsed);

        Ok(ImportReport {
            output_path,
            genres,
            authors,
            films,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Catalog, RawCatalog};
    use crate::domain::model::{Genre, GenreEntry};
    use crate::utils::error::ImportError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPipeline {
        fail_extract: bool,
        loads: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Pipeline for CountingPipeline {
        async fn extract(&self) -> Result<RawCatalog> {
            if self.fail_extract {
                return Err(ImportError::ProcessingError {
                    message: "boom".to_string(),
                });
            }
            Ok(RawCatalog {
                genres: vec![GenreEntry {
                    id: 28,
                    name: "Action".to_string(),
                }],
                ..Default::default()
            })
        }

        async fn transform(&self, data: RawCatalog) -> Result<Catalog> {
            Ok(Catalog {
                genres: data.genres.into_iter().map(Genre::from).collect(),
                ..Default::default()
            })
        }

        async fn load(&self, _catalog: Catalog) -> Result<String> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok("out/catalog_import.zip".to_string())
        }
    }

    #[test]
    fn test_run_reports_counts() {
        let engine = ImportEngine::new(CountingPipeline {
            fail_extract: false,
            loads: AtomicUsize::new(0),
        });

        let report = tokio_test::block_on(engine.run()).unwrap();

        assert_eq!(report.output_path, "out/catalog_import.zip");
        assert_eq!(report.genres, 1);
        assert_eq!(report.films, 0);
    }

    #[tokio::test]
    async fn test_extract_failure_skips_load() {
        let pipeline = CountingPipeline {
            fail_extract: true,
            loads: AtomicUsize::new(0),
        };
        let engine = ImportEngine::new(pipeline);

        assert!(engine.run().await.is_err());
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 0);
    }
}
