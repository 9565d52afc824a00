use crate::adapters::tmdb::TmdbClient;
use crate::core::{Catalog, ConfigProvider, Pipeline, RawCatalog, Storage};
use crate::domain::model::{
    Author, Film, FilmRating, FilmStatus, Genre, ImportedMovie, MovieSummary, PersonDetail,
};
use crate::utils::error::{ImportError, Result};
use futures::TryStreamExt;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const ARCHIVE_NAME: &str = "catalog_import.zip";

/// Extract 階段的累積狀態
#[derive(Default)]
struct ExtractState {
    seen_movies: HashSet<i64>,
    director_ids: HashSet<i64>,
    directors: Vec<PersonDetail>,
    movies: Vec<ImportedMovie>,
    skipped_without_director: usize,
    skipped_without_release_date: usize,
}

/// Imports popular (and optionally upcoming) movies with their directors and
/// the genre list, then writes the result as a ZIP archive.
pub struct ImportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: TmdbClient,
}

impl<S: Storage, C: ConfigProvider> ImportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let client = TmdbClient::from_config(&config)?;
        Ok(Self::with_client(storage, config, client))
    }

    pub fn with_client(storage: S, config: C, client: TmdbClient) -> Self {
        Self {
            storage,
            config,
            client,
        }
    }

    async fn import_movie(&self, summary: MovieSummary, state: &mut ExtractState) -> Result<()> {
        // 跨頁重複的電影只處理一次
        if !state.seen_movies.insert(summary.id) {
            tracing::debug!("Skipping duplicate movie {} ({})", summary.id, summary.title);
            return Ok(());
        }

        let detail = self.client.fetch_movie_details(summary.id).await?;

        // Film 需要上映日；在查導演之前先排除，避免留下沒有電影的 Author
        if detail.release_date.or(summary.release_date).is_none() {
            tracing::warn!(
                "⚠️ '{}' ({}) has no release date, skipping",
                summary.title,
                summary.id
            );
            state.skipped_without_release_date += 1;
            return Ok(());
        }

        let Some(director) = self.client.fetch_movie_director(summary.id).await? else {
            tracing::warn!(
                "⚠️ No director found for '{}' ({}), skipping",
                summary.title,
                summary.id
            );
            state.skipped_without_director += 1;
            return Ok(());
        };

        if state.director_ids.insert(director.id) {
            let person = self.client.fetch_director_details(director.id).await?;
            tracing::debug!("Fetched director {} ({})", person.name, person.id);
            state.directors.push(person);
        }

        tracing::debug!("Imported movie {} ({})", summary.title, summary.id);
        state.movies.push(ImportedMovie {
            summary,
            detail,
            director_id: director.id,
        });
        Ok(())
    }
}

fn build_film(movie: ImportedMovie, genre_names: &HashMap<i64, String>) -> Option<Film> {
    let ImportedMovie {
        summary,
        detail,
        director_id,
    } = movie;

    let release_date = detail.release_date.or(summary.release_date)?;

    let title = if detail.title.is_empty() {
        summary.title
    } else {
        detail.title
    };
    let description = if detail.overview.is_empty() {
        summary.overview
    } else {
        detail.overview
    };

    let genres = if detail.genres.is_empty() {
        summary
            .genre_ids
            .iter()
            .filter_map(|id| {
                let name = genre_names.get(id).cloned();
                if name.is_none() {
                    tracing::warn!("Unknown genre id {} on movie {}", id, summary.id);
                }
                name
            })
            .collect()
    } else {
        detail.genres.into_iter().map(|g| g.name).collect()
    };

    Some(Film {
        title,
        description,
        release_date,
        adult: detail.adult || summary.adult,
        author: director_id,
        rating: FilmRating::from_vote_average(summary.vote_average),
        status: FilmStatus::from(detail.status),
        budget: detail.budget,
        box_office: detail.revenue,
        tmdb_id: summary.id,
        archived: false,
        genres,
    })
}

fn csv_bytes(header: &[&str], rows: Vec<Vec<String>>) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.into_inner().map_err(|e| ImportError::ProcessingError {
        message: format!("Failed to flush CSV output: {}", e),
    })
}

fn optional_to_string<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn genres_csv(genres: &[Genre]) -> Result<Vec<u8>> {
    let rows = genres
        .iter()
        .map(|g| vec![g.tmdb_id.to_string(), g.name.clone()])
        .collect();
    csv_bytes(&["tmdb_id", "name"], rows)
}

fn authors_csv(authors: &[Author]) -> Result<Vec<u8>> {
    let rows = authors
        .iter()
        .map(|a| {
            vec![
                a.tmdb_id.to_string(),
                a.name.clone(),
                optional_to_string(&a.birth_date),
                optional_to_string(&a.death_date),
                a.place_of_birth.clone(),
                a.gender.label().to_string(),
            ]
        })
        .collect();
    csv_bytes(
        &[
            "tmdb_id",
            "name",
            "birth_date",
            "death_date",
            "place_of_birth",
            "gender",
        ],
        rows,
    )
}

fn films_csv(films: &[Film]) -> Result<Vec<u8>> {
    let rows = films
        .iter()
        .map(|f| {
            vec![
                f.tmdb_id.to_string(),
                f.title.clone(),
                f.release_date.to_string(),
                f.author.to_string(),
                f.status.label().to_string(),
                f.rating.label().to_string(),
                optional_to_string(&f.budget),
                optional_to_string(&f.box_office),
                f.adult.to_string(),
                f.genres.join("|"),
            ]
        })
        .collect();
    csv_bytes(
        &[
            "tmdb_id",
            "title",
            "release_date",
            "author_tmdb_id",
            "status",
            "rating",
            "budget",
            "box_office",
            "adult",
            "genres",
        ],
        rows,
    )
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ImportPipeline<S, C> {
    async fn extract(&self) -> Result<RawCatalog> {
        let genres = self.client.fetch_movie_genres().await?;
        tracing::info!("🎭 Fetched {} genres", genres.len());

        let max_pages = self.config.max_pages();
        let mut state = ExtractState::default();

        if self.config.include_upcoming() {
            for page in 1..=max_pages {
                let candidates = self.client.fetch_popular_and_upcoming(page).await?;
                tracing::debug!("Page {}: {} popular/upcoming candidates", page, candidates.len());
                for summary in candidates {
                    self.import_movie(summary, &mut state).await?;
                }
            }
        } else {
            let movies = self.client.fetch_all_popular(max_pages);
            futures::pin_mut!(movies);
            while let Some(summary) = movies.try_next().await? {
                self.import_movie(summary, &mut state).await?;
            }
        }

        tracing::info!(
            "🎬 Collected {} movies and {} directors ({} skipped without director, {} without release date)",
            state.movies.len(),
            state.directors.len(),
            state.skipped_without_director,
            state.skipped_without_release_date
        );

        Ok(RawCatalog {
            genres,
            directors: state.directors,
            movies: state.movies,
        })
    }

    async fn transform(&self, data: RawCatalog) -> Result<Catalog> {
        let genre_names: HashMap<i64, String> = data
            .genres
            .iter()
            .map(|g| (g.id, g.name.clone()))
            .collect();

        let genres: Vec<Genre> = data.genres.into_iter().map(Genre::from).collect();
        let authors: Vec<Author> = data.directors.into_iter().map(Author::from).collect();

        let mut films = Vec::with_capacity(data.movies.len());
        for movie in data.movies {
            let (id, title) = (movie.summary.id, movie.summary.title.clone());
            match build_film(movie, &genre_names) {
                Some(film) => films.push(film),
                None => tracing::warn!("⚠️ '{}' ({}) has no release date, skipping", title, id),
            }
        }

        Ok(Catalog {
            genres,
            authors,
            films,
        })
    }

    async fn load(&self, catalog: Catalog) -> Result<String> {
        let output_path = format!(
            "{}/{}",
            self.config.output_path().trim_end_matches('/'),
            ARCHIVE_NAME
        );

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            zip.start_file("catalog.json", SimpleFileOptions::default())?;
            zip.write_all(&serde_json::to_vec_pretty(&catalog)?)?;

            zip.start_file("genres.csv", SimpleFileOptions::default())?;
            zip.write_all(&genres_csv(&catalog.genres)?)?;

            zip.start_file("authors.csv", SimpleFileOptions::default())?;
            zip.write_all(&authors_csv(&catalog.authors)?)?;

            zip.start_file("films.csv", SimpleFileOptions::default())?;
            zip.write_all(&films_csv(&catalog.films)?)?;

            zip.finish()?.into_inner()
        };

        tracing::debug!("Writing archive ({} bytes) to storage", zip_data.len());
        self.storage.write_file(ARCHIVE_NAME, &zip_data).await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{GenreEntry, MovieDetail, MovieStatus};
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig;

    impl ConfigProvider for MockConfig {
        fn api_base_url(&self) -> &str {
            "http://127.0.0.1:9"
        }

        fn api_key(&self) -> Option<&str> {
            Some("test-key")
        }

        fn output_path(&self) -> &str {
            "test_output/"
        }

        fn max_pages(&self) -> u32 {
            1
        }

        fn include_upcoming(&self) -> bool {
            false
        }
    }

    fn pipeline(storage: MockStorage) -> ImportPipeline<MockStorage, MockConfig> {
        ImportPipeline::new(storage, MockConfig).unwrap()
    }

    fn imported(id: i64, release_date: Option<NaiveDate>, genre_ids: Vec<i64>) -> ImportedMovie {
        ImportedMovie {
            summary: MovieSummary {
                id,
                title: format!("Movie {}", id),
                overview: "summary overview".to_string(),
                release_date,
                vote_average: 7.2,
                genre_ids,
                adult: false,
            },
            detail: MovieDetail {
                id,
                status: MovieStatus::Released,
                budget: Some(1_000),
                revenue: None,
                title: String::new(),
                overview: String::new(),
                release_date: None,
                adult: false,
                genres: vec![],
            },
            director_id: 42,
        }
    }

    fn raw_catalog(movies: Vec<ImportedMovie>) -> RawCatalog {
        RawCatalog {
            genres: vec![
                GenreEntry {
                    id: 18,
                    name: "Drama".to_string(),
                },
                GenreEntry {
                    id: 35,
                    name: "Comedy".to_string(),
                },
            ],
            directors: vec![PersonDetail {
                id: 42,
                name: "Director".to_string(),
                birthday: None,
                deathday: None,
                biography: String::new(),
                place_of_birth: None,
                gender: 2,
            }],
            movies,
        }
    }

    #[tokio::test]
    async fn test_transform_maps_entities() {
        let date = NaiveDate::from_ymd_opt(2023, 7, 21);
        let catalog = pipeline(MockStorage::new())
            .transform(raw_catalog(vec![imported(1, date, vec![18, 35, 999])]))
            .await
            .unwrap();

        assert_eq!(catalog.genres.len(), 2);
        assert_eq!(catalog.authors[0].place_of_birth, "Unknown");

        let film = &catalog.films[0];
        assert_eq!(film.title, "Movie 1");
        assert_eq!(film.description, "summary overview");
        assert_eq!(film.release_date, date.unwrap());
        assert_eq!(film.author, 42);
        assert_eq!(film.rating, FilmRating::Good);
        assert_eq!(film.status, FilmStatus::Released);
        assert_eq!(film.budget, Some(1_000));
        assert_eq!(film.box_office, None);
        assert!(!film.archived);
        // 未知的 genre id 會被略過
        assert_eq!(film.genres, vec!["Drama", "Comedy"]);
    }

    #[tokio::test]
    async fn test_transform_prefers_detail_fields() {
        let mut movie = imported(2, None, vec![18]);
        movie.detail.title = "Detailed Title".to_string();
        movie.detail.release_date = NaiveDate::from_ymd_opt(2024, 1, 5);
        movie.detail.genres = vec![GenreEntry {
            id: 35,
            name: "Comedy".to_string(),
        }];

        let catalog = pipeline(MockStorage::new())
            .transform(raw_catalog(vec![movie]))
            .await
            .unwrap();

        let film = &catalog.films[0];
        assert_eq!(film.title, "Detailed Title");
        assert_eq!(film.genres, vec!["Comedy"]);
    }

    #[tokio::test]
    async fn test_transform_skips_movies_without_release_date() {
        let catalog = pipeline(MockStorage::new())
            .transform(raw_catalog(vec![
                imported(3, None, vec![]),
                imported(4, NaiveDate::from_ymd_opt(2022, 2, 2), vec![]),
            ]))
            .await
            .unwrap();

        assert_eq!(catalog.films.len(), 1);
        assert_eq!(catalog.films[0].tmdb_id, 4);
    }

    #[tokio::test]
    async fn test_load_writes_archive() {
        let storage = MockStorage::new();
        let pipeline = pipeline(storage.clone());

        let catalog = pipeline
            .transform(raw_catalog(vec![imported(
                5,
                NaiveDate::from_ymd_opt(2020, 10, 1),
                vec![18],
            )]))
            .await
            .unwrap();

        let output_path = pipeline.load(catalog.clone()).await.unwrap();
        assert_eq!(output_path, "test_output/catalog_import.zip");

        let zip_bytes = storage.get_file(ARCHIVE_NAME).await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();

        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec!["authors.csv", "catalog.json", "films.csv", "genres.csv"]
        );

        let json: Catalog = serde_json::from_reader(archive.by_name("catalog.json").unwrap())
            .unwrap();
        assert_eq!(json, catalog);

        let mut films = String::new();
        std::io::Read::read_to_string(&mut archive.by_name("films.csv").unwrap(), &mut films)
            .unwrap();
        let lines: Vec<&str> = films.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("tmdb_id,title,release_date"));
        assert_eq!(lines[1], "5,Movie 5,2020-10-01,42,Released,Good,1000,,false,Drama");
    }
}
