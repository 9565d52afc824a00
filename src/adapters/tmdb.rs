//! TMDb (The Movie Database) API client.
//!
//! Every call is a single GET against `{base_url}/{path}` with the API key
//! attached as a query parameter. Requests are issued one at a time; there is
//! no retry and no caching at this layer.

use std::collections::{HashMap, VecDeque};

use futures::stream::{self, Stream};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::domain::model::{CreditEntry, GenreEntry, MovieDetail, MovieSummary, PersonDetail};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ImportError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

#[derive(Debug, Deserialize)]
struct PagedResponse<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct CreditsResponse {
    #[serde(default)]
    crew: Vec<CreditEntry>,
}

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    #[serde(default)]
    genres: Vec<GenreEntry>,
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// 使用預設 TMDb 端點；未傳入金鑰時讀取 `TMDB_API_KEY`
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let api_key = resolve_api_key(api_key, std::env::var(API_KEY_ENV).ok())?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client: Client::new(),
            base_url,
            api_key,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::with_base_url(config.api_base_url(), config.api_key().map(str::to_string))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, page: Option<u32>) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);

        let mut request = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())]);
        if let Some(page) = page {
            request = request.query(&[("page", page)]);
        }

        tracing::debug!("GET {} (page: {:?})", path, page);
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::debug!("TMDb responded {} for {}", status, path);
            return Err(ImportError::RemoteError {
                status,
                path: path.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn fetch_popular(&self, page: u32) -> Result<Vec<MovieSummary>> {
        let data: PagedResponse<MovieSummary> = self.get("movie/popular", Some(page)).await?;
        Ok(data.results)
    }

    pub async fn fetch_upcoming(&self, page: u32) -> Result<Vec<MovieSummary>> {
        let data: PagedResponse<MovieSummary> = self.get("movie/upcoming", Some(page)).await?;
        Ok(data.results)
    }

    /// Popular and upcoming for the same page, merged by id. An upcoming entry
    /// replaces a popular one with the same id. Duplicates across pages are
    /// left to the caller.
    pub async fn fetch_popular_and_upcoming(&self, page: u32) -> Result<Vec<MovieSummary>> {
        let popular = self.fetch_popular(page).await?;
        let upcoming = self.fetch_upcoming(page).await?;
        Ok(merge_by_id(popular, upcoming))
    }

    pub async fn fetch_movie_details(&self, movie_id: i64) -> Result<MovieDetail> {
        self.get(&format!("movie/{}", movie_id), None).await
    }

    /// Crew entries credited as "Director". Empty when the movie has none.
    pub async fn fetch_movie_directors(&self, movie_id: i64) -> Result<Vec<CreditEntry>> {
        let credits: CreditsResponse = self
            .get(&format!("movie/{}/credits", movie_id), None)
            .await?;

        Ok(credits
            .crew
            .into_iter()
            .filter(CreditEntry::is_director)
            .collect())
    }

    pub async fn fetch_movie_director(&self, movie_id: i64) -> Result<Option<CreditEntry>> {
        Ok(self.fetch_movie_directors(movie_id).await?.into_iter().next())
    }

    pub async fn fetch_director_details(&self, director_id: i64) -> Result<PersonDetail> {
        self.get(&format!("person/{}", director_id), None).await
    }

    /// Popular movies from pages `1..=max_pages`, in page order.
    ///
    /// A page is requested only once every item of the previous page has been
    /// pulled, so dropping the stream early saves the remaining requests. The
    /// stream ends after the first error.
    pub fn fetch_all_popular(
        &self,
        max_pages: u32,
    ) -> impl Stream<Item = Result<MovieSummary>> + '_ {
        stream::try_unfold(
            (first_page(max_pages), VecDeque::new()),
            move |(mut next, mut buffer)| async move {
                loop {
                    if let Some(movie) = buffer.pop_front() {
                        return Ok::<_, ImportError>(Some((movie, (next, buffer))));
                    }
                    let Some(page) = next else {
                        return Ok::<_, ImportError>(None);
                    };
                    buffer = VecDeque::from(self.fetch_popular(page).await?);
                    next = next_page(page, max_pages);
                }
            },
        )
    }

    pub async fn fetch_movie_genres(&self) -> Result<Vec<GenreEntry>> {
        let data: GenreListResponse = self.get("genre/movie/list", None).await?;
        Ok(data.genres)
    }
}

fn first_page(max_pages: u32) -> Option<u32> {
    (max_pages >= 1).then_some(1)
}

/// 下一個要抓的頁碼；超過 `max_pages` 或 u32 溢位時為 None
fn next_page(page: u32, max_pages: u32) -> Option<u32> {
    page.checked_add(1).filter(|next| *next <= max_pages)
}

/// 明確傳入的金鑰優先，其次為環境變數；兩者皆無則失敗
pub fn resolve_api_key(explicit: Option<String>, from_env: Option<String>) -> Result<String> {
    explicit
        .filter(|key| !key.trim().is_empty())
        .or_else(|| from_env.filter(|key| !key.trim().is_empty()))
        .ok_or_else(|| ImportError::MissingConfigError {
            field: "api_key".to_string(),
        })
}

/// Merge two summary lists keyed by id. The later list wins on collision;
/// each id keeps the position where it first appeared.
pub fn merge_by_id(first: Vec<MovieSummary>, later: Vec<MovieSummary>) -> Vec<MovieSummary> {
    let mut positions: HashMap<i64, usize> = HashMap::new();
    let mut merged: Vec<MovieSummary> = Vec::with_capacity(first.len() + later.len());

    for movie in first.into_iter().chain(later) {
        match positions.get(&movie.id) {
            Some(&index) => merged[index] = movie,
            None => {
                positions.insert(movie.id, merged.len());
                merged.push(movie);
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: i64, title: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: title.to_string(),
            overview: String::new(),
            release_date: None,
            vote_average: 0.0,
            genre_ids: vec![],
            adult: false,
        }
    }

    #[test]
    fn test_merge_by_id_later_wins() {
        let popular = vec![summary(1, "One"), summary(2, "Two (popular)")];
        let upcoming = vec![summary(2, "Two (upcoming)"), summary(3, "Three")];

        let merged = merge_by_id(popular, upcoming);

        let ids: Vec<i64> = merged.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(merged[1].title, "Two (upcoming)");
    }

    #[test]
    fn test_merge_by_id_collapses_duplicates_within_a_list() {
        let merged = merge_by_id(vec![summary(4, "a"), summary(4, "b")], vec![]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "b");
    }

    #[test]
    fn test_page_advance_stops_at_max_pages() {
        assert_eq!(first_page(0), None);
        assert_eq!(first_page(3), Some(1));
        assert_eq!(next_page(1, 3), Some(2));
        assert_eq!(next_page(3, 3), None);
    }

    #[test]
    fn test_page_advance_does_not_overflow() {
        assert_eq!(next_page(u32::MAX - 1, u32::MAX), Some(u32::MAX));
        assert_eq!(next_page(u32::MAX, u32::MAX), None);
    }

    #[test]
    fn test_resolve_api_key_order() {
        assert_eq!(
            resolve_api_key(Some("explicit".into()), Some("env".into())).unwrap(),
            "explicit"
        );
        assert_eq!(resolve_api_key(None, Some("env".into())).unwrap(), "env");
        assert_eq!(
            resolve_api_key(Some("  ".into()), Some("env".into())).unwrap(),
            "env"
        );
        assert!(matches!(
            resolve_api_key(None, None),
            Err(ImportError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client =
            TmdbClient::with_base_url("http://localhost:1234/3/", Some("key".into())).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234/3");
    }
}
