use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Remote records (TMDb response shapes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default, deserialize_with = "optional_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default)]
    pub adult: bool,
}

/// TMDb 的電影製作狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovieStatus {
    Rumored,
    Planned,
    #[serde(rename = "In Production")]
    InProduction,
    #[serde(rename = "Post Production")]
    PostProduction,
    Released,
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: i64,
    pub status: MovieStatus,
    #[serde(default, deserialize_with = "zero_as_none")]
    pub budget: Option<u64>,
    #[serde(default, deserialize_with = "zero_as_none")]
    pub revenue: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default, deserialize_with = "optional_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub genres: Vec<GenreEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditEntry {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub job: String,
    #[serde(default)]
    pub department: Option<String>,
}

impl CreditEntry {
    pub const DIRECTOR_JOB: &'static str = "Director";

    pub fn is_director(&self) -> bool {
        self.job == Self::DIRECTOR_JOB
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonDetail {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "optional_date")]
    pub birthday: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_date")]
    pub deathday: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub biography: String,
    #[serde(default)]
    pub place_of_birth: Option<String>,
    #[serde(default)]
    pub gender: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenreEntry {
    pub id: i64,
    pub name: String,
}

/// TMDb 以 `""` 或 `null` 表示未知日期
fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn zero_as_none<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<u64> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|v| *v > 0))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Local catalog entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "0")]
    NotSpecified,
    #[serde(rename = "1")]
    Female,
    #[serde(rename = "2")]
    Male,
    #[serde(rename = "3")]
    NonBinary,
}

impl Gender {
    pub fn from_tmdb_code(code: u8) -> Self {
        match code {
            1 => Gender::Female,
            2 => Gender::Male,
            3 => Gender::NonBinary,
            _ => Gender::NotSpecified,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gender::NotSpecified => "Not specified",
            Gender::Female => "Female",
            Gender::Male => "Male",
            Gender::NonBinary => "Non-binary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilmStatus {
    Planned,
    #[serde(rename = "Post Production")]
    PostProduction,
    Released,
}

impl FilmStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FilmStatus::Planned => "Planned",
            FilmStatus::PostProduction => "Post Production",
            FilmStatus::Released => "Released",
        }
    }
}

impl From<MovieStatus> for FilmStatus {
    fn from(status: MovieStatus) -> Self {
        match status {
            MovieStatus::Released => FilmStatus::Released,
            MovieStatus::InProduction | MovieStatus::PostProduction => FilmStatus::PostProduction,
            MovieStatus::Rumored | MovieStatus::Planned | MovieStatus::Canceled => {
                FilmStatus::Planned
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilmRating {
    Bad,
    Average,
    Good,
    Excellent,
}

impl FilmRating {
    /// 依 TMDb 0-10 平均分數分級
    pub fn from_vote_average(vote_average: f64) -> Self {
        if vote_average >= 8.0 {
            FilmRating::Excellent
        } else if vote_average >= 6.0 {
            FilmRating::Good
        } else if vote_average >= 4.0 {
            FilmRating::Average
        } else {
            FilmRating::Bad
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilmRating::Bad => "Bad",
            FilmRating::Average => "Average",
            FilmRating::Good => "Good",
            FilmRating::Excellent => "Excellent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
    pub tmdb_id: i64,
}

impl From<GenreEntry> for Genre {
    fn from(entry: GenreEntry) -> Self {
        Self {
            name: entry.name,
            tmdb_id: entry.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub biography: String,
    pub place_of_birth: String,
    pub gender: Gender,
    pub tmdb_id: i64,
}

impl Author {
    pub const UNKNOWN_PLACE_OF_BIRTH: &'static str = "Unknown";
}

impl From<PersonDetail> for Author {
    fn from(person: PersonDetail) -> Self {
        let place_of_birth = person
            .place_of_birth
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| Author::UNKNOWN_PLACE_OF_BIRTH.to_string());

        Self {
            name: person.name,
            birth_date: person.birthday,
            death_date: person.deathday,
            biography: person.biography,
            place_of_birth,
            gender: Gender::from_tmdb_code(person.gender),
            tmdb_id: person.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    pub title: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub adult: bool,
    /// 導演 (Author) 的 TMDb id
    pub author: i64,
    pub rating: FilmRating,
    pub status: FilmStatus,
    pub budget: Option<u64>,
    pub box_office: Option<u64>,
    pub tmdb_id: i64,
    pub archived: bool,
    pub genres: Vec<String>,
}

/// 一部電影在 extract 階段收集到的原始資料
#[derive(Debug, Clone)]
pub struct ImportedMovie {
    pub summary: MovieSummary,
    pub detail: MovieDetail,
    pub director_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct RawCatalog {
    pub genres: Vec<GenreEntry>,
    pub directors: Vec<PersonDetail>,
    pub movies: Vec<ImportedMovie>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub genres: Vec<Genre>,
    pub authors: Vec<Author>,
    pub films: Vec<Film>,
}
