use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use iced::widget::image::Handle;
use iced::Color;
use serde::{Deserialize, Serialize};

use crate::controller::PageTicket;
use crate::pacing::ScrollMetrics;
use crate::player::Server;

fn simple_hash(s: &str) -> String {
    let mut hash: u64 = 5381;
    for byte in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(byte as u64);
    }
    format!("{:016x}", hash)
}

fn get_cache_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "catalogz").map(|dirs| dirs.cache_dir().join("posters"))
}

pub const BACKGROUND_BLACK: Color = Color::from_rgb(0.0, 0.0, 0.0);
pub const SURFACE_DARK_GRAY: Color = Color::from_rgb(0.078, 0.078, 0.078);
pub const ACCENT_RED: Color = Color::from_rgb(0.898, 0.035, 0.078);
pub const TEXT_WHITE: Color = Color::from_rgb(1.0, 1.0, 1.0);
pub const TEXT_GRAY: Color = Color::from_rgb(0.702, 0.702, 0.702);

pub type MediaId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Movie,
    Tv,
}

impl MediaType {
    pub fn path(self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Movie => write!(f, "Movies"),
            MediaType::Tv => write!(f, "TV Shows"),
        }
    }
}

/// The active catalog view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Popular,
    Tv,
    Anime,
    Tagalog,
    Netflix,
    Search,
    Favorites,
}

impl Mode {
    /// Modes reachable from the navigation bar. Search is entered through the search box.
    pub const NAVIGATION: [Mode; 6] = [
        Mode::Popular,
        Mode::Tv,
        Mode::Anime,
        Mode::Tagalog,
        Mode::Netflix,
        Mode::Favorites,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Mode::Popular => "Movies",
            Mode::Tv => "TV Shows",
            Mode::Anime => "Anime",
            Mode::Tagalog => "Tagalog",
            Mode::Netflix => "Netflix",
            Mode::Search => "Search",
            Mode::Favorites => "Favorites",
        }
    }

    /// Media type of the items an endpoint returns when the payload does not say.
    pub fn fallback_media_type(self, netflix_subtype: MediaType) -> MediaType {
        match self {
            Mode::Tv => MediaType::Tv,
            Mode::Netflix => netflix_subtype,
            _ => MediaType::Movie,
        }
    }
}

/// Identity of a catalog entry. Also the persisted shape of a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaKey {
    pub id: MediaId,
    pub media_type: MediaType,
}

impl MediaKey {
    pub fn new(id: MediaId, media_type: MediaType) -> Self {
        Self { id, media_type }
    }

    pub fn tmdb_page_url(&self) -> String {
        format!(
            "https://www.themoviedb.org/{}/{}",
            self.media_type.path(),
            self.id
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

impl Genre {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    pub id: MediaId,
    pub media_type: MediaType,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub first_date: Option<String>,
    pub genre_ids: Vec<u64>,
    pub vote_average: f32,
}

impl CatalogItem {
    pub fn key(&self) -> MediaKey {
        MediaKey::new(self.id, self.media_type)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogPage {
    pub results: Vec<CatalogItem>,
    pub total_pages: u32,
    /// Results the catalog sent before non-catalog entries (people) were dropped.
    pub upstream_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonSummary {
    pub season_number: u32,
    pub name: String,
    pub episode_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub episode_number: u32,
    pub season_number: u32,
    pub name: String,
    pub overview: String,
    pub air_date: Option<String>,
    pub still_path: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("catalog returned HTTP {0}")]
    Status(u16),
    #[error("unexpected response: {0}")]
    Parse(String),
    #[error("rate limited by the catalog, try again shortly")]
    RateLimit,
    #[error("the TMDB API key was rejected")]
    Unauthorized,
}

#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    cache: HashMap<String, Handle>,
    pending: HashSet<String>,
    cache_directory: Option<PathBuf>,
}

impl ImageCache {
    pub fn new() -> Self {
        let cache_directory = get_cache_dir();
        if let Some(ref dir) = cache_directory {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::warn!("poster cache disabled: {}", e);
                return Self::default();
            }
        }
        Self {
            cache: HashMap::new(),
            pending: HashSet::new(),
            cache_directory,
        }
    }

    pub fn get(&self, url: &str) -> Option<&Handle> {
        self.cache.get(url)
    }

    pub fn insert(&mut self, url: String, handle: Handle) {
        self.pending.remove(&url);
        self.cache.insert(url, handle);
    }

    pub fn is_pending(&self, url: &str) -> bool {
        self.pending.contains(url)
    }

    pub fn mark_pending(&mut self, url: String) {
        self.pending.insert(url);
    }

    pub fn clear_pending(&mut self, url: &str) {
        self.pending.remove(url);
    }

    pub fn get_cache_path(&self, url: &str) -> Option<PathBuf> {
        self.cache_directory
            .as_ref()
            .map(|dir| dir.join(simple_hash(url)))
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Setup(crate::settings::SetupMessage),
    SwitchMode(Mode),
    SearchQueryChanged(String),
    SearchSubmit,
    SearchDebounceTriggered,
    ClearSearch,
    SetGenreFilter(Option<u64>),
    SetYearFilter(Option<i32>),
    SetNetflixSubtype(MediaType),
    GenresLoaded(MediaType, Result<Vec<Genre>, ApiError>),
    LoadMore,
    PageLoaded(PageTicket, Result<CatalogPage, ApiError>),
    FavoritesResolved(u64, Vec<CatalogItem>),
    MainScrolled(ScrollMetrics),
    ScrollToTop,
    RetryLoad,
    LoadImage(String),
    ImageLoaded(String, Result<Handle, String>),
    OpenItem(MediaKey),
    CloseModal,
    SeasonsLoaded(MediaId, Result<Vec<SeasonSummary>, ApiError>),
    ExpandSeason(u32),
    EpisodesLoaded(MediaId, u32, Result<Vec<Episode>, ApiError>),
    PlayEpisode(u32, u32),
    PlayNextEpisode,
    ChangeServer(Server),
    WatchNow,
    OpenTmdbPage(MediaKey),
    ToggleFavorite(MediaKey),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMediaResult {
    pub id: u64,
    pub title: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub media_type: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl TmdbMediaResult {
    /// Resolves the media type once, at the API boundary.
    ///
    /// An explicit `media_type` wins. Otherwise the shape of the record decides:
    /// shows carry `name`/`first_air_date`, movies carry `title`/`release_date`.
    /// `fallback` covers records that carry neither. People returned by multi
    /// search are not catalog items and yield `None`.
    pub fn resolve_media_type(&self, fallback: MediaType) -> Option<MediaType> {
        match self.media_type.as_deref() {
            Some("movie") => return Some(MediaType::Movie),
            Some("tv") => return Some(MediaType::Tv),
            Some(_) => return None,
            None => {}
        }
        if self.name.is_some() || self.first_air_date.is_some() {
            Some(MediaType::Tv)
        } else if self.title.is_some() || self.release_date.is_some() {
            Some(MediaType::Movie)
        } else {
            Some(fallback)
        }
    }

    pub fn into_item(self, fallback: MediaType) -> Option<CatalogItem> {
        let media_type = self.resolve_media_type(fallback)?;
        let (title, first_date) = match media_type {
            MediaType::Movie => (
                self.title.or(self.name),
                self.release_date.or(self.first_air_date),
            ),
            MediaType::Tv => (
                self.name.or(self.title),
                self.first_air_date.or(self.release_date),
            ),
        };
        Some(CatalogItem {
            id: self.id,
            media_type,
            title: title.unwrap_or_default(),
            overview: self.overview,
            poster_path: self.poster_path.filter(|p| !p.is_empty()),
            first_date: first_date.filter(|d| !d.is_empty()),
            genre_ids: if self.genre_ids.is_empty() {
                self.genres.iter().map(|g| g.id).collect()
            } else {
                self.genre_ids
            },
            vote_average: self.vote_average,
        })
    }
}

#[derive(Deserialize)]
pub struct TmdbPageResponse {
    pub results: Vec<TmdbMediaResult>,
    #[serde(default)]
    pub total_pages: u32,
}

impl TmdbPageResponse {
    pub fn into_page(self, fallback: MediaType) -> CatalogPage {
        let upstream_count = self.results.len();
        CatalogPage {
            results: self
                .results
                .into_iter()
                .filter_map(|r| r.into_item(fallback))
                .collect(),
            total_pages: self.total_pages,
            upstream_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> TmdbMediaResult {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn explicit_media_type_wins_over_shape() {
        let result = raw(r#"{"id": 1, "name": "Dark", "media_type": "movie"}"#);
        let item = result.into_item(MediaType::Tv).unwrap();
        assert_eq!(item.media_type, MediaType::Movie);
        assert_eq!(item.title, "Dark");
    }

    #[test]
    fn show_shape_is_inferred_as_tv() {
        let result = raw(r#"{"id": 2, "name": "Severance", "first_air_date": "2022-02-18"}"#);
        let item = result.into_item(MediaType::Movie).unwrap();
        assert_eq!(item.media_type, MediaType::Tv);
        assert_eq!(item.first_date.as_deref(), Some("2022-02-18"));
    }

    #[test]
    fn movie_shape_is_inferred_as_movie() {
        let result = raw(r#"{"id": 3, "title": "Heat", "release_date": "1995-12-15"}"#);
        let item = result.into_item(MediaType::Tv).unwrap();
        assert_eq!(item.media_type, MediaType::Movie);
        assert_eq!(item.title, "Heat");
    }

    #[test]
    fn bare_record_uses_fallback() {
        let result = raw(r#"{"id": 4}"#);
        let item = result.into_item(MediaType::Tv).unwrap();
        assert_eq!(item.media_type, MediaType::Tv);
        assert_eq!(item.title, "");
    }

    #[test]
    fn people_are_dropped() {
        let result = raw(r#"{"id": 5, "name": "Someone", "media_type": "person"}"#);
        assert!(result.into_item(MediaType::Movie).is_none());
    }

    #[test]
    fn empty_poster_and_date_become_none() {
        let result = raw(r#"{"id": 6, "title": "X", "poster_path": "", "release_date": ""}"#);
        let item = result.into_item(MediaType::Movie).unwrap();
        assert!(item.poster_path.is_none());
        assert!(item.first_date.is_none());
    }

    #[test]
    fn detail_genres_fill_genre_ids() {
        let result = raw(
            r#"{"id": 7, "title": "Up", "genres": [{"id": 16, "name": "Animation"}, {"id": 12, "name": "Adventure"}]}"#,
        );
        let item = result.into_item(MediaType::Movie).unwrap();
        assert_eq!(item.genre_ids, vec![16, 12]);
    }

    #[test]
    fn tmdb_page_url_uses_media_path() {
        assert_eq!(
            MediaKey::new(550, MediaType::Movie).tmdb_page_url(),
            "https://www.themoviedb.org/movie/550"
        );
        assert_eq!(
            MediaKey::new(1399, MediaType::Tv).tmdb_page_url(),
            "https://www.themoviedb.org/tv/1399"
        );
    }
}
