use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;

use crate::media::{
    ApiError, CatalogItem, CatalogPage, Episode, Genre, MediaId, MediaKey, MediaType,
    SeasonSummary, TmdbMediaResult, TmdbPageResponse,
};
use crate::settings::AppSettings;

const CACHE_TTL_SECONDS: u64 = 300;
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

pub fn poster_url(path: &str) -> String {
    format!("{}{}", POSTER_BASE_URL, path)
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreListResponse {
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbShowResponse {
    #[serde(default)]
    pub seasons: Vec<TmdbSeason>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSeason {
    pub season_number: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub episode_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSeasonResponse {
    #[serde(default)]
    pub episodes: Vec<TmdbEpisode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbEpisode {
    pub episode_number: u32,
    pub season_number: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub overview: String,
    pub air_date: Option<String>,
    pub still_path: Option<String>,
}

/// The catalog operations the view controller depends on.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetches one page of results for a path built by the query builder.
    async fn fetch_page(&self, path: &str, fallback: MediaType) -> Result<CatalogPage, ApiError>;

    /// Looks up a single entry by identity.
    async fn fetch_item(&self, key: MediaKey) -> Result<CatalogItem, ApiError>;
}

pub async fn fetch_image_bytes(url: String) -> Result<Vec<u8>, String> {
    reqwest::get(&url)
        .await
        .map_err(|e| e.to_string())?
        .error_for_status()
        .map_err(|e| e.to_string())?
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| e.to_string())
}

struct CacheEntry<T> {
    data: T,
    created_at: Instant,
}

impl<T: Clone> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            created_at: Instant::now(),
        }
    }

    fn is_valid(&self) -> bool {
        self.is_fresh_at(Instant::now())
    }

    fn is_fresh_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) < Duration::from_secs(CACHE_TTL_SECONDS)
    }
}

/// Evicts expired entries so long sessions don't keep every path ever fetched.
fn prune_expired<K, T: Clone>(cache: &mut HashMap<K, CacheEntry<T>>, now: Instant) {
    cache.retain(|_, entry| entry.is_fresh_at(now));
}

#[derive(Clone)]
pub struct TmdbClient {
    api_key: String,
    base_url: String,
    language: String,
    http_client: Arc<reqwest::Client>,
    page_cache: Arc<RwLock<HashMap<String, CacheEntry<CatalogPage>>>>,
    details_cache: Arc<RwLock<HashMap<MediaKey, CacheEntry<CatalogItem>>>>,
}

impl std::fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbClient")
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl TmdbClient {
    pub fn new(api_key: String, language: String) -> Self {
        Self {
            api_key,
            base_url: String::from("https://api.themoviedb.org/3"),
            language,
            http_client: Arc::new(reqwest::Client::new()),
            page_cache: Arc::new(RwLock::new(HashMap::new())),
            details_cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        let language = if settings.language.is_empty() {
            String::from("en-US")
        } else {
            settings.language.clone()
        };
        Self::new(settings.api_key.clone(), language)
    }

    fn build_url(&self, endpoint: &str) -> String {
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}api_key={}&language={}",
            self.base_url, endpoint, separator, self.api_key, self.language
        )
    }

    fn get_cached_page(&self, key: &str) -> Option<CatalogPage> {
        self.page_cache
            .read()
            .ok()?
            .get(key)
            .filter(|e| e.is_valid())
            .map(|e| e.data.clone())
    }

    fn set_cached_page(&self, key: String, data: CatalogPage) {
        if let Ok(mut cache) = self.page_cache.write() {
            prune_expired(&mut cache, Instant::now());
            cache.insert(key, CacheEntry::new(data));
        }
    }

    fn get_cached_details(&self, key: &MediaKey) -> Option<CatalogItem> {
        self.details_cache
            .read()
            .ok()?
            .get(key)
            .filter(|e| e.is_valid())
            .map(|e| e.data.clone())
    }

    fn set_cached_details(&self, key: MediaKey, data: CatalogItem) {
        if let Ok(mut cache) = self.details_cache.write() {
            prune_expired(&mut cache, Instant::now());
            cache.insert(key, CacheEntry::new(data));
        }
    }

    async fn fetch_response(&self, url: &str) -> Result<reqwest::Response, ApiError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        match response.status().as_u16() {
            401 => Err(ApiError::Unauthorized),
            429 => Err(ApiError::RateLimit),
            s if s >= 400 => Err(ApiError::Status(s)),
            _ => Ok(response),
        }
    }

    async fn fetch_json<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> Result<T, ApiError> {
        tracing::debug!(endpoint, "catalog request");
        self.fetch_response(&self.build_url(endpoint))
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    pub async fn fetch_genres(&self, media_type: MediaType) -> Result<Vec<Genre>, ApiError> {
        let response: GenreListResponse = self
            .fetch_json(&format!("/genre/{}/list", media_type.path()))
            .await?;
        let mut genres = response.genres;
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    /// Season list of a show, without the "Specials" season 0.
    pub async fn fetch_seasons(&self, show_id: MediaId) -> Result<Vec<SeasonSummary>, ApiError> {
        let show: TmdbShowResponse = self.fetch_json(&format!("/tv/{}", show_id)).await?;
        Ok(show
            .seasons
            .into_iter()
            .filter(|s| s.season_number > 0)
            .map(|s| SeasonSummary {
                season_number: s.season_number,
                name: if s.name.is_empty() {
                    format!("Season {}", s.season_number)
                } else {
                    s.name
                },
                episode_count: s.episode_count,
            })
            .collect())
    }

    pub async fn fetch_season_episodes(
        &self,
        show_id: MediaId,
        season_number: u32,
    ) -> Result<Vec<Episode>, ApiError> {
        let season: TmdbSeasonResponse = self
            .fetch_json(&format!("/tv/{}/season/{}", show_id, season_number))
            .await?;
        Ok(season
            .episodes
            .into_iter()
            .map(|e| Episode {
                episode_number: e.episode_number,
                season_number: e.season_number,
                name: e.name,
                overview: e.overview,
                air_date: e.air_date,
                still_path: e.still_path,
            })
            .collect())
    }
}

#[async_trait]
impl CatalogApi for TmdbClient {
    async fn fetch_page(&self, path: &str, fallback: MediaType) -> Result<CatalogPage, ApiError> {
        if let Some(cached) = self.get_cached_page(path) {
            return Ok(cached);
        }
        let response: TmdbPageResponse = self.fetch_json(path).await?;
        let page = response.into_page(fallback);
        self.set_cached_page(path.to_string(), page.clone());
        Ok(page)
    }

    async fn fetch_item(&self, key: MediaKey) -> Result<CatalogItem, ApiError> {
        if let Some(cached) = self.get_cached_details(&key) {
            return Ok(cached);
        }
        let mut result: TmdbMediaResult = self
            .fetch_json(&format!("/{}/{}", key.media_type.path(), key.id))
            .await?;
        result.media_type = Some(key.media_type.path().to_string());
        let item = result
            .into_item(key.media_type)
            .ok_or_else(|| ApiError::Parse(format!("{:?} is not a catalog entry", key)))?;
        self.set_cached_details(key, item.clone());
        Ok(item)
    }
}

/// Bulk lookup for favorites. Entries that fail to resolve are skipped.
pub async fn resolve_favorites<C: CatalogApi + ?Sized>(
    api: &C,
    keys: Vec<MediaKey>,
) -> Vec<CatalogItem> {
    let mut items = Vec::with_capacity(keys.len());
    for key in keys {
        match api.fetch_item(key).await {
            Ok(item) => items.push(item),
            Err(e) => tracing::warn!(?key, "favorite lookup failed: {}", e),
        }
    }
    items
}

pub async fn load_genres(client: TmdbClient, media_type: MediaType) -> Result<Vec<Genre>, ApiError> {
    client.fetch_genres(media_type).await
}


#[cfg(test)]
mod tests {
    use super::testing::FakeCatalog;
    use super::*;

    #[test]
    fn build_url_appends_credentials_to_existing_query() {
        let client = TmdbClient::new(String::from("k"), String::from("en-US"));
        assert_eq!(
            client.build_url("/discover/tv?sort_by=popularity.desc&page=2"),
            "https://api.themoviedb.org/3/discover/tv?sort_by=popularity.desc&page=2&api_key=k&language=en-US"
        );
        assert_eq!(
            client.build_url("/genre/movie/list"),
            "https://api.themoviedb.org/3/genre/movie/list?api_key=k&language=en-US"
        );
    }

    #[test]
    fn poster_url_uses_w500() {
        assert_eq!(
            poster_url("/abc.jpg"),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
    }

    #[test]
    fn page_response_drops_people_and_tags_types() {
        let json = r#"{
            "page": 1,
            "total_pages": 3,
            "results": [
                {"id": 1, "title": "Alien", "release_date": "1979-05-25", "media_type": "movie"},
                {"id": 2, "name": "Someone", "media_type": "person"},
                {"id": 3, "name": "Lost", "first_air_date": "2004-09-22", "media_type": "tv"}
            ]
        }"#;
        let response: TmdbPageResponse = serde_json::from_str(json).unwrap();
        let page = response.into_page(MediaType::Movie);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.upstream_count, 3);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[1].media_type, MediaType::Tv);
    }

    #[test]
    fn expired_cache_entries_are_evicted_on_insert() {
        let client = TmdbClient::new(String::from("k"), String::from("en-US"));
        client.set_cached_page(String::from("/movie/popular?page=1"), CatalogPage::default());
        let later = Instant::now() + Duration::from_secs(CACHE_TTL_SECONDS + 1);
        {
            let mut cache = client.page_cache.write().unwrap();
            cache.insert(
                String::from("/movie/popular?page=2"),
                CacheEntry::new(CatalogPage::default()),
            );
            prune_expired(&mut cache, later);
            assert!(cache.is_empty());
        }

        client.set_cached_page(String::from("/search/multi?page=1"), CatalogPage::default());
        client.set_cached_page(String::from("/search/multi?page=2"), CatalogPage::default());
        assert_eq!(client.page_cache.read().unwrap().len(), 2);
        assert!(client.get_cached_page("/search/multi?page=1").is_some());
    }

    #[tokio::test]
    async fn resolve_favorites_skips_failures() {
        let missing = MediaKey::new(2, MediaType::Tv);
        let api = FakeCatalog::with_pages(1, 1).without(missing);
        let items = resolve_favorites(
            &api,
            vec![
                MediaKey::new(1, MediaType::Movie),
                missing,
                MediaKey::new(3, MediaType::Tv),
            ],
        )
        .await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].key(), MediaKey::new(3, MediaType::Tv));
    }
}
