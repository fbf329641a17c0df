use crate::media::{MediaType, Mode};

/// TMDB genre id for "Animation", applied to anime mode when no genre is picked.
pub const ANIME_GENRE_ID: u64 = 16;
pub const ANIME_LANGUAGE: &str = "ja";
pub const TAGALOG_LANGUAGE: &str = "tl";
pub const NETFLIX_PROVIDER_ID: u32 = 8;
pub const NETFLIX_WATCH_REGION: &str = "US";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("enter something to search for")]
    EmptySearch,
    #[error("favorites are not paginated from the catalog")]
    NotPaginated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams<'a> {
    pub mode: Mode,
    pub query: &'a str,
    pub genre_id: Option<u64>,
    pub year: Option<i32>,
    pub netflix_subtype: MediaType,
    pub page: u32,
}

fn year_param(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Movie => "primary_release_year",
        MediaType::Tv => "first_air_date_year",
    }
}

/// Maps a view state onto a catalog path relative to the API base.
///
/// Parameters come out in a fixed order (endpoint filters, genre, year, page) and
/// optional ones are left out entirely when unset.
pub fn build_query_path(params: &QueryParams<'_>) -> Result<String, QueryError> {
    let mut genre_id = params.genre_id;
    let (mut path, year_key) = match params.mode {
        Mode::Popular => (
            String::from("/discover/movie?sort_by=popularity.desc"),
            year_param(MediaType::Movie),
        ),
        Mode::Tv => (
            String::from("/discover/tv?sort_by=popularity.desc"),
            year_param(MediaType::Tv),
        ),
        Mode::Anime => {
            genre_id = genre_id.or(Some(ANIME_GENRE_ID));
            (
                format!(
                    "/discover/movie?sort_by=popularity.desc&with_original_language={}",
                    ANIME_LANGUAGE
                ),
                year_param(MediaType::Movie),
            )
        }
        Mode::Tagalog => (
            format!(
                "/discover/movie?sort_by=popularity.desc&with_original_language={}",
                TAGALOG_LANGUAGE
            ),
            year_param(MediaType::Movie),
        ),
        Mode::Netflix => (
            format!(
                "/discover/{}?sort_by=popularity.desc&with_watch_providers={}&watch_region={}",
                params.netflix_subtype.path(),
                NETFLIX_PROVIDER_ID,
                NETFLIX_WATCH_REGION
            ),
            year_param(params.netflix_subtype),
        ),
        Mode::Search => {
            let query = params.query.trim();
            if query.is_empty() {
                return Err(QueryError::EmptySearch);
            }
            (
                format!("/search/multi?query={}", urlencoding::encode(query)),
                "year",
            )
        }
        Mode::Favorites => return Err(QueryError::NotPaginated),
    };

    if let Some(genre) = genre_id {
        path.push_str(&format!("&with_genres={}", genre));
    }
    if let Some(year) = params.year {
        path.push_str(&format!("&{}={}", year_key, year));
    }
    path.push_str(&format!("&page={}", params.page));
    Ok(path)
}
