use crate::library::RecentlyViewedEntry;
use crate::media::{CatalogItem, MediaKey, MediaType};
use crate::tmdb::poster_url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poster {
    Remote(String),
    Placeholder,
}

impl Poster {
    fn from_path(path: Option<&str>) -> Self {
        match path {
            Some(p) if !p.is_empty() => Poster::Remote(poster_url(p)),
            _ => Poster::Placeholder,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Poster::Remote(url) => Some(url),
            Poster::Placeholder => None,
        }
    }
}

/// What a card needs to draw an entry, whichever list it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub key: MediaKey,
    pub media_type: MediaType,
    pub title: String,
    pub year: String,
    pub poster: Poster,
    pub rating: Option<f32>,
}

fn year_of(date: Option<&str>) -> String {
    date.and_then(|d| d.get(..4)).unwrap_or_default().to_string()
}

fn display_title(title: &str) -> String {
    if title.trim().is_empty() {
        String::from("Untitled")
    } else {
        title.to_string()
    }
}

impl ViewModel {
    pub fn from_item(item: &CatalogItem) -> Self {
        Self {
            key: item.key(),
            media_type: item.media_type,
            title: display_title(&item.title),
            year: year_of(item.first_date.as_deref()),
            poster: Poster::from_path(item.poster_path.as_deref()),
            rating: (item.vote_average > 0.0).then_some(item.vote_average),
        }
    }

    pub fn from_recent(entry: &RecentlyViewedEntry) -> Self {
        Self {
            key: entry.key(),
            media_type: entry.media_type,
            title: display_title(&entry.title),
            year: year_of(entry.release_date.as_deref()),
            poster: Poster::from_path(entry.poster_path.as_deref()),
            rating: None,
        }
    }

    /// Stand-in card for a favorite whose details have not been resolved yet.
    pub fn favorite_placeholder(key: MediaKey) -> Self {
        Self {
            key,
            media_type: key.media_type,
            title: String::from("Loading…"),
            year: String::new(),
            poster: Poster::Placeholder,
            rating: None,
        }
    }

    pub fn type_label(&self) -> &'static str {
        match self.media_type {
            MediaType::Movie => "Movie",
            MediaType::Tv => "TV",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmdb::testing::movie;

    #[test]
    fn item_maps_year_and_poster() {
        let vm = ViewModel::from_item(&movie(42));
        assert_eq!(vm.year, "2020");
        assert_eq!(
            vm.poster,
            Poster::Remote(String::from("https://image.tmdb.org/t/p/w500/poster42.jpg"))
        );
        assert_eq!(vm.rating, Some(7.0));
        assert_eq!(vm.type_label(), "Movie");
    }

    #[test]
    fn missing_fields_fall_back() {
        let item = CatalogItem {
            title: String::new(),
            poster_path: None,
            first_date: None,
            vote_average: 0.0,
            ..movie(1)
        };
        let vm = ViewModel::from_item(&item);
        assert_eq!(vm.title, "Untitled");
        assert_eq!(vm.year, "");
        assert_eq!(vm.poster, Poster::Placeholder);
        assert!(vm.poster.url().is_none());
        assert_eq!(vm.rating, None);
    }

    #[test]
    fn short_dates_give_empty_year() {
        assert_eq!(year_of(Some("199")), "");
        assert_eq!(year_of(Some("2024-05-01")), "2024");
    }

    #[test]
    fn recent_entries_share_the_mapping() {
        let item = CatalogItem {
            media_type: MediaType::Tv,
            ..movie(9)
        };
        let entry = RecentlyViewedEntry::from_item(&item);
        let from_entry = ViewModel::from_recent(&entry);
        let from_item = ViewModel::from_item(&item);
        assert_eq!(from_entry.key, from_item.key);
        assert_eq!(from_entry.title, from_item.title);
        assert_eq!(from_entry.year, from_item.year);
        assert_eq!(from_entry.poster, from_item.poster);
        assert_eq!(from_entry.type_label(), "TV");
    }

    #[test]
    fn favorite_placeholder_has_no_poster() {
        let vm = ViewModel::favorite_placeholder(MediaKey::new(5, MediaType::Tv));
        assert_eq!(vm.poster, Poster::Placeholder);
        assert_eq!(vm.media_type, MediaType::Tv);
    }
}
