use std::collections::HashSet;

use crate::media::{CatalogItem, MediaType, Mode};

pub const PAGE_CEILING: u32 = 100;
pub const PAGE_SIZE: usize = 20;

/// Why a page was not requested from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSkip {
    AlreadyLoaded,
    BeyondCeiling,
    NotPaginated,
}

/// One catalog page to request, with the media type assumed for untagged results.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub mode: Mode,
    pub page: u32,
    pub path: String,
    pub fallback: MediaType,
}

/// Tracks which pages of the current mode/filter combination have been fetched.
///
/// A loader only ever describes one combination; the view controller replaces it
/// wholesale on every mode or filter change.
#[derive(Debug, Clone)]
pub struct PageLoader {
    loaded: HashSet<u32>,
    total_pages: u32,
}

impl Default for PageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PageLoader {
    pub fn new() -> Self {
        Self {
            loaded: HashSet::new(),
            total_pages: PAGE_CEILING,
        }
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn is_loaded(&self, page: u32) -> bool {
        self.loaded.contains(&page)
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    pub fn plan(&self, page: u32, mode: Mode) -> Result<(), PageSkip> {
        if mode == Mode::Favorites {
            return Err(PageSkip::NotPaginated);
        }
        if page == 0 || page > PAGE_CEILING {
            return Err(PageSkip::BeyondCeiling);
        }
        if self.loaded.contains(&page) {
            return Err(PageSkip::AlreadyLoaded);
        }
        Ok(())
    }

    pub fn record(
        &mut self,
        page: u32,
        server_total_pages: u32,
        mut results: Vec<CatalogItem>,
    ) -> Vec<CatalogItem> {
        self.loaded.insert(page);
        self.total_pages = server_total_pages.min(PAGE_CEILING);
        results.truncate(PAGE_SIZE);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64) -> CatalogItem {
        CatalogItem {
            id,
            media_type: MediaType::Movie,
            title: format!("Movie {}", id),
            overview: String::new(),
            poster_path: None,
            first_date: None,
            genre_ids: Vec::new(),
            vote_average: 0.0,
        }
    }

    #[test]
    fn record_caps_total_pages_and_page_size() {
        let mut loader = PageLoader::new();
        let results = loader.record(1, 500, (0..35).map(item).collect());
        assert_eq!(results.len(), PAGE_SIZE);
        assert_eq!(loader.total_pages(), PAGE_CEILING);
        assert!(loader.is_loaded(1));

        loader.record(2, 4, Vec::new());
        assert_eq!(loader.total_pages(), 4);
    }

    #[test]
    fn plan_rejects_loaded_out_of_range_and_favorites() {
        let mut loader = PageLoader::new();
        loader.record(1, 10, Vec::new());
        assert_eq!(loader.plan(1, Mode::Popular), Err(PageSkip::AlreadyLoaded));
        assert_eq!(loader.plan(101, Mode::Popular), Err(PageSkip::BeyondCeiling));
        assert_eq!(loader.plan(2, Mode::Favorites), Err(PageSkip::NotPaginated));
        assert_eq!(loader.plan(2, Mode::Tv), Ok(()));
    }

    #[test]
    fn loaded_page_is_skipped_in_every_mode() {
        let mut loader = PageLoader::new();
        loader.record(1, 3, (0..20).map(item).collect());
        for mode in [Mode::Popular, Mode::Tv, Mode::Anime, Mode::Search] {
            assert_eq!(loader.plan(1, mode), Err(PageSkip::AlreadyLoaded));
        }
        assert_eq!(loader.loaded_count(), 1);
    }
}
