use crate::media::{ApiError, CatalogItem, CatalogPage, Genre, MediaKey, MediaType, Mode};
use crate::pager::{PageLoader, PageRequest, PageSkip};
use crate::query::{build_query_path, QueryError, QueryParams};

pub const ITEM_CEILING: usize = 500;

/// An in-flight page request. While one is outstanding the filters are locked;
/// a response whose generation no longer matches is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct PageTicket {
    pub generation: u64,
    pub request: PageRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadPlan {
    Page(PageTicket),
    Favorites { generation: u64, keys: Vec<MediaKey> },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Appended(usize),
    Ended,
    Empty,
    Failed(String),
    Stale,
    Skipped,
}

/// Genre lists per endpoint. Anime uses a fixed list since its endpoint is
/// always the movie one restricted to animation.
#[derive(Debug, Clone, Default)]
pub struct GenreCatalog {
    movie: Vec<Genre>,
    tv: Vec<Genre>,
}

impl GenreCatalog {
    pub fn set(&mut self, media_type: MediaType, genres: Vec<Genre>) {
        match media_type {
            MediaType::Movie => self.movie = genres,
            MediaType::Tv => self.tv = genres,
        }
    }

    pub fn get(&self, media_type: MediaType) -> &[Genre] {
        match media_type {
            MediaType::Movie => &self.movie,
            MediaType::Tv => &self.tv,
        }
    }

    pub fn for_mode(&self, mode: Mode, netflix_subtype: MediaType) -> Vec<Genre> {
        match mode {
            Mode::Anime => anime_genres(),
            Mode::Favorites => Vec::new(),
            Mode::Tv => self.tv.clone(),
            Mode::Netflix => self.get(netflix_subtype).to_vec(),
            Mode::Popular | Mode::Tagalog | Mode::Search => self.movie.clone(),
        }
    }
}

pub fn anime_genres() -> Vec<Genre> {
    vec![
        Genre::new(28, "Action"),
        Genre::new(12, "Adventure"),
        Genre::new(16, "Animation"),
        Genre::new(35, "Comedy"),
        Genre::new(18, "Drama"),
        Genre::new(14, "Fantasy"),
        Genre::new(10749, "Romance"),
        Genre::new(878, "Science Fiction"),
        Genre::new(9648, "Mystery"),
        Genre::new(27, "Horror"),
        Genre::new(10751, "Family"),
    ]
}

#[derive(Debug, Clone)]
pub struct ViewState {
    pub mode: Mode,
    pub query: String,
    pub genre_id: Option<u64>,
    pub year: Option<i32>,
    pub netflix_subtype: MediaType,
    pub current_page: u32,
    pub pager: PageLoader,
    pub items: Vec<CatalogItem>,
    pub is_loading: bool,
    pub reached_end: bool,
    pub status: LoadStatus,
    pub generation: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            mode: Mode::Popular,
            query: String::new(),
            genre_id: None,
            year: None,
            netflix_subtype: MediaType::Movie,
            current_page: 1,
            pager: PageLoader::new(),
            items: Vec::new(),
            is_loading: false,
            reached_end: false,
            status: LoadStatus::Idle,
            generation: 0,
        }
    }
}

/// Owns the catalog view: which mode and filters are active, which pages are in
/// the buffer, and whether a load is in flight.
#[derive(Debug, Clone, Default)]
pub struct ViewController {
    state: ViewState,
    genres: GenreCatalog,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.state.items
    }

    /// Message of the last failed page load, until the next load starts.
    pub fn load_error(&self) -> Option<&str> {
        match &self.state.status {
            LoadStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Filters stay locked while a page or favorites lookup is in flight.
    pub fn filters_disabled(&self) -> bool {
        self.state.is_loading
    }

    pub fn title(&self) -> String {
        match self.state.mode {
            Mode::Popular => String::from("Popular Movies"),
            Mode::Tv => String::from("Popular TV Shows"),
            Mode::Anime => String::from("Anime"),
            Mode::Tagalog => String::from("Tagalog Movies"),
            Mode::Netflix => format!("Netflix {}", self.state.netflix_subtype),
            Mode::Search => format!("Results for \"{}\"", self.state.query),
            Mode::Favorites => String::from("My Favorites"),
        }
    }

    pub fn available_genres(&self) -> Vec<Genre> {
        self.genres.for_mode(self.state.mode, self.state.netflix_subtype)
    }

    pub fn set_genres(&mut self, media_type: MediaType, genres: Vec<Genre>) {
        self.genres.set(media_type, genres);
    }

    /// Endpoint whose genre list the current mode needs but has not been fetched yet.
    pub fn missing_genre_list(&self) -> Option<MediaType> {
        let needed = match self.state.mode {
            Mode::Anime | Mode::Favorites => return None,
            Mode::Tv => MediaType::Tv,
            Mode::Netflix => self.state.netflix_subtype,
            Mode::Popular | Mode::Tagalog | Mode::Search => MediaType::Movie,
        };
        self.genres.get(needed).is_empty().then_some(needed)
    }

    fn reset_pagination(&mut self) {
        let state = &mut self.state;
        state.current_page = 1;
        state.pager = PageLoader::new();
        state.items.clear();
        state.is_loading = false;
        state.reached_end = false;
        state.status = LoadStatus::Idle;
        state.generation += 1;
        tracing::debug!(generation = state.generation, mode = ?state.mode, "view reset");
    }

    /// Returns false when `mode` is already active.
    pub fn switch_mode(&mut self, mode: Mode) -> bool {
        if self.state.mode == mode {
            return false;
        }
        let previous = self.state.mode;
        if mode != Mode::Search {
            self.state.query.clear();
        }
        self.state.genre_id = None;
        self.state.year = None;
        if previous != Mode::Netflix && mode != Mode::Netflix {
            self.state.netflix_subtype = MediaType::Movie;
        }
        self.state.mode = mode;
        self.reset_pagination();
        tracing::info!(?previous, ?mode, "switched mode");
        true
    }

    /// Returns Ok(false) when the same query is already showing.
    pub fn submit_search(&mut self, query: &str) -> Result<bool, QueryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QueryError::EmptySearch);
        }
        if self.state.mode == Mode::Search && self.state.query == query {
            return Ok(false);
        }
        if self.state.mode == Mode::Search {
            self.state.query = query.to_string();
            self.reset_pagination();
        } else {
            self.state.query = query.to_string();
            self.switch_mode(Mode::Search);
        }
        Ok(true)
    }

    pub fn set_genre(&mut self, genre_id: Option<u64>) -> bool {
        if self.filters_disabled() || self.state.genre_id == genre_id {
            return false;
        }
        self.state.genre_id = genre_id;
        self.reset_pagination();
        true
    }

    pub fn set_year(&mut self, year: Option<i32>) -> bool {
        if self.filters_disabled() || self.state.year == year {
            return false;
        }
        self.state.year = year;
        self.reset_pagination();
        true
    }

    /// Switches into netflix mode if needed; the chosen subtype survives the switch.
    pub fn set_netflix_subtype(&mut self, subtype: MediaType) -> bool {
        if self.state.mode != Mode::Netflix {
            self.state.netflix_subtype = subtype;
            return self.switch_mode(Mode::Netflix);
        }
        if self.filters_disabled() || self.state.netflix_subtype == subtype {
            return false;
        }
        self.state.netflix_subtype = subtype;
        self.state.genre_id = None;
        self.reset_pagination();
        true
    }

    /// Plans the next load. With `clear` the buffer and pagination start over first.
    pub fn begin_load(&mut self, clear: bool, favorites: &[MediaKey]) -> Option<LoadPlan> {
        if clear {
            self.reset_pagination();
        } else if self.state.is_loading || self.state.reached_end {
            return None;
        }

        if self.state.mode == Mode::Favorites {
            if favorites.is_empty() {
                self.state.reached_end = true;
                self.state.status = LoadStatus::Empty;
                return None;
            }
            self.state.is_loading = true;
            self.state.status = LoadStatus::Idle;
            return Some(LoadPlan::Favorites {
                generation: self.state.generation,
                keys: favorites.to_vec(),
            });
        }

        let page = self.state.current_page;
        if let Err(skip) = self.state.pager.plan(page, self.state.mode) {
            tracing::debug!(page, ?skip, "nothing to load");
            if skip == PageSkip::BeyondCeiling {
                self.state.reached_end = true;
            }
            return None;
        }

        let path = match build_query_path(&QueryParams {
            mode: self.state.mode,
            query: &self.state.query,
            genre_id: self.state.genre_id,
            year: self.state.year,
            netflix_subtype: self.state.netflix_subtype,
            page,
        }) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("load rejected: {}", e);
                return None;
            }
        };

        self.state.is_loading = true;
        self.state.status = LoadStatus::Idle;
        Some(LoadPlan::Page(PageTicket {
            generation: self.state.generation,
            request: PageRequest {
                mode: self.state.mode,
                page,
                path,
                fallback: self.state.mode.fallback_media_type(self.state.netflix_subtype),
            },
        }))
    }

    pub fn finish_load(
        &mut self,
        ticket: &PageTicket,
        result: Result<CatalogPage, ApiError>,
    ) -> LoadOutcome {
        if ticket.generation != self.state.generation {
            tracing::debug!(
                stale = ticket.generation,
                current = self.state.generation,
                "dropping stale page"
            );
            return LoadOutcome::Stale;
        }
        self.state.is_loading = false;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(page = ticket.request.page, "page load failed: {}", e);
                let message = e.to_string();
                self.state.status = LoadStatus::Failed(message.clone());
                return LoadOutcome::Failed(message);
            }
        };

        let page = ticket.request.page;
        if self.state.pager.is_loaded(page) {
            return LoadOutcome::Skipped;
        }
        let upstream_count = response.upstream_count;
        let results = self
            .state
            .pager
            .record(page, response.total_pages, response.results);
        self.state.status = LoadStatus::Idle;

        if upstream_count == 0 {
            self.state.reached_end = true;
            if self.state.items.is_empty() {
                self.state.status = LoadStatus::Empty;
                return LoadOutcome::Empty;
            }
            return LoadOutcome::Ended;
        }

        let appended = results.len();
        self.state.items.extend(results);
        if self.state.items.len() >= ITEM_CEILING {
            self.state.items.truncate(ITEM_CEILING);
            self.state.reached_end = true;
        }
        if page >= self.state.pager.total_pages() {
            self.state.reached_end = true;
        } else if !self.state.reached_end {
            self.state.current_page = page + 1;
        }
        if self.state.reached_end && self.state.items.is_empty() {
            self.state.status = LoadStatus::Empty;
            return LoadOutcome::Empty;
        }
        tracing::debug!(
            page,
            appended,
            pages = self.state.pager.loaded_count(),
            total = self.state.items.len(),
            reached_end = self.state.reached_end,
            "page applied"
        );
        LoadOutcome::Appended(appended)
    }

    /// Applies resolved favorites. Keys unfavorited while the lookup was in
    /// flight are dropped so they don't come back.
    pub fn finish_favorites(
        &mut self,
        generation: u64,
        mut items: Vec<CatalogItem>,
        current: &[MediaKey],
    ) -> LoadOutcome {
        if generation != self.state.generation {
            return LoadOutcome::Stale;
        }
        self.state.is_loading = false;
        self.state.reached_end = true;
        items.retain(|item| current.contains(&item.key()));
        items.truncate(ITEM_CEILING);
        self.state.items = items;
        if self.state.items.is_empty() {
            self.state.status = LoadStatus::Empty;
            return LoadOutcome::Empty;
        }
        self.state.status = LoadStatus::Idle;
        LoadOutcome::Appended(self.state.items.len())
    }

    /// Drops an unfavorited entry from the favorites grid without a reload.
    pub fn remove_item(&mut self, key: MediaKey) {
        if self.state.mode != Mode::Favorites {
            return;
        }
        self.state.items.retain(|item| item.key() != key);
        if self.state.items.is_empty() && !self.state.is_loading {
            self.state.status = LoadStatus::Empty;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pager::{PAGE_CEILING, PAGE_SIZE};
    use crate::tmdb::testing::{movie, page_of, FakeCatalog};
    use crate::tmdb::{resolve_favorites, CatalogApi};
    use proptest::prelude::*;

    /// Drives one load the way the UI does, with the fetch awaited in place.
    async fn load_more<C: CatalogApi + ?Sized>(
        controller: &mut ViewController,
        api: &C,
        clear: bool,
        favorites: &[MediaKey],
    ) -> LoadOutcome {
        match controller.begin_load(clear, favorites) {
            None if controller.state().status == LoadStatus::Empty => LoadOutcome::Empty,
            None => LoadOutcome::Skipped,
            Some(LoadPlan::Page(ticket)) => {
                let result = api
                    .fetch_page(&ticket.request.path, ticket.request.fallback)
                    .await;
                controller.finish_load(&ticket, result)
            }
            Some(LoadPlan::Favorites { generation, keys }) => {
                let items = resolve_favorites(api, keys).await;
                controller.finish_favorites(generation, items, favorites)
            }
        }
    }

    fn page(ids: std::ops::Range<u64>, total_pages: u32) -> CatalogPage {
        CatalogPage {
            upstream_count: ids.end.saturating_sub(ids.start) as usize,
            results: ids.map(movie).collect(),
            total_pages,
        }
    }

    fn ticket(controller: &mut ViewController) -> PageTicket {
        match controller.begin_load(false, &[]) {
            Some(LoadPlan::Page(ticket)) => ticket,
            other => panic!("expected a page plan, got {:?}", other),
        }
    }

    #[test]
    fn switching_to_same_mode_is_a_no_op() {
        let mut controller = ViewController::new();
        let generation = controller.state().generation;
        assert!(!controller.switch_mode(Mode::Popular));
        assert_eq!(controller.state().generation, generation);
    }

    #[test]
    fn switch_mode_clears_filters_and_pagination() {
        let mut controller = ViewController::new();
        controller.set_genre(Some(35));
        controller.set_year(Some(2001));
        let t = ticket(&mut controller);
        controller.finish_load(&t, Ok(page(0..20, 10)));
        assert_eq!(controller.state().current_page, 2);

        assert!(controller.switch_mode(Mode::Tv));
        let state = controller.state();
        assert_eq!(state.genre_id, None);
        assert_eq!(state.year, None);
        assert_eq!(state.current_page, 1);
        assert!(state.items.is_empty());
        assert_eq!(state.pager.loaded_count(), 0);
        assert!(!state.reached_end);
        assert_eq!(controller.title(), "Popular TV Shows");
    }

    #[test]
    fn netflix_subtype_survives_only_inside_netflix() {
        let mut controller = ViewController::new();
        assert!(controller.set_netflix_subtype(MediaType::Tv));
        assert_eq!(controller.state().mode, Mode::Netflix);
        assert_eq!(controller.title(), "Netflix TV Shows");

        controller.switch_mode(Mode::Anime);
        assert_eq!(controller.state().netflix_subtype, MediaType::Tv);
        controller.switch_mode(Mode::Popular);
        assert_eq!(controller.state().netflix_subtype, MediaType::Movie);
    }

    #[test]
    fn netflix_tv_results_default_to_tv() {
        let mut controller = ViewController::new();
        controller.set_netflix_subtype(MediaType::Tv);
        let t = ticket(&mut controller);
        assert_eq!(t.request.fallback, MediaType::Tv);
        assert!(t.request.path.starts_with("/discover/tv?"));
    }

    #[test]
    fn search_rejects_blank_and_ignores_repeats() {
        let mut controller = ViewController::new();
        assert_eq!(controller.submit_search("  "), Err(QueryError::EmptySearch));
        assert_eq!(controller.state().mode, Mode::Popular);

        assert_eq!(controller.submit_search(" dune "), Ok(true));
        assert_eq!(controller.state().query, "dune");
        assert_eq!(controller.title(), "Results for \"dune\"");
        let generation = controller.state().generation;
        assert_eq!(controller.submit_search("dune"), Ok(false));
        assert_eq!(controller.state().generation, generation);

        assert_eq!(controller.submit_search("arrival"), Ok(true));
        assert!(controller.state().generation > generation);
    }

    #[test]
    fn leaving_search_clears_query() {
        let mut controller = ViewController::new();
        controller.submit_search("alien").unwrap();
        controller.switch_mode(Mode::Favorites);
        assert!(controller.state().query.is_empty());
    }

    #[test]
    fn filters_are_locked_while_loading() {
        let mut controller = ViewController::new();
        let t = ticket(&mut controller);
        assert!(controller.filters_disabled());
        assert!(!controller.set_genre(Some(18)));
        assert!(!controller.set_year(Some(1990)));
        assert!(controller.begin_load(false, &[]).is_none());

        controller.finish_load(&t, Err(ApiError::Status(500)));
        assert!(!controller.filters_disabled());
        assert!(controller.set_genre(Some(18)));
    }

    #[test]
    fn failure_keeps_page_and_reports() {
        let mut controller = ViewController::new();
        let t = ticket(&mut controller);
        let outcome = controller.finish_load(&t, Err(ApiError::Network(String::from("down"))));
        assert!(matches!(outcome, LoadOutcome::Failed(_)));
        assert_eq!(controller.state().current_page, 1);
        assert!(matches!(controller.state().status, LoadStatus::Failed(_)));

        let retry = ticket(&mut controller);
        assert_eq!(retry.request.page, 1);
    }

    #[test]
    fn stale_response_is_dropped() {
        let mut controller = ViewController::new();
        let old = ticket(&mut controller);
        controller.switch_mode(Mode::Tv);
        let fresh = ticket(&mut controller);

        assert_eq!(controller.finish_load(&old, Ok(page(0..20, 5))), LoadOutcome::Stale);
        assert!(controller.items().is_empty());
        assert!(controller.state().is_loading);

        assert_eq!(
            controller.finish_load(&fresh, Ok(page(100..120, 5))),
            LoadOutcome::Appended(20)
        );
        assert_eq!(controller.items()[0].id, 100);
    }

    #[test]
    fn empty_first_page_is_empty_state() {
        let mut controller = ViewController::new();
        let t = ticket(&mut controller);
        assert_eq!(controller.finish_load(&t, Ok(page(0..0, 0))), LoadOutcome::Empty);
        assert_eq!(controller.state().status, LoadStatus::Empty);
        assert!(controller.state().reached_end);
    }

    #[test]
    fn last_page_ends_pagination() {
        let mut controller = ViewController::new();
        let t = ticket(&mut controller);
        controller.finish_load(&t, Ok(page(0..20, 2)));
        let t = ticket(&mut controller);
        assert_eq!(t.request.page, 2);
        controller.finish_load(&t, Ok(page(20..27, 2)));
        assert!(controller.state().reached_end);
        assert_eq!(controller.items().len(), 27);
        assert!(controller.begin_load(false, &[]).is_none());
    }

    #[test]
    fn empty_favorites_need_no_lookup() {
        let mut controller = ViewController::new();
        controller.switch_mode(Mode::Favorites);
        assert!(controller.begin_load(true, &[]).is_none());
        assert_eq!(controller.state().status, LoadStatus::Empty);
        assert_eq!(controller.title(), "My Favorites");
    }

    #[test]
    fn unfavoriting_removes_from_favorites_grid() {
        let mut controller = ViewController::new();
        controller.switch_mode(Mode::Favorites);
        let key = MediaKey::new(1, MediaType::Movie);
        let generation = match controller.begin_load(true, &[key]) {
            Some(LoadPlan::Favorites { generation, keys }) => {
                assert_eq!(keys, vec![key]);
                generation
            }
            other => panic!("expected favorites plan, got {:?}", other),
        };
        controller.finish_favorites(generation, vec![movie(1)], &[key]);
        controller.remove_item(key);
        assert!(controller.items().is_empty());
        assert_eq!(controller.state().status, LoadStatus::Empty);
    }

    #[test]
    fn search_page_of_only_people_keeps_paging() {
        let mut controller = ViewController::new();
        controller.submit_search("tom hanks").unwrap();
        let t = ticket(&mut controller);
        let response: crate::media::TmdbPageResponse = serde_json::from_str(
            r#"{"results":[{"id":31,"media_type":"person","name":"Tom Hanks"},
                           {"id":32,"media_type":"person","name":"Colin Hanks"}],
                "total_pages":5}"#,
        )
        .unwrap();
        let page = response.into_page(MediaType::Movie);
        assert!(page.results.is_empty());
        assert_eq!(page.upstream_count, 2);

        assert_eq!(controller.finish_load(&t, Ok(page)), LoadOutcome::Appended(0));
        assert!(!controller.state().reached_end);
        assert_ne!(controller.state().status, LoadStatus::Empty);
        assert_eq!(controller.state().current_page, 2);
        assert_eq!(ticket(&mut controller).request.page, 2);
    }

    #[test]
    fn last_page_of_only_people_is_empty_state() {
        let mut controller = ViewController::new();
        controller.submit_search("tom hanks").unwrap();
        let t = ticket(&mut controller);
        let people = CatalogPage {
            results: Vec::new(),
            total_pages: 1,
            upstream_count: 3,
        };
        assert_eq!(controller.finish_load(&t, Ok(people)), LoadOutcome::Empty);
        assert!(controller.state().reached_end);
        assert_eq!(controller.state().status, LoadStatus::Empty);
    }

    #[test]
    fn favorite_removed_during_lookup_stays_removed() {
        let mut controller = ViewController::new();
        controller.switch_mode(Mode::Favorites);
        let key = MediaKey::new(1, MediaType::Movie);
        let generation = match controller.begin_load(true, &[key]) {
            Some(LoadPlan::Favorites { generation, .. }) => generation,
            other => panic!("expected favorites plan, got {:?}", other),
        };
        controller.remove_item(key);
        assert_eq!(
            controller.finish_favorites(generation, vec![movie(1)], &[]),
            LoadOutcome::Empty
        );
        assert!(controller.items().is_empty());
        assert_eq!(controller.state().status, LoadStatus::Empty);
    }

    #[test]
    fn genre_list_follows_mode() {
        let mut controller = ViewController::new();
        assert_eq!(controller.missing_genre_list(), Some(MediaType::Movie));
        controller.set_genres(MediaType::Movie, vec![Genre::new(35, "Comedy")]);
        assert_eq!(controller.missing_genre_list(), None);
        assert_eq!(controller.available_genres().len(), 1);

        controller.switch_mode(Mode::Anime);
        assert_eq!(controller.available_genres(), anime_genres());
        controller.switch_mode(Mode::Tv);
        assert_eq!(controller.missing_genre_list(), Some(MediaType::Tv));
    }

    #[tokio::test]
    async fn load_more_walks_pages_in_order() {
        let api = FakeCatalog::with_pages(3, 20);
        let mut controller = ViewController::new();
        for expected in 1..=3u32 {
            let outcome = load_more(&mut controller, &api, false, &[]).await;
            assert_eq!(outcome, LoadOutcome::Appended(20));
            assert!(controller.state().pager.is_loaded(expected));
        }
        assert!(controller.state().reached_end);
        assert_eq!(load_more(&mut controller, &api, false, &[]).await, LoadOutcome::Skipped);
        assert_eq!(api.request_count(), 3);
    }

    #[tokio::test]
    async fn load_more_resolves_favorites() {
        let missing = MediaKey::new(2, MediaType::Movie);
        let api = FakeCatalog::with_pages(1, 1).without(missing);
        let mut controller = ViewController::new();
        controller.switch_mode(Mode::Favorites);
        let keys = [MediaKey::new(1, MediaType::Tv), missing];
        let outcome = load_more(&mut controller, &api, true, &keys).await;
        assert_eq!(outcome, LoadOutcome::Appended(1));
        assert_eq!(controller.items()[0].media_type, MediaType::Tv);
    }

    #[tokio::test]
    async fn favorites_and_ceiling_never_hit_the_network() {
        let api = FakeCatalog::with_pages(200, 20);
        let mut controller = ViewController::new();
        controller.switch_mode(Mode::Favorites);
        assert_eq!(load_more(&mut controller, &api, false, &[]).await, LoadOutcome::Empty);

        controller.switch_mode(Mode::Popular);
        controller.state.current_page = PAGE_CEILING + 1;
        assert_eq!(load_more(&mut controller, &api, false, &[]).await, LoadOutcome::Skipped);
        assert!(controller.state().reached_end);
        assert_eq!(api.request_count(), 0);
    }

    #[tokio::test]
    async fn failed_page_is_retried_at_the_same_number() {
        let api = FakeCatalog::with_pages(3, 20);
        api.fail_next(ApiError::Network(String::from("offline")));
        let mut controller = ViewController::new();

        let outcome = load_more(&mut controller, &api, false, &[]).await;
        assert!(matches!(outcome, LoadOutcome::Failed(_)));
        assert!(!controller.state().pager.is_loaded(1));
        assert_eq!(controller.state().current_page, 1);

        assert_eq!(load_more(&mut controller, &api, false, &[]).await, LoadOutcome::Appended(20));
        assert!(controller.state().pager.is_loaded(1));
    }

    #[test]
    fn ceiling_pages_are_never_requested() {
        let mut controller = ViewController::new();
        for p in 1..=PAGE_CEILING {
            let t = ticket(&mut controller);
            assert_eq!(page_of(&t.request.path), p);
            let start = u64::from(p) * 100;
            controller.finish_load(&t, Ok(page(start..start + 1, 500)));
        }
        assert!(controller.state().reached_end);
        assert!(controller.begin_load(false, &[]).is_none());
    }

    proptest! {
        #[test]
        fn buffer_and_page_stay_within_ceilings(sizes in proptest::collection::vec(0usize..=PAGE_SIZE, 1..40)) {
            let mut controller = ViewController::new();
            let mut next_id = 0u64;
            let mut last_page = controller.state().current_page;
            for size in sizes {
                let Some(LoadPlan::Page(t)) = controller.begin_load(false, &[]) else {
                    break;
                };
                let results = page(next_id..next_id + size as u64, PAGE_CEILING + 50);
                next_id += size as u64;
                controller.finish_load(&t, Ok(results));
                prop_assert!(controller.items().len() <= ITEM_CEILING);
                prop_assert!(controller.state().current_page <= PAGE_CEILING);
                prop_assert!(controller.state().current_page >= last_page);
                last_page = controller.state().current_page;
                prop_assert!(!controller.state().is_loading);
            }
        }

        #[test]
        fn every_filter_change_resets_pagination(genre in 1u64..20000, year in 1950i32..2030) {
            let mut controller = ViewController::new();
            let t = ticket(&mut controller);
            controller.finish_load(&t, Ok(page(0..20, 10)));
            let before = controller.state().generation;

            prop_assume!(controller.set_genre(Some(genre)));
            prop_assert_eq!(controller.state().pager.loaded_count(), 0);
            prop_assert!(controller.items().is_empty());
            prop_assert!(controller.state().generation > before);

            controller.set_year(Some(year));
            prop_assert_eq!(controller.state().current_page, 1);
        }
    }
}
