use std::time::Instant;

use iced::Task;

use crate::components::MAIN_SCROLL_ID;
use crate::controller::{LoadOutcome, LoadPlan, PageTicket};
use crate::detail_handlers;
use crate::media::{
    ApiError, CatalogItem, CatalogPage, Genre, MediaKey, MediaType, Message, Mode,
};
use crate::pacing::{ScrollMetrics, BACK_TO_TOP_OFFSET};
use crate::query::QueryError;
use crate::render::ViewModel;
use crate::tmdb::{fetch_image_bytes, load_genres, resolve_favorites, CatalogApi};
use crate::Catalogz;

pub fn handle_message(app: &mut Catalogz, message: Message) -> Task<Message> {
    match message {
        Message::Setup(_) => Task::none(),
        Message::SwitchMode(mode) => handle_switch_mode(app, mode),
        Message::SearchQueryChanged(query) => handle_search_query_changed(app, query),
        Message::SearchSubmit => {
            app.search_debounce.touch(Instant::now());
            Task::none()
        }
        Message::SearchDebounceTriggered => handle_search_debounce_triggered(app),
        Message::ClearSearch => handle_clear_search(app),
        Message::SetGenreFilter(genre_id) => {
            if app.controller.set_genre(genre_id) {
                return refresh_view(app);
            }
            Task::none()
        }
        Message::SetYearFilter(year) => {
            if app.controller.set_year(year) {
                return refresh_view(app);
            }
            Task::none()
        }
        Message::SetNetflixSubtype(subtype) => {
            if app.controller.set_netflix_subtype(subtype) {
                return refresh_view(app);
            }
            Task::none()
        }
        Message::GenresLoaded(media_type, result) => handle_genres_loaded(app, media_type, result),
        Message::LoadMore => start_load(app, false),
        Message::PageLoaded(ticket, result) => handle_page_loaded(app, ticket, result),
        Message::FavoritesResolved(generation, items) => {
            handle_favorites_resolved(app, generation, items)
        }
        Message::MainScrolled(metrics) => handle_main_scrolled(app, metrics),
        Message::ScrollToTop => {
            app.show_back_to_top = false;
            scroll_to_top()
        }
        Message::RetryLoad => start_load(app, false),
        Message::LoadImage(url) => handle_load_image(app, url),
        Message::ImageLoaded(url, result) => handle_image_loaded(app, url, result),
        Message::OpenItem(key) => detail_handlers::handle_open_item(app, key),
        Message::CloseModal => detail_handlers::handle_close_modal(app),
        Message::SeasonsLoaded(show_id, result) => {
            detail_handlers::handle_seasons_loaded(app, show_id, result)
        }
        Message::ExpandSeason(season) => detail_handlers::handle_expand_season(app, season),
        Message::EpisodesLoaded(show_id, season, result) => {
            detail_handlers::handle_episodes_loaded(app, show_id, season, result)
        }
        Message::PlayEpisode(season, episode) => {
            detail_handlers::handle_play_episode(app, season, episode)
        }
        Message::PlayNextEpisode => detail_handlers::handle_play_next_episode(app),
        Message::ChangeServer(server) => {
            app.modal.change_server(server);
            Task::none()
        }
        Message::WatchNow => detail_handlers::handle_watch_now(app),
        Message::OpenTmdbPage(key) => {
            detail_handlers::open_in_browser(app, &key.tmdb_page_url());
            Task::none()
        }
        Message::ToggleFavorite(key) => handle_toggle_favorite(app, key),
    }
}

/// Starts the next load the controller plans, if any. A missing client leaves
/// the controller untouched so it never gets stuck loading.
pub fn start_load(app: &mut Catalogz, clear: bool) -> Task<Message> {
    let Some(client) = app.tmdb_client.clone() else {
        return Task::none();
    };
    let favorites = app.library.favorites().to_vec();
    let Some(plan) = app.controller.begin_load(clear, &favorites) else {
        return Task::none();
    };

    match plan {
        LoadPlan::Page(ticket) => {
            tracing::debug!(page = ticket.request.page, path = %ticket.request.path, "loading page");
            Task::perform(
                async move {
                    let result = client
                        .fetch_page(&ticket.request.path, ticket.request.fallback)
                        .await;
                    (ticket, result)
                },
                |(ticket, result)| Message::PageLoaded(ticket, result),
            )
        }
        LoadPlan::Favorites { generation, keys } => Task::perform(
            async move { resolve_favorites(&client, keys).await },
            move |items| Message::FavoritesResolved(generation, items),
        ),
    }
}

/// Runs after every mode or filter change: back to the top, first page, and the
/// genre list the new view needs.
pub fn refresh_view(app: &mut Catalogz) -> Task<Message> {
    app.show_back_to_top = false;
    app.scroll.offset = 0.0;

    let mut tasks = vec![scroll_to_top(), start_load(app, false)];
    if let (Some(media_type), Some(client)) =
        (app.controller.missing_genre_list(), app.tmdb_client.clone())
    {
        tasks.push(Task::perform(load_genres(client, media_type), move |r| {
            Message::GenresLoaded(media_type, r)
        }));
    }
    Task::batch(tasks)
}

fn scroll_to_top() -> Task<Message> {
    let id = iced::widget::Id::new(MAIN_SCROLL_ID);
    let offset = iced::widget::scrollable::AbsoluteOffset { x: 0.0, y: 0.0 };
    iced::widget::operation::scroll_to(id, offset)
}

pub fn load_posters(app: &Catalogz, items: &[CatalogItem]) -> Task<Message> {
    let tasks: Vec<Task<Message>> = items
        .iter()
        .filter_map(|item| ViewModel::from_item(item).poster.url().map(str::to_string))
        .filter(|url| app.image_cache.get(url).is_none() && !app.image_cache.is_pending(url))
        .map(|url| Task::done(Message::LoadImage(url)))
        .collect();
    Task::batch(tasks)
}

fn handle_switch_mode(app: &mut Catalogz, mode: Mode) -> Task<Message> {
    if mode != Mode::Search {
        app.search_query.clear();
        app.search_debounce.cancel();
    }
    if !app.controller.switch_mode(mode) {
        return Task::none();
    }
    refresh_view(app)
}

fn handle_search_query_changed(app: &mut Catalogz, query: String) -> Task<Message> {
    app.search_query = query;
    if app.search_query.trim().is_empty() {
        app.search_debounce.cancel();
        return Task::none();
    }
    app.search_debounce.touch(Instant::now());
    Task::none()
}

fn handle_search_debounce_triggered(app: &mut Catalogz) -> Task<Message> {
    if !app.search_debounce.fire(Instant::now()) {
        return Task::none();
    }
    match app.controller.submit_search(&app.search_query) {
        Ok(true) => refresh_view(app),
        Ok(false) => Task::none(),
        Err(QueryError::EmptySearch) => Task::none(),
        Err(e) => {
            tracing::warn!("search rejected: {}", e);
            Task::none()
        }
    }
}

fn handle_clear_search(app: &mut Catalogz) -> Task<Message> {
    app.search_query.clear();
    app.search_debounce.cancel();
    if app.controller.state().mode == Mode::Search {
        return handle_switch_mode(app, Mode::Popular);
    }
    Task::none()
}

fn handle_genres_loaded(
    app: &mut Catalogz,
    media_type: MediaType,
    result: Result<Vec<Genre>, ApiError>,
) -> Task<Message> {
    match result {
        Ok(genres) => {
            tracing::debug!(?media_type, count = genres.len(), "genres loaded");
            app.controller.set_genres(media_type, genres);
        }
        Err(e) => tracing::warn!(?media_type, "could not load genres: {}", e),
    }
    Task::none()
}

fn handle_page_loaded(
    app: &mut Catalogz,
    ticket: PageTicket,
    result: Result<CatalogPage, ApiError>,
) -> Task<Message> {
    let before = app.controller.items().len();
    match app.controller.finish_load(&ticket, result) {
        // Nothing new to scroll past, so no scroll event will ask for the next page.
        LoadOutcome::Appended(0) if !app.controller.state().reached_end => start_load(app, false),
        LoadOutcome::Appended(_) => {
            let fresh = app.controller.items()[before..].to_vec();
            load_posters(app, &fresh)
        }
        LoadOutcome::Failed(_)
        | LoadOutcome::Ended
        | LoadOutcome::Empty
        | LoadOutcome::Stale
        | LoadOutcome::Skipped => Task::none(),
    }
}

fn handle_favorites_resolved(
    app: &mut Catalogz,
    generation: u64,
    items: Vec<CatalogItem>,
) -> Task<Message> {
    let current = app.library.favorites().to_vec();
    match app.controller.finish_favorites(generation, items, &current) {
        LoadOutcome::Appended(_) => {
            let items = app.controller.items().to_vec();
            load_posters(app, &items)
        }
        _ => Task::none(),
    }
}

fn handle_main_scrolled(app: &mut Catalogz, metrics: ScrollMetrics) -> Task<Message> {
    app.scroll = metrics;
    if metrics.offset <= BACK_TO_TOP_OFFSET {
        app.show_back_to_top = false;
    }
    let state = app.controller.state();
    let (is_loading, reached_end) = (state.is_loading, state.reached_end);
    if app.controller.load_error().is_some() {
        return Task::none();
    }
    if app
        .scroll_trigger
        .should_load(&metrics, Instant::now(), is_loading, reached_end)
    {
        return start_load(app, false);
    }
    Task::none()
}

fn handle_toggle_favorite(app: &mut Catalogz, key: MediaKey) -> Task<Message> {
    let now_favorite = app.library.toggle_favorite(key);
    tracing::info!(?key, now_favorite, "favorite toggled");
    if !now_favorite {
        app.controller.remove_item(key);
    }
    Task::none()
}

fn handle_load_image(app: &mut Catalogz, url: String) -> Task<Message> {
    if app.image_cache.get(&url).is_some() || app.image_cache.is_pending(&url) {
        return Task::none();
    }
    app.image_cache.mark_pending(url.clone());
    let image_url = url.clone();
    let cache_path = app.image_cache.get_cache_path(&url);

    Task::perform(
        async move {
            if let Some(ref path) = cache_path {
                if let Ok(bytes) = tokio::fs::read(path).await {
                    return (image_url, Ok(bytes), cache_path, true);
                }
            }
            let bytes = fetch_image_bytes(image_url.clone()).await;
            (image_url, bytes, cache_path, false)
        },
        |(url, result, cache_path, from_cache)| match result {
            Ok(bytes) => {
                if !from_cache {
                    if let Some(path) = cache_path {
                        let bytes_clone = bytes.clone();
                        std::thread::spawn(move || {
                            if let Err(e) = std::fs::write(&path, &bytes_clone) {
                                tracing::debug!("poster cache write failed: {}", e);
                            }
                        });
                    }
                }
                Message::ImageLoaded(url, Ok(iced::widget::image::Handle::from_bytes(bytes)))
            }
            Err(error) => Message::ImageLoaded(url, Err(error)),
        },
    )
}

fn handle_image_loaded(
    app: &mut Catalogz,
    url: String,
    result: Result<iced::widget::image::Handle, String>,
) -> Task<Message> {
    match result {
        Ok(handle) => app.image_cache.insert(url, handle),
        Err(e) => {
            tracing::debug!(%url, "poster failed to load: {}", e);
            app.image_cache.clear_pending(&url);
        }
    }
    Task::none()
}
