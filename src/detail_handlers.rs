use iced::Task;

use crate::handlers::load_posters;
use crate::media::{ApiError, CatalogItem, Episode, MediaId, MediaKey, MediaType, Message, SeasonSummary};
use crate::Catalogz;

fn find_item(app: &Catalogz, key: MediaKey) -> Option<CatalogItem> {
    app.controller
        .items()
        .iter()
        .find(|item| item.key() == key)
        .cloned()
        .or_else(|| app.library.find_recent(key).map(|entry| entry.to_item()))
}

pub fn handle_open_item(app: &mut Catalogz, key: MediaKey) -> Task<Message> {
    let Some(item) = find_item(app, key) else {
        tracing::warn!(?key, "opened an entry that is no longer listed");
        return Task::none();
    };
    app.modal_error = None;
    app.show_back_to_top = false;
    let poster_task = load_posters(app, std::slice::from_ref(&item));
    app.modal.open(item, &mut app.library);

    if key.media_type != MediaType::Tv {
        return poster_task;
    }
    let Some(client) = app.tmdb_client.clone() else {
        return poster_task;
    };
    let show_id = key.id;
    let seasons_task = Task::perform(
        async move { client.fetch_seasons(show_id).await },
        move |result| Message::SeasonsLoaded(show_id, result),
    );
    Task::batch([poster_task, seasons_task])
}

pub fn handle_close_modal(app: &mut Catalogz) -> Task<Message> {
    let outcome = app.modal.close(app.scroll.offset);
    app.show_back_to_top = outcome.show_back_to_top;
    app.modal_error = None;
    Task::none()
}

fn fetch_episodes(app: &Catalogz, show_id: MediaId, season: u32) -> Task<Message> {
    let Some(client) = app.tmdb_client.clone() else {
        return Task::none();
    };
    Task::perform(
        async move { client.fetch_season_episodes(show_id, season).await },
        move |result| Message::EpisodesLoaded(show_id, season, result),
    )
}

pub fn handle_seasons_loaded(
    app: &mut Catalogz,
    show_id: MediaId,
    result: Result<Vec<SeasonSummary>, ApiError>,
) -> Task<Message> {
    let seasons = match result {
        Ok(seasons) => seasons,
        Err(e) => {
            tracing::warn!(show_id, "could not load seasons: {}", e);
            app.modal_error = Some(e.to_string());
            return Task::none();
        }
    };
    let first = seasons.first().map(|s| s.season_number);
    if let Err(e) = app.modal.load_seasons(show_id, seasons) {
        tracing::debug!(show_id, "seasons arrived late: {}", e);
        return Task::none();
    }
    match first.and_then(|season| app.modal.expand_season(season)) {
        Some(season) => fetch_episodes(app, show_id, season),
        None => Task::none(),
    }
}

pub fn handle_expand_season(app: &mut Catalogz, season: u32) -> Task<Message> {
    let Some(show_id) = app.modal.item().map(|item| item.id) else {
        return Task::none();
    };
    match app.modal.expand_season(season) {
        Some(season) => fetch_episodes(app, show_id, season),
        None => Task::none(),
    }
}

pub fn handle_episodes_loaded(
    app: &mut Catalogz,
    show_id: MediaId,
    season: u32,
    result: Result<Vec<Episode>, ApiError>,
) -> Task<Message> {
    match result {
        Ok(episodes) => {
            if let Err(e) = app.modal.load_episodes(show_id, season, episodes) {
                tracing::debug!(show_id, season, "episodes arrived late: {}", e);
            }
        }
        Err(e) => {
            tracing::warn!(show_id, season, "could not load episodes: {}", e);
            app.modal_error = Some(e.to_string());
        }
    }
    Task::none()
}

pub fn handle_play_episode(app: &mut Catalogz, season: u32, episode: u32) -> Task<Message> {
    let Some(show_id) = app.modal.item().map(|item| item.id) else {
        return Task::none();
    };
    match app.modal.play_episode(show_id, season, episode) {
        Ok(url) => open_in_browser(app, &url),
        Err(e) => app.modal_error = Some(e.to_string()),
    }
    Task::none()
}

pub fn handle_play_next_episode(app: &mut Catalogz) -> Task<Message> {
    match app.modal.play_next() {
        Ok(url) => open_in_browser(app, &url),
        Err(e) => app.modal_error = Some(e.to_string()),
    }
    Task::none()
}

pub fn handle_watch_now(app: &mut Catalogz) -> Task<Message> {
    if let Some(url) = app.modal.source().map(str::to_string) {
        open_in_browser(app, &url);
    }
    Task::none()
}

pub fn open_in_browser(app: &mut Catalogz, url: &str) {
    tracing::info!(%url, "opening in browser");
    if let Err(e) = webbrowser::open(url) {
        tracing::warn!(%url, "could not open browser: {}", e);
        app.modal_error = Some(format!("Could not open {}: {}", url, e));
    }
}
