use std::collections::BTreeMap;

use crate::library::Library;
use crate::media::{CatalogItem, Episode, MediaId, MediaType, SeasonSummary};
use crate::pacing::BACK_TO_TOP_OFFSET;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Server {
    #[default]
    VidSrc,
    VidSrcMe,
    Videasy,
}

impl Server {
    pub const ALL: [Server; 3] = [Server::VidSrc, Server::VidSrcMe, Server::Videasy];

    pub fn label(self) -> &'static str {
        match self {
            Server::VidSrc => "VidSrc",
            Server::VidSrcMe => "VidSrc.me",
            Server::Videasy => "Videasy",
        }
    }
}

impl std::fmt::Display for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayTarget {
    Movie(MediaId),
    Episode {
        show_id: MediaId,
        season: u32,
        episode: u32,
    },
}

pub fn embed_url(server: Server, target: PlayTarget) -> String {
    match (server, target) {
        (Server::VidSrc, PlayTarget::Movie(id)) => {
            format!("https://vidsrc.cc/v2/embed/movie/{}", id)
        }
        (
            Server::VidSrc,
            PlayTarget::Episode {
                show_id,
                season,
                episode,
            },
        ) => format!(
            "https://vidsrc.cc/v2/embed/tv/{}/{}/{}",
            show_id, season, episode
        ),
        (Server::VidSrcMe, PlayTarget::Movie(id)) => {
            format!("https://vidsrc.me/embed/movie?tmdb={}", id)
        }
        (
            Server::VidSrcMe,
            PlayTarget::Episode {
                show_id,
                season,
                episode,
            },
        ) => format!(
            "https://vidsrc.me/embed/tv?tmdb={}&season={}&episode={}",
            show_id, season, episode
        ),
        (Server::Videasy, PlayTarget::Movie(id)) => {
            format!("https://player.videasy.net/movie/{}", id)
        }
        (
            Server::Videasy,
            PlayTarget::Episode {
                show_id,
                season,
                episode,
            },
        ) => format!(
            "https://player.videasy.net/tv/{}/{}/{}",
            show_id, season, episode
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EpisodeRef {
    pub season: u32,
    pub episode: u32,
}

#[derive(Debug, Clone)]
struct SeasonEntry {
    summary: SeasonSummary,
    episodes: Option<Vec<Episode>>,
}

impl SeasonEntry {
    fn episode_numbers(&self) -> Vec<u32> {
        match &self.episodes {
            Some(episodes) => {
                let mut numbers: Vec<u32> = episodes.iter().map(|e| e.episode_number).collect();
                numbers.sort_unstable();
                numbers
            }
            None => (1..=self.summary.episode_count).collect(),
        }
    }
}

/// Seasons of the open show, each with its episode list once fetched.
#[derive(Debug, Clone, Default)]
pub struct SeasonIndex {
    seasons: BTreeMap<u32, SeasonEntry>,
}

impl SeasonIndex {
    pub fn from_summaries(summaries: Vec<SeasonSummary>) -> Self {
        let seasons = summaries
            .into_iter()
            .map(|summary| {
                (
                    summary.season_number,
                    SeasonEntry {
                        summary,
                        episodes: None,
                    },
                )
            })
            .collect();
        Self { seasons }
    }

    pub fn is_empty(&self) -> bool {
        self.seasons.is_empty()
    }

    pub fn summaries(&self) -> impl Iterator<Item = &SeasonSummary> {
        self.seasons.values().map(|entry| &entry.summary)
    }

    pub fn episodes(&self, season: u32) -> Option<&[Episode]> {
        self.seasons
            .get(&season)
            .and_then(|entry| entry.episodes.as_deref())
    }

    fn set_episodes(&mut self, season: u32, episodes: Vec<Episode>) -> bool {
        match self.seasons.get_mut(&season) {
            Some(entry) => {
                entry.episodes = Some(episodes);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, target: EpisodeRef) -> bool {
        self.seasons
            .get(&target.season)
            .is_some_and(|entry| entry.episode_numbers().contains(&target.episode))
    }

    /// The episode after `current`: next in its season, else the first episode
    /// of the following non-empty season.
    pub fn next_after(&self, current: EpisodeRef) -> Option<EpisodeRef> {
        if let Some(entry) = self.seasons.get(&current.season) {
            if let Some(episode) = entry
                .episode_numbers()
                .into_iter()
                .find(|n| *n > current.episode)
            {
                return Some(EpisodeRef {
                    season: current.season,
                    episode,
                });
            }
        }
        self.seasons
            .range(current.season + 1..)
            .find_map(|(season, entry)| {
                entry.episode_numbers().first().map(|episode| EpisodeRef {
                    season: *season,
                    episode: *episode,
                })
            })
    }
}

#[derive(Debug, Clone)]
pub struct MovieSession {
    pub item: CatalogItem,
    pub server: Server,
}

#[derive(Debug, Clone)]
pub struct TvSession {
    pub show: CatalogItem,
    pub server: Server,
    pub seasons: SeasonIndex,
    pub expanded: Option<u32>,
    pub selected: Option<EpisodeRef>,
}

#[derive(Debug, Clone, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Movie(MovieSession),
    Tv(TvSession),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayerError {
    #[error("no show is open")]
    NoShowOpen,
    #[error("show {0} is no longer open")]
    ShowMismatch(MediaId),
    #[error("season {season} episode {episode} is not available")]
    UnknownEpisode { season: u32, episode: u32 },
    #[error("this is the last available episode")]
    NoNextEpisode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseOutcome {
    pub show_back_to_top: bool,
}

/// Details modal and the embed player inside it.
#[derive(Debug, Clone, Default)]
pub struct PlayerModal {
    state: ModalState,
    source: Option<String>,
    next: Option<EpisodeRef>,
}

impl PlayerModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, ModalState::Closed)
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn next_episode(&self) -> Option<EpisodeRef> {
        self.next
    }

    pub fn item(&self) -> Option<&CatalogItem> {
        match &self.state {
            ModalState::Closed => None,
            ModalState::Movie(session) => Some(&session.item),
            ModalState::Tv(session) => Some(&session.show),
        }
    }

    pub fn server(&self) -> Server {
        match &self.state {
            ModalState::Movie(session) => session.server,
            ModalState::Tv(session) => session.server,
            ModalState::Closed => Server::default(),
        }
    }

    pub fn open(&mut self, item: CatalogItem, library: &mut Library) {
        match item.media_type {
            MediaType::Movie => self.open_movie(item, library),
            MediaType::Tv => self.open_tv(item, library),
        }
    }

    pub fn open_movie(&mut self, item: CatalogItem, library: &mut Library) {
        library.add_recently_viewed(&item);
        let server = Server::default();
        self.source = Some(embed_url(server, PlayTarget::Movie(item.id)));
        self.next = None;
        tracing::info!(id = item.id, "opened movie");
        self.state = ModalState::Movie(MovieSession { item, server });
    }

    pub fn open_tv(&mut self, show: CatalogItem, library: &mut Library) {
        library.add_recently_viewed(&show);
        self.source = None;
        self.next = None;
        tracing::info!(id = show.id, "opened show");
        self.state = ModalState::Tv(TvSession {
            show,
            server: Server::default(),
            seasons: SeasonIndex::default(),
            expanded: None,
            selected: None,
        });
    }

    fn tv_session(&mut self, show_id: MediaId) -> Result<&mut TvSession, PlayerError> {
        match &mut self.state {
            ModalState::Tv(session) if session.show.id == show_id => Ok(session),
            ModalState::Tv(_) => Err(PlayerError::ShowMismatch(show_id)),
            _ => Err(PlayerError::NoShowOpen),
        }
    }

    pub fn load_seasons(
        &mut self,
        show_id: MediaId,
        seasons: Vec<SeasonSummary>,
    ) -> Result<(), PlayerError> {
        let session = self.tv_session(show_id)?;
        session.seasons = SeasonIndex::from_summaries(seasons);
        Ok(())
    }

    /// Toggles a season open or shut. Returns the season whose episodes still
    /// need fetching, if any.
    pub fn expand_season(&mut self, season: u32) -> Option<u32> {
        let ModalState::Tv(session) = &mut self.state else {
            return None;
        };
        if session.expanded == Some(season) {
            session.expanded = None;
            return None;
        }
        session.expanded = Some(season);
        session
            .seasons
            .episodes(season)
            .is_none()
            .then_some(season)
    }

    pub fn load_episodes(
        &mut self,
        show_id: MediaId,
        season: u32,
        episodes: Vec<Episode>,
    ) -> Result<(), PlayerError> {
        let session = self.tv_session(show_id)?;
        if !session.seasons.set_episodes(season, episodes) {
            return Err(PlayerError::UnknownEpisode { season, episode: 0 });
        }
        if let Some(current) = session.selected {
            let next = session.seasons.next_after(current);
            self.next = next;
        }
        Ok(())
    }

    pub fn play_episode(
        &mut self,
        show_id: MediaId,
        season: u32,
        episode: u32,
    ) -> Result<String, PlayerError> {
        let session = self.tv_session(show_id)?;
        let target = EpisodeRef { season, episode };
        if !session.seasons.contains(target) {
            return Err(PlayerError::UnknownEpisode { season, episode });
        }
        session.selected = Some(target);
        session.expanded = Some(season);
        let url = embed_url(
            session.server,
            PlayTarget::Episode {
                show_id,
                season,
                episode,
            },
        );
        let next = session.seasons.next_after(target);
        self.next = next;
        self.source = Some(url.clone());
        tracing::info!(show_id, season, episode, "playing episode");
        Ok(url)
    }

    pub fn play_next(&mut self) -> Result<String, PlayerError> {
        let show_id = match &self.state {
            ModalState::Tv(session) => session.show.id,
            _ => return Err(PlayerError::NoShowOpen),
        };
        let next = self.next.ok_or(PlayerError::NoNextEpisode)?;
        self.play_episode(show_id, next.season, next.episode)
    }

    /// Switches the embed host; the source changes only if something is playing.
    pub fn change_server(&mut self, server: Server) -> Option<&str> {
        let target = match &mut self.state {
            ModalState::Closed => return None,
            ModalState::Movie(session) => {
                session.server = server;
                Some(PlayTarget::Movie(session.item.id))
            }
            ModalState::Tv(session) => {
                session.server = server;
                session.selected.map(|selected| PlayTarget::Episode {
                    show_id: session.show.id,
                    season: selected.season,
                    episode: selected.episode,
                })
            }
        };
        if let Some(target) = target {
            self.source = Some(embed_url(server, target));
        }
        self.source.as_deref()
    }

    pub fn close(&mut self, scroll_offset: f32) -> CloseOutcome {
        self.state = ModalState::Closed;
        self.source = None;
        self.next = None;
        CloseOutcome {
            show_back_to_top: scroll_offset > BACK_TO_TOP_OFFSET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::MemoryStore;
    use crate::tmdb::testing::movie;

    fn library() -> Library {
        Library::load(Box::new(MemoryStore::default()))
    }

    fn show(id: MediaId) -> CatalogItem {
        CatalogItem {
            media_type: MediaType::Tv,
            ..movie(id)
        }
    }

    fn season(number: u32, episode_count: u32) -> SeasonSummary {
        SeasonSummary {
            season_number: number,
            name: format!("Season {}", number),
            episode_count,
        }
    }

    fn episode(season: u32, number: u32) -> Episode {
        Episode {
            episode_number: number,
            season_number: season,
            name: format!("Episode {}", number),
            overview: String::new(),
            air_date: None,
            still_path: None,
        }
    }

    #[test]
    fn embed_templates() {
        let movie = PlayTarget::Movie(550);
        let ep = PlayTarget::Episode {
            show_id: 1399,
            season: 2,
            episode: 3,
        };
        assert_eq!(
            embed_url(Server::VidSrc, movie),
            "https://vidsrc.cc/v2/embed/movie/550"
        );
        assert_eq!(
            embed_url(Server::VidSrc, ep),
            "https://vidsrc.cc/v2/embed/tv/1399/2/3"
        );
        assert_eq!(
            embed_url(Server::VidSrcMe, movie),
            "https://vidsrc.me/embed/movie?tmdb=550"
        );
        assert_eq!(
            embed_url(Server::VidSrcMe, ep),
            "https://vidsrc.me/embed/tv?tmdb=1399&season=2&episode=3"
        );
        assert_eq!(
            embed_url(Server::Videasy, movie),
            "https://player.videasy.net/movie/550"
        );
        assert_eq!(
            embed_url(Server::Videasy, ep),
            "https://player.videasy.net/tv/1399/2/3"
        );
    }

    #[test]
    fn open_movie_records_and_sets_source() {
        let mut library = library();
        let mut modal = PlayerModal::new();
        modal.change_server(Server::Videasy);
        modal.open(movie(10), &mut library);

        assert_eq!(modal.server(), Server::VidSrc);
        assert_eq!(modal.source(), Some("https://vidsrc.cc/v2/embed/movie/10"));
        assert_eq!(library.recently_viewed()[0].id, 10);
    }

    #[test]
    fn open_tv_waits_for_episode() {
        let mut library = library();
        let mut modal = PlayerModal::new();
        modal.open(show(456), &mut library);
        assert!(matches!(modal.state(), ModalState::Tv(_)));
        assert_eq!(modal.source(), None);
        assert_eq!(library.recently_viewed()[0].media_type, MediaType::Tv);
    }

    #[test]
    fn last_episode_of_season_points_to_next_season() {
        let mut library = library();
        let mut modal = PlayerModal::new();
        modal.open_tv(show(456), &mut library);
        modal
            .load_seasons(456, vec![season(1, 10), season(2, 8)])
            .unwrap();

        let url = modal.play_episode(456, 1, 10).unwrap();
        assert_eq!(url, "https://vidsrc.cc/v2/embed/tv/456/1/10");
        assert_eq!(
            modal.next_episode(),
            Some(EpisodeRef {
                season: 2,
                episode: 1
            })
        );

        let url = modal.play_next().unwrap();
        assert_eq!(url, "https://vidsrc.cc/v2/embed/tv/456/2/1");
        assert_eq!(
            modal.next_episode(),
            Some(EpisodeRef {
                season: 2,
                episode: 2
            })
        );
    }

    #[test]
    fn two_episode_season_advances_within_the_season() {
        let mut library = library();
        let mut modal = PlayerModal::new();
        modal.open_tv(show(456), &mut library);
        modal.load_seasons(456, vec![season(1, 2)]).unwrap();
        modal
            .load_episodes(456, 1, vec![episode(1, 1), episode(1, 2)])
            .unwrap();

        let url = modal.play_episode(456, 1, 1).unwrap();
        assert_eq!(url, "https://vidsrc.cc/v2/embed/tv/456/1/1");
        assert_eq!(
            modal.next_episode(),
            Some(EpisodeRef {
                season: 1,
                episode: 2
            })
        );

        modal.play_episode(456, 1, 2).unwrap();
        assert_eq!(modal.next_episode(), None);
    }

    #[test]
    fn final_episode_has_no_next() {
        let mut library = library();
        let mut modal = PlayerModal::new();
        modal.open_tv(show(7), &mut library);
        modal.load_seasons(7, vec![season(1, 2)]).unwrap();
        modal.play_episode(7, 1, 2).unwrap();
        assert_eq!(modal.next_episode(), None);
        assert_eq!(modal.play_next(), Err(PlayerError::NoNextEpisode));
    }

    #[test]
    fn loaded_episode_lists_take_precedence() {
        let mut library = library();
        let mut modal = PlayerModal::new();
        modal.open_tv(show(9), &mut library);
        modal.load_seasons(9, vec![season(1, 3), season(2, 3)]).unwrap();
        assert_eq!(modal.expand_season(1), Some(1));
        modal
            .load_episodes(9, 1, vec![episode(1, 1), episode(1, 2)])
            .unwrap();
        assert_eq!(modal.expand_season(2), Some(2));
        assert_eq!(modal.expand_season(2), None);
        assert_eq!(modal.expand_season(1), None);

        assert_eq!(
            modal.play_episode(9, 1, 3),
            Err(PlayerError::UnknownEpisode {
                season: 1,
                episode: 3
            })
        );
        modal.play_episode(9, 1, 2).unwrap();
        assert_eq!(modal.next_episode().map(|n| n.season), Some(2));
    }

    #[test]
    fn stale_show_responses_are_rejected() {
        let mut library = library();
        let mut modal = PlayerModal::new();
        assert_eq!(
            modal.load_seasons(1, vec![season(1, 1)]),
            Err(PlayerError::NoShowOpen)
        );
        modal.open_tv(show(2), &mut library);
        assert_eq!(
            modal.load_seasons(1, vec![season(1, 1)]),
            Err(PlayerError::ShowMismatch(1))
        );
    }

    #[test]
    fn change_server_only_rebuilds_url() {
        let mut library = library();
        let mut modal = PlayerModal::new();
        modal.open_tv(show(456), &mut library);
        modal.load_seasons(456, vec![season(1, 5)]).unwrap();
        assert_eq!(modal.change_server(Server::VidSrcMe), None);

        modal.play_episode(456, 1, 4).unwrap();
        let next = modal.next_episode();
        assert_eq!(
            modal.change_server(Server::Videasy),
            Some("https://player.videasy.net/tv/456/1/4")
        );
        assert_eq!(modal.next_episode(), next);
    }

    #[test]
    fn close_tears_down_and_reports_back_to_top() {
        let mut library = library();
        let mut modal = PlayerModal::new();
        modal.open_movie(movie(1), &mut library);
        let outcome = modal.close(1200.0);
        assert!(outcome.show_back_to_top);
        assert!(!modal.is_open());
        assert_eq!(modal.source(), None);

        modal.open_movie(movie(1), &mut library);
        assert!(!modal.close(100.0).show_back_to_top);
    }
}
