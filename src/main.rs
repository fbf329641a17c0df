mod cards;
mod components;
mod controller;
mod detail_handlers;
mod detail_popup;
mod detail_sections;
mod handlers;
mod library;
mod media;
mod pacing;
mod pager;
mod player;
mod query;
mod render;
mod search;
mod settings;
mod tmdb;

use iced::widget::container;
use iced::{Element, Font, Length, Size, Subscription, Task, Theme};
use tracing_subscriber::EnvFilter;

use controller::ViewController;
use library::Library;
use media::{ImageCache, Message, BACKGROUND_BLACK};
use pacing::{Debounce, ScrollMetrics, ScrollTrigger, SEARCH_DEBOUNCE};
use player::PlayerModal;
use settings::{AppSettings, SetupPage};
use tmdb::TmdbClient;

pub struct Catalogz {
    pub setup_page: Option<SetupPage>,
    pub tmdb_client: Option<TmdbClient>,
    pub controller: ViewController,
    pub library: Library,
    pub modal: PlayerModal,
    pub image_cache: ImageCache,
    pub search_query: String,
    pub search_debounce: Debounce,
    pub scroll_trigger: ScrollTrigger,
    pub scroll: ScrollMetrics,
    pub show_back_to_top: bool,
    pub modal_error: Option<String>,
}

impl Default for Catalogz {
    fn default() -> Self {
        Self {
            setup_page: None,
            tmdb_client: None,
            controller: ViewController::new(),
            library: Library::open_default(),
            modal: PlayerModal::new(),
            image_cache: ImageCache::new(),
            search_query: String::new(),
            search_debounce: Debounce::new(SEARCH_DEBOUNCE),
            scroll_trigger: ScrollTrigger::default(),
            scroll: ScrollMetrics::default(),
            show_back_to_top: false,
            modal_error: None,
        }
    }
}

impl Catalogz {
    fn new() -> (Self, Task<Message>) {
        let settings = match AppSettings::load() {
            Some(s) if s.is_valid() => s,
            _ => {
                tracing::info!("no API key configured, showing setup");
                return (
                    Self {
                        setup_page: Some(SetupPage::default()),
                        ..Default::default()
                    },
                    Task::none(),
                );
            }
        };

        let mut app = Self::default();
        let task = app.initialize_with_settings(settings);
        (app, task)
    }

    fn initialize_with_settings(&mut self, settings: AppSettings) -> Task<Message> {
        self.tmdb_client = Some(TmdbClient::from_settings(&settings));
        self.setup_page = None;
        tracing::info!(language = %settings.language, "catalog client ready");

        let recent: Vec<_> = self
            .library
            .recently_viewed()
            .iter()
            .map(|entry| entry.to_item())
            .collect();
        Task::batch([
            handlers::refresh_view(self),
            handlers::load_posters(self, &recent),
        ])
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        if let Message::Setup(setup_msg) = message {
            if let Some(ref mut setup) = self.setup_page {
                if let Some(settings) = setup.update(setup_msg) {
                    return self.initialize_with_settings(settings);
                }
            }
            return Task::none();
        }
        handlers::handle_message(self, message)
    }

    fn view(&self) -> Element<'_, Message> {
        if let Some(ref setup) = self.setup_page {
            return setup.view().map(Message::Setup);
        }

        let main_content = container(self.view_main_content())
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(BACKGROUND_BLACK)),
                ..Default::default()
            });

        if self.modal.is_open() {
            let popup_overlay = self.view_detail_popup_overlay();
            return iced::widget::stack![main_content, popup_overlay]
                .width(Length::Fill)
                .height(Length::Fill)
                .into();
        }

        main_content.into()
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.search_debounce.is_pending() {
            return iced::time::every(std::time::Duration::from_millis(50))
                .map(|_| Message::SearchDebounceTriggered);
        }
        Subscription::none()
    }
}

fn main() -> iced::Result {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("catalogz=info")),
        )
        .try_init();

    iced::application(Catalogz::new, Catalogz::update, Catalogz::view)
        .title("Catalogz")
        .theme(Catalogz::theme)
        .window_size(Size::new(1280.0, 800.0))
        .font(iced_fonts::BOOTSTRAP_FONT_BYTES)
        .default_font(Font::DEFAULT)
        .subscription(Catalogz::subscription)
        .run()
}
