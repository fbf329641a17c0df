use std::path::PathBuf;

use iced::widget::{button, column, container, row, text, text_input, Space};
use iced::{Alignment, Element, Length};
use serde::{Deserialize, Serialize};

use crate::media::{ACCENT_RED, BACKGROUND_BLACK, TEXT_GRAY, TEXT_WHITE};

/// Overrides the stored API key when set.
pub const API_KEY_ENV: &str = "CATALOGZ_API_KEY";
const DEFAULT_LANGUAGE: &str = "en-US";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("could not determine a config directory")]
    NoConfigDir,
    #[error("could not write settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode settings: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    pub api_key: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    String::from(DEFAULT_LANGUAGE)
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: default_language(),
        }
    }
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "catalogz")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    fn load_from_file() -> Option<Self> {
        let path = Self::config_path()?;
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring unreadable settings: {}", e);
                None
            }
        }
    }

    /// Stored settings with the environment override applied.
    pub fn load() -> Option<Self> {
        let stored = Self::load_from_file();
        Self::apply_env(stored, std::env::var(API_KEY_ENV).ok())
    }

    fn apply_env(stored: Option<Self>, env_key: Option<String>) -> Option<Self> {
        match env_key.filter(|key| !key.trim().is_empty()) {
            Some(key) => {
                tracing::debug!("using API key from {}", API_KEY_ENV);
                Some(Self {
                    api_key: key.trim().to_string(),
                    ..stored.unwrap_or_default()
                })
            }
            None => stored,
        }
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        tracing::info!(path = %path.display(), "settings saved");
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum SetupMessage {
    ApiKeyChanged(String),
    LanguageChanged(String),
    Submit,
}

pub struct SetupPage {
    pub api_key: String,
    pub language: String,
    pub error: Option<String>,
}

impl Default for SetupPage {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: default_language(),
            error: None,
        }
    }
}

impl SetupPage {
    fn settings(&self) -> Result<AppSettings, String> {
        if self.api_key.trim().is_empty() {
            return Err(String::from("API key is required"));
        }
        Ok(AppSettings {
            api_key: self.api_key.trim().to_string(),
            language: if self.language.trim().is_empty() {
                default_language()
            } else {
                self.language.trim().to_string()
            },
        })
    }

    pub fn update(&mut self, message: SetupMessage) -> Option<AppSettings> {
        match message {
            SetupMessage::ApiKeyChanged(key) => {
                self.api_key = key;
                self.error = None;
                None
            }
            SetupMessage::LanguageChanged(lang) => {
                self.language = lang;
                None
            }
            SetupMessage::Submit => {
                let settings = match self.settings() {
                    Ok(settings) => settings,
                    Err(e) => {
                        self.error = Some(e);
                        return None;
                    }
                };
                if let Err(e) = settings.save() {
                    self.error = Some(format!("Failed to save: {}", e));
                    return None;
                }
                Some(settings)
            }
        }
    }

    pub fn view(&self) -> Element<'_, SetupMessage> {
        let logo = text("CATALOGZ")
            .size(48)
            .color(ACCENT_RED)
            .font(iced::Font::with_name("sans-serif"));

        let title = text("Welcome to Catalogz").size(28).color(TEXT_WHITE);
        let subtitle = text("Add your TMDB API key to start browsing")
            .size(14)
            .color(TEXT_GRAY);

        let api_label = text("TMDB API Key").size(14).color(TEXT_WHITE);
        let api_hint = text(format!(
            "Get a free key at themoviedb.org/settings/api, or set {}",
            API_KEY_ENV
        ))
        .size(12)
        .color(TEXT_GRAY);
        let api_input = text_input("Enter your TMDB API key...", &self.api_key)
            .on_input(SetupMessage::ApiKeyChanged)
            .on_submit(SetupMessage::Submit)
            .padding(12)
            .size(14)
            .width(Length::Fill);

        let lang_label = text("Language").size(14).color(TEXT_WHITE);
        let lang_hint = text("Examples: en-US, fil-PH, ja-JP")
            .size(12)
            .color(TEXT_GRAY);
        let lang_input = text_input(DEFAULT_LANGUAGE, &self.language)
            .on_input(SetupMessage::LanguageChanged)
            .on_submit(SetupMessage::Submit)
            .padding(12)
            .size(14)
            .width(Length::Fill);

        let submit_button = button(text("Start Browsing").size(16).color(TEXT_WHITE))
            .padding([12, 32])
            .style(|_theme, status| {
                let bg = match status {
                    button::Status::Hovered => iced::Color::from_rgb(0.7, 0.02, 0.06),
                    _ => ACCENT_RED,
                };
                button::Style {
                    background: Some(iced::Background::Color(bg)),
                    text_color: TEXT_WHITE,
                    border: iced::Border::default().rounded(4),
                    ..Default::default()
                }
            })
            .on_press(SetupMessage::Submit);

        let error_text = match &self.error {
            Some(err) => text(err).size(14).color(ACCENT_RED),
            None => text("").size(14),
        };

        let spacer = || Space::new().height(16);
        let small_spacer = || Space::new().height(4);

        let form = column![
            logo,
            spacer(),
            title,
            small_spacer(),
            subtitle,
            spacer(),
            spacer(),
            api_label,
            small_spacer(),
            api_hint,
            small_spacer(),
            api_input,
            spacer(),
            lang_label,
            small_spacer(),
            lang_hint,
            small_spacer(),
            lang_input,
            spacer(),
            error_text,
            small_spacer(),
            row![submit_button].width(Length::Fill),
        ]
        .width(Length::Fixed(400.0))
        .align_x(Alignment::Start);

        container(form)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(BACKGROUND_BLACK)),
                ..Default::default()
            })
            .into()
    }
}
