use iced::widget::{button, column, container, row, text, Column, Row, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::components::icon;
use crate::detail_popup::{format_episode_number, format_full_date, ICON_PLAY_FILL};
use crate::media::{Episode, Message, SeasonSummary, ACCENT_RED, TEXT_GRAY, TEXT_WHITE};
use crate::player::{EpisodeRef, TvSession};
use crate::Catalogz;

fn rounded_style(radius: f32, bg: Option<Color>) -> container::Style {
    container::Style {
        background: bg.map(iced::Background::Color),
        border: Border {
            radius: radius.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn season_pill_style(is_active: bool) -> impl Fn(&iced::Theme, button::Status) -> button::Style {
    move |_theme, status| {
        let alpha = if is_active {
            0.3
        } else if matches!(status, button::Status::Hovered) {
            0.15
        } else {
            0.1
        };
        button::Style {
            background: Some(iced::Background::Color(Color::from_rgba(
                1.0, 1.0, 1.0, alpha,
            ))),
            text_color: TEXT_WHITE,
            border: Border {
                color: if is_active {
                    ACCENT_RED
                } else {
                    Color::TRANSPARENT
                },
                width: if is_active { 1.0 } else { 0.0 },
                radius: 4.0.into(),
            },
            shadow: Shadow::default(),
            snap: false,
        }
    }
}

fn episode_row_style(is_playing: bool) -> impl Fn(&iced::Theme, button::Status) -> button::Style {
    move |_theme, status| {
        let alpha = match (is_playing, status) {
            (true, _) => 0.12,
            (false, button::Status::Hovered) => 0.08,
            _ => 0.03,
        };
        button::Style {
            background: Some(iced::Background::Color(Color::from_rgba(
                1.0, 1.0, 1.0, alpha,
            ))),
            text_color: TEXT_WHITE,
            border: Border {
                color: if is_playing {
                    ACCENT_RED
                } else {
                    Color::TRANSPARENT
                },
                width: if is_playing { 1.0 } else { 0.0 },
                radius: 6.0.into(),
            },
            shadow: Shadow::default(),
            snap: false,
        }
    }
}

impl Catalogz {
    fn bold_text(s: impl ToString, size: u16, color: Color) -> iced::widget::Text<'static> {
        text(s.to_string())
            .size(size as u32)
            .color(color)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..Default::default()
            })
    }

    pub fn view_detail_seasons_section(&self, session: &TvSession) -> Element<'_, Message> {
        let header = Self::bold_text("Seasons", 18, TEXT_WHITE);

        let body: Element<Message> = if session.seasons.is_empty() {
            container(text("Loading seasons...").size(14).color(TEXT_GRAY))
                .padding(16.0)
                .into()
        } else {
            let pills: Vec<Element<Message>> = session
                .seasons
                .summaries()
                .map(|summary| Self::view_season_pill(summary, session.expanded))
                .collect();
            let mut body = column![Row::with_children(pills).spacing(8).wrap()].spacing(20);
            if let Some(season) = session.expanded {
                body = body.push(self.view_detail_episode_list(session, season));
            }
            body.into()
        };

        container(column![header, body].spacing(20).width(Length::Fill))
            .width(Length::Fill)
            .padding(Padding::new(32.0))
            .style(|_| rounded_style(0.0, Some(Color::from_rgba(1.0, 1.0, 1.0, 0.03))))
            .into()
    }

    fn view_season_pill(summary: &SeasonSummary, expanded: Option<u32>) -> Element<'static, Message> {
        let is_active = expanded == Some(summary.season_number);
        let label = column![
            text(summary.name.clone()).size(14).color(TEXT_WHITE),
            text(format!("{} episodes", summary.episode_count))
                .size(11)
                .color(TEXT_GRAY)
        ]
        .spacing(2);

        button(label)
            .padding(Padding::new(8.0).left(16.0).right(16.0))
            .style(season_pill_style(is_active))
            .on_press(Message::ExpandSeason(summary.season_number))
            .into()
    }

    fn view_detail_episode_list(&self, session: &TvSession, season: u32) -> Element<'_, Message> {
        let Some(episodes) = session.seasons.episodes(season) else {
            return container(text("Loading episodes...").size(14).color(TEXT_GRAY))
                .padding(16.0)
                .into();
        };
        if episodes.is_empty() {
            return container(text("No episodes available").size(14).color(TEXT_GRAY))
                .padding(16.0)
                .into();
        }

        let rows: Vec<Element<Message>> = episodes
            .iter()
            .map(|episode| {
                let is_playing = session.selected
                    == Some(EpisodeRef {
                        season: episode.season_number,
                        episode: episode.episode_number,
                    });
                Self::view_detail_episode_row(episode, is_playing)
            })
            .collect();

        Column::with_children(rows).spacing(8).into()
    }

    fn view_detail_episode_row(episode: &Episode, is_playing: bool) -> Element<'static, Message> {
        let number = container(Self::bold_text(
            format_episode_number(episode.season_number, episode.episode_number),
            13,
            if is_playing { ACCENT_RED } else { TEXT_WHITE },
        ))
        .width(Length::Fixed(64.0));

        let air_date = episode
            .air_date
            .as_ref()
            .map(|d| format_full_date(d))
            .unwrap_or_default();

        let mut details = column![row![
            text(episode.name.clone())
                .size(14)
                .color(TEXT_WHITE)
                .wrapping(text::Wrapping::Word),
            Space::new().width(Length::Fill),
            text(air_date).size(12).color(TEXT_GRAY)
        ]
        .spacing(8)]
        .spacing(4)
        .width(Length::Fill);
        if !episode.overview.is_empty() {
            details = details.push(
                text(episode.overview.clone())
                    .size(12)
                    .color(TEXT_GRAY)
                    .wrapping(text::Wrapping::Word),
            );
        }

        let play = icon(ICON_PLAY_FILL)
            .size(18)
            .color(if is_playing { ACCENT_RED } else { TEXT_WHITE });

        button(
            row![number, details, play]
                .spacing(16)
                .align_y(iced::Alignment::Center),
        )
        .width(Length::Fill)
        .padding(Padding::new(12.0))
        .style(episode_row_style(is_playing))
        .on_press(Message::PlayEpisode(
            episode.season_number,
            episode.episode_number,
        ))
        .into()
    }
}
