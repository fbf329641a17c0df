use iced::widget::{button, column, container, pick_list, row, scrollable, text, Column, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::components::{hidden_scrollbar_style, icon, primary_button_style};
use crate::media::{CatalogItem, MediaType, Message, ACCENT_RED, TEXT_GRAY, TEXT_WHITE};
use crate::player::{ModalState, Server};
use crate::render::ViewModel;
use crate::Catalogz;

const POPUP_WIDTH: f32 = 920.0;
const POSTER_WIDTH: f32 = 220.0;
const POSTER_HEIGHT: f32 = 330.0;

const ICON_X_LG: char = '\u{F659}';
pub const ICON_PLAY_FILL: char = '\u{F4F4}';
const ICON_SKIP_FORWARD: char = '\u{F552}';
const ICON_HEART: char = '\u{F417}';
const ICON_HEART_FILL: char = '\u{F415}';
const ICON_BOX_ARROW_UP_RIGHT: char = '\u{F1C5}';
const ICON_EXCLAMATION: char = '\u{F33B}';

pub fn format_full_date(date_str: &str) -> String {
    let parts: Vec<&str> = date_str.split('-').collect();
    if parts.len() != 3 || date_str.len() < 10 {
        return date_str.to_string();
    }
    format!("{}/{}/{}", parts[1], parts[2], parts[0])
}

pub fn format_episode_number(season: u32, episode: u32) -> String {
    format!("S{} E{}", season, episode)
}

fn overview_text(item: &CatalogItem) -> String {
    if item.overview.is_empty() {
        String::from("No overview available.")
    } else {
        item.overview.clone()
    }
}

fn popup_container_style(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(iced::Background::Color(Color::from_rgb(
            0.078, 0.078, 0.078,
        ))),
        border: Border {
            color: Color::TRANSPARENT,
            width: 0.0,
            radius: 16.0.into(),
        },
        shadow: Shadow {
            color: Color::from_rgba(0.0, 0.0, 0.0, 0.5),
            offset: iced::Vector::new(0.0, 25.0),
            blur_radius: 50.0,
        },
        ..Default::default()
    }
}

fn secondary_button_style(_theme: &iced::Theme, status: button::Status) -> button::Style {
    let alpha = if matches!(status, button::Status::Hovered) {
        0.3
    } else {
        0.2
    };
    button::Style {
        background: Some(iced::Background::Color(Color::from_rgba(
            1.0, 1.0, 1.0, alpha,
        ))),
        text_color: TEXT_WHITE,
        border: Border {
            radius: 4.0.into(),
            ..Default::default()
        },
        shadow: Shadow::default(),
        snap: false,
    }
}

fn icon_label<'a>(glyph: char, glyph_color: Color, label: String) -> Element<'a, Message> {
    row![
        icon(glyph).size(16).color(glyph_color),
        text(label).size(15).font(iced::Font {
            weight: iced::font::Weight::Bold,
            ..Default::default()
        })
    ]
    .spacing(8)
    .align_y(iced::Alignment::Center)
    .into()
}

impl Catalogz {
    pub fn view_detail_popup_overlay(&self) -> Element<'_, Message> {
        let Some(item) = self.modal.item() else {
            return Space::new().width(0).height(0).into();
        };

        let popup_with_close = iced::widget::stack![
            self.view_detail_popup_content(item),
            self.view_detail_close_button()
        ]
        .width(Length::Fixed(POPUP_WIDTH))
        .height(Length::Fill);

        let popup = container(popup_with_close)
            .max_width(POPUP_WIDTH)
            .clip(true)
            .style(popup_container_style);

        // Swallows presses so clicks inside the panel don't reach the backdrop.
        let popup_mouse_area = iced::widget::mouse_area(popup);

        let overlay_bg = iced::widget::mouse_area(
            container(Space::new().width(Length::Fill).height(Length::Fill))
                .width(Length::Fill)
                .height(Length::Fill)
                .style(|_theme| container::Style {
                    background: Some(iced::Background::Color(Color::from_rgba(
                        0.0, 0.0, 0.0, 0.85,
                    ))),
                    ..Default::default()
                }),
        )
        .on_press(Message::CloseModal);

        let centered_popup = container(popup_mouse_area)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .padding(Padding::new(40.0));

        iced::widget::stack![overlay_bg, centered_popup]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn view_detail_close_button(&self) -> Element<'_, Message> {
        let btn = button(
            container(icon(ICON_X_LG).size(20).color(TEXT_WHITE))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill),
        )
        .width(Length::Fixed(36.0))
        .height(Length::Fixed(36.0))
        .padding(0)
        .style(|_theme, status| {
            let alpha = if matches!(status, button::Status::Hovered) {
                0.8
            } else {
                0.6
            };
            button::Style {
                background: Some(iced::Background::Color(Color::from_rgba(
                    0.0, 0.0, 0.0, alpha,
                ))),
                text_color: TEXT_WHITE,
                border: Border {
                    radius: 18.0.into(),
                    ..Default::default()
                },
                shadow: Shadow::default(),
                snap: false,
            }
        })
        .on_press(Message::CloseModal);

        container(btn)
            .width(Length::Fill)
            .align_x(iced::alignment::Horizontal::Right)
            .padding(Padding::new(20.0))
            .into()
    }

    fn view_detail_popup_content(&self, item: &CatalogItem) -> Element<'_, Message> {
        let mut sections: Vec<Element<Message>> = vec![self.view_detail_summary(item)];
        sections.push(self.view_detail_player_bar());

        if let ModalState::Tv(session) = self.modal.state() {
            sections.push(self.view_detail_seasons_section(session));
        }

        scrollable(Column::with_children(sections).width(Length::Fill))
            .direction(scrollable::Direction::Vertical(
                scrollable::Scrollbar::new().width(0).scroller_width(0),
            ))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(hidden_scrollbar_style)
            .into()
    }

    fn view_detail_summary(&self, item: &CatalogItem) -> Element<'_, Message> {
        let model = ViewModel::from_item(item);
        let poster = container(self.view_card_poster(&model, POSTER_WIDTH, POSTER_HEIGHT))
            .style(|_theme| container::Style {
                border: Border {
                    radius: 8.0.into(),
                    ..Default::default()
                },
                ..Default::default()
            })
            .clip(true);

        let title = text(item.title.clone())
            .size(32)
            .color(TEXT_WHITE)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..Default::default()
            })
            .wrapping(text::Wrapping::Word);

        let mut meta = row![
            text(model.year.clone()).size(14).color(TEXT_GRAY),
            text(model.type_label()).size(14).color(TEXT_GRAY)
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center);
        if let Some(rating) = model.rating {
            meta = meta.push(text(format!("{:.1}★", rating)).size(14).color(ACCENT_RED));
        }

        let info = column![
            title,
            meta,
            text(overview_text(item))
                .size(15)
                .color(TEXT_WHITE)
                .wrapping(text::Wrapping::Word),
            self.view_detail_buttons(item)
        ]
        .spacing(16)
        .width(Length::Fill);

        row![poster, info]
            .spacing(32)
            .padding(Padding::new(32.0).top(72.0))
            .width(Length::Fill)
            .into()
    }

    fn view_detail_buttons(&self, item: &CatalogItem) -> Element<'_, Message> {
        let key = item.key();
        let mut buttons = row![].spacing(12).align_y(iced::Alignment::Center);

        if item.media_type == MediaType::Movie || self.modal.source().is_some() {
            let label = if item.media_type == MediaType::Movie {
                "Watch Now"
            } else {
                "Resume"
            };
            buttons = buttons.push(
                button(icon_label(ICON_PLAY_FILL, TEXT_WHITE, String::from(label)))
                    .padding(Padding::new(10.0).left(24.0).right(24.0))
                    .style(primary_button_style)
                    .on_press(Message::WatchNow),
            );
        }

        let is_favorite = self.library.is_favorite(key);
        let (glyph, color, label) = if is_favorite {
            (ICON_HEART_FILL, ACCENT_RED, "In Favorites")
        } else {
            (ICON_HEART, TEXT_WHITE, "Add to Favorites")
        };
        buttons = buttons.push(
            button(icon_label(glyph, color, String::from(label)))
                .padding(Padding::new(10.0).left(20.0).right(20.0))
                .style(secondary_button_style)
                .on_press(Message::ToggleFavorite(key)),
        );

        buttons = buttons.push(
            button(icon_label(
                ICON_BOX_ARROW_UP_RIGHT,
                TEXT_WHITE,
                String::from("View on TMDB"),
            ))
            .padding(Padding::new(10.0).left(20.0).right(20.0))
            .style(secondary_button_style)
            .on_press(Message::OpenTmdbPage(key)),
        );

        buttons.into()
    }

    /// Server choice, the current embed address and the next-episode shortcut.
    fn view_detail_player_bar(&self) -> Element<'_, Message> {
        let server_picker = pick_list(Server::ALL.to_vec(), Some(self.modal.server()), |server| {
            Message::ChangeServer(server)
        })
        .text_size(14)
        .padding(Padding::new(8.0).left(12.0).right(12.0))
        .style(|_, _| pick_list::Style {
            text_color: TEXT_WHITE,
            placeholder_color: TEXT_GRAY,
            handle_color: TEXT_WHITE,
            background: iced::Background::Color(Color::from_rgba(1.0, 1.0, 1.0, 0.1)),
            border: Border {
                color: Color::from_rgba(1.0, 1.0, 1.0, 0.2),
                width: 1.0,
                radius: 4.0.into(),
            },
        });

        let mut controls = row![
            text("Server").size(14).color(TEXT_GRAY),
            server_picker,
            Space::new().width(Length::Fill)
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center);

        if let Some(next) = self.modal.next_episode() {
            controls = controls.push(
                button(icon_label(
                    ICON_SKIP_FORWARD,
                    TEXT_WHITE,
                    format!("Next: {}", format_episode_number(next.season, next.episode)),
                ))
                .padding(Padding::new(8.0).left(16.0).right(16.0))
                .style(primary_button_style)
                .on_press(Message::PlayNextEpisode),
            );
        }

        let source: Element<Message> = match self.modal.source() {
            Some(url) => text(format!("Now playing: {}", url))
                .size(12)
                .color(TEXT_GRAY)
                .into(),
            None => text("Pick an episode to start watching.")
                .size(12)
                .color(TEXT_GRAY)
                .into(),
        };

        let mut body = column![controls, source].spacing(10);
        if let Some(error) = &self.modal_error {
            body = body.push(
                row![
                    icon(ICON_EXCLAMATION).size(14).color(ACCENT_RED),
                    text(error.clone()).size(13).color(ACCENT_RED)
                ]
                .spacing(8)
                .align_y(iced::Alignment::Center),
            );
        }

        container(body)
            .width(Length::Fill)
            .padding(Padding::new(16.0).left(32.0).right(32.0))
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_dates_read_month_first() {
        assert_eq!(format_full_date("2021-09-17"), "09/17/2021");
        assert_eq!(format_full_date("2021"), "2021");
    }

    #[test]
    fn missing_overview_gets_a_stand_in() {
        let mut item = crate::tmdb::testing::movie(7);
        item.overview.clear();
        assert_eq!(overview_text(&item), "No overview available.");
        item.overview = String::from("A heist in orbit.");
        assert_eq!(overview_text(&item), "A heist in orbit.");
    }

    #[test]
    fn episode_numbers_are_compact() {
        assert_eq!(format_episode_number(2, 1), "S2 E1");
    }
}
