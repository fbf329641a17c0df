use iced::widget::{button, column, container, row, scrollable, text, Column, Row, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::components::{hidden_scrollbar_style, icon};
use crate::media::{Message, Mode, ACCENT_RED, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE};
use crate::render::ViewModel;
use crate::Catalogz;

const ICON_FILM: char = '\u{F3A9}';
const ICON_HEART: char = '\u{F417}';
const ICON_HEART_FILL: char = '\u{F415}';
const ICON_STAR_FILL: char = '\u{F586}';

const CARD_WIDTH: f32 = 160.0;
const CARD_HEIGHT: f32 = 240.0;
const RECENT_WIDTH: f32 = 100.0;
const RECENT_HEIGHT: f32 = 150.0;
const GRID_COLUMNS: usize = 6;

impl Catalogz {
    /// View models for the grid. While favorites are still resolving, their keys
    /// stand in as placeholders.
    fn grid_models(&self) -> Vec<ViewModel> {
        let state = self.controller.state();
        if state.mode == Mode::Favorites && state.is_loading {
            return self
                .library
                .favorites()
                .iter()
                .map(|key| ViewModel::favorite_placeholder(*key))
                .collect();
        }
        state.items.iter().map(ViewModel::from_item).collect()
    }

    pub fn view_card_grid(&self) -> Element<'_, Message> {
        let models = self.grid_models();
        let rows: Vec<Element<Message>> = models
            .chunks(GRID_COLUMNS)
            .map(|chunk| {
                let cards: Vec<Element<Message>> =
                    chunk.iter().map(|model| self.view_grid_card(model)).collect();
                Row::with_children(cards)
                    .spacing(16)
                    .align_y(iced::Alignment::Start)
                    .into()
            })
            .collect();

        Column::with_children(rows)
            .spacing(24)
            .width(Length::Fill)
            .into()
    }

    fn view_grid_card(&self, model: &ViewModel) -> Element<'_, Message> {
        let key = model.key;
        let poster = self.view_card_poster(model, CARD_WIDTH, CARD_HEIGHT);

        let favorite = container(self.view_favorite_toggle(model))
            .width(Length::Fill)
            .align_x(iced::alignment::Horizontal::Right)
            .padding(6);

        let badge = container(
            container(text(model.type_label()).size(11).color(TEXT_WHITE))
                .padding(Padding::new(2.0).left(6.0).right(6.0))
                .style(|_theme| container::Style {
                    background: Some(iced::Background::Color(Color::from_rgba(
                        0.0, 0.0, 0.0, 0.7,
                    ))),
                    border: Border {
                        radius: 4.0.into(),
                        ..Default::default()
                    },
                    ..Default::default()
                }),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .align_y(iced::alignment::Vertical::Bottom)
        .padding(6);

        let poster_stack = container(iced::widget::stack![poster, badge, favorite])
            .width(Length::Fixed(CARD_WIDTH))
            .height(Length::Fixed(CARD_HEIGHT))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                border: Border {
                    color: Color::TRANSPARENT,
                    width: 0.0,
                    radius: 8.0.into(),
                },
                shadow: Shadow {
                    color: Color::from_rgba(0.0, 0.0, 0.0, 0.3),
                    offset: iced::Vector::new(0.0, 4.0),
                    blur_radius: 8.0,
                },
                ..Default::default()
            });

        let title = text(model.title.clone())
            .size(14)
            .color(TEXT_WHITE)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..Default::default()
            })
            .wrapping(text::Wrapping::Word);

        let mut meta = row![text(model.year.clone()).size(12).color(TEXT_GRAY)]
            .spacing(8)
            .align_y(iced::Alignment::Center);
        if let Some(rating) = model.rating {
            meta = meta.push(
                row![
                    icon(ICON_STAR_FILL).size(10).color(ACCENT_RED),
                    text(format!("{:.1}", rating)).size(12).color(TEXT_GRAY)
                ]
                .spacing(4)
                .align_y(iced::Alignment::Center),
            );
        }

        let card = column![
            iced::widget::mouse_area(poster_stack).on_press(Message::OpenItem(key)),
            title,
            meta
        ]
        .spacing(6)
        .width(Length::Fixed(CARD_WIDTH));

        card.into()
    }

    fn view_favorite_toggle(&self, model: &ViewModel) -> Element<'_, Message> {
        let is_favorite = self.library.is_favorite(model.key);
        let glyph = if is_favorite {
            ICON_HEART_FILL
        } else {
            ICON_HEART
        };
        let color = if is_favorite { ACCENT_RED } else { TEXT_WHITE };

        button(
            container(icon(glyph).size(14).color(color))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill),
        )
        .width(Length::Fixed(30.0))
        .height(Length::Fixed(30.0))
        .padding(0)
        .style(|_theme, status| {
            let bg_color = match status {
                button::Status::Hovered => Color::from_rgba(1.0, 1.0, 1.0, 0.25),
                _ => Color::from_rgba(0.0, 0.0, 0.0, 0.5),
            };
            button::Style {
                background: Some(iced::Background::Color(bg_color)),
                text_color: TEXT_WHITE,
                border: Border {
                    color: Color::from_rgba(1.0, 1.0, 1.0, 0.3),
                    width: 1.0,
                    radius: 15.0.into(),
                },
                shadow: Shadow::default(),
                snap: false,
            }
        })
        .on_press(Message::ToggleFavorite(model.key))
        .into()
    }

    pub fn view_recently_viewed(&self) -> Element<'_, Message> {
        let entries = self.library.recently_viewed();
        if entries.is_empty() {
            return Space::new().height(0).into();
        }

        let cards: Vec<Element<Message>> = entries
            .iter()
            .map(ViewModel::from_recent)
            .map(|model| {
                let key = model.key;
                let poster = container(self.view_card_poster(&model, RECENT_WIDTH, RECENT_HEIGHT))
                    .width(Length::Fixed(RECENT_WIDTH))
                    .height(Length::Fixed(RECENT_HEIGHT))
                    .style(|_theme| container::Style {
                        border: Border {
                            radius: 6.0.into(),
                            ..Default::default()
                        },
                        ..Default::default()
                    });
                let caption = text(model.title.clone())
                    .size(11)
                    .color(TEXT_GRAY)
                    .wrapping(text::Wrapping::Word);
                iced::widget::mouse_area(
                    column![poster, caption]
                        .spacing(4)
                        .width(Length::Fixed(RECENT_WIDTH)),
                )
                .on_press(Message::OpenItem(key))
                .into()
            })
            .collect();

        let section_title = text("Recently Viewed")
            .size(20)
            .color(TEXT_WHITE)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..Default::default()
            });

        let cards_row = scrollable(Row::with_children(cards).spacing(12))
            .direction(scrollable::Direction::Horizontal(
                scrollable::Scrollbar::new().width(0).scroller_width(0),
            ))
            .width(Length::Fill)
            .style(hidden_scrollbar_style);

        column![section_title, cards_row]
            .spacing(12)
            .width(Length::Fill)
            .into()
    }

    pub fn view_card_poster(
        &self,
        model: &ViewModel,
        width: f32,
        height: f32,
    ) -> Element<'_, Message> {
        let handle = model.poster.url().and_then(|url| self.image_cache.get(url));

        match handle {
            Some(h) => iced::widget::image(h.clone())
                .width(Length::Fixed(width))
                .height(Length::Fixed(height))
                .content_fit(iced::ContentFit::Cover)
                .into(),
            None => self.view_card_placeholder(width, height),
        }
    }

    pub fn view_card_placeholder(&self, width: f32, height: f32) -> Element<'_, Message> {
        container(icon(ICON_FILM).size(width * 0.3).color(TEXT_GRAY))
            .width(Length::Fixed(width))
            .height(Length::Fixed(height))
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                ..Default::default()
            })
            .into()
    }
}
