use iced::widget::{button, column, container, row, scrollable, text, text_input, Row, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::controller::LoadStatus;
use crate::media::{Message, Mode, ACCENT_RED, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE};
use crate::pacing::ScrollMetrics;
use crate::Catalogz;

pub const MAIN_SCROLL_ID: &str = "main-grid";

const ICON_SEARCH: char = '\u{F52A}';
const ICON_X_LG: char = '\u{F659}';
const ICON_ARROW_UP: char = '\u{F148}';

pub fn icon(icon_char: char) -> iced::widget::Text<'static> {
    text(icon_char.to_string()).font(iced::Font {
        family: iced::font::Family::Name("bootstrap-icons"),
        ..Default::default()
    })
}

pub fn hidden_scrollbar_style(
    _theme: &iced::Theme,
    _status: scrollable::Status,
) -> scrollable::Style {
    scrollable::Style {
        container: container::Style::default(),
        vertical_rail: scrollable::Rail {
            background: None,
            border: Border::default(),
            scroller: scrollable::Scroller {
                background: iced::Background::Color(Color::TRANSPARENT),
                border: Border::default(),
            },
        },
        horizontal_rail: scrollable::Rail {
            background: None,
            border: Border::default(),
            scroller: scrollable::Scroller {
                background: iced::Background::Color(Color::TRANSPARENT),
                border: Border::default(),
            },
        },
        gap: None,
        auto_scroll: scrollable::AutoScroll {
            background: iced::Background::Color(Color::TRANSPARENT),
            border: Border::default(),
            shadow: Shadow::default(),
            icon: Color::TRANSPARENT,
        },
    }
}

pub fn primary_button_style(_theme: &iced::Theme, status: button::Status) -> button::Style {
    let bg = match status {
        button::Status::Hovered => Color::from_rgb(0.7, 0.02, 0.06),
        _ => ACCENT_RED,
    };
    button::Style {
        background: Some(iced::Background::Color(bg)),
        text_color: TEXT_WHITE,
        border: Border {
            color: Color::TRANSPARENT,
            width: 0.0,
            radius: 4.0.into(),
        },
        shadow: Shadow::default(),
        snap: false,
    }
}

impl Catalogz {
    pub fn view_header(&self) -> Element<'_, Message> {
        let left_section = row![self.view_logo(), self.view_navigation()]
            .spacing(32)
            .align_y(iced::Alignment::Center);

        let header_content = row![
            left_section,
            Space::new().width(Length::Fill),
            self.view_search_bar()
        ]
        .padding(Padding::new(16.0).left(48.0).right(48.0))
        .align_y(iced::Alignment::Center);

        let is_scrolled = self.scroll.offset > 0.0;

        container(header_content)
            .width(Length::Fill)
            .height(Length::Fixed(80.0))
            .style(move |_theme| container::Style {
                background: Some(iced::Background::Color(Color::from_rgba(
                    0.0,
                    0.0,
                    0.0,
                    if is_scrolled { 0.85 } else { 0.5 },
                ))),
                ..Default::default()
            })
            .into()
    }

    fn view_logo(&self) -> Element<'_, Message> {
        text("Catalogz")
            .size(28)
            .color(ACCENT_RED)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..Default::default()
            })
            .into()
    }

    fn view_navigation(&self) -> Element<'_, Message> {
        let nav_buttons: Vec<Element<Message>> = Mode::NAVIGATION
            .into_iter()
            .map(|mode| self.view_nav_button(mode))
            .collect();

        Row::with_children(nav_buttons)
            .spacing(16)
            .align_y(iced::Alignment::Center)
            .into()
    }

    fn view_nav_button(&self, mode: Mode) -> Element<'_, Message> {
        let is_active = self.controller.state().mode == mode;
        let text_color = if is_active { TEXT_WHITE } else { TEXT_GRAY };
        let label = text(mode.label())
            .size(14)
            .color(text_color)
            .shaping(text::Shaping::Advanced);

        let button_content: Element<Message> = if is_active {
            let underline = container(Space::new().width(Length::Fill).height(2)).style(|_theme| {
                container::Style {
                    background: Some(iced::Background::Color(ACCENT_RED)),
                    ..Default::default()
                }
            });
            column![label, underline]
                .spacing(4)
                .align_x(iced::Alignment::Center)
                .into()
        } else {
            label.into()
        };

        button(button_content)
            .padding(Padding::new(8.0).left(12.0).right(12.0))
            .style(move |_theme, status| {
                let final_color = match status {
                    button::Status::Hovered => TEXT_WHITE,
                    _ if is_active => TEXT_WHITE,
                    _ => TEXT_GRAY,
                };
                button::Style {
                    background: Some(iced::Background::Color(Color::TRANSPARENT)),
                    text_color: final_color,
                    border: Border::default(),
                    shadow: Shadow::default(),
                    snap: false,
                }
            })
            .on_press(Message::SwitchMode(mode))
            .into()
    }

    fn view_search_bar(&self) -> Element<'_, Message> {
        let search_icon = icon(ICON_SEARCH).size(14).color(TEXT_GRAY);

        let search_input = text_input("Search movies and shows...", &self.search_query)
            .on_input(Message::SearchQueryChanged)
            .on_submit(Message::SearchSubmit)
            .padding(8)
            .width(Length::Fixed(220.0))
            .style(|_theme, _status| text_input::Style {
                background: iced::Background::Color(Color::TRANSPARENT),
                border: Border::default(),
                icon: TEXT_GRAY,
                placeholder: TEXT_GRAY,
                value: TEXT_WHITE,
                selection: ACCENT_RED,
            });

        let mut search_content = row![search_icon, search_input]
            .spacing(8)
            .align_y(iced::Alignment::Center);

        if !self.search_query.is_empty() {
            let clear = button(icon(ICON_X_LG).size(12).color(TEXT_GRAY))
                .padding(4)
                .style(|_theme, _status| button::Style {
                    background: None,
                    text_color: TEXT_GRAY,
                    border: Border::default(),
                    shadow: Shadow::default(),
                    snap: false,
                })
                .on_press(Message::ClearSearch);
            search_content = search_content.push(clear);
        }

        container(search_content)
            .padding(Padding::new(4.0).left(12.0).right(8.0))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(Color::from_rgba(
                    0.0, 0.0, 0.0, 0.7,
                ))),
                border: Border {
                    color: TEXT_GRAY,
                    width: 1.0,
                    radius: 24.0.into(),
                },
                ..Default::default()
            })
            .into()
    }

    fn view_page_title(&self) -> Element<'_, Message> {
        text(self.controller.title())
            .size(28)
            .color(TEXT_WHITE)
            .font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..Default::default()
            })
            .into()
    }

    pub fn view_main_content(&self) -> Element<'_, Message> {
        let body = column![
            self.view_recently_viewed(),
            self.view_page_title(),
            self.view_filter_panel(),
            self.view_error_banner(),
            self.view_catalog_body(),
            self.view_load_footer(),
        ]
        .spacing(24)
        .padding(Padding::new(100.0).left(48.0).right(48.0).bottom(48.0))
        .width(Length::Fill);

        let grid_scroll = scrollable(body)
            .id(iced::widget::Id::new(MAIN_SCROLL_ID))
            .direction(scrollable::Direction::Vertical(
                scrollable::Scrollbar::new().width(0).scroller_width(0),
            ))
            .on_scroll(|viewport| Message::MainScrolled(ScrollMetrics::from_viewport(&viewport)))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(hidden_scrollbar_style);

        let mut layers: Vec<Element<Message>> = vec![grid_scroll.into(), self.view_header()];
        if self.show_back_to_top && !self.modal.is_open() {
            layers.push(self.view_back_to_top());
        }
        iced::widget::Stack::with_children(layers)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn view_catalog_body(&self) -> Element<'_, Message> {
        let state = self.controller.state();
        match &state.status {
            LoadStatus::Empty => self.view_empty_state(),
            _ if state.items.is_empty() && state.is_loading && state.mode != Mode::Favorites => {
                self.view_skeleton_grid()
            }
            _ => self.view_card_grid(),
        }
    }

    fn view_error_banner(&self) -> Element<'_, Message> {
        let Some(error_message) = self.controller.load_error() else {
            return Space::new().height(0).into();
        };

        let error_text = text(error_message).size(16).color(TEXT_WHITE);
        let retry_button = button(text("Retry").size(14).color(TEXT_WHITE))
            .padding(Padding::new(8.0).left(20.0).right(20.0))
            .style(primary_button_style)
            .on_press(Message::RetryLoad);

        container(
            row![error_text, Space::new().width(Length::Fill), retry_button]
                .spacing(16)
                .align_y(iced::Alignment::Center),
        )
        .width(Length::Fill)
        .padding(16)
        .style(|_theme| container::Style {
            background: Some(iced::Background::Color(Color::from_rgba(
                0.898, 0.035, 0.078, 0.2,
            ))),
            border: Border {
                color: ACCENT_RED,
                width: 1.0,
                radius: 8.0.into(),
            },
            ..Default::default()
        })
        .into()
    }

    fn view_empty_state(&self) -> Element<'_, Message> {
        let (headline, suggestion) = match self.controller.state().mode {
            Mode::Favorites => (
                "No favorites yet",
                "Open any title and add it to your favorites",
            ),
            Mode::Search => ("No results found", "Try a different title or clear the filters"),
            _ => ("Nothing to show", "Try another genre or year"),
        };

        container(
            column![
                text(headline)
                    .size(24)
                    .color(TEXT_GRAY)
                    .font(iced::Font {
                        weight: iced::font::Weight::Medium,
                        ..Default::default()
                    }),
                text(suggestion).size(16).color(TEXT_GRAY),
            ]
            .spacing(12)
            .align_x(iced::Alignment::Center),
        )
        .width(Length::Fill)
        .height(Length::Fixed(300.0))
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
    }

    /// Spinner text while a page is in flight, or a manual trigger when the grid
    /// is too short to scroll.
    fn view_load_footer(&self) -> Element<'_, Message> {
        let state = self.controller.state();
        if state.is_loading && !state.items.is_empty() {
            return container(text("Loading more...").size(14).color(TEXT_GRAY))
                .width(Length::Fill)
                .center_x(Length::Fill)
                .into();
        }
        if state.reached_end
            || state.items.is_empty()
            || self.controller.load_error().is_some()
        {
            return Space::new().height(0).into();
        }
        container(
            button(text("Load more").size(14).color(TEXT_WHITE))
                .padding(Padding::new(10.0).left(24.0).right(24.0))
                .style(|_theme, status| {
                    let bg_alpha = if matches!(status, button::Status::Hovered) {
                        0.2
                    } else {
                        0.1
                    };
                    button::Style {
                        background: Some(iced::Background::Color(Color::from_rgba(
                            1.0, 1.0, 1.0, bg_alpha,
                        ))),
                        text_color: TEXT_WHITE,
                        border: Border {
                            color: Color::from_rgba(1.0, 1.0, 1.0, 0.2),
                            width: 1.0,
                            radius: 4.0.into(),
                        },
                        shadow: Shadow::default(),
                        snap: false,
                    }
                })
                .on_press(Message::LoadMore),
        )
        .width(Length::Fill)
        .center_x(Length::Fill)
        .into()
    }

    fn view_back_to_top(&self) -> Element<'_, Message> {
        let arrow = button(
            container(icon(ICON_ARROW_UP).size(20).color(TEXT_WHITE))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill),
        )
        .width(Length::Fixed(48.0))
        .height(Length::Fixed(48.0))
        .padding(0)
        .style(|_theme, status| {
            let bg = match status {
                button::Status::Hovered => ACCENT_RED,
                _ => SURFACE_DARK_GRAY,
            };
            button::Style {
                background: Some(iced::Background::Color(bg)),
                text_color: TEXT_WHITE,
                border: Border {
                    color: Color::from_rgba(1.0, 1.0, 1.0, 0.2),
                    width: 1.0,
                    radius: 24.0.into(),
                },
                shadow: Shadow {
                    color: Color::from_rgba(0.0, 0.0, 0.0, 0.5),
                    offset: iced::Vector::new(0.0, 4.0),
                    blur_radius: 8.0,
                },
                snap: false,
            }
        })
        .on_press(Message::ScrollToTop);

        container(arrow)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(iced::alignment::Horizontal::Right)
            .align_y(iced::alignment::Vertical::Bottom)
            .padding(32)
            .into()
    }

    fn view_skeleton_grid(&self) -> Element<'_, Message> {
        let rows: Vec<Element<Message>> = (0..2)
            .map(|_| {
                let cards: Vec<Element<Message>> = (0..6).map(|_| skeleton_card()).collect();
                Row::with_children(cards).spacing(16).into()
            })
            .collect();
        iced::widget::Column::with_children(rows).spacing(16).into()
    }
}

fn skeleton_card() -> Element<'static, Message> {
    container(Space::new().width(160.0).height(240.0))
        .width(Length::Fixed(160.0))
        .height(Length::Fixed(240.0))
        .style(|_theme| container::Style {
            background: Some(iced::Background::Color(Color::from_rgba(
                0.2, 0.2, 0.2, 0.5,
            ))),
            border: Border {
                color: Color::TRANSPARENT,
                width: 0.0,
                radius: 8.0.into(),
            },
            ..Default::default()
        })
        .into()
}
