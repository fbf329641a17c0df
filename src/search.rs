use chrono::Datelike;
use iced::widget::{button, container, pick_list, row, text, Row, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::media::{
    Genre, MediaType, Message, Mode, ACCENT_RED, TEXT_GRAY, TEXT_WHITE,
};
use crate::Catalogz;

const ALL_GENRES: &str = "All Genres";
const ALL_YEARS: &str = "All Years";
const EARLIEST_YEAR: i32 = 1950;

/// Years offered in the year filter, newest first.
pub fn year_options(current_year: i32) -> Vec<i32> {
    (EARLIEST_YEAR..=current_year).rev().collect()
}

fn genre_label(genres: &[Genre], genre_id: Option<u64>) -> String {
    genre_id
        .and_then(|id| genres.iter().find(|g| g.id == id))
        .map(|g| g.name.clone())
        .unwrap_or_else(|| String::from(ALL_GENRES))
}

fn genre_from_label(genres: &[Genre], label: &str) -> Option<u64> {
    if label == ALL_GENRES {
        return None;
    }
    genres.iter().find(|g| g.name == label).map(|g| g.id)
}

fn year_from_label(label: &str) -> Option<i32> {
    label.parse().ok()
}

fn pick_list_style(_theme: &iced::Theme, _status: pick_list::Status) -> pick_list::Style {
    pick_list::Style {
        text_color: TEXT_WHITE,
        placeholder_color: TEXT_GRAY,
        handle_color: TEXT_WHITE,
        background: iced::Background::Color(Color::from_rgba(1.0, 1.0, 1.0, 0.1)),
        border: Border {
            color: Color::from_rgba(1.0, 1.0, 1.0, 0.2),
            width: 1.0,
            radius: 4.0.into(),
        },
    }
}

/// Stand-in for a pick list while a load holds the filters.
fn locked_filter(label: String) -> Element<'static, Message> {
    container(text(label).size(13).color(Color::from_rgba(1.0, 1.0, 1.0, 0.35)))
        .padding(Padding::new(8.0).left(12.0).right(12.0))
        .style(|_theme| container::Style {
            background: Some(iced::Background::Color(Color::from_rgba(
                1.0, 1.0, 1.0, 0.04,
            ))),
            border: Border {
                color: Color::from_rgba(1.0, 1.0, 1.0, 0.1),
                width: 1.0,
                radius: 4.0.into(),
            },
            ..Default::default()
        })
        .into()
}

impl Catalogz {
    pub fn view_filter_panel(&self) -> Element<'_, Message> {
        let mode = self.controller.state().mode;
        if mode == Mode::Favorites {
            return Space::new().height(0).into();
        }

        let mut filters: Vec<Element<Message>> = Vec::new();
        if mode == Mode::Netflix {
            filters.push(self.view_netflix_subtype_toggle());
        }
        filters.push(self.view_genre_dropdown());
        filters.push(self.view_year_dropdown());

        let filter_row = Row::with_children(filters)
            .spacing(16)
            .align_y(iced::Alignment::Center);

        container(filter_row)
            .width(Length::Fill)
            .padding(Padding::new(16.0))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(Color::from_rgba(
                    1.0, 1.0, 1.0, 0.05,
                ))),
                border: Border {
                    color: Color::from_rgba(1.0, 1.0, 1.0, 0.1),
                    width: 1.0,
                    radius: 8.0.into(),
                },
                ..Default::default()
            })
            .into()
    }

    fn view_netflix_subtype_toggle(&self) -> Element<'_, Message> {
        let locked = self.controller.filters_disabled();
        let current = self.controller.state().netflix_subtype;

        let buttons: Vec<Element<Message>> = [MediaType::Movie, MediaType::Tv]
            .into_iter()
            .map(|subtype| {
                let is_active = current == subtype;
                let label = text(subtype.to_string()).size(13).color(TEXT_WHITE);
                let mut toggle = button(label)
                    .padding(Padding::new(8.0).left(16.0).right(16.0))
                    .style(move |_theme, status| {
                        let bg_alpha = if is_active {
                            0.3
                        } else if matches!(status, button::Status::Hovered) {
                            0.15
                        } else {
                            0.1
                        };
                        button::Style {
                            background: Some(iced::Background::Color(Color::from_rgba(
                                1.0, 1.0, 1.0, bg_alpha,
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
                    });
                if !locked {
                    toggle = toggle.on_press(Message::SetNetflixSubtype(subtype));
                }
                toggle.into()
            })
            .collect();

        Row::with_children(buttons)
            .spacing(4)
            .align_y(iced::Alignment::Center)
            .into()
    }

    fn view_genre_dropdown(&self) -> Element<'_, Message> {
        let genres = self.controller.available_genres();
        let selected = genre_label(&genres, self.controller.state().genre_id);
        if self.controller.filters_disabled() {
            return locked_filter(selected);
        }

        let mut options: Vec<String> = vec![String::from(ALL_GENRES)];
        options.extend(genres.iter().map(|g| g.name.clone()));

        pick_list(options, Some(selected), move |sel: String| {
            Message::SetGenreFilter(genre_from_label(&genres, &sel))
        })
        .text_size(13)
        .padding(Padding::new(8.0).left(12.0).right(12.0))
        .style(pick_list_style)
        .into()
    }

    fn view_year_dropdown(&self) -> Element<'_, Message> {
        let selected = self
            .controller
            .state()
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| String::from(ALL_YEARS));
        if self.controller.filters_disabled() {
            return locked_filter(selected);
        }

        let mut options: Vec<String> = vec![String::from(ALL_YEARS)];
        options.extend(
            year_options(chrono::Local::now().year())
                .into_iter()
                .map(|y| y.to_string()),
        );

        row![
            text("Year:").size(13).color(TEXT_GRAY),
            pick_list(options, Some(selected), |sel: String| {
                Message::SetYearFilter(year_from_label(&sel))
            })
            .text_size(13)
            .padding(Padding::new(8.0).left(12.0).right(12.0))
            .style(pick_list_style)
        ]
        .spacing(8)
        .align_y(iced::Alignment::Center)
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn years_run_newest_first_down_to_1950() {
        let years = year_options(2024);
        assert_eq!(years.first(), Some(&2024));
        assert_eq!(years.last(), Some(&EARLIEST_YEAR));
        assert_eq!(years.len(), 75);
    }

    #[test]
    fn labels_map_back_to_filter_values() {
        let genres = vec![Genre::new(35, "Comedy"), Genre::new(18, "Drama")];
        assert_eq!(genre_label(&genres, Some(18)), "Drama");
        assert_eq!(genre_label(&genres, Some(99)), ALL_GENRES);
        assert_eq!(genre_label(&genres, None), ALL_GENRES);
        assert_eq!(genre_from_label(&genres, "Comedy"), Some(35));
        assert_eq!(genre_from_label(&genres, ALL_GENRES), None);
        assert_eq!(year_from_label("1999"), Some(1999));
        assert_eq!(year_from_label(ALL_YEARS), None);
    }
}
