use crate::app::{App, AppState};
use crate::widgets::chats::ChatsWidget;
use crate::widgets::empty_page::EmptyPage;
use crate::widgets::popup::PopupWidget;
use crate::widgets::register::RegistrationWidget;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::widgets::Clear;
use ratatui::{
    style::{Color, Style},
    Frame,
};

/// Renders the user interface widgets.
pub fn render(app: &mut App, frame: &mut Frame) {
    frame.render_widget(
        ratatui::widgets::Block::default().style(Style::default().bg(Color::Rgb(31, 29, 46))),
        frame.area(),
    );

    match app.state {
        AppState::Register => {
            let error_message = app.error.as_ref().map(ToString::to_string).unwrap_or_default();
            frame.render_widget(
                RegistrationWidget::new(
                    app.input.clone(),
                    error_message,
                    app.character_index,
                    app.input_mode.clone(),
                ),
                frame.area(),
            );
        }
        AppState::Chats => {
            let chats = app.open_chats();

            if chats.is_empty() {
                frame.render_widget(Clear, frame.area());
                frame.render_widget(
                    ratatui::widgets::Block::default().style(Style::default().bg(Color::Rgb(31, 29, 46))),
                    frame.area(),
                );
                frame.render_widget(EmptyPage::new(app.input_mode.clone()), frame.area());
            } else {
                let active_peer = chats[app.active_chat].clone();
                let history = app.chat_history(&active_peer);
                let username = app
                    .client
                    .as_ref()
                    .map(|c| c.username().to_string())
                    .unwrap_or_default();
                frame.render_widget(
                    ChatsWidget::new(
                        username,
                        if app.show_popup { String::new() } else { app.input.clone() },
                        app.character_index,
                        app.input_mode.clone(),
                        active_peer,
                        chats,
                        app.selected_chat,
                        app.active_window,
                        history,
                    ),
                    frame.area(),
                );
            }

            if app.show_popup {
                let error_message = app.error.as_ref().map(ToString::to_string).unwrap_or_default();
                let area = popup_area(frame.area(), 30, 4);
                frame.render_widget(Clear, area);
                frame.render_widget(
                    ratatui::widgets::Block::default().style(Style::default().bg(Color::Rgb(31, 29, 46))),
                    area,
                );
                frame.render_widget(
                    PopupWidget::new(app.input.clone(), app.character_index, app.input_mode.clone(), error_message),
                    area,
                );
            }
        }
    }
}

fn popup_area(area: Rect, len_x: u16, len_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(len_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Length(len_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
