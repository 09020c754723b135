use crate::app::{App, AppResult, AppState, InputMode};
use crossterm::event::{KeyCode, KeyEvent};

pub async fn handle_key_event(key: KeyEvent, app: &mut App) -> AppResult<()> {
    match app.input_mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('i') => {
                app.input_mode = InputMode::Insert;
                app.input.clear();
                app.reset_cursor();
            }
            KeyCode::Char('q') => {
                if !app.show_popup {
                    app.quit();
                }
            }
            KeyCode::Char('a') | KeyCode::Char('/') if app.state == AppState::Chats => {
                app.show_popup = !app.show_popup;
                app.input_mode = InputMode::Insert;
                app.error = None;
                app.input.clear();
                app.reset_cursor();
            }
            KeyCode::Left | KeyCode::Char('h') if app.state == AppState::Chats && !app.show_popup => {
                app.active_window = 0;
            }
            KeyCode::Right | KeyCode::Char('l') if app.state == AppState::Chats && !app.show_popup => {
                app.active_window = 1;
            }
            KeyCode::Down | KeyCode::Char('j')
                if app.state == AppState::Chats && app.active_window == 0 && !app.show_popup =>
            {
                let count = app.open_chats().len();
                if count > 0 {
                    app.selected_chat = (app.selected_chat + 1) % count;
                }
            }
            KeyCode::Up | KeyCode::Char('k')
                if app.state == AppState::Chats && app.active_window == 0 && !app.show_popup =>
            {
                let count = app.open_chats().len();
                if count > 0 {
                    app.selected_chat = (app.selected_chat + count - 1) % count;
                }
            }
            KeyCode::Esc if app.state == AppState::Chats && app.show_popup => {
                app.show_popup = false;
            }
            KeyCode::Enter if app.state == AppState::Chats && !app.show_popup => {
                app.active_chat = app.selected_chat;
            }
            _ => {}
        },

        InputMode::Insert => match key.code {
            KeyCode::Char(to_insert) => {
                if app.state == AppState::Chats && !app.show_popup && app.active_window == 0 {
                    return Ok(());
                }
                app.enter_char(to_insert)
            }
            KeyCode::Enter => app.submit_message().await,
            KeyCode::Backspace => app.delete_char(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            KeyCode::Esc => app.input_mode = InputMode::Normal,
            _ => {}
        },
    }

    Ok(())
}
