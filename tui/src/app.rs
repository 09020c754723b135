use crate::chat::ChatMessage;
use crate::errors::TuiError;
use client::Client;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{DefaultTerminal, Frame};
use std::collections::HashMap;
use std::error;
use std::time::Duration;

pub type AppResult<T> = Result<T, Box<dyn error::Error>>;

/// How long the event loop waits for a keypress before polling the socket
/// for an inbound message instead.
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    #[default]
    Register,
    Chats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Insert,
}

pub struct App {
    pub running: bool,
    pub state: AppState,
    pub client: Option<Client>,

    pub(crate) input: String,
    pub(crate) input_mode: InputMode,
    pub(crate) character_index: usize,
    pub(crate) error: Option<TuiError>,

    pub(crate) show_popup: bool,
    pub(crate) active_window: usize,
    pub(crate) selected_chat: usize,
    pub(crate) active_chat: usize,
    open_chats: Vec<String>,
    histories: HashMap<String, Vec<ChatMessage>>,
}

impl Default for App {
    fn default() -> Self {
        App {
            running: true,
            state: AppState::default(),
            client: None,
            input: String::new(),
            input_mode: InputMode::Insert,
            character_index: 0,
            error: None,
            show_popup: false,
            active_window: 0,
            selected_chat: 0,
            active_chat: 0,
            open_chats: Vec::new(),
            histories: HashMap::new(),
        }
    }
}

impl App {
    pub fn new() -> Self {
        App::default()
    }

    pub(crate) fn open_chats(&self) -> Vec<String> {
        self.open_chats.clone()
    }

    pub(crate) fn chat_history(&self, peer: &str) -> Option<Vec<ChatMessage>> {
        self.histories.get(peer).cloned()
    }

    fn record(&mut self, peer: &str, message: ChatMessage) {
        self.histories.entry(peer.to_string()).or_default().push(message);
    }

    fn open_chat_with(&mut self, peer: &str) {
        if !self.open_chats.contains(&peer.to_string()) {
            self.open_chats.push(peer.to_string());
            self.histories.entry(peer.to_string()).or_default();
        }
    }

    fn clamp_cursor(&self, new_cursor_pos: usize) -> usize {
        new_cursor_pos.clamp(0, self.input.chars().count())
    }

    pub(crate) fn move_cursor_left(&mut self) {
        let moved = self.character_index.saturating_sub(1);
        self.character_index = self.clamp_cursor(moved);
    }

    pub(crate) fn move_cursor_right(&mut self) {
        let moved = self.character_index.saturating_add(1);
        self.character_index = self.clamp_cursor(moved);
    }

    pub(crate) fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.character_index)
            .unwrap_or(self.input.len())
    }

    pub(crate) fn enter_char(&mut self, new_char: char) {
        let restricted = match self.state {
            AppState::Register => true,
            AppState::Chats => self.show_popup,
        };
        if restricted && (new_char.is_whitespace() || !new_char.is_ascii_alphanumeric()) {
            return;
        }
        let index = self.byte_index();
        self.input.insert(index, new_char);
        self.move_cursor_right();
    }

    pub(crate) fn delete_char(&mut self) {
        if self.character_index == 0 {
            return;
        }
        let current_index = self.character_index;
        let before = self.input.chars().take(current_index - 1);
        let after = self.input.chars().skip(current_index);
        self.input = before.chain(after).collect();
        self.move_cursor_left();
    }

    pub(crate) fn reset_cursor(&mut self) {
        self.character_index = 0;
    }

    pub(crate) async fn submit_message(&mut self) {
        match self.state {
            AppState::Register => self.submit_registration().await,
            AppState::Chats => self.submit_chats_input().await,
        }
        self.input.clear();
        self.reset_cursor();
    }

    async fn submit_registration(&mut self) {
        if self.input.is_empty() {
            self.error = Some(TuiError::EmptyUsernameInput);
            return;
        }
        match Client::new(self.input.clone()).await {
            Ok(mut client) => match client.register().await {
                Ok(()) => {
                    self.client = Some(client);
                    self.state = AppState::Chats;
                    self.error = None;
                }
                Err(e) => self.error = Some(TuiError::from(e)),
            },
            Err(e) => self.error = Some(TuiError::from(e)),
        }
    }

    async fn submit_chats_input(&mut self) {
        let Some(client) = self.client.as_mut() else {
            return;
        };

        if self.show_popup {
            if self.input == client.username() {
                self.error = Some(TuiError::InvalidUser("Cannot add yourself".to_string()));
                return;
            }
            match client.lookup_peer(&self.input).await {
                Ok(()) => {
                    self.open_chat_with(&self.input.clone());
                    self.show_popup = false;
                    self.error = None;
                }
                Err(e) => self.error = Some(TuiError::from(e)),
            }
            return;
        }

        if self.active_window != 1 || self.input.is_empty() {
            return;
        }
        let chats = self.open_chats();
        let Some(peer) = chats.get(self.active_chat) else {
            return;
        };
        match client.send_message(peer, &self.input).await {
            Ok(()) => {
                let username = client.username().to_string();
                let peer = peer.clone();
                self.record(&peer, ChatMessage::new(username, self.input.clone()));
            }
            Err(e) => self.error = Some(TuiError::from(e)),
        }
    }

    async fn poll_incoming(&mut self) {
        let Some(client) = self.client.as_mut() else {
            return;
        };
        if let Some(result) = client.try_receive_message().await {
            match result {
                Ok((from, text)) => {
                    self.open_chat_with(&from);
                    self.record(&from, ChatMessage::new(from.clone(), text));
                }
                Err(e) => self.error = Some(TuiError::from(e)),
            }
        }
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> AppResult<()> {
        while self.running {
            terminal.draw(|frame| self.draw(frame))?;

            if event::poll(EVENT_POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        crate::handler::handle_key_event(key, self).await?;
                    }
                }
            } else {
                self.poll_incoming().await;
            }
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        crate::ui::render(self, frame);
    }

    pub fn quit(&mut self) {
        self.running = false;
    }
}
