use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::prelude::{Color, Line, Span, Style, Widget};
use ratatui::widgets::{Block, Borders, Paragraph};
use crate::app::InputMode;

pub(crate) struct PopupWidget {
    input: String,

    character_index: usize,
    input_mode: InputMode,
    display_message: String,
}

impl PopupWidget {
    pub(crate) fn new(
        input: String,
        character_index: usize,
        input_mode: InputMode,
        display_message: String,
    ) -> Self {
        Self {
            input,
            character_index,
            input_mode,
            display_message,
        }
    }
}

impl Widget for PopupWidget {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized
    {
        let layout = ratatui::layout::Layout::default()
            .direction(ratatui::layout::Direction::Vertical)
            .constraints([ratatui::layout::Constraint::Min(3), ratatui::layout::Constraint::Length(1)])
            .split(area);

        let (before_cursor, after_cursor) = self.input.split_at(self.character_index);
        let input_with_cursor = Line::from(vec![
            Span::raw(before_cursor),
            Span::styled("|", Style::default().fg(Color::Gray)),
            Span::raw(after_cursor),
        ]);

        let input_paragraph = Paragraph::new(input_with_cursor)
            .block(Block::default().borders(Borders::ALL).title(" Add a friend "));
        input_paragraph.render(layout[0], buf);

        if !self.display_message.is_empty() {
            let error_paragraph = Paragraph::new(Line::from(self.display_message))
                .style(Style::default().fg(Color::LightRed));
            error_paragraph.render(layout[1], buf);
        }
    }
}