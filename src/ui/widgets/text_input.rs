//! Text input widget and the connect dialog built from it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Single-line text input widget
pub struct TextInputWidget<'a> {
    /// Current input value
    value: &'a str,
    /// Cursor position (character index)
    cursor: usize,
    /// Placeholder text when empty
    placeholder: &'a str,
    /// Title for the input box
    title: &'a str,
    /// Whether the input is focused
    focused: bool,
}

impl<'a> TextInputWidget<'a> {
    /// Create a new text input widget
    pub fn new(value: &'a str, cursor: usize) -> Self {
        Self {
            value,
            cursor,
            placeholder: "",
            title: "Input",
            focused: true,
        }
    }

    /// Set placeholder text
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Set title
    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    /// Set focused state
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for TextInputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} ", self.title));

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let cursor_style = Style::default().fg(Color::Black).bg(Color::White);

        if self.value.is_empty() {
            let mut x = inner.x;
            if self.focused {
                buf.set_string(x, inner.y, " ", cursor_style);
                x += 1;
            }
            buf.set_string(
                x,
                inner.y,
                self.placeholder,
                Style::default().fg(Color::DarkGray),
            );
            return;
        }

        let line = if self.focused {
            let before: String = self.value.chars().take(self.cursor).collect();
            let at: String = self.value.chars().skip(self.cursor).take(1).collect();
            let after: String = self.value.chars().skip(self.cursor + 1).collect();
            let at = if at.is_empty() { " ".to_string() } else { at };
            Line::from(vec![
                Span::raw(before),
                Span::styled(at, cursor_style),
                Span::raw(after),
            ])
        } else {
            Line::from(self.value)
        };
        buf.set_line(inner.x, inner.y, &line, inner.width);
    }
}

/// State for text input
#[derive(Debug, Default, Clone)]
pub struct TextInputState {
    /// Current value
    pub value: String,
    /// Cursor position (character index)
    pub cursor: usize,
}

impl TextInputState {
    /// Create a new text input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with initial value
    pub fn with_value(value: String) -> Self {
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) -> TextInputAction {
        match key.code {
            KeyCode::Char(c) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    return TextInputAction::None;
                }
                let at = self.byte_index(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
                TextInputAction::Changed
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                    TextInputAction::Changed
                } else {
                    TextInputAction::None
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.char_count() {
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                    TextInputAction::Changed
                } else {
                    TextInputAction::None
                }
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                TextInputAction::None
            }
            KeyCode::Right => {
                if self.cursor < self.char_count() {
                    self.cursor += 1;
                }
                TextInputAction::None
            }
            KeyCode::Home => {
                self.cursor = 0;
                TextInputAction::None
            }
            KeyCode::End => {
                self.cursor = self.char_count();
                TextInputAction::None
            }
            KeyCode::Enter => TextInputAction::Submit,
            KeyCode::Esc => TextInputAction::Cancel,
            _ => TextInputAction::None,
        }
    }

    /// Clear the input
    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Get the current value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// Actions that can result from text input handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputAction {
    /// No action
    None,
    /// Value changed
    Changed,
    /// User submitted (Enter)
    Submit,
    /// User cancelled (Esc)
    Cancel,
}

/// Fields of the connect dialog, in focus order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuField {
    #[default]
    Name,
    Host,
    Port,
}

impl MenuField {
    pub fn next(self) -> Self {
        match self {
            Self::Name => Self::Host,
            Self::Host => Self::Port,
            Self::Port => Self::Name,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Self::Name => Self::Port,
            Self::Host => Self::Name,
            Self::Port => Self::Host,
        }
    }
}

/// Dialog for naming a ship and choosing a Midway server
pub struct ConnectDialog<'a> {
    name: &'a TextInputState,
    host: &'a TextInputState,
    port: &'a TextInputState,
    focus: MenuField,
    /// Error message to display
    error: Option<&'a str>,
}

impl<'a> ConnectDialog<'a> {
    pub fn new(
        name: &'a TextInputState,
        host: &'a TextInputState,
        port: &'a TextInputState,
        focus: MenuField,
    ) -> Self {
        Self {
            name,
            host,
            port,
            focus,
            error: None,
        }
    }

    /// Set error message
    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }
}

impl Widget for ConnectDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Sail for Midway ");
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Ship name
                Constraint::Length(3), // Host
                Constraint::Length(3), // Port
                Constraint::Length(1), // Error
                Constraint::Min(0),
                Constraint::Length(1), // Help
            ])
            .split(inner);

        let fields = [
            (MenuField::Name, self.name, "Ship name", "Enterprise"),
            (MenuField::Host, self.host, "Location of Midway", "127.0.0.1"),
            (MenuField::Port, self.port, "Port", "25565"),
        ];
        for (row, (field, state, title, placeholder)) in rows.iter().zip(fields) {
            TextInputWidget::new(state.value(), state.cursor)
                .title(title)
                .placeholder(placeholder)
                .focused(self.focus == field)
                .render(*row, buf);
        }

        if let Some(error) = self.error {
            Paragraph::new(error)
                .style(Style::default().fg(Color::Red))
                .render(rows[3], buf);
        }

        Paragraph::new("Tab: Next field | Enter: Connect | Esc: Quit")
            .style(Style::default().fg(Color::DarkGray))
            .render(rows[5], buf);
    }
}
