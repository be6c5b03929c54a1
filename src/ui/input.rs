//! Keyboard input handling for the bridge controls.
//!
//! Terminals only report key presses, not releases, so the held-key controls
//! of a windowed client become steps: each press moves the helm or the
//! throttle one notch.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Bridge controls on the chart
    #[default]
    Normal,
    /// Text entry in the connect menu
    Insert,
}

/// Actions that can be triggered by keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Helm
    HelmPort,
    HelmStarboard,
    HelmAmidships,

    // Engine telegraph
    ThrottleUp,
    ThrottleDown,
    FullAhead,
    Stop,
    Astern,
    Anchor,

    // Chart
    ZoomIn,
    ZoomOut,

    // Misc
    Help,
    Back,
    Quit,
}

/// Input handler for processing keyboard events
#[derive(Debug, Default)]
pub struct InputHandler;

impl InputHandler {
    /// Create a new input handler
    pub fn new() -> Self {
        Self
    }

    /// Handle a key event and return the corresponding action
    pub fn handle_key(&self, key: KeyEvent, mode: InputMode) -> Option<Action> {
        match mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Insert => self.handle_insert_key(key),
        }
    }

    /// Handle key in normal mode
    fn handle_normal_key(&self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        match key.code {
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Some(Action::HelmPort),
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => {
                Some(Action::HelmStarboard)
            }
            KeyCode::Char(' ') => Some(Action::HelmAmidships),

            KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Some(Action::ThrottleUp),
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Some(Action::ThrottleDown),
            KeyCode::Char('z') | KeyCode::Char('Z') => Some(Action::FullAhead),
            KeyCode::Char('x') | KeyCode::Char('X') => Some(Action::Stop),
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::Astern),
            KeyCode::Char('v') | KeyCode::Char('V') => Some(Action::Anchor),

            KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::ZoomOut),
            KeyCode::Char('=') | KeyCode::Char('+') => Some(Action::ZoomIn),

            KeyCode::Char('?') | KeyCode::F(1) => Some(Action::Help),
            KeyCode::Esc => Some(Action::Back),
            KeyCode::Char('q') => Some(Action::Quit),

            _ => None,
        }
    }

    /// Handle key in insert mode
    fn handle_insert_key(&self, key: KeyEvent) -> Option<Action> {
        if key.code == KeyCode::Esc {
            return Some(Action::Back);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        // Other keys are handled by the text input widgets
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_helm_keys() {
        let handler = InputHandler::new();
        assert_eq!(
            handler.handle_key(press(KeyCode::Char('a')), InputMode::Normal),
            Some(Action::HelmPort)
        );
        assert_eq!(
            handler.handle_key(press(KeyCode::Right), InputMode::Normal),
            Some(Action::HelmStarboard)
        );
        assert_eq!(
            handler.handle_key(press(KeyCode::Char(' ')), InputMode::Normal),
            Some(Action::HelmAmidships)
        );
    }

    #[test]
    fn test_telegraph_keys() {
        let handler = InputHandler::new();
        assert_eq!(
            handler.handle_key(press(KeyCode::Char('z')), InputMode::Normal),
            Some(Action::FullAhead)
        );
        assert_eq!(
            handler.handle_key(press(KeyCode::Char('x')), InputMode::Normal),
            Some(Action::Stop)
        );
        assert_eq!(
            handler.handle_key(press(KeyCode::Char('c')), InputMode::Normal),
            Some(Action::Astern)
        );
        assert_eq!(
            handler.handle_key(press(KeyCode::Char('v')), InputMode::Normal),
            Some(Action::Anchor)
        );
    }

    #[test]
    fn test_zoom_keys() {
        let handler = InputHandler::new();
        assert_eq!(
            handler.handle_key(press(KeyCode::Char('-')), InputMode::Normal),
            Some(Action::ZoomOut)
        );
        assert_eq!(
            handler.handle_key(press(KeyCode::Char('=')), InputMode::Normal),
            Some(Action::ZoomIn)
        );
    }

    #[test]
    fn test_insert_mode_passes_text_through() {
        let handler = InputHandler::new();
        assert_eq!(
            handler.handle_key(press(KeyCode::Char('a')), InputMode::Insert),
            None
        );
        assert_eq!(
            handler.handle_key(press(KeyCode::Esc), InputMode::Insert),
            Some(Action::Back)
        );
    }

    #[test]
    fn test_ctrl_c_quits() {
        let handler = InputHandler::new();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handler.handle_key(ctrl_c, InputMode::Normal), Some(Action::Quit));
        assert_eq!(handler.handle_key(ctrl_c, InputMode::Insert), Some(Action::Quit));
    }
}
