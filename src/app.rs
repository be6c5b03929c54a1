//! Application state and main event loop.

use crate::config::Settings;
use crate::error::{AppError, ConnectionError, ConnectionResult, Result};
use crate::protocol::ClientMessage;
use crate::services::connection::validate_name;
use crate::services::{MidwayConnection, MidwayEvent};
use crate::ui::input::{Action, InputHandler, InputMode};
use crate::ui::widgets::chart::ChartState;
use crate::ui::widgets::help::HelpViewState;
use crate::ui::widgets::helm::HelmControls;
use crate::ui::widgets::text_input::{MenuField, TextInputAction, TextInputState};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::prelude::*;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Application view state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppView {
    /// Ship name and Midway address
    #[default]
    MainMenu,
    /// Sea chart and bridge controls
    Chart,
    /// Help view showing keybindings
    Help,
}

/// Main application state
pub struct App {
    pub settings: Settings,

    // UI State
    /// Current view
    pub view: AppView,
    /// View to return to when help closes
    previous_view: AppView,
    /// Current input mode
    pub input_mode: InputMode,

    // Connect menu
    pub menu_field: MenuField,
    pub name_input: TextInputState,
    pub host_input: TextInputState,
    pub port_input: TextInputState,
    /// Inline error shown under the menu fields
    pub menu_error: Option<String>,

    // Async State
    /// Loading message (what operation is in progress)
    pub loading_message: Option<String>,
    /// Transient status line
    pub status_message: Option<String>,
    connecting: Option<JoinHandle<ConnectionResult<MidwayConnection>>>,
    connection: Option<MidwayConnection>,
    /// Address of the Midway server, once connected
    pub midway_address: Option<String>,

    // Bridge
    pub chart: ChartState,
    pub controls: HelmControls,
    pub anchored: bool,

    // Help view state
    /// State for help view (scroll position)
    pub help_view_state: HelpViewState,

    // Input handler
    input_handler: InputHandler,
}

impl App {
    /// Create a new application instance with the menu prefilled from settings
    pub fn new(settings: Settings) -> Self {
        let name_input = TextInputState::with_value(settings.client.name.clone());
        let host_input = TextInputState::with_value(settings.client.host.clone());
        let port_input = TextInputState::with_value(settings.client.port.to_string());
        let chart = ChartState::new(String::new(), settings.ui.zoom);

        Self {
            settings,
            view: AppView::MainMenu,
            previous_view: AppView::MainMenu,
            input_mode: InputMode::Insert,
            menu_field: MenuField::Name,
            name_input,
            host_input,
            port_input,
            menu_error: None,
            loading_message: None,
            status_message: None,
            connecting: None,
            connection: None,
            midway_address: None,
            chart,
            controls: HelmControls::default(),
            anchored: false,
            help_view_state: HelpViewState::new(),
            input_handler: InputHandler::new(),
        }
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting.is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn focused_input(&mut self) -> &mut TextInputState {
        match self.menu_field {
            MenuField::Name => &mut self.name_input,
            MenuField::Host => &mut self.host_input,
            MenuField::Port => &mut self.port_input,
        }
    }

    /// Start connecting with the values typed into the menu
    pub fn submit_menu(&mut self) {
        if self.connecting.is_some() {
            return;
        }
        let name = match validate_name(self.name_input.value()) {
            Ok(name) => name.to_string(),
            Err(e) => {
                self.menu_error = Some(menu_error(&e));
                return;
            }
        };
        let host = self.host_input.value().to_string();
        let port = self.port_input.value().to_string();

        self.menu_error = None;
        self.loading_message = Some(format!("Sailing for Midway at {host}..."));
        self.connecting = Some(tokio::spawn(async move {
            MidwayConnection::connect(&host, &port, &name).await
        }));
    }

    /// Collect a finished connection attempt
    async fn poll_connect(&mut self) {
        if !self.connecting.as_ref().is_some_and(JoinHandle::is_finished) {
            return;
        }
        let Some(handle) = self.connecting.take() else {
            return;
        };
        self.loading_message = None;

        match handle.await {
            Ok(Ok(connection)) => self.on_connected(connection),
            Ok(Err(e)) => {
                tracing::debug!("Connection failed: {}", e);
                self.menu_error = Some(menu_error(&e));
            }
            Err(e) => {
                tracing::error!("Connection task failed: {}", e);
                self.menu_error = Some("Could not connect to Midway".to_string());
            }
        }
    }

    fn on_connected(&mut self, connection: MidwayConnection) {
        self.chart = ChartState::new(connection.name(), self.settings.ui.zoom);
        self.controls = HelmControls::default();
        self.anchored = false;
        self.midway_address = Some(connection.address().to_string());
        self.status_message = Some(format!("{} has joined the fleet", connection.name()));
        self.connection = Some(connection);
        self.view = AppView::Chart;
        self.previous_view = AppView::Chart;
        self.input_mode = InputMode::Normal;
    }

    /// Drain events from Midway into the chart
    pub fn poll_events(&mut self) {
        let mut closed = None;
        if let Some(connection) = self.connection.as_mut() {
            while let Some(event) = connection.try_recv() {
                if let MidwayEvent::Disconnected(reason) = event {
                    closed = Some(reason);
                    break;
                }
                self.chart.apply(&event);
            }
        }
        // Joined the fleet until Midway starts reporting our ship
        if self.chart.own_ship().is_some() {
            self.status_message = None;
        }
        if let Some(reason) = closed {
            self.on_disconnected(reason);
        }
    }

    fn on_disconnected(&mut self, reason: Option<String>) {
        match &reason {
            Some(reason) => tracing::info!("Lost contact with Midway: {}", reason),
            None => tracing::info!("Midway closed the connection"),
        }
        let message = if self.chart.is_sunk() {
            format!("{} has been sunk", self.chart.own_name())
        } else {
            "Lost contact with Midway".to_string()
        };
        self.leave();
        self.menu_error = Some(message);
    }

    /// Drop the connection and go back to the menu
    pub fn leave(&mut self) {
        self.connection = None;
        self.midway_address = None;
        self.status_message = None;
        self.view = AppView::MainMenu;
        self.previous_view = AppView::MainMenu;
        self.input_mode = InputMode::Insert;
    }

    /// Poll background work; called once per frame
    pub async fn update(&mut self) {
        self.poll_connect().await;
        self.poll_events();
    }

    fn send(&self, message: ClientMessage) {
        if let Some(connection) = &self.connection {
            if let Err(e) = connection.send(message) {
                tracing::debug!("Could not reach Midway: {}", e);
            }
        }
    }

    /// Open help view
    pub fn open_help(&mut self) {
        self.help_view_state = HelpViewState::new();
        self.previous_view = self.view;
        self.input_mode = InputMode::Normal;
        self.view = AppView::Help;
    }

    /// Close help view
    pub fn close_help(&mut self) {
        self.view = self.previous_view;
        self.input_mode = match self.view {
            AppView::MainMenu => InputMode::Insert,
            _ => InputMode::Normal,
        };
    }

    /// Handle keyboard input and return true if should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.view {
            AppView::MainMenu => self.handle_menu_key(key),
            AppView::Help => self.handle_help_key(key),
            AppView::Chart => self.handle_chart_key(key),
        }
    }

    /// Handle keys on the connect menu
    fn handle_menu_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.menu_field = self.menu_field.next();
                return false;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.menu_field = self.menu_field.previous();
                return false;
            }
            KeyCode::F(1) => {
                self.open_help();
                return false;
            }
            _ => {}
        }

        if let Some(Action::Quit) = self.input_handler.handle_key(key, self.input_mode) {
            return true;
        }

        match self.focused_input().handle_key(key) {
            TextInputAction::Submit => self.submit_menu(),
            TextInputAction::Cancel => return true,
            TextInputAction::Changed => self.menu_error = None,
            TextInputAction::None => {}
        }
        false
    }

    /// Handle keys in help view
    fn handle_help_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::F(1) => {
                self.close_help();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.help_view_state.scroll_up(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.help_view_state.scroll_down(1);
            }
            KeyCode::PageUp | KeyCode::Char('b') => {
                self.help_view_state.page_up();
            }
            KeyCode::PageDown | KeyCode::Char('f') => {
                self.help_view_state.page_down();
            }
            _ => {}
        }
        false
    }

    /// Handle bridge controls on the chart
    fn handle_chart_key(&mut self, key: KeyEvent) -> bool {
        let Some(action) = self.input_handler.handle_key(key, self.input_mode) else {
            return false;
        };

        match action {
            Action::Quit => return true,
            Action::Back => self.leave(),
            Action::Help => self.open_help(),
            Action::ZoomIn => self.chart.zoom_in(),
            Action::ZoomOut => self.chart.zoom_out(),
            Action::Anchor => {
                self.controls.apply(action);
                self.anchored = true;
                self.send(ClientMessage::Anchor);
            }
            _ => {
                if self.controls.apply(action) {
                    // Midway weighs anchor as soon as the engines turn
                    if self.controls.power != 0.0 {
                        self.anchored = false;
                    }
                    self.send(ClientMessage::Sail {
                        power: self.controls.power,
                        helm: self.controls.helm,
                    });
                }
            }
        }
        false
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let tick_rate = Duration::from_millis(self.settings.ui.refresh_rate_ms);

        loop {
            self.update().await;

            // Draw UI
            terminal.draw(|f| crate::ui::layout::draw(f, self))?;

            // Wait for event with timeout
            if event::poll(tick_rate).map_err(|e| AppError::Terminal(e.to_string()))? {
                match event::read().map_err(|e| AppError::Terminal(e.to_string()))? {
                    // Some platforms also report releases and repeats
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key) {
                            break;
                        }
                    }
                    Event::Resize(width, height) => {
                        tracing::debug!("Terminal resized to {}x{}", width, height);
                    }
                    _ => {}
                }
            }
        }

        // Leaving closes the socket, which Midway treats as a departure
        self.leave();
        if let Some(handle) = self.connecting.take() {
            handle.abort();
        }

        Ok(())
    }
}

/// Inline menu text for a failed connection attempt
fn menu_error(error: &ConnectionError) -> String {
    match error {
        ConnectionError::InvalidAddress(_) => "Invalid ip address".to_string(),
        ConnectionError::InvalidName(_) => "Ship name must be a single word".to_string(),
        _ => "Could not connect to Midway".to_string(),
    }
}
