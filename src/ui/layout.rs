//! Main layout rendering for the TUI.

use crate::app::{App, AppView};
use crate::ui::widgets::chart::ChartWidget;
use crate::ui::widgets::help::HelpWidget;
use crate::ui::widgets::helm::HelmPanelWidget;
use crate::ui::widgets::text_input::ConnectDialog;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Width of the bridge panel beside the chart
const PANEL_WIDTH: u16 = 32;

/// Draw the main application UI
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    match app.view {
        AppView::MainMenu => draw_main_menu(frame, app, area),
        AppView::Chart => draw_chart(frame, app, area),
        AppView::Help => draw_help(frame, app, area),
    }

    if let Some(ref message) = app.loading_message {
        draw_loading_indicator(frame, area, message);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, subtitle: Option<&str>) {
    let mut spans = vec![Span::styled(
        "Enterprise",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    if let Some(subtitle) = subtitle {
        spans.push(Span::styled(
            format!(" - {subtitle}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, text: &str) {
    let footer = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, area);
}

fn split_screen(area: Rect) -> [Rect; 3] {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(2), // Footer
        ])
        .areas(area)
}

/// Draw the connect menu
fn draw_main_menu(frame: &mut Frame, app: &App, area: Rect) {
    let [header, body, footer] = split_screen(area);
    draw_header(frame, header, Some("WW2 naval combat"));

    let dialog_area = centered_fixed(50, 16, body);
    let dialog = ConnectDialog::new(
        &app.name_input,
        &app.host_input,
        &app.port_input,
        app.menu_field,
    )
    .error(app.menu_error.as_deref());
    frame.render_widget(dialog, dialog_area);

    draw_footer(
        frame,
        footer,
        " Tab: Next field | Enter: Connect | F1: Help | Esc: Quit ",
    );
}

/// Draw the sea chart and the bridge panel
fn draw_chart(frame: &mut Frame, app: &App, area: Rect) {
    let [header, body, footer] = split_screen(area);
    let subtitle = app
        .status_message
        .clone()
        .unwrap_or_else(|| format!("{} on the bridge", app.chart.own_name()));
    draw_header(frame, header, Some(subtitle.as_str()));

    let [chart_area, panel_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(PANEL_WIDTH)])
        .areas(body);

    frame.render_widget(ChartWidget::new(&app.chart), chart_area);
    let panel = HelmPanelWidget::new(app.chart.own_ship(), app.controls)
        .anchored(app.anchored)
        .zoom(app.chart.zoom())
        .midway(app.midway_address.as_deref());
    frame.render_widget(panel, panel_area);

    if app.chart.is_sunk() {
        draw_sunk_overlay(frame, chart_area, app.chart.own_name());
    }

    draw_footer(
        frame,
        footer,
        " a/d: Helm | w/s: Throttle | z/x/c: Ahead/Stop/Astern | v: Anchor | -/=: Zoom | ?: Help | Esc: Leave ",
    );
}

fn draw_help(frame: &mut Frame, app: &App, area: Rect) {
    // The widget records its dimensions; drawing only gets a shared App.
    let mut help_state = app.help_view_state.clone();
    let help_widget = HelpWidget::new(&mut help_state);
    frame.render_widget(help_widget, area);
}

fn draw_sunk_overlay(frame: &mut Frame, area: Rect, name: &str) {
    let popup_area = centered_fixed(40, 5, area);
    frame.render_widget(Clear, popup_area);

    let sunk = Paragraph::new(format!("{name} has been sunk"))
        .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .alignment(Alignment::Center);
    frame.render_widget(sunk, popup_area);
}

fn draw_loading_indicator(frame: &mut Frame, area: Rect, message: &str) {
    let popup_area = centered_fixed(50, 3, area);

    frame.render_widget(Clear, popup_area);

    let loading = Paragraph::new(message)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(loading, popup_area);
}

/// Centre a box of fixed size, shrinking it to fit
fn centered_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::domain::Hull;
    use crate::protocol::{Colour, ShipReport};
    use crate::services::MidwayEvent;
    use ratatui::backend::TestBackend;

    fn render(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_centered_fixed_fits() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_fixed(10, 4, area), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_fixed(50, 40, area), area);
    }

    #[test]
    fn test_draw_main_menu() {
        let mut app = App::new(Settings::default());
        app.menu_error = Some("Invalid ip address".to_string());
        let screen = render(&app);
        assert!(screen.contains("Sail for Midway"));
        assert!(screen.contains("127.0.0.1"));
        assert!(screen.contains("Invalid ip address"));
    }

    #[test]
    fn test_draw_chart_with_sunk_overlay() {
        let mut app = App::new(Settings::default());
        app.view = AppView::Chart;
        app.chart = crate::ui::widgets::chart::ChartState::new("Hornet", 0);
        app.chart.apply(&MidwayEvent::Ship(ShipReport {
            name: "Hornet".to_string(),
            x: 0.0,
            y: 0.0,
            angle: 0.0,
            velocity: 0.0,
            size: 100.0,
            hull: Hull::Destroyer,
            colour: Colour::GRAY,
            health: 1.0,
        }));
        let screen = render(&app);
        assert!(screen.contains("Hornet on the bridge"));
        assert!(screen.contains("Throttle"));
        assert!(!screen.contains("has been sunk"));

        app.chart.apply(&MidwayEvent::Sunk("Hornet".to_string()));
        assert!(render(&app).contains("Hornet has been sunk"));
    }

    #[test]
    fn test_draw_help() {
        let mut app = App::new(Settings::default());
        app.open_help();
        assert!(render(&app).contains("Engine Telegraph"));
    }
}
