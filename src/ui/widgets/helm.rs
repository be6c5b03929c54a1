//! Engine telegraph, helm and the bridge status panel.

use crate::domain::navigation::{format_latitude, format_longitude, knots};
use crate::domain::{MAX_POWER, MIN_POWER};
use crate::protocol::ShipReport;
use crate::ui::input::Action;
use crate::ui::widgets::chart::health_bar;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

pub const HELM_STEP: f32 = 0.25;
pub const THROTTLE_STEP: f32 = 0.1;
/// Power rung by the "astern" telegraph
pub const ASTERN_POWER: f32 = -0.5;

/// What the bridge has ordered; sent to Midway as `sail`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HelmControls {
    pub power: f32,
    /// Negative is port, positive starboard
    pub helm: f32,
}

impl HelmControls {
    /// Apply a bridge action, returning true if the orders changed
    pub fn apply(&mut self, action: Action) -> bool {
        let before = *self;
        match action {
            Action::HelmPort => self.helm = notch(self.helm - HELM_STEP, -1.0, 1.0),
            Action::HelmStarboard => self.helm = notch(self.helm + HELM_STEP, -1.0, 1.0),
            Action::HelmAmidships => self.helm = 0.0,
            Action::ThrottleUp => {
                self.power = notch(self.power + THROTTLE_STEP, MIN_POWER, MAX_POWER)
            }
            Action::ThrottleDown => {
                self.power = notch(self.power - THROTTLE_STEP, MIN_POWER, MAX_POWER)
            }
            Action::FullAhead => self.power = MAX_POWER,
            Action::Stop | Action::Anchor => self.power = 0.0,
            Action::Astern => self.power = ASTERN_POWER,
            _ => {}
        }
        *self != before
    }
}

/// Round to two places so repeated steps land on exact notches
fn notch(value: f32, min: f32, max: f32) -> f32 {
    ((value * 100.0).round() / 100.0).clamp(min, max)
}

/// Throttle gauge, filled from the centre for astern
pub fn throttle_bar(power: f32, width: usize) -> String {
    let filled = ((power.abs() / MAX_POWER).clamp(0.0, 1.0) * width as f32).round() as usize;
    let bar = "█".repeat(filled) + &"·".repeat(width - filled);
    if power < 0.0 {
        format!("R {bar}")
    } else {
        format!("F {bar}")
    }
}

/// Rudder indicator, `|` marks amidships
pub fn helm_indicator(helm: f32, half_width: usize) -> String {
    let offset = (helm.clamp(-1.0, 1.0) * half_width as f32).round() as isize;
    let position = (half_width as isize + offset) as usize;
    let cells: String = (0..=half_width * 2)
        .map(|i| {
            if i == position {
                '▲'
            } else if i == half_width {
                '|'
            } else {
                '─'
            }
        })
        .collect();
    format!("P {cells} S")
}

/// Compass heading in whole degrees
pub fn heading_degrees(angle: f32) -> u16 {
    (angle.to_degrees().rem_euclid(360.0).round() as u16) % 360
}

/// Bridge status panel
pub struct HelmPanelWidget<'a> {
    ship: Option<&'a ShipReport>,
    controls: HelmControls,
    anchored: bool,
    zoom: i32,
    /// Address of the Midway server we are connected to
    midway: Option<&'a str>,
}

impl<'a> HelmPanelWidget<'a> {
    pub fn new(ship: Option<&'a ShipReport>, controls: HelmControls) -> Self {
        Self {
            ship,
            controls,
            anchored: false,
            zoom: 0,
            midway: None,
        }
    }

    pub fn anchored(mut self, anchored: bool) -> Self {
        self.anchored = anchored;
        self
    }

    pub fn zoom(mut self, zoom: i32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn midway(mut self, address: Option<&'a str>) -> Self {
        self.midway = address;
        self
    }

    fn row(label: &'static str, value: String) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{label:<9}"), Style::default().fg(Color::DarkGray)),
            Span::raw(value),
        ])
    }
}

impl Widget for HelmPanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = match self.ship {
            Some(ship) => format!(" {} ", ship.name),
            None => " Bridge ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title);

        let mut lines = Vec::new();
        match self.ship {
            Some(ship) => {
                lines.push(Self::row("Lat", format_latitude(ship.y)));
                lines.push(Self::row("Long", format_longitude(ship.x)));
                lines.push(Self::row(
                    "Heading",
                    format!("{:03}°", heading_degrees(ship.angle)),
                ));
                lines.push(Self::row("Speed", format!("{:.1} kt", knots(ship.velocity))));
                lines.push(Self::row("Hull", health_bar(ship.health)));
            }
            None => lines.push(Line::from(Span::styled(
                "Awaiting position...",
                Style::default().fg(Color::Yellow),
            ))),
        }
        lines.push(Line::from(""));
        lines.push(Self::row(
            "Throttle",
            format!("{:+.0}%", self.controls.power * 100.0),
        ));
        lines.push(Line::from(throttle_bar(self.controls.power, 10)));
        lines.push(Self::row("Helm", format!("{:+.2}", self.controls.helm)));
        lines.push(Line::from(helm_indicator(self.controls.helm, 5)));
        lines.push(Line::from(""));
        lines.push(Self::row("Zoom", self.zoom.to_string()));
        lines.push(match self.midway {
            Some(address) => Self::row("Midway", address.to_string()),
            None => Line::from(Span::styled(
                "No contact with Midway",
                Style::default().fg(Color::Red),
            )),
        });
        if self.anchored {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "⚓ At anchor",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
        }

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
