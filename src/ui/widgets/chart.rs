//! Sea chart: the arena, the grid and every ship Midway reports.

use crate::domain::navigation::{grid_lines, zoom_scale, Viewport, MAX_ZOOM, MIN_ZOOM};
use crate::protocol::{Colour, ShipReport};
use crate::services::MidwayEvent;
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine},
        Block, Borders,
    },
};
use std::collections::BTreeMap;

/// World metres covered by one terminal column at zoom level 0
pub const METRES_PER_CELL: f32 = 20.0;

/// Segments used to draw the arena boundary
const ARENA_SEGMENTS: usize = 180;

const GRID_COLOUR: Color = Color::Rgb(30, 60, 90);
const ARENA_COLOUR: Color = Color::Red;

/// Everything the chart knows about the sea
#[derive(Debug, Clone, Default)]
pub struct ChartState {
    /// Our ship's name
    own: String,
    ships: BTreeMap<String, ShipReport>,
    radius: Option<f32>,
    /// Last known position of our ship
    center: (f32, f32),
    sunk: bool,
    zoom: i32,
}

impl ChartState {
    pub fn new(own: impl Into<String>, zoom: i32) -> Self {
        Self {
            own: own.into(),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            ..Self::default()
        }
    }

    /// Fold one Midway event into the chart
    pub fn apply(&mut self, event: &MidwayEvent) {
        match event {
            MidwayEvent::Ship(report) => {
                if report.name == self.own {
                    self.center = (report.x, report.y);
                }
                self.ships.insert(report.name.clone(), report.clone());
            }
            MidwayEvent::Sunk(name) => {
                if *name == self.own {
                    self.sunk = true;
                }
                self.ships.remove(name);
            }
            MidwayEvent::Radius(radius) => self.radius = Some(*radius),
            MidwayEvent::Disconnected(_) => {}
        }
    }

    pub fn own_name(&self) -> &str {
        &self.own
    }

    pub fn own_ship(&self) -> Option<&ShipReport> {
        self.ships.get(&self.own)
    }

    pub fn ships(&self) -> impl Iterator<Item = &ShipReport> {
        self.ships.values()
    }

    pub fn radius(&self) -> Option<f32> {
        self.radius
    }

    pub fn center(&self) -> (f32, f32) {
        self.center
    }

    /// Whether Midway has reported our ship sunk
    pub fn is_sunk(&self) -> bool {
        self.sunk
    }

    pub fn zoom(&self) -> i32 {
        self.zoom
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom - 1).max(MIN_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom + 1).min(MAX_ZOOM);
    }
}

/// Five-block health bar
pub fn health_bar(health: f32) -> String {
    let filled = (health.clamp(0.0, 1.0) * 5.0).ceil() as usize;
    format!("{}{}", "■".repeat(filled), "□".repeat(5 - filled))
}

fn colour(colour: Colour) -> Color {
    Color::Rgb(colour.r, colour.g, colour.b)
}

/// Chart widget drawn on a braille canvas
///
/// Canvas units are one column wide and half a row tall, which keeps them
/// roughly square. The view is centred on our ship and world `y` (south)
/// points down the screen.
pub struct ChartWidget<'a> {
    state: &'a ChartState,
}

impl<'a> ChartWidget<'a> {
    pub fn new(state: &'a ChartState) -> Self {
        Self { state }
    }
}

impl Widget for ChartWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue))
            .title(format!(" Chart (zoom {}) ", self.state.zoom));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let width = f32::from(inner.width);
        let height = f32::from(inner.height) * 2.0;
        let viewport = Viewport::new(
            zoom_scale(self.state.zoom) / METRES_PER_CELL,
            self.state.center,
            (width / 2.0, height / 2.0),
        );

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, f64::from(width)])
            .y_bounds([0.0, f64::from(height)])
            .paint(|ctx| {
                draw_grid(ctx, &viewport, width, height);
                if let Some(radius) = self.state.radius {
                    draw_arena(ctx, &viewport, radius, height);
                }
                ctx.layer();
                for ship in self.state.ships() {
                    draw_ship(ctx, &viewport, ship, height);
                }
            })
            .render(inner, buf);
    }
}

/// Screen units (y down) to canvas units (y up)
fn to_canvas(point: (f32, f32), height: f32) -> (f64, f64) {
    (f64::from(point.0), f64::from(height - point.1))
}

fn draw_grid(ctx: &mut Context<'_>, viewport: &Viewport, width: f32, height: f32) {
    let (min_x, min_y) = viewport.reverse_transform((0.0, 0.0));
    let (max_x, max_y) = viewport.reverse_transform((width, height));

    for x in grid_lines(min_x, max_x) {
        let (sx, _) = viewport.transform((x, 0.0));
        ctx.draw(&CanvasLine {
            x1: f64::from(sx),
            y1: 0.0,
            x2: f64::from(sx),
            y2: f64::from(height),
            color: GRID_COLOUR,
        });
    }
    for y in grid_lines(min_y, max_y) {
        let (_, sy) = viewport.transform((0.0, y));
        let cy = f64::from(height - sy);
        ctx.draw(&CanvasLine {
            x1: 0.0,
            y1: cy,
            x2: f64::from(width),
            y2: cy,
            color: GRID_COLOUR,
        });
    }
}

fn draw_arena(ctx: &mut Context<'_>, viewport: &Viewport, radius: f32, height: f32) {
    let point = |i: usize| {
        let theta = i as f32 / ARENA_SEGMENTS as f32 * std::f32::consts::TAU;
        let world = (radius * theta.cos(), radius * theta.sin());
        to_canvas(viewport.transform(world), height)
    };
    for i in 0..ARENA_SEGMENTS {
        let (x1, y1) = point(i);
        let (x2, y2) = point(i + 1);
        ctx.draw(&CanvasLine {
            x1,
            y1,
            x2,
            y2,
            color: ARENA_COLOUR,
        });
    }
}

fn draw_ship(ctx: &mut Context<'_>, viewport: &Viewport, ship: &ShipReport, height: f32) {
    let (x, y) = to_canvas(viewport.transform((ship.x, ship.y)), height);
    let half = f64::from(viewport.scale_len(ship.size).max(1.0)) / 2.0;
    // Bow direction in canvas units; angle 0 is north
    let (dx, dy) = (
        f64::from(ship.angle.sin()) * half,
        f64::from(ship.angle.cos()) * half,
    );
    let color = colour(ship.colour);

    ctx.draw(&CanvasLine {
        x1: x - dx,
        y1: y - dy,
        x2: x + dx,
        y2: y + dy,
        color,
    });
    ctx.print(
        x,
        y,
        Span::styled(
            ship.hull.glyph().to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    );
    let mut label = vec![Span::styled(ship.name.clone(), Style::default().fg(color))];
    if ship.health < 1.0 {
        label.push(Span::raw(" "));
        label.push(Span::styled(
            health_bar(ship.health),
            Style::default().fg(Color::Green),
        ));
    }
    ctx.print(x + 2.0, y, Line::from(label));
}
