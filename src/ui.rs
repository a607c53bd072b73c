use std::time::{SystemTime, UNIX_EPOCH};

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Paragraph, Widget},
};

use pickr::{
    board::{Emphasis, Marker},
    input::keys::ReleaseMode,
    palette::Rgb,
};

use crate::App;

/// Marker radius in cells; terminal cells are about twice as tall as wide.
const MARKER_RX: f64 = 5.0;
const MARKER_RY: f64 = 2.5;
const OUTLINE: f64 = 1.45;
const CHOSEN_SCALE: f64 = 1.18;
const DIMMED_ALPHA: f64 = 0.35;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let board = self.tracker.renderer();

        for marker in board.markers() {
            let scale = match marker.emphasis {
                Emphasis::Chosen if board.is_pulsing() => CHOSEN_SCALE,
                Emphasis::Bouncing => bounce_scale(),
                _ => 1.0,
            };
            draw_marker(marker, scale, area, buf);
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .vertical_margin(1)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let message = Paragraph::new(Span::styled(
            board.message().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        message.render(chunks[0], buf);

        let legend = match self.release_mode() {
            Some(ReleaseMode::Inferred) => "keys let go once auto-repeat stops / (esc)ape",
            _ => "(esc)ape",
        };
        Paragraph::new(Span::styled(
            legend,
            Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
    }
}

/// Gentle pulse for markers waiting on a decision
fn bounce_scale() -> f64 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let phase = (millis % 600) as f64 / 600.0 * std::f64::consts::TAU;
    1.0 + 0.12 * phase.sin()
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

fn draw_marker(marker: &Marker, scale: f64, area: Rect, buf: &mut Buffer) {
    let rx = MARKER_RX * scale;
    let ry = MARKER_RY * scale;
    let cx = area.x as f64 + marker.position.x;
    let cy = area.y as f64 + marker.position.y;
    let outlined = marker.emphasis == Emphasis::Chosen;

    let fill = match marker.emphasis {
        Emphasis::Dimmed => marker.color.dim(DIMMED_ALPHA),
        _ => marker.color,
    };
    let reach = if outlined { OUTLINE } else { 1.0 };

    let x0 = (cx - rx * reach).floor().max(area.left() as f64) as u16;
    let x1 = (cx + rx * reach).ceil().min(area.right() as f64) as u16;
    let y0 = (cy - ry * reach).floor().max(area.top() as f64) as u16;
    let y1 = (cy + ry * reach).ceil().min(area.bottom() as f64) as u16;

    for y in y0..y1 {
        for x in x0..x1 {
            let dx = (x as f64 + 0.5 - cx) / rx;
            let dy = (y as f64 + 0.5 - cy) / ry;
            let d = (dx * dx + dy * dy).sqrt();

            let bg = if d <= 1.0 {
                fill
            } else if outlined && d <= OUTLINE {
                Rgb::WHITE.dim(0.7)
            } else {
                continue;
            };

            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(' ').set_bg(to_color(bg));
            }
        }
    }

    if let Some(label) = marker.label {
        let (x, y) = (cx.floor(), cy.floor());
        if x >= area.left() as f64 && x < area.right() as f64 && y >= area.top() as f64 && y < area.bottom() as f64 {
            if let Some(cell) = buf.cell_mut((x as u16, y as u16)) {
                cell.set_char(label)
                    .set_fg(Color::White)
                    .set_style(Style::default().add_modifier(Modifier::BOLD));
            }
        }
    }
}
