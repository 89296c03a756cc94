//! Detail overlay rendering.
//!
//! Displays a modal overlay with everything known about the selected
//! device.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::common::{format_rate, format_temperature};
use crate::app::App;
use crate::data::{DeviceGroup, DeviceId, DiskReport};

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 44;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 12;

/// Render the device detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(ref report) = app.report else {
        return;
    };
    let Some(device) = app.selected_device() else {
        return;
    };

    let overlay_width = (area.width * 70 / 100).clamp(MIN_OVERLAY_WIDTH, 80);
    let overlay_height = MIN_OVERLAY_HEIGHT.min(area.height.saturating_sub(2));

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Min(9),    // Device info
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    let health_style = app.theme.status_style(device.health);
    let label_style = Style::default().add_modifier(Modifier::DIM);

    let lines = vec![
        Line::from(vec![Span::styled(
            format!(" {} ", device.attributes.name),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Device:       ", label_style),
            Span::raw(device.id.dev_path()),
        ]),
        Line::from(vec![
            Span::styled(" Size:         ", label_style),
            Span::raw(device.attributes.size.clone()),
        ]),
        Line::from(vec![
            Span::styled(" Group:        ", label_style),
            Span::raw(group_label(report, &device.id)),
        ]),
        Line::from(vec![
            Span::styled(" Temperature:  ", label_style),
            Span::styled(format_temperature(device.temperature), health_style),
            Span::raw("  "),
            Span::styled(device.health.symbol(), health_style),
        ]),
        Line::from(vec![
            Span::styled(" Speed:        ", label_style),
            Span::styled(
                format_rate(device.rate),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let block = Block::default()
        .title(" Device Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Paragraph::new(lines).block(block), chunks[0]);

    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " Press Esc to close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[1]);
}

/// Label for the group a device belongs to.
fn group_label(report: &DiskReport, id: &DeviceId) -> String {
    for group in &report.groups {
        if let DeviceGroup::Raid { name, members } = group {
            if members.contains(id) {
                return format!("RAID: {}", name);
            }
        }
    }
    "Standalone".to_string()
}
