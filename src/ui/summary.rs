//! Summary view rendering.
//!
//! Displays all external devices in a table, with RAID sets rendered as
//! labelled sections above their member rows and standalone devices
//! after them.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use super::common::{format_rate, format_temperature};
use crate::app::App;
use crate::data::{DeviceGroup, RateEstimate};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the summary view showing all devices grouped by RAID set.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref report) = app.report else {
        return;
    };

    if report.device_count() == 0 {
        let block = Block::default()
            .title(" External Disks (0) ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border));
        let empty = Paragraph::new("\n  No external disks found.")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Device"),
        Cell::from("Name"),
        Cell::from("Size"),
        Cell::from("Temp"),
        Cell::from("Speed"),
        Cell::from("Trend"),
        Cell::from("Status"),
    ])
    .height(1)
    .style(app.theme.header);

    // Flatten groups into table rows; group headings are unselectable
    // separator rows, so the visual index of the selected device has to
    // be tracked while building.
    let mut rows: Vec<Row> = Vec::new();
    let mut device_row: usize = 0;
    let mut selected_visual: usize = 0;

    for group in &report.groups {
        if let DeviceGroup::Raid { name, members } = group {
            rows.push(
                Row::new(vec![Cell::from(Span::styled(
                    format!("⛓ RAID: {} ({} disks)", name, members.len()),
                    Style::default().fg(app.theme.raid).add_modifier(Modifier::BOLD),
                ))])
                .height(1),
            );
        }

        for id in group.members() {
            let Some(device) = report.devices.get(id) else {
                continue;
            };

            if device_row == app.selected_index {
                selected_visual = rows.len();
            }
            device_row += 1;

            let indent = if matches!(group, DeviceGroup::Raid { .. }) {
                "  "
            } else {
                ""
            };

            let temp_style = app.theme.status_style(device.health);
            let speed_style = match device.rate {
                RateEstimate::Rate(_) => Style::default().add_modifier(Modifier::BOLD),
                _ => Style::default().add_modifier(Modifier::DIM),
            };

            rows.push(Row::new(vec![
                Cell::from(format!("{}{}", indent, device.id)),
                Cell::from(device.attributes.name.clone()),
                Cell::from(device.attributes.size.clone()),
                Cell::from(format_temperature(device.temperature)).style(temp_style),
                Cell::from(format_rate(device.rate)).style(speed_style),
                Cell::from(render_sparkline(&app.history.sparkline(&device.id))),
                Cell::from(device.health.symbol()).style(app.theme.status_style(device.health)),
            ]));
        }
    }

    let widths = [
        Constraint::Min(10),  // Device
        Constraint::Fill(3),  // Name - gets the largest share
        Constraint::Fill(1),  // Size
        Constraint::Min(11),  // Temp
        Constraint::Min(12),  // Speed
        Constraint::Min(8),   // Trend - fixed 8 for sparkline chars
        Constraint::Min(6),   // Status
    ];

    let title = format!(
        " External Disks ({}) [{}/{}] ",
        report.device_count(),
        app.selected_index + 1,
        report.device_count(),
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected_visual));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return "        ".to_string(); // 8 spaces placeholder
    }

    // Take last 8 values
    let values: Vec<u8> = data.iter().rev().take(8).rev().copied().collect();

    values.iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}
