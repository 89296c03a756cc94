//! Common UI components shared across views.
//!
//! This module contains the header bar, status bar, help overlay, and
//! the display formatting for rates and temperatures. Formatting lives
//! here, not in the estimator: the core reports structured values and
//! the presentation layer decides how they read.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{HealthStatus, RateEstimate, TemperatureReading};

/// Format a rate estimate for display: two decimals, MB/s, or an
/// explicit placeholder. Missing data is never shown as a number.
pub fn format_rate(rate: RateEstimate) -> String {
    match rate {
        RateEstimate::WarmingUp => "measuring...".to_string(),
        RateEstimate::Idle => "idle".to_string(),
        RateEstimate::Rate(mb_per_sec) => format!("{:.2} MB/s", mb_per_sec),
        RateEstimate::Unavailable => "n/a".to_string(),
    }
}

/// Format a temperature reading for display.
pub fn format_temperature(reading: TemperatureReading) -> String {
    match reading {
        TemperatureReading::Celsius(t) => format!("{}\u{00b0}C", t),
        TemperatureReading::Unavailable => "n/a".to_string(),
        TemperatureReading::ToolMissing => "no smartctl".to_string(),
        TemperatureReading::TimedOut => "timeout".to_string(),
    }
}

/// Render the header bar with fleet health overview.
///
/// Displays: status indicator, device counts by health, total throughput.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref report) = app.report else {
        let line = Line::from(vec![
            Span::styled(
                " DISKWATCH ",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("| Scanning for external disks..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    // Count devices by health status
    let mut healthy = 0;
    let mut warning = 0;
    let mut critical = 0;

    for device in report.devices.values() {
        match device.health {
            HealthStatus::Healthy => healthy += 1,
            HealthStatus::Warning => warning += 1,
            HealthStatus::Critical => critical += 1,
        }
    }

    let total = report.device_count();

    // Overall status indicator
    let (status_icon, status_style) = if critical > 0 {
        ("●", app.theme.status_style(HealthStatus::Critical))
    } else if warning > 0 {
        ("●", app.theme.status_style(HealthStatus::Warning))
    } else {
        ("●", app.theme.status_style(HealthStatus::Healthy))
    };

    let line = Line::from(vec![
        Span::styled(format!(" {} ", status_icon), status_style),
        Span::styled("DISKWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            format!("{}", healthy),
            Style::default().fg(app.theme.healthy),
        ),
        Span::raw(" ok "),
        if warning > 0 {
            Span::styled(
                format!("{}", warning),
                Style::default().fg(app.theme.warning),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" warm "),
        if critical > 0 {
            Span::styled(
                format!("{}", critical),
                Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" hot │ "),
        Span::styled(
            format!("{}", total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" disks │ "),
        Span::raw(format!("Σ {:.2} MB/s", report.total_rate())),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows: time since last update, available controls, and tool hints.
/// Also displays temporary status messages and inventory errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(err) = app.load_error() {
        format!(" Error: {} | q:quit r:retry", err)
    } else if let Some(ref report) = app.report {
        let elapsed = report.last_updated.elapsed();

        let hint = if report.temperature_tool_missing() {
            " | temperatures need smartmontools (brew install smartmontools)"
        } else {
            ""
        };

        format!(
            " {} | Updated {:.1}s ago{} | ↑↓:select Enter:detail e:export ?:help q:quit",
            app.source_description(),
            elapsed.as_secs_f64(),
            hint,
        )
    } else {
        " Scanning... | q:quit".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ↑/↓ j/k     Select device"),
        Line::from("  PgUp/PgDn   Jump 10 devices"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       View device detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Refresh now"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 18u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
