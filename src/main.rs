// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing_subscriber::EnvFilter;

mod app;
mod data;
mod events;
mod source;
mod ui;

use app::App;
use data::Thresholds;
use source::{CommandRunner, DiskutilInventory, ToolProbe};

#[derive(Parser, Debug)]
#[command(name = "diskwatch")]
#[command(about = "Terminal dashboard for monitoring external disk temperature and I/O throughput")]
struct Args {
    /// Poll interval in seconds
    #[arg(short, long, default_value = "2")]
    interval: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logging goes to stderr and stays silent unless RUST_LOG is set;
    // the alternate screen owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")))
        .with_writer(io::stderr)
        .init();

    let runner = Arc::new(CommandRunner::new()?);
    let inventory = Box::new(DiskutilInventory::new(Arc::clone(&runner)));
    let probe = Box::new(ToolProbe::new(runner));

    let interval = Duration::from_secs(args.interval.max(1));
    run_tui(
        App::new(inventory, probe, Thresholds::default()),
        interval,
    )
}

/// Run the TUI with the given application state
fn run_tui(mut app: App, refresh_interval: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    // First collection pass before the loop so the initial frame has data
    app.refresh();

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, refresh_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 10;

    while app.running {
        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5.min(area.height),
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Min(6),    // Device table
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            // Render header with fleet health
            ui::common::render_header(frame, app, chunks[0]);

            // Render the grouped device table
            ui::summary::render(frame, app, chunks[1]);

            // Render status bar
            ui::common::render_status_bar(frame, app, chunks[2]);

            // Render detail overlay if active
            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }

            // Render help overlay if active
            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Run a collection pass on the polling cadence
        if last_refresh.elapsed() >= refresh_interval {
            app.refresh();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}
