use std::io::{Stdout, Write, stdout};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    cursor::Show,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseButton, MouseEventKind,
    },
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use floormap_core::{Color as MapColor, Frame, Raster, Surface};
use floormap_protocol::{RelPos, ShapeId};
use floormap_runtime::{MainCoordinator, spawn_worker};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    widgets::Block,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::Setup;

/// Rows above the map reserved for the header.
const STATUS_ROWS: u16 = 1;
const PAPER: MapColor = MapColor::rgba(1.0, 1.0, 1.0, 1.0);
const INPUT_POLL: Duration = Duration::from_millis(100);

/// The terminal as a drawing surface. Once it is moved into the worker the
/// main context can no longer draw.
pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    raster: Raster,
}

impl TerminalSurface {
    pub fn new(terminal: Terminal<CrosstermBackend<Stdout>>) -> Self {
        Self {
            terminal,
            raster: Raster::new(0, 0, PAPER),
        }
    }

    fn draw(&mut self, frame: &Frame<'_>) -> std::io::Result<()> {
        let size = self.terminal.size()?;
        let area = map_area(size.width, size.height);
        self.raster
            .resize(usize::from(area.width), usize::from(area.height));
        self.raster.present(frame);

        let raster = &self.raster;
        self.terminal.draw(|f| {
            let full = f.area();
            let header = Block::default()
                .title(" floormap | hover a desk, click to select | q quit ")
                .style(Style::default().fg(Color::White).bg(Color::DarkGray));
            f.render_widget(header, Rect::new(0, 0, full.width, STATUS_ROWS.min(full.height)));

            let buf = f.buffer_mut();
            for y in 0..area.height {
                for x in 0..area.width {
                    let Some(color) = raster.cell(usize::from(x), usize::from(y)) else {
                        continue;
                    };
                    let (r, g, b) = color.to_rgb8();
                    if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
                        cell.set_char(' ').set_bg(Color::Rgb(r, g, b));
                    }
                }
            }
        })?;
        Ok(())
    }
}

impl Surface for TerminalSurface {
    fn present(&mut self, frame: &Frame<'_>) {
        if let Err(e) = self.draw(frame) {
            warn!(error = %e, "terminal draw failed");
        }
    }
}

fn map_area(width: u16, height: u16) -> Rect {
    Rect::new(0, STATUS_ROWS, width, height.saturating_sub(STATUS_ROWS))
}

/// Normalize a terminal cell against the map area, using the cell center.
fn rel_pos(column: u16, row: u16, width: u16, height: u16) -> RelPos {
    let area = map_area(width, height);
    RelPos::from_offset(
        f64::from(column) + 0.5,
        f64::from(row.saturating_sub(area.y)) + 0.5,
        f64::from(area.width),
        f64::from(area.height),
    )
}

#[derive(Debug, PartialEq)]
enum Input {
    Moved(RelPos),
    Pressed(RelPos),
    Quit,
}

fn translate(event: Event, (width, height): (u16, u16)) -> Option<Input> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Input::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Input::Quit)
            }
            _ => None,
        },
        // The header is not part of the map.
        Event::Mouse(mouse) if mouse.row < STATUS_ROWS => None,
        Event::Mouse(mouse) => {
            let pos = rel_pos(mouse.column, mouse.row, width, height);
            match mouse.kind {
                MouseEventKind::Moved | MouseEventKind::Drag(_) => Some(Input::Moved(pos)),
                MouseEventKind::Down(MouseButton::Left) => Some(Input::Pressed(pos)),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Read terminal events on a blocking thread until the receiver goes away.
fn spawn_input(tx: mpsc::UnboundedSender<Input>) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while !tx.is_closed() {
            match event::poll(INPUT_POLL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    warn!(error = %e, "polling terminal input failed");
                    break;
                }
            }
            let event = match event::read() {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, "reading terminal input failed");
                    break;
                }
            };
            let size = terminal::size().unwrap_or_default();
            if let Some(input) = translate(event, size)
                && tx.send(input).is_err()
            {
                break;
            }
        }
        debug!("input reader stopped");
    })
}

pub async fn run_interactive(setup: Setup) -> Result<()> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;

    let result = session(setup).await;

    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture, Show)?;

    let clicked = result?;
    let mut out = stdout().lock();
    for shape in &clicked {
        writeln!(out, "clicked {shape}")?;
    }
    Ok(())
}

/// Run until the user quits. Returns the shapes clicked, in order.
async fn session(setup: Setup) -> Result<Vec<ShapeId>> {
    let Setup {
        map,
        config,
        engine,
        timing,
    } = setup;

    let surface = TerminalSurface::new(Terminal::new(CrosstermBackend::new(stdout()))?);
    let clicked = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&clicked);

    let worker = spawn_worker(engine, map, &timing);
    let coordinator = MainCoordinator::start(worker, surface, &config, &timing, move |shape: &ShapeId| {
        sink.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(shape.clone());
    })
    .await?;
    info!("interactive session started");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let input = spawn_input(tx);
    while let Some(event) = rx.recv().await {
        match event {
            Input::Moved(pos) => coordinator.pointer_moved(pos),
            Input::Pressed(pos) => coordinator.pointer_pressed(pos)?,
            Input::Quit => break,
        }
    }
    drop(rx);

    coordinator.shutdown().await;
    let _ = input.await;
    info!("interactive session ended");

    let clicked = std::mem::take(&mut *clicked.lock().unwrap_or_else(PoisonError::into_inner));
    Ok(clicked)
}
