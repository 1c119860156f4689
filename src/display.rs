use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::{Alignment, Rect};
use tui::style::{Color, Modifier, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders, Paragraph};
use tui::Terminal;

/// reference framebuffer width
pub const COLUMNS: usize = 64;
/// reference framebuffer height
pub const ROWS: usize = 32;

/// Monochrome framebuffer, row-major. Coordinates always wrap; nothing is
/// ever clipped.
pub struct VideoMemory {
    cells: Vec<bool>,
    columns: usize,
    rows: usize,
}

impl VideoMemory {
    pub fn new(columns: usize, rows: usize) -> Self {
        VideoMemory {
            cells: vec![false; columns * rows],
            columns,
            rows,
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        (y % self.rows) * self.columns + (x % self.columns)
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = false);
    }

    /// XOR one cell; true if that erased a lit pixel (a collision)
    pub fn set_pixel(&mut self, x: usize, y: usize) -> bool {
        let idx = self.index(x, y);
        let was_set = self.cells[idx];
        self.cells[idx] = !was_set;
        was_set
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.cells[self.index(x, y)]
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            cells: &self.cells,
            columns: self.columns,
            rows: self.rows,
        }
    }
}

impl Default for VideoMemory {
    fn default() -> Self {
        VideoMemory::new(COLUMNS, ROWS)
    }
}

/// Read-only view of a framebuffer, handed to renderers once per frame.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    cells: &'a [bool],
    columns: usize,
    rows: usize,
}

impl<'a> Snapshot<'a> {
    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.cells[(y % self.rows) * self.columns + (x % self.columns)]
    }

    /// coordinates of every lit cell, row by row
    pub fn lit(&self) -> impl Iterator<Item = (usize, usize)> + 'a {
        let w = self.columns;
        let cells: &'a [bool] = self.cells;
        cells
            .iter()
            .enumerate()
            .filter(|(_, lit)| **lit)
            .map(move |(i, _)| (i % w, i / w))
    }

    /// owned copy, for handing a frame to another thread
    pub fn to_vec(&self) -> Vec<bool> {
        self.cells.to_vec()
    }
}

/// Display is used by the controller to put a frame on the screen. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work.
pub trait Display {
    /// draw one frame; `paused` asks for the pause overlay
    fn draw(&mut self, frame: &Snapshot, paused: bool) -> Result<(), io::Error>;
}

// store useful metadata about the canvas
struct Resolution(usize, usize);

impl Resolution {
    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// frame plus a one-cell border on each side
    fn area(&self) -> Rect {
        Rect::new(0, 0, 2 + self.0 as u16, 2 + self.1 as u16)
    }

    /// lit cells as canvas coords; y grows downwards on screen so flip it
    fn points(frame: &Snapshot) -> Vec<(f64, f64)> {
        frame
            .lit()
            .map(|(x, y)| (x as f64, -1.0 * y as f64))
            .collect()
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct TermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl TermDisplay {
    pub fn new(x: usize, y: usize) -> Result<TermDisplay, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(TermDisplay {
            terminal,
            resolution: Resolution(x, y),
        })
    }
}

impl Drop for TermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
    }
}

impl Display for TermDisplay {
    fn draw(&mut self, frame: &Snapshot, paused: bool) -> Result<(), io::Error> {
        // for now this assumes a 1:1 ratio between terminal cells and chip8
        // pixels
        let resolution = &self.resolution;
        let points = Resolution::points(frame);
        self.terminal.draw(|f| {
            let size = resolution.area().intersection(f.size());

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &points,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);

            if paused {
                let mid = Rect::new(
                    size.x + 1,
                    size.y + size.height / 2,
                    size.width.saturating_sub(2),
                    1,
                )
                .intersection(size);
                let overlay = Paragraph::new("PAUSED")
                    .style(
                        Style::default()
                            .fg(Color::Red)
                            .bg(Color::Black)
                            .add_modifier(Modifier::BOLD),
                    )
                    .alignment(Alignment::Center);
                f.render_widget(overlay, mid);
            }
        })?;
        Ok(())
    }
}

/// useful for testing the controller without a terminal
#[derive(Default)]
pub struct DummyDisplay {
    pub frames: usize,
    pub lit: usize,
    pub paused: bool,
}

impl DummyDisplay {
    pub fn new() -> DummyDisplay {
        DummyDisplay::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, frame: &Snapshot, paused: bool) -> Result<(), io::Error> {
        self.frames += 1;
        self.lit = frame.lit().count();
        self.paused = paused;
        Ok(())
    }
}
