//! Overlay Demo: A movable dialog over a scrolling background.
//!
//! Demonstrates:
//! - Plane stacking and transparency
//! - Incremental composition (only what moved is redrawn)
//! - Terminal resize delivered to the renderer, compositor and root plane
//!
//! Keys: arrows move the dialog, `h` hides/shows it, `r` raises the
//! status line above it, `q`/Esc quits. Set `RUST_LOG=stratum=trace` and
//! redirect stderr to a file to watch the frame logs.

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::execute;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use stratum::{Attrs, Cell, Color, Compositor, PlaneId, PlaneTree, Position, Rect, Renderer, RendererConfig, Size};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DIALOG: Size = Size::new(34, 7);

struct Scene {
    tree: PlaneTree,
    root: PlaneId,
    status: PlaneId,
    dialog: PlaneId,
    dialog_pos: Position,
    dialog_shown: bool,
    tick: u64,
}

impl Scene {
    fn new(size: Size) -> stratum::Result<Self> {
        let mut tree = PlaneTree::new();
        let root = tree.create_root(Position::ORIGIN, size)?;
        let dialog_pos = Position::new(4, 3);
        let dialog = tree.create_child(root, dialog_pos, DIALOG)?;
        let status = tree.create_child(root, Position::ORIGIN, Size::new(size.width, 1))?;

        let mut scene = Self {
            tree,
            root,
            status,
            dialog,
            dialog_pos,
            dialog_shown: true,
            tick: 0,
        };
        scene.draw_dialog();
        scene.draw_background();
        scene.draw_status();
        Ok(scene)
    }

    fn draw_background(&mut self) {
        let Some(plane) = self.tree.get_mut(self.root) else {
            return;
        };
        let width = usize::from(plane.width());
        for y in 1..plane.height() {
            let seed = self.tick as usize + usize::from(y) * 7;
            let line: String = "·· stratum 層 compositor ··"
                .chars()
                .cycle()
                .skip(seed % 27)
                .take(width)
                .collect();
            let shade = 236 + (y % 8) as u8;
            plane.print(0, y, line, Color::Indexed(shade), Color::Default, Attrs::empty());
        }
    }

    fn draw_dialog(&mut self) {
        let Some(plane) = self.tree.get_mut(self.dialog) else {
            return;
        };
        let frame = Color::rgb(30, 30, 60);
        plane.fill(Cell::styled(' ', Color::Default, frame, Attrs::empty()));
        plane.print(2, 1, "Overlay dialog", Color::WHITE, frame, Attrs::BOLD);
        plane.print(2, 3, "arrows: move   h: hide", Color::rgb(200, 200, 120), frame, Attrs::empty());
        plane.print(2, 4, "r: raise status   q: quit", Color::rgb(200, 200, 120), frame, Attrs::empty());
        plane.print(2, 5, "全角 glyphs stay whole", Color::CYAN, frame, Attrs::ITALIC);
    }

    fn draw_status(&mut self) {
        let text = format!(
            " frame {:>6}  dialog at ({}, {}) ",
            self.tick, self.dialog_pos.x, self.dialog_pos.y
        );
        let Some(plane) = self.tree.get_mut(self.status) else {
            return;
        };
        let bar = Color::rgb(0, 95, 135);
        plane.fill_rect(Rect::new(0, 0, plane.width(), 1), Cell::styled(' ', Color::Default, bar, Attrs::empty()));
        plane.print(0, 0, text, Color::WHITE, bar, Attrs::empty());
    }

    fn move_dialog(&mut self, dx: i32, dy: i32) -> stratum::Result<()> {
        self.dialog_pos = Position::new(self.dialog_pos.x + dx, self.dialog_pos.y + dy);
        self.tree.move_to(self.dialog, self.dialog_pos)
    }

    fn resize(&mut self, size: Size) -> stratum::Result<()> {
        self.tree.resize(self.root, size)?;
        self.tree.resize(self.status, Size::new(size.width, 1))?;
        self.draw_background();
        self.draw_status();
        Ok(())
    }
}

fn run(out: &mut impl Write) -> Result<(), Box<dyn std::error::Error>> {
    let (width, height) = terminal::size()?;
    let mut size = Size::new(width, height);
    let mut scene = Scene::new(size)?;
    let mut compositor = Compositor::new(size);
    let mut renderer = Renderer::new(size, RendererConfig::default())?;

    let frame = Duration::from_millis(50);
    let mut next_tick = Instant::now();

    loop {
        let timeout = next_tick.saturating_duration_since(Instant::now());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Left => scene.move_dialog(-1, 0)?,
                    KeyCode::Right => scene.move_dialog(1, 0)?,
                    KeyCode::Up => scene.move_dialog(0, -1)?,
                    KeyCode::Down => scene.move_dialog(0, 1)?,
                    KeyCode::Char('h') => {
                        scene.dialog_shown = !scene.dialog_shown;
                        scene.tree.set_visible(scene.dialog, scene.dialog_shown)?;
                    }
                    KeyCode::Char('r') => scene.tree.raise(scene.status)?,
                    _ => {}
                },
                Event::Resize(w, h) => {
                    size = Size::new(w, h);
                    info!(?size, "terminal resized");
                    renderer.resize(size)?;
                    compositor.resize(size);
                    scene.resize(size)?;
                }
                _ => {}
            }
        }

        if Instant::now() >= next_tick {
            next_tick += frame;
            scene.tick += 1;
            scene.draw_background();
            scene.draw_status();
        }

        compositor.compose(&mut scene.tree, scene.root, renderer.back_mut())?;
        renderer.flush(out)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let result = run(&mut stdout);

    execute!(stdout, LeaveAlternateScreen, crossterm::cursor::Show)?;
    terminal::disable_raw_mode()?;
    result
}
