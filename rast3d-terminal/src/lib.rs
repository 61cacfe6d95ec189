/// Terminal front end for the rast3d rasterizer
use anyhow::Result;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use log::debug;
use nalgebra::Vector3;
use rast3d_core::{CameraAxis, CameraDir};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};

pub mod config;
pub mod demo;
pub mod renderer;

pub use config::AppConfig;
pub use demo::DemoScene;
pub use renderer::AsciiRenderer;

/// Camera travel per key press, as seconds of movement at the camera speed
const KEY_STEP_SECONDS: f32 = 0.1;
/// Camera turn per arrow key press, before the camera's rotation speed is applied
const LOOK_STEP_DEGREES: f32 = 15.0;
/// Camera turn per terminal cell of mouse travel
const MOUSE_DEGREES_PER_CELL: f32 = 8.0;
/// Cube rotation per key press
const CUBE_STEP_DEGREES: f32 = 8.0;

/// What a key press asks the demo to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    Move(CameraDir),
    Look(CameraAxis, f32),
    RotateCube(Vector3<f32>),
}

impl Action {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        let action = match code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('w') => Action::Move(CameraDir::Forward),
            KeyCode::Char('s') => Action::Move(CameraDir::Back),
            KeyCode::Char('a') => Action::Move(CameraDir::Left),
            KeyCode::Char('d') => Action::Move(CameraDir::Right),
            KeyCode::Char('r') => Action::Move(CameraDir::Up),
            KeyCode::Char('f') => Action::Move(CameraDir::Down),
            KeyCode::Left => Action::Look(CameraAxis::Yaw, LOOK_STEP_DEGREES),
            KeyCode::Right => Action::Look(CameraAxis::Yaw, -LOOK_STEP_DEGREES),
            KeyCode::Up => Action::Look(CameraAxis::Pitch, -LOOK_STEP_DEGREES),
            KeyCode::Down => Action::Look(CameraAxis::Pitch, LOOK_STEP_DEGREES),
            KeyCode::Char('l') => Action::RotateCube(Vector3::x() * CUBE_STEP_DEGREES),
            KeyCode::Char('j') => Action::RotateCube(Vector3::x() * -CUBE_STEP_DEGREES),
            KeyCode::Char('i') => Action::RotateCube(Vector3::z() * -CUBE_STEP_DEGREES),
            KeyCode::Char('k') => Action::RotateCube(Vector3::z() * CUBE_STEP_DEGREES),
            KeyCode::Char('o') => Action::RotateCube(Vector3::y() * CUBE_STEP_DEGREES),
            KeyCode::Char('u') => Action::RotateCube(Vector3::y() * -CUBE_STEP_DEGREES),
            _ => return None,
        };
        Some(action)
    }
}

/// Main application struct for the interactive terminal view
pub struct TerminalApp {
    demo: DemoScene,
    presenter: AsciiRenderer,
    running: bool,
    started: Instant,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
    last_mouse: Option<(u16, u16)>,
}

impl TerminalApp {
    pub fn new(demo: DemoScene) -> Result<Self> {
        let (columns, rows) = terminal::size()?;

        Ok(Self {
            demo,
            presenter: AsciiRenderer::new(columns, rows),
            running: true,
            started: Instant::now(),
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
            last_mouse: None,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;

        result
    }

    fn main_loop(&mut self) -> Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::ZERO)? {
                self.handle_event(event::read()?);
            }

            self.demo.update(self.started.elapsed().as_secs_f32());
            self.demo.draw()?;
            self.present()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press | KeyEventKind::Repeat,
                ..
            }) => {
                if let Some(action) = Action::from_key(code) {
                    self.apply(action);
                }
            }
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Moved | MouseEventKind::Drag(_),
                column,
                row,
                ..
            }) => self.mouse_moved(column, row),
            Event::Resize(columns, rows) => {
                debug!("terminal resized to {columns}x{rows}");
                self.presenter.resize(columns, rows);
            }
            _ => {}
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Move(dir) => self.demo.camera_mut().move_in(dir, KEY_STEP_SECONDS),
            Action::Look(axis, degrees) => self.demo.camera_mut().rotate(axis, degrees),
            Action::RotateCube(delta) => self.demo.rotate_cube(delta),
        }
    }

    /// Turn the camera by the mouse travel since the previous event; the first event only
    /// records the position
    fn mouse_moved(&mut self, column: u16, row: u16) {
        if let Some((last_column, last_row)) = self.last_mouse {
            let dx = column as f32 - last_column as f32;
            let dy = row as f32 - last_row as f32;
            let camera = self.demo.camera_mut();
            if dx != 0.0 {
                camera.rotate(CameraAxis::Yaw, -dx * MOUSE_DEGREES_PER_CELL);
            }
            if dy != 0.0 {
                camera.rotate(CameraAxis::Pitch, dy * MOUSE_DEGREES_PER_CELL);
            }
        }
        self.last_mouse = Some((column, row));
    }

    fn present(&mut self) -> Result<()> {
        let mut stdout = stdout();
        self.presenter.draw(self.demo.renderer().pixels(), &mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "rast3d | FPS: {:.1} | WASD/R/F=Move Mouse/Arrows=Look IJKL/U/O=Cube Q=Quit",
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
