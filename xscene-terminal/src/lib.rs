/// Terminal-based ASCII viewer for scene trees
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use log::debug;
use nalgebra::{Matrix4, Rotation3, Vector3};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use xscene_core::{Camera, ProjectionMode};

pub mod cli;
pub mod demo;
pub mod renderer;
pub mod view;

pub use renderer::AsciiRenderer;
pub use view::SceneView;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: u32 = 2;

/// Viewer settings taken from the command line
#[derive(Debug, Clone, Copy)]
pub struct AppOptions {
    pub fps: u32,
    pub spin: bool,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self { fps: 30, spin: true }
    }
}

/// Yaw/pitch orbit of the scene around its bounding box centre
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orbit {
    pub yaw: f32,
    pub pitch: f32,
}

impl Orbit {
    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-1.5, 1.5);
    }

    /// Model matrix rotating the scene about `pivot`
    pub fn model_matrix(&self, pivot: &Vector3<f32>) -> Matrix4<f32> {
        let rotation = Rotation3::from_euler_angles(self.pitch, self.yaw, 0.0);
        Matrix4::new_translation(pivot) * rotation.to_homogeneous() * Matrix4::new_translation(&-pivot)
    }
}

/// Main application struct for terminal scene viewing
pub struct TerminalApp {
    view: SceneView,
    options: AppOptions,
    orbit: Orbit,
    camera: Camera,
    renderer: AsciiRenderer,
    running: bool,
    show_bounds: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(view: SceneView, options: AppOptions) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let camera = Camera::framing(&view.world_bounds(), width as u32, height as u32 * CELL_ASPECT);
        debug!("camera at {:?} looking at {:?}", camera.position, camera.target);

        Ok(Self {
            view,
            options,
            orbit: Orbit::default(),
            camera,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            show_bounds: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / u64::from(self.options.fps.max(1)));

        while self.running {
            let frame_start = Instant::now();

            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            if self.options.spin {
                self.orbit.rotate(0.015, 0.0);
            }

            self.render()?;

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

    fn handle_input(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                KeyCode::Char('w') | KeyCode::Up => self.orbit.rotate(0.0, -0.1),
                KeyCode::Char('s') | KeyCode::Down => self.orbit.rotate(0.0, 0.1),
                KeyCode::Char('a') | KeyCode::Left => self.orbit.rotate(-0.1, 0.0),
                KeyCode::Char('d') | KeyCode::Right => self.orbit.rotate(0.1, 0.0),
                KeyCode::Char(' ') => self.options.spin = !self.options.spin,
                KeyCode::Char('b') => self.show_bounds = !self.show_bounds,
                KeyCode::Char('p') => {
                    self.camera.mode = match self.camera.mode {
                        ProjectionMode::Perspective => ProjectionMode::Orthographic,
                        ProjectionMode::Orthographic => ProjectionMode::Perspective,
                    };
                }
                _ => {}
            },
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
        Ok(())
    }

    fn resize(&mut self, width: u16, height: u16) {
        let mode = self.camera.mode;
        self.camera = Camera::framing(
            &self.view.world_bounds(),
            width as u32,
            height as u32 * CELL_ASPECT,
        );
        self.camera.mode = mode;
        self.renderer = AsciiRenderer::new(width as usize, height as usize);
    }

    fn render(&mut self) -> io::Result<()> {
        let pivot = self.view.world_bounds().center().coords;
        let model = self.orbit.model_matrix(&pivot);

        self.renderer.clear();
        for mesh in self.view.meshes() {
            self.renderer.render_mesh(mesh, &model, &self.camera);
        }

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.draw(&mut stdout)?;

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "xscene | {} nodes | FPS: {:.1} | WASD/Arrows=Orbit Space=Spin P=Projection B=Bounds Q=Quit",
                self.view.tree().len(),
                self.fps
            )),
        )?;
        if self.show_bounds {
            queue!(stdout, cursor::MoveTo(0, 1), Print(self.view.bounds_summary()))?;
        }
        queue!(stdout, ResetColor)?;

        stdout.flush()?;
        Ok(())
    }
}
