/// Terminal front end: software framebuffer, crossterm presenter and frame loop
use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue, terminal,
};
use log::info;
use std::io::{stdout, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use strata_core::{
    grid::DEFAULT_CELL_SIZE_PX, load_texture_or_warn, Camera, Color, GridPlane, LayeredScene,
    Mesh, MeshRenderer, OverlayPlane, Quaternion, RenderConfig, SceneCamera, TextureHandle,
    UvRect, Vertex, PLAYER_TINT,
};

pub mod framebuffer;
pub mod renderer;
pub mod stl;
pub mod texture;

pub use framebuffer::Framebuffer;
pub use renderer::TerminalPresenter;
pub use stl::load_stl;
pub use texture::{Texture, TextureStore};

/// Radians the player spins per frame.
const PLAYER_SPIN: f32 = 0.02;
/// Normalized viewport units the layered camera pans per key press.
const PAN_STEP: f32 = 0.05;
const MAP_RADIUS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveScene {
    Tiles,
    Layers,
}

/// Interactive demo with a 3-D tile map and a layered parallax scene.
pub struct TerminalApp {
    config: RenderConfig,
    framebuffer: Framebuffer,
    presenter: TerminalPresenter,
    active: ActiveScene,
    map: Mesh,
    player: Mesh,
    player_pos: Vertex,
    camera: Camera,
    layers: LayeredScene,
    scene_camera: SceneCamera,
    running: bool,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Builds both scenes for a viewport of `config.window_width` by
    /// `config.window_height` cells. `texture` is optional decoration for
    /// the layered scene; failing to load it is not fatal.
    pub fn new(config: RenderConfig, texture: Option<&Path>) -> Result<Self> {
        config.validate().context("invalid render configuration")?;

        let mut framebuffer =
            Framebuffer::new(config.window_width as usize, config.window_height as usize);
        let texture =
            texture.and_then(|path| load_texture_or_warn(framebuffer.textures_mut(), path));

        let map = build_map(&config).context("failed to build tile map")?;
        let mut player = Mesh::with_limit(config.max_triangles).with_tint(PLAYER_TINT);
        player
            .add_tile(-0.5, -0.5, 0.0)
            .context("failed to build player mesh")?;
        let layers = build_layers(&config, texture);
        info!(
            "scenes ready: {} map triangles, {} layers, viewport {}x{}",
            map.len(),
            layers.len(),
            config.window_width,
            config.window_height
        );

        Ok(Self {
            camera: Camera::from_config(&config),
            framebuffer,
            presenter: TerminalPresenter::new(),
            active: ActiveScene::Tiles,
            map,
            player,
            player_pos: Vertex::point(0.0, 0.0, 0.0),
            layers,
            scene_camera: SceneCamera::default(),
            running: true,
            last_fps_sample: Instant::now(),
            frame_count: 0,
            fps: 0.0,
            config,
        })
    }

    pub fn active_scene(&self) -> ActiveScene {
        self.active
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> Result<()> {
        terminal::enable_raw_mode().context("failed to enable raw mode")?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> Result<()> {
        let target_frame_time = Duration::from_secs_f32(self.config.target_frame_delta() / 1000.0);

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                    if kind != KeyEventKind::Release {
                        self.handle_key(code);
                    }
                }
            }

            self.update();
            self.render_frame().context("frame render failed")?;
            self.present()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_fps_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_fps_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_fps_sample = now;
            }
        }

        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        let (dx, dy) = match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
                return;
            }
            KeyCode::Tab => {
                self.active = match self.active {
                    ActiveScene::Tiles => ActiveScene::Layers,
                    ActiveScene::Layers => ActiveScene::Tiles,
                };
                return;
            }
            KeyCode::Char('w') | KeyCode::Up => (0.0, -1.0),
            KeyCode::Char('s') | KeyCode::Down => (0.0, 1.0),
            KeyCode::Char('a') | KeyCode::Left => (-1.0, 0.0),
            KeyCode::Char('d') | KeyCode::Right => (1.0, 0.0),
            _ => return,
        };

        match self.active {
            ActiveScene::Tiles => {
                // World y points up while screen rows grow downwards.
                self.player.translate(dx, -dy, 0.0);
                self.player_pos.translate(dx, -dy, 0.0);
                self.camera.translate(dx, -dy, 0.0);
            }
            ActiveScene::Layers => self.scene_camera.pan(dx * PAN_STEP, dy * PAN_STEP),
        }
    }

    fn update(&mut self) {
        let spin = Quaternion::from_axis_angle(Vertex::direction(0.0, 0.0, 1.0), PLAYER_SPIN);
        self.player.rotate_about(&spin, self.player_pos);
    }

    /// Draws the active scene into the framebuffer and returns the number of
    /// triangles submitted.
    pub fn render_frame(&mut self) -> strata_core::Result<usize> {
        self.framebuffer.clear(Color::BLACK);
        match self.active {
            ActiveScene::Tiles => {
                let (width, height) = self.config.viewport();
                let renderer = MeshRenderer::new(
                    self.camera.projection_matrix(),
                    self.camera.view_matrix(),
                    Vertex::direction(0.0, 0.0, 1.0),
                    width,
                    height,
                )
                .with_options(self.config.render_options());
                let map = renderer.render(&mut self.framebuffer, &self.map)?;
                let player = renderer.render(&mut self.framebuffer, &self.player)?;
                Ok(map + player)
            }
            ActiveScene::Layers => {
                let stats = self
                    .layers
                    .render(&mut self.framebuffer, &self.scene_camera, &self.config)?;
                Ok(stats.triangles)
            }
        }
    }

    fn present(&mut self) -> Result<()> {
        let scene = match self.active {
            ActiveScene::Tiles => "tiles",
            ActiveScene::Layers => "layers",
        };
        self.presenter.set_status(format!(
            "Strata | {} | FPS: {:.1} | WASD=Move Tab=Scene Q=Quit",
            scene, self.fps
        ));

        let mut out = stdout();
        queue!(out, cursor::MoveTo(0, 0))?;
        self.presenter
            .present(&self.framebuffer, &mut out)
            .context("failed to write frame to terminal")?;
        out.flush()?;
        Ok(())
    }
}

/// Three stacked 10x10 tile floors around the origin.
fn build_map(config: &RenderConfig) -> strata_core::Result<Mesh> {
    let mut map = Mesh::with_limit(config.max_triangles);
    for z in 0..3 {
        for r in -MAP_RADIUS..MAP_RADIUS {
            for c in -MAP_RADIUS..MAP_RADIUS {
                map.add_tile(c as f32, r as f32, z as f32)?;
            }
        }
    }
    Ok(map)
}

fn build_layers(config: &RenderConfig, texture: Option<TextureHandle>) -> LayeredScene {
    let mut scene = LayeredScene::new();

    // Near to far in storage; the world pass draws them back to front.
    let mut grid = GridPlane::new(
        0.0,
        config.default_parallax,
        false,
        DEFAULT_CELL_SIZE_PX / 8,
        config,
    );
    for gy in -2..2 {
        for gx in -4..4 {
            let color = if (gx + gy) % 2 == 0 {
                Color::rgb(60, 160, 60)
            } else {
                Color::rgb(40, 110, 40)
            };
            grid.set_cell(gx, gy, color, texture, Some(UvRect::new(0.0, 0.0, 0.5, 0.5)));
        }
    }
    scene.add_plane(grid);

    scene
        .create_layer(1.0, 0.5, false)
        .add_quad(-0.8, -0.1, 0.5, 0.4, Color::rgb(90, 90, 140), None, None)
        .add_quad(0.2, -0.2, 0.6, 0.5, Color::rgb(70, 70, 120), None, None);
    scene
        .create_layer(3.0, 0.2, false)
        .add_quad(-10.0, -10.0, 20.0, 20.0, Color::rgb(20, 30, 70), None, None);

    let mut hud = OverlayPlane::new(0.0);
    hud.add_quad(0.0, 0.9, 1.0, 0.1, Color::new(0, 0, 0, 160), None, None)
        .add_quad(0.02, 0.92, 0.1, 0.06, Color::YELLOW, None, None);
    scene.add_plane(hud);

    scene
}
