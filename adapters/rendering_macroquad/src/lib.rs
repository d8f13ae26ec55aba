#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the isometric grid generator.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Tiles are painted as flat diamonds and obstacles as raised blocks, both in
//! the scene graph's draw order. All UI-specific calls live inside the local
//! `ui` module to avoid leaking Macroquad UI types throughout the renderer.

mod ui;

use self::ui::{draw_control_panel_ui, ControlPanelUiContext, ControlPanelUiResult};
use anyhow::Result;
use glam::Vec2;
use isogrid_core::{ElementKind, ScreenPosition};
use isogrid_rendering::{
    Color, FrameInput, Presentation, RenderingBackend, Scene, SceneNode, ViewTransform,
};
use isogrid_system_projection::{TILE_HEIGHT, TILE_WIDTH};
use log::info;
use macroquad::input::{is_key_pressed, KeyCode};
use macroquad::math::Vec2 as MacroquadVec2;
use std::time::{Duration, Instant};

/// Fraction of a tile's diamond covered by an obstacle's footprint.
const OBSTACLE_FOOTPRINT: f32 = 0.6;

/// Height of an obstacle block in world units.
const OBSTACLE_HEIGHT: f32 = 0.6;

/// Free space kept around the grid in pixels.
const VIEW_MARGIN: f32 = 24.0;

/// Which parameter a control-panel stepper adjusts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterStep {
    /// Grid width.
    Width,
    /// Grid height.
    Height,
    /// Obstacle count.
    Obstacles,
}

/// Tracks UI-sourced interactions so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlPanelInputState {
    generate_latched: bool,
    width_delta: i32,
    height_delta: i32,
    obstacle_delta: i32,
}

impl ControlPanelInputState {
    /// Returns whether the UI requested a generation and clears the latch so the
    /// action fires only once.
    pub fn take_generate(&mut self) -> bool {
        let latched = self.generate_latched;
        self.generate_latched = false;
        latched
    }

    /// Records that the control-panel button requested a generation this frame.
    pub fn register_generate(&mut self) {
        self.generate_latched = true;
    }

    /// Accumulates a stepper press until the next frame consumes it.
    pub fn register_step(&mut self, step: ParameterStep, delta: i32) {
        let slot = match step {
            ParameterStep::Width => &mut self.width_delta,
            ParameterStep::Height => &mut self.height_delta,
            ParameterStep::Obstacles => &mut self.obstacle_delta,
        };
        *slot = slot.saturating_add(delta);
    }

    /// Builds the frame input from latched UI actions and the keyboard
    /// shortcut, clearing the latches.
    pub fn take_frame_input(&mut self, generate_shortcut: bool) -> FrameInput {
        let input = FrameInput {
            generate_pressed: self.take_generate() || generate_shortcut,
            width_delta: self.width_delta,
            height_delta: self.height_delta,
            obstacle_delta: self.obstacle_delta,
        };
        self.width_delta = 0;
        self.height_delta = 0;
        self.obstacle_delta = 0;
        input
    }

    fn register(&mut self, result: ControlPanelUiResult) {
        if result.generate_pressed {
            self.register_generate();
        }
        self.register_step(ParameterStep::Width, result.width_delta);
        self.register_step(ParameterStep::Height, result.height_delta);
        self.register_step(ParameterStep::Obstacles, result.obstacle_delta);
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the loop.
    quit_requested: bool,
    /// `G` or `Space` to generate a new grid.
    generate: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            generate: is_key_pressed(KeyCode::G) || is_key_pressed(KeyCode::Space),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    target_fps: Option<u32>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs the frame rate once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Caps the frame rate by sleeping away the rest of each frame's budget.
    #[must_use]
    pub fn with_target_fps(mut self, target_fps: Option<u32>) -> Self {
        self.target_fps = target_fps.filter(|fps| *fps > 0);
        self
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    /// Records a frame and returns the average rate once a second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }
        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            target_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 1024,
            window_height: 720,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }
        let frame_budget = target_fps.map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps)));

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut control_panel_input = ControlPanelInputState::default();

            loop {
                let frame_start = Instant::now();
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = control_panel_input.take_frame_input(keyboard.generate);

                update_scene(frame_dt, frame_input, &mut scene);

                let viewport = Vec2::new(
                    (screen_width - panel_width(&scene, screen_width)).max(0.0),
                    screen_height,
                );
                if let Some(view) = scene_view(&scene, viewport) {
                    draw_grid(&scene, &view);
                } else {
                    let _ = macroquad::text::draw_text(
                        "Press G or use the Generate button.",
                        VIEW_MARGIN,
                        VIEW_MARGIN * 2.0,
                        24.0,
                        macroquad::color::WHITE,
                    );
                }

                if let Some(panel_context) = draw_control_panel(&scene, screen_width, screen_height)
                {
                    let mut control_panel_ui = macroquad::ui::root_ui();
                    let result = draw_control_panel_ui(&mut control_panel_ui, panel_context);
                    control_panel_input.register(result);
                }

                if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                    if show_fps {
                        info!("FPS: {per_second:.2}");
                    }
                }

                if let Some(budget) = frame_budget {
                    let spent = frame_start.elapsed();
                    if spent < budget {
                        std::thread::sleep(budget - spent);
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn panel_width(scene: &Scene, screen_width: f32) -> f32 {
    scene
        .control_panel
        .map(|panel| panel.width.max(0.0))
        .unwrap_or(0.0)
        .min(screen_width)
}

/// Fits the drawn extent of the scene, including diamond corners and
/// obstacle tops, into the viewport.
fn scene_view(scene: &Scene, viewport: Vec2) -> Option<ViewTransform> {
    let (min, max) = scene.graph.bounds()?;
    let half = ScreenPosition::new(TILE_WIDTH * 0.5, TILE_HEIGHT * 0.5);
    let lift = ScreenPosition::new(0.0, OBSTACLE_HEIGHT);
    Some(ViewTransform::fit(
        min - half,
        max + half + lift,
        viewport,
        VIEW_MARGIN,
    ))
}

fn draw_grid(scene: &Scene, view: &ViewTransform) {
    for node in scene.graph.draw_order() {
        let Some(position) = scene.graph.world_position(node.handle) else {
            continue;
        };
        let center = view.to_screen(position);
        let color = scene.palette.color_for(node.kind, node.variant);
        draw_node(node, center, view.scale(), color);
    }
}

fn draw_node(node: &SceneNode, center: Vec2, scale: f32, color: Color) {
    match node.kind {
        ElementKind::Tile => {
            let corners = diamond(center, TILE_WIDTH * 0.5 * scale, TILE_HEIGHT * 0.5 * scale);
            draw_quad(corners, color);
            draw_outline(corners, color.darken(0.3));
        }
        ElementKind::Obstacle => draw_obstacle(center, scale, color),
    }
}

fn draw_obstacle(center: Vec2, scale: f32, color: Color) {
    let half_width = TILE_WIDTH * 0.5 * OBSTACLE_FOOTPRINT * scale;
    let half_height = TILE_HEIGHT * 0.5 * OBSTACLE_FOOTPRINT * scale;
    let lift = Vec2::new(0.0, OBSTACLE_HEIGHT * scale);

    let base = diamond(center, half_width, half_height);
    let top = base.map(|corner| corner - lift);
    let [_, right, bottom, left] = base;
    let [_, top_right, top_bottom, top_left] = top;

    draw_quad([left, bottom, top_bottom, top_left], color.darken(0.35));
    draw_quad([bottom, right, top_right, top_bottom], color.darken(0.2));
    draw_quad(top, color.lighten(0.1));
    draw_outline(top, color.darken(0.5));
}

/// Corners of a diamond ordered top, right, bottom, left.
fn diamond(center: Vec2, half_width: f32, half_height: f32) -> [Vec2; 4] {
    [
        center - Vec2::new(0.0, half_height),
        center + Vec2::new(half_width, 0.0),
        center + Vec2::new(0.0, half_height),
        center - Vec2::new(half_width, 0.0),
    ]
}

fn draw_quad(corners: [Vec2; 4], color: Color) {
    let color = to_macroquad_color(color);
    let [a, b, c, d] = corners.map(to_macroquad_vec);
    macroquad::shapes::draw_triangle(a, b, c, color);
    macroquad::shapes::draw_triangle(a, c, d, color);
}

fn draw_outline(corners: [Vec2; 4], color: Color) {
    let color = to_macroquad_color(color);
    for index in 0..corners.len() {
        let from = corners[index];
        let to = corners[(index + 1) % corners.len()];
        macroquad::shapes::draw_line(from.x, from.y, to.x, to.y, 1.0, color);
    }
}

fn draw_control_panel<'a>(
    scene: &'a Scene,
    screen_width: f32,
    screen_height: f32,
) -> Option<ControlPanelUiContext<'a>> {
    let panel = scene.control_panel?;
    if panel.width <= f32::EPSILON {
        return None;
    }

    let left = (screen_width - panel.width).max(0.0);
    let background_color = to_macroquad_color(panel.background);
    macroquad::shapes::draw_rectangle(left, 0.0, panel.width, screen_height, background_color);

    Some(ControlPanelUiContext {
        origin: MacroquadVec2::new(left, 0.0),
        size: MacroquadVec2::new(panel.width, screen_height),
        background: background_color,
        status: &scene.status,
    })
}

fn to_macroquad_vec(point: Vec2) -> MacroquadVec2 {
    MacroquadVec2::new(point.x, point.y)
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
