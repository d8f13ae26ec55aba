#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for isometric grid adapters.

mod scene_graph;
mod view;

use anyhow::Result as AnyResult;
use isogrid_core::{ElementKind, GridParameters, VariantId};
use std::time::Duration;

pub use scene_graph::{SceneGraph, SceneNode};
pub use view::ViewTransform;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        self.map_channels(|channel| channel + (1.0 - channel) * amount)
    }

    /// Returns a new color darkened towards black by the provided amount.
    #[must_use]
    pub fn darken(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        self.map_channels(|channel| channel * (1.0 - amount))
    }

    fn map_channels(self, adjust: impl Fn(f32) -> f32) -> Self {
        Self {
            red: adjust(self.red),
            green: adjust(self.green),
            blue: adjust(self.blue),
            alpha: self.alpha,
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Whether the generate button or its shortcut was pressed on this frame.
    pub generate_pressed: bool,
    /// Requested change of the grid width.
    pub width_delta: i32,
    /// Requested change of the grid height.
    pub height_delta: i32,
    /// Requested change of the obstacle count.
    pub obstacle_delta: i32,
}

impl FrameInput {
    /// Reports whether any parameter stepper was used.
    #[must_use]
    pub const fn adjusts_parameters(&self) -> bool {
        self.width_delta != 0 || self.height_delta != 0 || self.obstacle_delta != 0
    }
}

/// Colors assigned to tile and obstacle variants.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariantPalette {
    tiles: Vec<Color>,
    obstacles: Vec<Color>,
}

impl VariantPalette {
    /// Color used for variants without a palette entry.
    pub const MISSING: Color = Color::new(1.0, 0.0, 1.0, 1.0);

    /// Creates a palette indexed by variant identifier.
    #[must_use]
    pub fn new(tiles: Vec<Color>, obstacles: Vec<Color>) -> Self {
        Self { tiles, obstacles }
    }

    /// Color of the variant, or [`Self::MISSING`] if none was configured.
    #[must_use]
    pub fn color_for(&self, kind: ElementKind, variant: VariantId) -> Color {
        let colors = match kind {
            ElementKind::Tile => &self.tiles,
            ElementKind::Obstacle => &self.obstacles,
        };
        colors
            .get(variant.get() as usize)
            .copied()
            .unwrap_or(Self::MISSING)
    }
}

/// Descriptor for the side panel hosting the generation controls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlPanelView {
    /// Width of the panel in pixels.
    pub width: f32,
    /// Background color of the panel.
    pub background: Color,
}

impl ControlPanelView {
    /// Creates a new control panel descriptor.
    #[must_use]
    pub const fn new(width: f32, background: Color) -> Self {
        Self { width, background }
    }
}

/// Summary of the grid shown next to the controls.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridStatus {
    /// Parameters the next generation will use.
    pub parameters: GridParameters,
    /// Whether a generation is in flight.
    pub generating: bool,
    /// Tiles in the current grid.
    pub tiles: usize,
    /// Obstacles in the current grid.
    pub obstacles: usize,
    /// Message describing the last failed request, if any.
    pub last_error: Option<String>,
}

/// Scene description consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Retained elements to draw.
    pub graph: SceneGraph,
    /// Variant colors.
    pub palette: VariantPalette,
    /// Optional side panel hosting the controls.
    pub control_panel: Option<ControlPanelView>,
    /// Status summary displayed in the control panel.
    pub status: GridStatus,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        graph: SceneGraph,
        palette: VariantPalette,
        control_panel: Option<ControlPanelView>,
        status: GridStatus,
    ) -> Self {
        Self {
            graph,
            palette,
            control_panel,
            status,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting isometric grid scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and may mutate the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}
