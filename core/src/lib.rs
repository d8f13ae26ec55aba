#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the isometric grid generator.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative grid world, and pure systems. The trigger system emits
//! [`Command`] values addressed to subscribers, the world executes them
//! against a [`PlacementBackend`] and reports progress through [`Event`]
//! values. Systems never touch the element layers directly; they compute
//! placements and samples that the world consumes.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title shown by adapters that open a window.
pub const APPLICATION_TITLE: &str = "Isometric Grid Generator";

/// Smallest accepted value for either grid dimension.
pub const MIN_DIMENSION: u32 = 2;

/// Largest accepted value for either grid dimension.
pub const MAX_DIMENSION: u32 = 15;

/// Dimensions and obstacle budget used for a single grid generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridParameters {
    width: u32,
    height: u32,
    obstacle_count: u32,
}

impl GridParameters {
    /// Creates a new parameter set.
    ///
    /// Range validation of the dimensions belongs to the configuration
    /// boundary; the world only rejects zero-sized grids.
    #[must_use]
    pub const fn new(width: u32, height: u32, obstacle_count: u32) -> Self {
        Self {
            width,
            height,
            obstacle_count,
        }
    }

    /// Number of columns laid out in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows laid out in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of obstacles requested on top of the tile layer.
    #[must_use]
    pub const fn obstacle_count(&self) -> u32 {
        self.obstacle_count
    }

    /// Number of tiles a generation with these parameters produces.
    #[must_use]
    pub const fn tile_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns a copy with a different width.
    #[must_use]
    pub const fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Returns a copy with a different height.
    #[must_use]
    pub const fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// Returns a copy with a different obstacle budget.
    #[must_use]
    pub const fn with_obstacle_count(mut self, obstacle_count: u32) -> Self {
        self.obstacle_count = obstacle_count;
        self
    }

    /// Reports whether both dimensions lie within the supported range.
    #[must_use]
    pub const fn dimensions_in_range(&self) -> bool {
        self.width >= MIN_DIMENSION
            && self.width <= MAX_DIMENSION
            && self.height >= MIN_DIMENSION
            && self.height <= MAX_DIMENSION
    }
}

impl Default for GridParameters {
    fn default() -> Self {
        Self::new(10, 10, 2)
    }
}

/// Logical cell addressed by column and row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    column: u32,
    row: u32,
}

impl GridCell {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Position in isometric screen space, measured in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPosition {
    /// Horizontal coordinate; grows to the right.
    pub x: f32,
    /// Vertical coordinate; grows upwards.
    pub y: f32,
}

impl ScreenPosition {
    /// Origin of screen space.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a new screen-space position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for ScreenPosition {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for ScreenPosition {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Draw-order value assigned to an element; larger values draw later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DepthKey(i32);

impl DepthKey {
    /// Creates a new depth key.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric draw order.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }
}

/// Screen position and draw order derived from a grid cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    position: ScreenPosition,
    depth: DepthKey,
}

impl Placement {
    /// Creates a new placement.
    #[must_use]
    pub const fn new(position: ScreenPosition, depth: DepthKey) -> Self {
        Self { position, depth }
    }

    /// Screen-space position of the element's anchor.
    #[must_use]
    pub const fn position(&self) -> ScreenPosition {
        self.position
    }

    /// Draw-order value of the element.
    #[must_use]
    pub const fn depth(&self) -> DepthKey {
        self.depth
    }
}

/// Kinds of elements that can be placed on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    /// Floor tile occupying one grid cell.
    Tile,
    /// Obstacle standing on top of a tile.
    Obstacle,
}

impl ElementKind {
    /// Sorting layer the element kind renders in.
    ///
    /// Obstacles sit one layer above tiles so an obstacle always covers the
    /// tile it shares a depth key with.
    #[must_use]
    pub const fn sorting_layer(self) -> u8 {
        match self {
            Self::Tile => 0,
            Self::Obstacle => 1,
        }
    }

    /// Human-readable name used in element labels.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tile => "Tile",
            Self::Obstacle => "Obstacle",
        }
    }
}

/// Identifier of a visual variant inside a [`VariantPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantId(u32);

impl VariantId {
    /// Creates a new variant identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Named visual variant (sprite) an element may be drawn with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variant {
    id: VariantId,
    name: String,
}

impl Variant {
    /// Identifier of the variant within its pool.
    #[must_use]
    pub const fn id(&self) -> VariantId {
        self.id
    }

    /// Display name of the variant.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered pool of interchangeable visual variants.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariantPool {
    variants: Vec<Variant>,
}

impl VariantPool {
    /// Builds a pool from variant names, assigning identifiers in order.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variants = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| Variant {
                id: VariantId::new(index as u32),
                name: name.into(),
            })
            .collect();
        Self { variants }
    }

    /// Number of variants in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Reports whether the pool holds no variants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Variant stored at the provided position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Variant> {
        self.variants.get(index)
    }

    /// Iterator over the variants in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter()
    }
}

/// Handle to an element instantiated by a [`PlacementBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(u32);

impl ElementHandle {
    /// Creates a new element handle.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a parent container elements are attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u32);

impl ContainerId {
    /// Creates a new container identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Parent containers owning the tile and obstacle layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerContainers {
    /// Container that receives every tile.
    pub tiles: ContainerId,
    /// Container that receives every obstacle.
    pub obstacles: ContainerId,
}

impl LayerContainers {
    /// Creates a new container pair.
    #[must_use]
    pub const fn new(tiles: ContainerId, obstacles: ContainerId) -> Self {
        Self { tiles, obstacles }
    }

    /// Container that owns elements of the provided kind.
    #[must_use]
    pub const fn container_for(&self, kind: ElementKind) -> ContainerId {
        match kind {
            ElementKind::Tile => self.tiles,
            ElementKind::Obstacle => self.obstacles,
        }
    }
}

/// Everything a backend needs to instantiate one visual element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InstantiateRequest<'a> {
    /// Kind of element being created.
    pub kind: ElementKind,
    /// Container the element becomes a child of.
    pub parent: ContainerId,
    /// Position relative to the parent container.
    pub position: ScreenPosition,
    /// Human-readable label attached to the element.
    pub label: &'a str,
    /// Visual variant the element is drawn with.
    pub variant: VariantId,
    /// Draw order assigned at creation time.
    pub depth: DepthKey,
}

/// Narrow rendering capability the grid world depends on.
pub trait PlacementBackend {
    /// Instantiates a visual element and returns its handle.
    fn instantiate(&mut self, request: InstantiateRequest<'_>) -> ElementHandle;

    /// Destroys a previously instantiated element. Unknown handles are ignored.
    fn destroy(&mut self, element: ElementHandle);

    /// Lists the elements currently attached to the container.
    fn children(&self, container: ContainerId) -> Vec<ElementHandle>;
}

/// Identifier handed to a subscriber of the generate trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u32);

impl SubscriberId {
    /// Creates a new subscriber identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Commands that express all permissible grid mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that the grid be regenerated with the current parameters.
    Regenerate {
        /// Whether no grid has been generated yet, allowing the clear phase to be skipped.
        first_generation: bool,
    },
}

/// Command addressed to a single subscriber of the trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dispatch {
    /// Subscriber the command is delivered to.
    pub subscriber: SubscriberId,
    /// Command to execute.
    pub command: Command,
}

/// Events broadcast by the grid world while processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// A regeneration request was accepted and phases were queued.
    GenerationStarted {
        /// Parameters captured for this generation.
        parameters: GridParameters,
        /// Whether the clear phase was skipped.
        first_generation: bool,
    },
    /// A regeneration request arrived while another generation was in flight.
    GenerationRejected,
    /// The clear phase removed the previous grid.
    GridCleared {
        /// Number of elements destroyed across both layers.
        destroyed: usize,
    },
    /// The tile phase finished populating the tile layer.
    TilesPlaced {
        /// Number of tiles created.
        count: usize,
    },
    /// The obstacle phase finished.
    ObstaclesPlaced {
        /// Number of obstacles requested by the parameters.
        requested: u32,
        /// Number of obstacles actually created after clamping.
        placed: usize,
    },
    /// Every phase completed and the world returned to idle.
    GenerationCompleted {
        /// Final size of the tile layer.
        tiles: usize,
        /// Final size of the obstacle layer.
        obstacles: usize,
    },
}

/// Specific reason a configuration was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum ConfigurationError {
    /// The variant pool used for the element kind contains no variants.
    #[error("{} variant pool is empty", .kind.name())]
    EmptyVariantPool {
        /// Kind of element whose pool is empty.
        kind: ElementKind,
    },
    /// A grid dimension is zero.
    #[error("grid dimensions must be positive (received {width}x{height})")]
    ZeroDimension {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

/// Errors that abort a generation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The supplied configuration cannot produce a grid.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),
    /// Obstacle sampling was asked for more cells than the tile layer holds.
    #[error("cannot place {requested} obstacles on {available} tiles")]
    ObstacleSampling {
        /// Number of obstacle cells requested from the sampler.
        requested: usize,
        /// Number of tiles available.
        available: usize,
    },
}
