#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure isometric projection system mapping grid cells to placements.
//!
//! Tile art exposes a 512x256 pixel surface at 256 pixels per unit, so one
//! tile covers a diamond two units wide and one unit tall. Stepping one
//! column moves half a tile down-left, stepping one row moves half a tile
//! down-right, which joins neighbouring diamonds edge to edge. The constants
//! below must change together with the asset proportions.

use isogrid_core::{DepthKey, GridCell, GridParameters, Placement, ScreenPosition};

/// Width of a tile's visible diamond in world units.
pub const TILE_WIDTH: f32 = 2.0;

/// Height of a tile's visible diamond in world units.
pub const TILE_HEIGHT: f32 = 1.0;

const HALF_WIDTH: f32 = 1.0;
const HALF_HEIGHT: f32 = 0.5;

/// Offset between a cell and its neighbour in the next column.
pub const COLUMN_STEP: ScreenPosition = ScreenPosition::new(-HALF_WIDTH, -HALF_HEIGHT);

/// Offset between a cell and its neighbour in the next row.
pub const ROW_STEP: ScreenPosition = ScreenPosition::new(HALF_WIDTH, -HALF_HEIGHT);

/// Projector bound to one grid's dimensions.
///
/// The centering offset depends only on the dimensions, so it is computed
/// once and every cell afterwards costs a handful of additions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IsometricProjector {
    width: u32,
    height: u32,
    offset: ScreenPosition,
}

impl IsometricProjector {
    /// Creates a projector for the provided grid parameters.
    #[must_use]
    pub fn new(parameters: &GridParameters) -> Self {
        let width = parameters.width();
        let height = parameters.height();
        Self {
            width,
            height,
            offset: centering_offset(width, height),
        }
    }

    /// Offset added to every cell so the grid's centre lands on the origin.
    #[must_use]
    pub const fn offset(&self) -> ScreenPosition {
        self.offset
    }

    /// Projects a cell into screen space and assigns its draw order.
    ///
    /// Depth is `column + row`: under this projection cells with a larger sum
    /// sit lower on screen and therefore nearer the viewer, so drawing in
    /// ascending depth yields correct occlusion without any sorting pass.
    #[must_use]
    pub fn project(&self, cell: GridCell) -> Placement {
        let column = cell.column() as f32;
        let row = cell.row() as f32;
        let position = ScreenPosition::new(
            (row - column) * HALF_WIDTH,
            -(column + row) * HALF_HEIGHT,
        ) + self.offset;

        Placement::new(position, depth_for(cell))
    }

    /// Iterates every cell of the grid in column-major, ascending order.
    pub fn cells(&self) -> impl Iterator<Item = GridCell> {
        cells(self.width, self.height)
    }
}

/// Projects a single cell without keeping a projector around.
#[must_use]
pub fn project(parameters: &GridParameters, cell: GridCell) -> Placement {
    IsometricProjector::new(parameters).project(cell)
}

/// Draw-order key of a cell.
#[must_use]
pub fn depth_for(cell: GridCell) -> DepthKey {
    let sum = u64::from(cell.column()) + u64::from(cell.row());
    DepthKey::new(i32::try_from(sum).unwrap_or(i32::MAX))
}

/// Enumerates cells column by column, rows ascending within each column.
pub fn cells(width: u32, height: u32) -> impl Iterator<Item = GridCell> {
    (0..width).flat_map(move |column| (0..height).map(move |row| GridCell::new(column, row)))
}

fn centering_offset(width: u32, height: u32) -> ScreenPosition {
    let width = width as f32;
    let height = height as f32;
    ScreenPosition::new(
        (width - height) * 0.5 * HALF_WIDTH,
        ((height - 1.0) + (width - 1.0)) * 0.5 * HALF_HEIGHT,
    )
}
