use glam::Vec2;
use isogrid_core::ScreenPosition;

/// Maps world-space positions onto a pixel viewport.
///
/// World space grows upwards while pixel space grows downwards; the
/// transform flips the vertical axis and centres the fitted region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    scale: f32,
    world_center: Vec2,
    viewport_center: Vec2,
}

impl ViewTransform {
    /// Fits the world rectangle `min..max` into `viewport`, keeping `margin`
    /// pixels free on every side and preserving the aspect ratio.
    #[must_use]
    pub fn fit(min: ScreenPosition, max: ScreenPosition, viewport: Vec2, margin: f32) -> Self {
        let extent = Vec2::new(max.x - min.x, max.y - min.y).max(Vec2::ZERO);
        let available = (viewport - Vec2::splat(margin * 2.0)).max(Vec2::ZERO);

        let ratio = |available: f32, extent: f32| {
            if extent <= f32::EPSILON {
                f32::INFINITY
            } else {
                available / extent
            }
        };
        let scale = ratio(available.x, extent.x).min(ratio(available.y, extent.y));
        let scale = if scale.is_finite() { scale } else { 1.0 };

        Self {
            scale,
            world_center: Vec2::new(min.x + max.x, min.y + max.y) * 0.5,
            viewport_center: viewport * 0.5,
        }
    }

    /// Pixels per world unit.
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Converts a world-space position into pixel coordinates.
    #[must_use]
    pub fn to_screen(&self, position: ScreenPosition) -> Vec2 {
        let relative = Vec2::new(position.x, position.y) - self.world_center;
        self.viewport_center + Vec2::new(relative.x, -relative.y) * self.scale
    }
}
