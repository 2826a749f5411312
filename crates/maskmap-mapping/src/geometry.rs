//! Conversion between the rendered mask (viewport pixels) and the logical
//! device space stored in profiles.

use serde::{Deserialize, Serialize};

/// Logical device resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// A point in logical device space.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_negative(&self) -> bool {
        self.x < 0 || self.y < 0
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Rendered mask rectangle in client coordinates. Written by the host only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MaskViewport {
    pub width: f64,
    pub height: f64,
    pub left: f64,
    pub top: f64,
}

impl MaskViewport {
    pub const fn new(width: f64, height: f64, left: f64, top: f64) -> Self {
        Self {
            width,
            height,
            left,
            top,
        }
    }
}

/// A point relative to the viewport origin, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewportPoint {
    pub x: f64,
    pub y: f64,
}

impl ViewportPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Back to client coordinates.
    pub fn to_client(self, viewport: &MaskViewport) -> (f64, f64) {
        (self.x + viewport.left, self.y + viewport.top)
    }
}

/// Viewport-relative point clamped into `[0, width] x [0, height]`.
pub fn clamp_to_viewport(
    client_x: f64,
    client_y: f64,
    viewport: &MaskViewport,
) -> ViewportPoint {
    ViewportPoint {
        x: clamp(client_x - viewport.left, viewport.width),
        y: clamp(client_y - viewport.top, viewport.height),
    }
}

/// Map a client point to logical space. Points outside the viewport are
/// clamped to its edges first, so the result always lies within
/// `original`.
pub fn to_logical(
    client_x: f64,
    client_y: f64,
    viewport: &MaskViewport,
    original: Size,
) -> Position {
    viewport_to_logical(clamp_to_viewport(client_x, client_y, viewport), viewport, original)
}

/// Map an already clamped viewport point to logical space.
pub fn viewport_to_logical(
    point: ViewportPoint,
    viewport: &MaskViewport,
    original: Size,
) -> Position {
    Position {
        x: scale(point.x, viewport.width, original.width),
        y: scale(point.y, viewport.height, original.height),
    }
}

/// Map a logical position to the viewport. No clamping is applied.
pub fn to_viewport(
    position: Position,
    original: Size,
    viewport: &MaskViewport,
) -> ViewportPoint {
    ViewportPoint {
        x: unscale(position.x, original.width, viewport.width),
        y: unscale(position.y, original.height, viewport.height),
    }
}

fn clamp(value: f64, max: f64) -> f64 {
    if value.is_nan() || value < 0.0 {
        0.0
    } else if value > max {
        max.max(0.0)
    } else {
        value
    }
}

// A zero-sized viewport maps everything to the origin.
fn scale(value: f64, extent: f64, original: u32) -> i32 {
    if extent <= 0.0 {
        return 0;
    }
    (value / extent * f64::from(original)).round() as i32
}

fn unscale(value: i32, original: u32, extent: f64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (f64::from(value) / f64::from(original) * extent).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGINAL: Size = Size::new(2560, 1440);

    fn viewport() -> MaskViewport {
        MaskViewport::new(1280.0, 720.0, 40.0, 30.0)
    }

    #[test]
    fn maps_client_point_into_logical_space() {
        let vp = MaskViewport::new(1000.0, 500.0, 0.0, 0.0);
        let original = Size::new(2000, 1000);
        assert_eq!(
            to_logical(300.0, 200.0, &vp, original),
            Position::new(600, 400)
        );
    }

    #[test]
    fn clamps_points_outside_the_viewport() {
        let vp = viewport();
        assert_eq!(to_logical(-500.0, -1.0, &vp, ORIGINAL), Position::new(0, 0));
        assert_eq!(
            to_logical(10_000.0, 10_000.0, &vp, ORIGINAL),
            Position::new(2560, 1440)
        );
        assert_eq!(
            to_logical(20.0, 400.0, &vp, ORIGINAL),
            Position::new(0, 740)
        );
    }

    #[test]
    fn viewport_mapping_is_not_clamped() {
        let vp = viewport();
        let p = to_viewport(Position::new(3000, -20), ORIGINAL, &vp);
        assert_eq!(p, ViewportPoint::new(1500.0, -10.0));
    }

    #[test]
    fn logical_round_trip_is_within_one_unit() {
        for vp in [
            viewport(),
            MaskViewport::new(1920.0, 1080.0, 0.0, 0.0),
            MaskViewport::new(1333.0, 751.0, 12.5, 7.25),
        ] {
            for x in (0..=2560).step_by(37) {
                for y in (0..=1440).step_by(53) {
                    let p = Position::new(x, y);
                    let (cx, cy) = to_viewport(p, ORIGINAL, &vp).to_client(&vp);
                    let back = to_logical(cx, cy, &vp, ORIGINAL);
                    assert!((back.x - p.x).abs() <= 1, "{p:?} -> {back:?}");
                    assert!((back.y - p.y).abs() <= 1, "{p:?} -> {back:?}");
                }
            }
        }
    }

    #[test]
    fn pixel_round_trip_is_within_one_pixel_for_small_viewports() {
        let vp = MaskViewport::new(200.0, 120.0, 0.0, 0.0);
        for cx in 0..=200 {
            let p = to_logical(f64::from(cx), 60.0, &vp, ORIGINAL);
            let v = to_viewport(p, ORIGINAL, &vp);
            assert!((v.x - f64::from(cx)).abs() <= 1.0);
        }
    }

    #[test]
    fn zero_viewport_maps_to_origin() {
        let vp = MaskViewport::default();
        assert_eq!(to_logical(5.0, 5.0, &vp, ORIGINAL), Position::new(0, 0));
    }
}
