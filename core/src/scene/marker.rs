use crate::config::MarkerStyle;
use crate::coord::Point;
use crate::frame::Rgba;

pub const DESELECTED_Z: f64 = 999.0;
pub const SELECTED_Z: f64 = 1999.0;

/// Ellipse outline marking a section centre on the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMarker {
    left: f64,
    top: f64,
    size: f64,
    pen_width: f64,
    pen: Rgba,
    z: f64,
}

impl SceneMarker {
    pub fn new(style: &MarkerStyle) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            size: style.size,
            pen_width: style.pen_width,
            pen: style.deselected_pen,
            z: DESELECTED_Z,
        }
    }

    /// Centres the ellipse on `point`.
    pub fn center_on(&mut self, point: &Point) {
        self.left = point.x_pix() - 0.5 * self.size;
        self.top = point.y_pix() - 0.5 * self.size;
    }

    pub fn set_pen(&mut self, pen: Rgba) {
        self.pen = pen;
    }

    pub fn set_z(&mut self, z: f64) {
        self.z = z;
    }

    pub fn position(&self) -> (f64, f64) {
        (self.left, self.top)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + 0.5 * self.size, self.top + 0.5 * self.size)
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn pen(&self) -> Rgba {
        self.pen
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    /// Whether the scene point lies on the outline stroke.
    pub fn hits(&self, x: f64, y: f64) -> bool {
        let (cx, cy) = self.center();
        let radius = 0.5 * self.size;
        let distance = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
        (distance - radius).abs() <= 0.5 * self.pen_width.max(1.0)
    }
}
