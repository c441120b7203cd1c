use serde::{Deserialize, Serialize};

/// Conversion factor between stage micrometers and scene pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitScale {
    um_per_pixel: f64,
}

impl UnitScale {
    /// Non-positive or non-finite factors fall back to 1 um per pixel.
    pub fn new(um_per_pixel: f64) -> Self {
        let um_per_pixel = if um_per_pixel.is_finite() && um_per_pixel > 0.0 {
            um_per_pixel
        } else {
            1.0
        };
        Self { um_per_pixel }
    }

    pub fn um_per_pixel(&self) -> f64 {
        self.um_per_pixel
    }

    pub fn um_to_pix(&self, value: f64) -> f64 {
        value / self.um_per_pixel
    }

    pub fn pix_to_um(&self, value: f64) -> f64 {
        value * self.um_per_pixel
    }
}

impl Default for UnitScale {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// A stage position known in both micrometers and scene pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x_um: f64,
    y_um: f64,
    x_pix: f64,
    y_pix: f64,
}

impl Point {
    pub fn from_um(x_um: f64, y_um: f64, scale: UnitScale) -> Self {
        Self {
            x_um,
            y_um,
            x_pix: scale.um_to_pix(x_um),
            y_pix: scale.um_to_pix(y_um),
        }
    }

    pub fn from_pix(x_pix: f64, y_pix: f64, scale: UnitScale) -> Self {
        Self {
            x_um: scale.pix_to_um(x_pix),
            y_um: scale.pix_to_um(y_pix),
            x_pix,
            y_pix,
        }
    }

    pub fn um(&self) -> (f64, f64) {
        (self.x_um, self.y_um)
    }

    pub fn pix(&self) -> (f64, f64) {
        (self.x_pix, self.y_pix)
    }

    pub fn x_um(&self) -> f64 {
        self.x_um
    }

    pub fn y_um(&self) -> f64 {
        self.y_um
    }

    pub fn x_pix(&self) -> f64 {
        self.x_pix
    }

    pub fn y_pix(&self) -> f64 {
        self.y_pix
    }
}
