use crate::coord::UnitScale;
use crate::frame::Rgba;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Shared configuration for the section subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionsConfig {
    pub pen_width: f64,
    pub ellipse_size: f64,
    pub um_per_pixel: f64,
    pub render_width: usize,
    pub render_height: usize,
    pub foreground_opacity: f32,
    pub grid_x: usize,
    pub grid_y: usize,
    pub angle_step: f64,
    pub position_step: f64,
    pub dump_dir: PathBuf,
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            pen_width: 1.0,
            ellipse_size: 8.0,
            um_per_pixel: 1.0,
            render_width: 512,
            render_height: 512,
            foreground_opacity: 0.5,
            grid_x: 5,
            grid_y: 3,
            angle_step: 1.0,
            position_step: 0.5,
            dump_dir: PathBuf::from("."),
        }
    }
}

impl SectionsConfig {
    pub fn unit_scale(&self) -> UnitScale {
        UnitScale::new(self.um_per_pixel)
    }

    pub fn marker_style(&self) -> MarkerStyle {
        MarkerStyle {
            pen_width: self.pen_width.max(0.0),
            size: self.ellipse_size.max(0.0),
            ..MarkerStyle::default()
        }
    }
}

/// Pen and size used for every section marker in one scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub pen_width: f64,
    pub size: f64,
    pub selected_pen: Rgba,
    pub deselected_pen: Rgba,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            pen_width: 1.0,
            size: 1.0,
            selected_pen: [255, 0, 0, 255],
            deselected_pen: [0, 0, 255, 255],
        }
    }
}
