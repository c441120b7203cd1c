use crate::coord::Point;
use crate::frame::Frame;
use crate::math::MatrixHelper;
use crate::prelude::RenderResult;
use crate::scene::Scene;

/// Capability to capture a view of the scene around a point.
pub trait SceneRender {
    fn set_render_size(&mut self, width: usize, height: usize);
    fn set_scale(&mut self, scale: f64);
    /// Captures the scene centred on `center` and rotated by `angle` degrees, as is.
    fn render_scene(&mut self, scene: &Scene, center: &Point, angle: f64) -> RenderResult;

    /// Like [`SceneRender::render_scene`], with section markers hidden for the capture.
    fn render_section(&mut self, scene: &mut Scene, center: &Point, angle: f64) -> RenderResult {
        let previous = scene.set_chrome_hidden(true);
        let result = self.render_scene(scene, center, angle);
        scene.set_chrome_hidden(previous);
        result
    }
}

/// Software renderer: maps every output pixel back into scene space through
/// the inverse rotation and scale, then samples the scene.
#[derive(Debug, Clone)]
pub struct SectionRenderer {
    width: usize,
    height: usize,
    scale: f64,
}

impl SectionRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl SceneRender for SectionRenderer {
    fn set_render_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn render_scene(&mut self, scene: &Scene, center: &Point, angle: f64) -> RenderResult {
        if self.width == 0 || self.height == 0 || !(self.scale.is_finite() && self.scale > 0.0) {
            return RenderResult::Empty;
        }

        let inverse = MatrixHelper::inverse_rotate_scale(angle, self.scale);
        let (cx, cy) = center.pix();
        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;

        let mut frame = Frame::new(self.width, self.height, [0, 0, 0, 255]);
        for y in 0..self.height {
            for x in 0..self.width {
                let (dx, dy) = MatrixHelper::apply(
                    &inverse,
                    x as f64 + 0.5 - half_w,
                    y as f64 + 0.5 - half_h,
                );
                frame.set_pixel(x, y, scene.sample(cx + dx, cy + dy));
            }
        }
        RenderResult::Frame(frame)
    }
}
