use anyhow::{ensure, Context};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use stevecore::frame::Frame;
use stevecore::scene::{Scene, Tile};

/// Configuration for generating a synthetic slide: a noisy light field
/// scattered with dark elliptical blobs, cut into square tiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub width: usize,
    pub height: usize,
    pub tile_size: usize,
    pub blobs: usize,
    pub blob_radius: f64,
    pub noise: f64,
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            tile_size: 256,
            blobs: 12,
            blob_radius: 40.0,
            noise: 12.0,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Blob {
    x: f64,
    y: f64,
    rx: f64,
    ry: f64,
    shade: f64,
}

impl Blob {
    /// 1 at the centre, falling to 0 on the ellipse outline.
    fn weight(&self, x: f64, y: f64) -> f64 {
        let dx = (x - self.x) / self.rx;
        let dy = (y - self.y) / self.ry;
        (1.0 - (dx * dx + dy * dy)).max(0.0)
    }
}

fn scatter_blobs(config: &SampleConfig, rng: &mut StdRng) -> Vec<Blob> {
    let radius = config.blob_radius.max(1.0);
    (0..config.blobs)
        .map(|_| Blob {
            x: rng.gen_range(0.0..config.width as f64),
            y: rng.gen_range(0.0..config.height as f64),
            rx: radius * rng.gen_range(0.6..1.4),
            ry: radius * rng.gen_range(0.6..1.4),
            shade: rng.gen_range(80.0..160.0),
        })
        .collect()
}

fn shade_at(blobs: &[Blob], x: f64, y: f64) -> f64 {
    blobs
        .iter()
        .map(|blob| blob.shade * blob.weight(x, y))
        .fold(0.0, f64::max)
}

pub fn build_sample_scene(config: &SampleConfig) -> anyhow::Result<Scene> {
    ensure!(
        config.width > 0 && config.height > 0,
        "sample must have a non-zero size"
    );
    let tile_size = config.tile_size.max(1);
    config
        .width
        .checked_mul(config.height)
        .context("overflow computing sample area")?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let blobs = scatter_blobs(config, &mut rng);
    let noise = config.noise.abs();

    let mut scene = Scene::new();
    for top in (0..config.height).step_by(tile_size) {
        for left in (0..config.width).step_by(tile_size) {
            let tile_w = tile_size.min(config.width - left);
            let tile_h = tile_size.min(config.height - top);
            let mut frame = Frame::new(tile_w, tile_h, [0, 0, 0, 255]);
            for y in 0..tile_h {
                for x in 0..tile_w {
                    let sx = (left + x) as f64;
                    let sy = (top + y) as f64;
                    let jitter = if noise > 0.0 {
                        rng.gen_range(-noise..noise)
                    } else {
                        0.0
                    };
                    let base = 230.0 - shade_at(&blobs, sx, sy) + jitter;
                    let value = base.clamp(0.0, 255.0) as u8;
                    frame.set_pixel(x, y, [value, value, value.saturating_sub(10), 255]);
                }
            }
            scene.add_tile(Tile::new(frame, left as f64, top as f64));
        }
    }
    log::debug!(
        "generated {}x{} sample with {} blobs in {} tiles",
        config.width,
        config.height,
        blobs.len(),
        scene.tiles().len()
    );
    Ok(scene)
}
