use crate::generator::profile::{build_sample_scene, SampleConfig};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use stevecore::frame::Frame;
use stevecore::scene::{Scene, Tile};
use stevecore::SectionsConfig;

/// An image file placed at (`left`, `top`) scene pixels.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TileSpec {
    pub path: PathBuf,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub sections: SectionsConfig,
    pub sample: SampleConfig,
    /// When non-empty these images replace the synthetic sample.
    pub tiles: Vec<TileSpec>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let mut config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        if let Some(base) = path_ref.parent() {
            for tile in &mut config.tiles {
                if tile.path.is_relative() {
                    tile.path = base.join(&tile.path);
                }
            }
        }
        Ok(config)
    }

    pub fn build_scene(&self) -> anyhow::Result<Scene> {
        if self.tiles.is_empty() {
            return build_sample_scene(&self.sample).context("generating synthetic sample");
        }
        let mut scene = Scene::new();
        for spec in &self.tiles {
            let frame = Frame::open(&spec.path)
                .with_context(|| format!("loading tile {}", spec.path.display()))?;
            scene.add_tile(Tile::new(frame, spec.left, spec.top));
        }
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_uses_synthetic_sample() {
        let cfg = WorkflowConfig {
            sample: SampleConfig {
                width: 20,
                height: 20,
                tile_size: 10,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(cfg.build_scene().unwrap().tiles().len(), 4);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"sections:\n  grid_x: 7\n  ellipse_size: 12\nsample:\n  seed: 4\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.sections.grid_x, 7);
        assert_eq!(cfg.sections.grid_y, 3);
        assert_eq!(cfg.sample.seed, 4);
    }

    #[test]
    fn image_tiles_resolve_next_to_the_config() {
        let dir = tempfile::tempdir().unwrap();
        Frame::new(3, 2, [9, 9, 9, 255])
            .save_png(dir.path().join("tile.png"))
            .unwrap();
        let config_path = dir.path().join("workflow.yaml");
        fs::write(&config_path, "tiles:\n  - path: tile.png\n    left: 5\n").unwrap();

        let cfg = WorkflowConfig::load(&config_path).unwrap();
        let scene = cfg.build_scene().unwrap();
        assert_eq!(scene.extent(), Some((5.0, 0.0, 8.0, 2.0)));
    }
}
