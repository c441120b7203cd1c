use crate::workflow::config::WorkflowConfig;
use anyhow::{bail, Context};
use std::fs;
use std::path::{Path, PathBuf};
use stevecore::acquisition::AcquisitionRequest;
use stevecore::sections::Key;
use stevecore::{Point, Sections};

/// A section to add by hand: centre in um and angle in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionSeed {
    pub x_um: f64,
    pub y_um: f64,
    pub angle: f64,
}

impl std::str::FromStr for SectionSeed {
    type Err = String;

    /// `x,y` or `x,y,angle`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let values = raw
            .split(',')
            .map(|field| field.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| format!("invalid section '{raw}': {err}"))?;
        match values.as_slice() {
            [x_um, y_um] => Ok(Self {
                x_um: *x_um,
                y_um: *y_um,
                angle: 0.0,
            }),
            [x_um, y_um, angle] => Ok(Self {
                x_um: *x_um,
                y_um: *y_um,
                angle: *angle,
            }),
            _ => Err(format!("expected x,y[,angle], got '{raw}'")),
        }
    }
}

/// What to do with the sections once the scene is built, in run order.
#[derive(Clone, Debug, Default)]
pub struct Script {
    pub mosaic: Option<PathBuf>,
    pub add: Vec<SectionSeed>,
    pub check: Vec<usize>,
    pub zoom: i32,
    pub keys: Vec<Key>,
    pub pictures: Option<i32>,
    pub positions: bool,
    pub save: Option<PathBuf>,
}

/// Comma-separated key names, e.g. `down,d,d,e,space`.
pub fn parse_keys(script: &str) -> anyhow::Result<Vec<Key>> {
    script
        .split(',')
        .filter(|name| !name.trim().is_empty())
        .map(|name| match Key::from_name(name) {
            Some(key) => Ok(key),
            None => bail!("unknown key '{}'", name.trim()),
        })
        .collect()
}

pub struct WorkflowResult {
    pub sections: Sections,
    pub requests: Vec<AcquisitionRequest>,
}

impl WorkflowResult {
    /// Writes the composited pixmaps and every acquisition request to `dir`.
    pub fn write_outputs(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
        let view = self.sections.view();
        let mut written = Vec::new();

        let layers = [
            ("background.png", view.background_pixmap()),
            ("foreground.png", view.foreground_pixmap()),
        ];
        for (name, layer) in layers {
            if let Some(frame) = layer {
                let path = dir.join(name);
                frame
                    .save_png(&path)
                    .with_context(|| format!("writing {}", path.display()))?;
                written.push(path);
            }
        }

        let path = dir.join("view.png");
        view.paint()
            .save_png(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        written.push(path);

        let path = dir.join("requests.json");
        let json = serde_json::to_string_pretty(&self.requests)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        written.push(path);

        Ok(written)
    }
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self, script: &Script) -> anyhow::Result<WorkflowResult> {
        let scene = self.config.build_scene().context("building scene")?;
        let mut sections = Sections::new(self.config.sections.clone(), scene);
        let mut requests = Vec::new();

        if let Some(path) = &script.mosaic {
            let loaded = sections
                .load_mosaic_file(path)
                .with_context(|| format!("loading mosaic {}", path.display()))?;
            log::info!("loaded {loaded} sections from {}", path.display());
        }

        let unit_scale = sections.unit_scale();
        for seed in &script.add {
            let point = Point::from_um(seed.x_um, seed.y_um, unit_scale);
            sections.add_section(&point, seed.angle);
        }

        for &index in &script.check {
            let checked = sections
                .section(index)
                .map(|section| section.is_checked())
                .unwrap_or(false);
            sections
                .set_section_checked(index, !checked)
                .context("toggling section")?;
        }

        for _ in 0..script.zoom.unsigned_abs() {
            sections.view_wheel(f64::from(script.zoom.signum()));
        }

        for key in &script.keys {
            if let Some(request) = sections.view_key_press(key.code()) {
                requests.push(request);
            }
        }

        if let Some(count) = script.pictures {
            requests.extend(sections.handle_pictures(count));
        }
        if script.positions {
            requests.extend(sections.handle_positions());
        }

        if let Some(path) = &script.save {
            sections
                .save_mosaic_file(path)
                .with_context(|| format!("saving mosaic {}", path.display()))?;
        }

        let stats = sections.render_metrics();
        log::info!(
            "{} sections, {} renders ({} skipped), {} requests",
            sections.len(),
            stats.rendered,
            stats.skipped,
            requests.len()
        );
        Ok(WorkflowResult { sections, requests })
    }
}
