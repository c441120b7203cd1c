use crate::acquisition::{
    create_grid, create_spiral, AcquisitionRequest, CaptureTarget, MAX_SPIRAL_PICTURES,
};
use crate::config::{MarkerStyle, SectionsConfig};
use crate::coord::{Point, UnitScale};
use crate::math::FrameAccumulator;
use crate::prelude::{RenderResult, SectionError, SectionResult};
use crate::scene::{Scene, Tile};
use crate::sections::controls::ControlField;
use crate::sections::controls_list::SectionControlsList;
use crate::sections::mosaic;
use crate::sections::renderer::{SceneRender, SectionRenderer};
use crate::sections::section::{Section, SectionEvent};
use crate::sections::view::{ContextAction, Key, SectionsView, ViewEvent, GRID_PICTURES};
use crate::telemetry::{LogManager, RenderMetrics, RenderSnapshot};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Owns every section, the scene they live in and the compositing pipeline.
///
/// All input arrives through the `handle_*` / event entry points; each one
/// leaves markers, control rows and pixmaps consistent before returning.
pub struct Sections<R: SceneRender = SectionRenderer> {
    config: SectionsConfig,
    style: MarkerStyle,
    unit_scale: UnitScale,
    scene: Scene,
    sections: Vec<Section>,
    active: Option<usize>,
    scale: f64,
    grid: (usize, usize),
    renderer: R,
    view: SectionsView,
    controls_list: SectionControlsList,
    logger: LogManager,
    metrics: RenderMetrics,
}

impl Sections<SectionRenderer> {
    pub fn new(config: SectionsConfig, scene: Scene) -> Self {
        let renderer = SectionRenderer::new(config.render_width, config.render_height);
        Self::with_renderer(config, scene, renderer)
    }
}

impl<R: SceneRender> Sections<R> {
    pub fn with_renderer(config: SectionsConfig, scene: Scene, mut renderer: R) -> Self {
        renderer.set_render_size(config.render_width, config.render_height);
        renderer.set_scale(1.0);
        let view = SectionsView::new(
            config.render_width,
            config.render_height,
            config.foreground_opacity,
        );
        Self {
            style: config.marker_style(),
            unit_scale: config.unit_scale(),
            grid: (config.grid_x, config.grid_y),
            config,
            scene,
            sections: Vec::new(),
            active: None,
            scale: 1.0,
            renderer,
            view,
            controls_list: SectionControlsList::new(),
            logger: LogManager::new("sections"),
            metrics: RenderMetrics::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_section(&self) -> Option<&Section> {
        self.active.and_then(|index| self.sections.get(index))
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn grid_dims(&self) -> (usize, usize) {
        self.grid
    }

    pub fn unit_scale(&self) -> UnitScale {
        self.unit_scale
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn view(&self) -> &SectionsView {
        &self.view
    }

    pub fn controls_list(&self) -> &SectionControlsList {
        &self.controls_list
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn render_metrics(&self) -> RenderSnapshot {
        self.metrics.snapshot()
    }

    /// Renders of section `index` that came back empty or mismatched.
    pub fn render_failures(&self, index: usize) -> usize {
        self.metrics.failures_for(index)
    }

    /// Appends a section; the first section ever added to an empty
    /// collection becomes active.
    pub fn add_section(&mut self, point: &Point, angle: f64) -> usize {
        let index = self.sections.len();
        let mut section = Section::new(
            index,
            point,
            angle,
            &self.style,
            self.config.angle_step,
            self.unit_scale,
            &mut self.scene,
        );
        self.controls_list.add_section(&mut section);
        self.sections.push(section);
        if self.active.is_none() {
            self.activate(0);
        }
        self.logger.trace(&format!("added section {index}"));
        self.view_update();
        index
    }

    pub fn add_tile(&mut self, tile: Tile) {
        self.scene.add_tile(tile);
        self.view_update();
    }

    pub fn change_opacity(&mut self, foreground_opacity: f32) {
        self.view.change_opacity(foreground_opacity);
    }

    pub fn grid_change(&mut self, x_count: usize, y_count: usize) {
        self.grid = (x_count, y_count);
    }

    /// Moves selection to `index` without refreshing pixmaps.
    fn activate(&mut self, index: usize) -> bool {
        if index >= self.sections.len() {
            self.logger.trace(&format!(
                "ignoring activation of section {index} of {}",
                self.sections.len()
            ));
            return false;
        }
        if self.active == Some(index) {
            return false;
        }
        if let Some(previous) = self.active.and_then(|i| self.sections.get_mut(i)) {
            previous.deselect(&mut self.scene);
        }
        self.sections[index].select(&mut self.scene);
        self.active = Some(index);
        true
    }

    pub fn handle_active_section_update(&mut self, index: usize) {
        if self.activate(index) {
            self.update_foreground_pixmap();
        }
    }

    pub fn handle_section_event(&mut self, event: SectionEvent) {
        match event {
            SectionEvent::Changed(index) => self.handle_section_change(index),
            SectionEvent::CheckBoxChanged(_) => self.update_background_pixmap(),
            SectionEvent::Selected(index) => self.handle_active_section_update(index),
        }
    }

    fn section_mut(&mut self, index: usize) -> SectionResult<&mut Section> {
        let count = self.sections.len();
        self.sections
            .get_mut(index)
            .ok_or(SectionError::InvalidIndex { index, count })
    }

    /// A value typed into one of the section's numeric fields.
    pub fn edit_section(&mut self, index: usize, field: ControlField, value: f64) -> SectionResult<()> {
        let scene = &mut self.scene;
        let count = self.sections.len();
        let section = self
            .sections
            .get_mut(index)
            .ok_or(SectionError::InvalidIndex { index, count })?;
        if let Some(event) = section.edit(field, value, scene) {
            self.handle_section_event(event);
        }
        Ok(())
    }

    /// The section's check box changed state.
    pub fn set_section_checked(&mut self, index: usize, checked: bool) -> SectionResult<()> {
        let scene = &mut self.scene;
        let count = self.sections.len();
        let section = self
            .sections
            .get_mut(index)
            .ok_or(SectionError::InvalidIndex { index, count })?;
        if let Some(event) = section.set_checked(checked, scene) {
            self.handle_section_event(event);
        }
        Ok(())
    }

    /// One of the section's fields gained focus or its row was clicked.
    pub fn focus_section(&mut self, index: usize) -> SectionResult<()> {
        let event = self.section_mut(index)?.focus();
        self.handle_section_event(event);
        Ok(())
    }

    pub fn handle_view_event(&mut self, event: ViewEvent) -> Option<AcquisitionRequest> {
        match event {
            ViewEvent::Key(key) => {
                self.handle_key_event(key);
                None
            }
            ViewEvent::Pictures(count) => self.handle_pictures(count),
            ViewEvent::Positions => self.handle_positions(),
            ViewEvent::Resize { width, height } => {
                self.handle_section_size_change(width, height);
                None
            }
            ViewEvent::Zoom(multiplier) => {
                self.handle_scale_change(multiplier);
                None
            }
        }
    }

    /// Key pressed while the sections view has focus.
    pub fn view_key_press(&mut self, code: i32) -> Option<AcquisitionRequest> {
        let event = self.view.key_press(Key::from_code(code));
        self.handle_view_event(event)
    }

    /// Key pressed while the controls list has focus.
    pub fn list_key_press(&mut self, code: i32) {
        let key = self.controls_list.key_press(code);
        self.handle_key_event(key);
    }

    pub fn view_context_action(&mut self, action: ContextAction) -> Option<AcquisitionRequest> {
        let event = self.view.context_action(action);
        self.handle_view_event(event)
    }

    pub fn view_resized(&mut self, width: usize, height: usize) {
        if let Some(event) = self.view.resize(width, height) {
            self.handle_view_event(event);
        }
    }

    pub fn view_wheel(&mut self, delta: f64) {
        let event = self.view.wheel(delta);
        self.handle_view_event(event);
    }

    pub fn handle_key_event(&mut self, key: Key) {
        let step = self.config.position_step;
        match key {
            Key::Up => self.increment_active_section(-1),
            Key::Down => self.increment_active_section(1),
            Key::W => self.nudge_active(|section, scene| section.increment_y(-step, scene)),
            Key::S => self.nudge_active(|section, scene| section.increment_y(step, scene)),
            Key::A => self.nudge_active(|section, scene| section.increment_x(-step, scene)),
            Key::D => self.nudge_active(|section, scene| section.increment_x(step, scene)),
            Key::Q => self.nudge_active(|section, scene| section.increment_angle(-1.0, scene)),
            Key::E => self.nudge_active(|section, scene| section.increment_angle(1.0, scene)),
            Key::P => {
                let dir = self.config.dump_dir.clone();
                if let Err(err) = self.save_sections_dump(&dir) {
                    self.logger
                        .anomaly(&format!("section dump to {} failed: {err}", dir.display()));
                }
            }
            Key::Delete => {
                if self.active.is_some() {
                    self.remove_active_section();
                }
            }
            Key::U => self.view_update(),
            other => self.logger.trace(&format!("unhandled key {:#x}", other.code())),
        }
    }

    fn nudge_active<F>(&mut self, nudge: F)
    where
        F: FnOnce(&mut Section, &mut Scene) -> Option<SectionEvent>,
    {
        let Some(index) = self.active else {
            self.logger.trace("no active section to adjust");
            return;
        };
        let event = match self.sections.get_mut(index) {
            Some(section) => nudge(section, &mut self.scene),
            None => None,
        };
        if let Some(event) = event {
            self.handle_section_event(event);
        }
    }

    /// Capture targets for every section: its centre, then a spiral of
    /// `count` offsets when `count > 1`, or the configured grid for
    /// [`GRID_PICTURES`].
    pub fn handle_pictures(&self, count: i32) -> Option<AcquisitionRequest> {
        if count > 1 && count as usize > MAX_SPIRAL_PICTURES {
            self.logger.anomaly(&format!(
                "{count} pictures per section requested, clamping to {MAX_SPIRAL_PICTURES}"
            ));
        }
        let mut targets = Vec::new();
        for section in &self.sections {
            targets.push(CaptureTarget::Location(section.location()));
            if count > 1 {
                targets.extend(create_spiral(count as usize));
            } else if count == GRID_PICTURES {
                targets.extend(create_grid(self.grid.0, self.grid.1));
            }
        }
        if targets.is_empty() {
            return None;
        }
        self.logger
            .record(&format!("requesting {} pictures", targets.len()));
        Some(AcquisitionRequest::TakePictures(targets))
    }

    pub fn handle_positions(&self) -> Option<AcquisitionRequest> {
        if self.sections.is_empty() {
            return None;
        }
        let positions = self.sections.iter().map(Section::location).collect();
        Some(AcquisitionRequest::AddPositions(positions))
    }

    pub fn handle_scale_change(&mut self, multiplier: f64) {
        self.scale *= multiplier;
        self.renderer.set_scale(self.scale);
        self.view_update();
    }

    pub fn handle_section_size_change(&mut self, width: usize, height: usize) {
        self.renderer.set_render_size(width, height);
        self.view_update();
    }

    /// Runs after the active section moved or rotated.
    pub fn handle_section_update(&mut self) {
        let checked = self
            .active_section()
            .map(Section::is_checked)
            .unwrap_or(false);
        if checked {
            self.update_background_pixmap();
        }
        self.update_foreground_pixmap();
    }

    /// Section `index` moved or turned. The edited section may not be the
    /// active one, so its own check state decides the background recompute.
    fn handle_section_change(&mut self, index: usize) {
        let checked = self
            .sections
            .get(index)
            .map(Section::is_checked)
            .unwrap_or(false);
        if checked {
            self.update_background_pixmap();
        }
        self.update_foreground_pixmap();
    }

    pub fn increment_active_section(&mut self, delta: i64) {
        let Some(active) = self.active else {
            self.logger.trace("no active section to move from");
            return;
        };
        let count = self.sections.len() as i64;
        if count == 0 {
            return;
        }
        let next = (active as i64 + delta).rem_euclid(count) as usize;
        self.handle_active_section_update(next);
    }

    /// Claims `section` lines and adds them; `Ok(false)` leaves the line to
    /// other record handlers.
    pub fn load_from_mosaic_file_data(
        &mut self,
        fields: &[&str],
        line: usize,
        _directory: &Path,
    ) -> SectionResult<bool> {
        match mosaic::parse_section_fields(fields, line)? {
            Some(record) => {
                let point = Point::from_um(record.x_um, record.y_um, self.unit_scale);
                self.add_section(&point, record.angle);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Loads every section line of a mosaic file, returning how many were added.
    pub fn load_mosaic_file<P: AsRef<Path>>(&mut self, path: P) -> SectionResult<usize> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();

        let mut loaded = 0;
        for (number, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields = mosaic::split_fields(line);
            if self.load_from_mosaic_file_data(&fields, number + 1, &directory)? {
                loaded += 1;
            } else {
                self.logger
                    .trace(&format!("line {} left to other handlers", number + 1));
            }
        }
        self.logger.record(&format!(
            "loaded {loaded} sections from {}",
            path.display()
        ));
        Ok(loaded)
    }

    pub fn save_to_mosaic_file<W: Write>(&self, writer: &mut W) -> SectionResult<()> {
        for section in &self.sections {
            writer.write_all(section.serialize_line().as_bytes())?;
        }
        Ok(())
    }

    pub fn save_mosaic_file<P: AsRef<Path>>(&self, path: P) -> SectionResult<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        self.save_to_mosaic_file(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Drops the active section, renumbers the rest and activates its
    /// predecessor (or the new first section).
    pub fn remove_active_section(&mut self) {
        let Some(removed) = self.active.take() else {
            self.logger.trace("no active section to remove");
            return;
        };
        if removed >= self.sections.len() {
            return;
        }

        let mut section = self.sections.remove(removed);
        self.controls_list.remove_section(&mut section);
        section.release(&mut self.scene);
        self.metrics.section_removed(removed);

        for (index, section) in self.sections.iter_mut().enumerate() {
            section.set_section_number(index);
        }

        if !self.sections.is_empty() {
            self.activate(removed.saturating_sub(1));
        }
        self.logger.trace(&format!("removed section {removed}"));
        self.view_update();
    }

    /// Writes one `section_<i>.png` render per section into `dir`.
    pub fn save_sections_dump(&mut self, dir: &Path) -> SectionResult<usize> {
        fs::create_dir_all(dir)?;
        let mut written = 0;
        for section in &self.sections {
            let render = self.renderer.render_section(
                &mut self.scene,
                &section.location(),
                section.angle(),
            );
            match render {
                RenderResult::Frame(frame) => {
                    frame.save_png(dir.join(format!("section_{}.png", section.index())))?;
                    written += 1;
                }
                RenderResult::Empty => self.logger.anomaly(&format!(
                    "section {} produced no frame to dump",
                    section.index()
                )),
            }
        }
        Ok(written)
    }

    pub fn set_scene_items_visible(&mut self, visible: bool) {
        self.scene.set_markers_visible(visible);
        self.handle_section_update();
    }

    /// Recomputes the mean render of every checked section from scratch.
    pub fn update_background_pixmap(&mut self) {
        self.metrics.begin_background();
        let mut accumulator = FrameAccumulator::new();
        for section in &self.sections {
            if !section.is_checked() {
                continue;
            }
            let render = self.renderer.render_section(
                &mut self.scene,
                &section.location(),
                section.angle(),
            );
            let accepted = match &render {
                RenderResult::Frame(frame) => accumulator.add(frame),
                RenderResult::Empty => false,
            };
            self.metrics.record(section.index(), accepted);
            if !accepted {
                self.logger.anomaly(&format!(
                    "background render of section {} failed, skipping it",
                    section.index()
                ));
            }
        }
        self.view.set_background_pixmap(accumulator.mean());
    }

    pub fn update_foreground_pixmap(&mut self) {
        let Some(section) = self.active.and_then(|index| self.sections.get(index)) else {
            return;
        };
        let render = self.renderer.render_section(
            &mut self.scene,
            &section.location(),
            section.angle(),
        );
        self.metrics.record(section.index(), !render.is_empty());
        if render.is_empty() {
            self.logger.anomaly(&format!(
                "foreground render of section {} failed",
                section.index()
            ));
        }
        self.view.set_foreground_pixmap(render.into_frame());
    }

    pub fn view_update(&mut self) {
        self.update_background_pixmap();
        self.update_foreground_pixmap();
    }

    pub fn dump_dir(&self) -> PathBuf {
        self.config.dump_dir.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use proptest::prelude::*;

    /// Renders a solid frame whose red channel is the centre's x in um.
    struct FakeRenderer {
        width: usize,
        height: usize,
        failing_x: Vec<f64>,
    }

    impl FakeRenderer {
        fn new() -> Self {
            Self {
                width: 2,
                height: 2,
                failing_x: Vec::new(),
            }
        }

        fn failing(x: f64) -> Self {
            Self {
                failing_x: vec![x],
                ..Self::new()
            }
        }
    }

    impl SceneRender for FakeRenderer {
        fn set_render_size(&mut self, width: usize, height: usize) {
            self.width = width.min(4);
            self.height = height.min(4);
        }

        fn set_scale(&mut self, _scale: f64) {}

        fn render_scene(&mut self, scene: &Scene, center: &Point, _angle: f64) -> RenderResult {
            assert!(scene.chrome_hidden(), "captures must hide section markers");
            if self.failing_x.contains(&center.x_um()) {
                return RenderResult::Empty;
            }
            let value = center.x_um() as u8;
            RenderResult::Frame(Frame::new(self.width, self.height, [value, 0, 0, 255]))
        }
    }

    fn sections_with(renderer: FakeRenderer) -> Sections<FakeRenderer> {
        Sections::with_renderer(SectionsConfig::default(), Scene::new(), renderer)
    }

    fn add_at(sections: &mut Sections<FakeRenderer>, x: f64) -> usize {
        let point = Point::from_um(x, 0.0, sections.unit_scale());
        sections.add_section(&point, 0.0)
    }

    fn assert_consistent<R: SceneRender>(sections: &Sections<R>) {
        let indices: Vec<usize> = sections.sections().iter().map(Section::index).collect();
        assert_eq!(indices, (0..sections.len()).collect::<Vec<_>>());
        let selected = sections.sections().iter().filter(|s| s.is_selected()).count();
        if sections.is_empty() {
            assert_eq!(sections.active_index(), None);
        } else {
            assert_eq!(selected, 1);
            assert!(sections.sections()[sections.active_index().unwrap()].is_selected());
        }
        assert_eq!(sections.scene().marker_count(), sections.len());
        assert_eq!(sections.controls_list().len(), sections.len());
    }

    fn background_red(sections: &Sections<FakeRenderer>) -> Option<u8> {
        sections
            .view()
            .background_pixmap()
            .and_then(|frame| frame.pixel(0, 0))
            .map(|pixel| pixel[0])
    }

    #[test]
    fn first_section_becomes_active() {
        let mut sections = sections_with(FakeRenderer::new());
        add_at(&mut sections, 10.0);
        add_at(&mut sections, 20.0);
        assert_eq!(sections.active_index(), Some(0));
        assert_consistent(&sections);
        let foreground = sections.view().foreground_pixmap().unwrap();
        assert_eq!(foreground.pixel(0, 0), Some([10, 0, 0, 255]));
    }

    #[test]
    fn removing_middle_section_activates_predecessor() {
        let mut sections = sections_with(FakeRenderer::new());
        for x in [10.0, 20.0, 30.0] {
            add_at(&mut sections, x);
        }
        sections.handle_active_section_update(1);
        sections.remove_active_section();

        assert_eq!(sections.len(), 2);
        assert_eq!(sections.active_index(), Some(0));
        assert_eq!(sections.section(1).unwrap().location().x_um(), 30.0);
        assert_consistent(&sections);
    }

    #[test]
    fn removing_first_section_keeps_index_zero_active() {
        let mut sections = sections_with(FakeRenderer::new());
        add_at(&mut sections, 10.0);
        add_at(&mut sections, 20.0);
        sections.handle_key_event(Key::Delete);
        assert_eq!(sections.active_index(), Some(0));
        assert_eq!(sections.section(0).unwrap().location().x_um(), 20.0);

        sections.handle_key_event(Key::Delete);
        assert!(sections.is_empty());
        assert_eq!(sections.active_index(), None);
        assert_consistent(&sections);
    }

    #[test]
    fn active_cursor_wraps_both_ways() {
        let mut sections = sections_with(FakeRenderer::new());
        for x in [1.0, 2.0, 3.0] {
            add_at(&mut sections, x);
        }
        sections.handle_key_event(Key::Up);
        assert_eq!(sections.active_index(), Some(2));
        sections.handle_key_event(Key::Down);
        assert_eq!(sections.active_index(), Some(0));
        sections.increment_active_section(-7);
        assert_eq!(sections.active_index(), Some(2));
    }

    #[test]
    fn empty_collection_ignores_every_key() {
        let dir = tempfile::tempdir().unwrap();
        let config = SectionsConfig {
            dump_dir: dir.path().to_path_buf(),
            ..SectionsConfig::default()
        };
        let mut sections = Sections::with_renderer(config, Scene::new(), FakeRenderer::new());
        for key in [
            Key::Up,
            Key::Down,
            Key::W,
            Key::A,
            Key::S,
            Key::D,
            Key::Q,
            Key::E,
            Key::P,
            Key::Delete,
            Key::U,
        ] {
            sections.handle_key_event(key);
        }
        assert!(sections.is_empty());
        assert_eq!(sections.handle_pictures(1), None);
        assert_eq!(sections.handle_positions(), None);
        assert!(sections.view().background_pixmap().is_none());
    }

    #[test]
    fn nudge_keys_move_and_rotate_the_active_section() {
        let mut sections = sections_with(FakeRenderer::new());
        add_at(&mut sections, 10.0);
        sections.handle_key_event(Key::D);
        sections.handle_key_event(Key::W);
        sections.handle_key_event(Key::Q);
        let section = sections.active_section().unwrap();
        assert_eq!(section.location().um(), (10.5, -0.5));
        assert_eq!(section.angle(), -1.0);
        let marker = sections.scene().marker(section.marker()).unwrap();
        assert_eq!(marker.center(), (10.5, -0.5));
    }

    #[test]
    fn background_is_mean_of_checked_sections() {
        let mut sections = sections_with(FakeRenderer::new());
        add_at(&mut sections, 10.0);
        add_at(&mut sections, 30.0);
        assert_eq!(background_red(&sections), None);

        sections.set_section_checked(0, true).unwrap();
        assert_eq!(background_red(&sections), Some(10));

        sections.set_section_checked(1, true).unwrap();
        assert_eq!(background_red(&sections), Some(20));

        sections.set_section_checked(0, false).unwrap();
        sections.set_section_checked(1, false).unwrap();
        assert_eq!(background_red(&sections), None);
    }

    #[test]
    fn failed_render_is_left_out_of_the_mean() {
        let mut sections = sections_with(FakeRenderer::failing(50.0));
        for x in [10.0, 50.0, 30.0] {
            add_at(&mut sections, x);
        }
        for index in 0..3 {
            sections.set_section_checked(index, true).unwrap();
        }
        assert_eq!(background_red(&sections), Some(20));
        assert!(sections.render_metrics().skipped >= 1);
        assert!(sections.render_failures(1) >= 1);
        assert_eq!(sections.render_failures(0), 0);

        sections.focus_section(1).unwrap();
        sections.remove_active_section();
        assert_eq!(sections.render_failures(1), 0);
        assert_eq!(sections.render_metrics().failing_sections, 0);
    }

    #[test]
    fn editing_a_checked_inactive_section_refreshes_background() {
        let mut sections = sections_with(FakeRenderer::new());
        add_at(&mut sections, 10.0);
        add_at(&mut sections, 30.0);
        sections.set_section_checked(1, true).unwrap();
        assert_eq!(sections.active_index(), Some(0));
        assert_eq!(background_red(&sections), Some(30));

        sections.edit_section(1, ControlField::X, 90.0).unwrap();
        assert_eq!(sections.active_index(), Some(0));
        assert_eq!(background_red(&sections), Some(90));
    }

    #[test]
    fn editing_an_unchecked_inactive_section_keeps_background() {
        let mut sections = sections_with(FakeRenderer::new());
        add_at(&mut sections, 10.0);
        add_at(&mut sections, 30.0);
        sections.set_section_checked(0, true).unwrap();

        sections.edit_section(1, ControlField::X, 90.0).unwrap();
        assert_eq!(background_red(&sections), Some(10));
        assert_eq!(sections.section(1).unwrap().location().x_um(), 90.0);
    }

    #[test]
    fn editing_a_checked_active_section_refreshes_background() {
        let mut sections = sections_with(FakeRenderer::new());
        add_at(&mut sections, 10.0);
        sections.set_section_checked(0, true).unwrap();
        sections.edit_section(0, ControlField::X, 40.0).unwrap();
        assert_eq!(background_red(&sections), Some(40));
        let foreground = sections.view().foreground_pixmap().unwrap();
        assert_eq!(foreground.pixel(0, 0), Some([40, 0, 0, 255]));
    }

    #[test]
    fn removing_last_checked_section_clears_background() {
        let mut sections = sections_with(FakeRenderer::new());
        add_at(&mut sections, 10.0);
        sections.set_section_checked(0, true).unwrap();
        sections.remove_active_section();
        assert_eq!(background_red(&sections), None);
        assert_eq!(sections.scene().marker_count(), 0);
    }

    #[test]
    fn focusing_a_row_selects_its_section() {
        let mut sections = sections_with(FakeRenderer::new());
        add_at(&mut sections, 10.0);
        add_at(&mut sections, 20.0);
        sections.focus_section(1).unwrap();
        assert_eq!(sections.active_index(), Some(1));
        assert!(sections.section(1).unwrap().controls().is_selected());
        assert!(!sections.section(0).unwrap().controls().is_selected());
        assert!(matches!(
            sections.focus_section(5),
            Err(SectionError::InvalidIndex { index: 5, count: 2 })
        ));
    }

    #[test]
    fn grid_pictures_cover_every_section() {
        let mut sections = sections_with(FakeRenderer::new());
        add_at(&mut sections, 10.0);
        add_at(&mut sections, 20.0);
        sections.grid_change(5, 3);
        let request = sections.handle_pictures(GRID_PICTURES).unwrap();
        assert_eq!(request.len(), 2 + 2 * 15);
    }

    #[test]
    fn spiral_pictures_follow_each_location() {
        let mut sections = sections_with(FakeRenderer::new());
        add_at(&mut sections, 10.0);
        let request = sections.handle_pictures(3).unwrap();
        match request {
            AcquisitionRequest::TakePictures(targets) => {
                assert_eq!(targets.len(), 4);
                assert!(matches!(targets[0], CaptureTarget::Location(_)));
            }
            other => panic!("unexpected request {other:?}"),
        }
        assert_eq!(sections.handle_pictures(1).unwrap().len(), 1);
    }

    #[test]
    fn huge_picture_count_is_clamped_per_section() {
        let mut sections = sections_with(FakeRenderer::new());
        add_at(&mut sections, 10.0);
        add_at(&mut sections, 20.0);
        let request = sections.handle_pictures(i32::MAX).unwrap();
        assert_eq!(request.len(), 2 * (1 + MAX_SPIRAL_PICTURES));
    }

    #[test]
    fn view_keys_route_to_pictures_and_edits() {
        let mut sections = sections_with(FakeRenderer::new());
        add_at(&mut sections, 10.0);
        let request = sections.view_key_press(Key::Digit5.code()).unwrap();
        assert_eq!(request.len(), 6);
        assert_eq!(sections.view_key_press(Key::E.code()), None);
        assert_eq!(sections.active_section().unwrap().angle(), 1.0);
        sections.list_key_press(Key::S.code());
        assert_eq!(sections.active_section().unwrap().location().y_um(), 0.5);
        let positions = sections.view_context_action(ContextAction::RecordPositions);
        assert_eq!(positions.map(|request| request.len()), Some(1));
    }

    #[test]
    fn zoom_and_resize_reach_the_renderer() {
        let mut sections = sections_with(FakeRenderer::new());
        add_at(&mut sections, 10.0);
        sections.view_wheel(1.0);
        sections.view_wheel(1.0);
        assert!((sections.scale() - 1.44).abs() < 1e-12);

        sections.view_resized(3, 3);
        let foreground = sections.view().foreground_pixmap().unwrap();
        assert_eq!((foreground.width(), foreground.height()), (3, 3));
    }

    #[test]
    fn mosaic_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mosaic.msc");

        let mut saved = sections_with(FakeRenderer::new());
        let point = Point::from_um(-12.25, 1034.5, saved.unit_scale());
        saved.add_section(&point, 45.5);
        add_at(&mut saved, 3.0);
        saved.save_mosaic_file(&path).unwrap();

        let mut buffer = Vec::new();
        saved.save_to_mosaic_file(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "section,-12.25,1034.5,45.5\r\nsection,3,0,0\r\n");

        let mut restored = sections_with(FakeRenderer::new());
        assert_eq!(restored.load_mosaic_file(&path).unwrap(), 2);
        let section = restored.section(0).unwrap();
        assert_eq!(section.location().um(), (-12.25, 1034.5));
        assert_eq!(section.angle(), 45.5);
        assert_consistent(&restored);
    }

    #[test]
    fn mosaic_loader_skips_foreign_records_and_rejects_bad_sections() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.msc");
        fs::write(&good, "image,a.png,0,0\r\nsection,0,1,2,3\r\n\r\n").unwrap();
        let mut sections = sections_with(FakeRenderer::new());
        assert_eq!(sections.load_mosaic_file(&good).unwrap(), 1);
        assert_eq!(sections.section(0).unwrap().location().um(), (1.0, 2.0));

        let bad = dir.path().join("bad.msc");
        fs::write(&bad, "section,1,2,3\nsection,x,2,3\n").unwrap();
        let err = sections.load_mosaic_file(&bad).unwrap_err();
        assert!(matches!(err, SectionError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn dump_writes_one_png_per_section() {
        let dir = tempfile::tempdir().unwrap();
        let mut sections = sections_with(FakeRenderer::new());
        add_at(&mut sections, 10.0);
        add_at(&mut sections, 20.0);
        assert_eq!(sections.save_sections_dump(dir.path()).unwrap(), 2);
        assert!(dir.path().join("section_1.png").exists());
    }

    #[test]
    fn software_renderer_composites_real_scene() {
        let mut scene = Scene::new();
        scene.add_tile(Tile::new(Frame::new(8, 8, [40, 40, 40, 255]), -4.0, -4.0));
        let config = SectionsConfig {
            render_width: 4,
            render_height: 4,
            ellipse_size: 2.0,
            ..SectionsConfig::default()
        };
        let mut sections = Sections::new(config, scene);
        sections.add_section(&Point::from_um(0.0, 0.0, UnitScale::default()), 0.0);
        sections.set_section_checked(0, true).unwrap();

        let background = sections.view().background_pixmap().unwrap();
        assert_eq!(background.pixel(1, 1), Some([40, 40, 40, 255]));
        assert!(!sections.scene().chrome_hidden());
        assert_eq!(sections.view().paint().width(), 4);
    }

    proptest! {
        #[test]
        fn indices_stay_dense_and_one_section_selected(
            ops in proptest::collection::vec(0u8..4, 1..40)
        ) {
            let mut sections = sections_with(FakeRenderer::new());
            for (step, op) in ops.into_iter().enumerate() {
                match op {
                    0 | 1 => {
                        add_at(&mut sections, step as f64);
                    }
                    2 => sections.remove_active_section(),
                    _ => sections.increment_active_section(step as i64 - 20),
                }
                let indices: Vec<usize> = sections.sections().iter().map(Section::index).collect();
                prop_assert_eq!(indices, (0..sections.len()).collect::<Vec<_>>());
                let selected = sections.sections().iter().filter(|s| s.is_selected()).count();
                prop_assert_eq!(selected, usize::from(!sections.is_empty()));
            }
        }

        #[test]
        fn active_increment_stays_in_range(count in 0usize..8, delta in -50i64..50) {
            let mut sections = sections_with(FakeRenderer::new());
            for x in 0..count {
                add_at(&mut sections, x as f64);
            }
            sections.increment_active_section(delta);
            match sections.active_index() {
                Some(index) => {
                    prop_assert!(index < count);
                    prop_assert_eq!(index as i64, delta.rem_euclid(count as i64));
                }
                None => prop_assert_eq!(count, 0),
            }
        }
    }
}
