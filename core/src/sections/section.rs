use crate::config::MarkerStyle;
use crate::coord::{Point, UnitScale};
use crate::scene::{MarkerHandle, Scene, SceneMarker, DESELECTED_Z, SELECTED_Z};
use crate::sections::controls::{ControlEvent, ControlField, SectionControls};
use crate::sections::mosaic;

/// Notifications a section raises towards its owner, tagged with its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionEvent {
    Changed(usize),
    CheckBoxChanged(usize),
    Selected(usize),
}

/// A single region of interest. Owns its control row and the handle of its
/// scene marker; every mutation updates both before returning.
#[derive(Debug)]
pub struct Section {
    index: usize,
    selected: bool,
    controls: SectionControls,
    marker: MarkerHandle,
    style: MarkerStyle,
    scale: UnitScale,
}

impl Section {
    pub fn new(
        index: usize,
        position: &Point,
        angle: f64,
        style: &MarkerStyle,
        angle_step: f64,
        scale: UnitScale,
        scene: &mut Scene,
    ) -> Self {
        let controls = SectionControls::new(position.x_um(), position.y_um(), angle, angle_step);
        let marker = scene.add_marker(SceneMarker::new(style));
        let section = Self {
            index,
            selected: false,
            controls,
            marker,
            style: *style,
            scale,
        };
        section.set_location(scene);
        section
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Only the owning collection renumbers sections.
    pub(crate) fn set_section_number(&mut self, index: usize) {
        self.index = index;
    }

    pub fn location(&self) -> Point {
        self.controls.current_location(self.scale)
    }

    pub fn angle(&self) -> f64 {
        self.controls.current_angle()
    }

    pub fn is_checked(&self) -> bool {
        self.controls.is_checked()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn controls(&self) -> &SectionControls {
        &self.controls
    }

    pub(crate) fn controls_mut(&mut self) -> &mut SectionControls {
        &mut self.controls
    }

    pub fn marker(&self) -> &MarkerHandle {
        &self.marker
    }

    pub fn select(&mut self, scene: &mut Scene) {
        self.selected = true;
        if let Some(marker) = scene.marker_mut(&self.marker) {
            marker.set_z(SELECTED_Z);
            marker.set_pen(self.style.selected_pen);
        }
        self.controls.select();
    }

    pub fn deselect(&mut self, scene: &mut Scene) {
        self.selected = false;
        if let Some(marker) = scene.marker_mut(&self.marker) {
            marker.set_z(DESELECTED_Z);
            marker.set_pen(self.style.deselected_pen);
        }
        self.controls.deselect();
    }

    /// Moves the marker to the position shown by the control row.
    pub fn set_location(&self, scene: &mut Scene) {
        let location = self.location();
        if let Some(marker) = scene.marker_mut(&self.marker) {
            marker.center_on(&location);
        }
    }

    fn forward(&self, event: Option<ControlEvent>, scene: &mut Scene) -> Option<SectionEvent> {
        match event? {
            ControlEvent::Changed => {
                self.set_location(scene);
                Some(SectionEvent::Changed(self.index))
            }
            ControlEvent::CheckBoxChanged => Some(SectionEvent::CheckBoxChanged(self.index)),
            ControlEvent::Selected => Some(SectionEvent::Selected(self.index)),
        }
    }

    pub fn edit(
        &mut self,
        field: ControlField,
        value: f64,
        scene: &mut Scene,
    ) -> Option<SectionEvent> {
        let event = self.controls.set_field(field, value);
        self.forward(event, scene)
    }

    pub fn set_checked(&mut self, checked: bool, scene: &mut Scene) -> Option<SectionEvent> {
        let event = self.controls.set_checked(checked);
        self.forward(event, scene)
    }

    pub fn focus(&self) -> SectionEvent {
        SectionEvent::Selected(self.index)
    }

    pub fn increment_angle(&mut self, direction: f64, scene: &mut Scene) -> Option<SectionEvent> {
        let event = self.controls.increment_angle(direction);
        self.forward(event, scene)
    }

    pub fn increment_x(&mut self, delta: f64, scene: &mut Scene) -> Option<SectionEvent> {
        let event = self.controls.increment_x(delta);
        self.forward(event, scene)
    }

    pub fn increment_y(&mut self, delta: f64, scene: &mut Scene) -> Option<SectionEvent> {
        let event = self.controls.increment_y(delta);
        self.forward(event, scene)
    }

    pub fn serialize_line(&self) -> String {
        mosaic::format_section_line(&self.location(), self.angle())
    }

    /// Releases the scene marker; the control row must already be detached.
    pub(crate) fn release(self, scene: &mut Scene) {
        scene.remove_marker(self.marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(scene: &mut Scene, x: f64, y: f64, angle: f64) -> Section {
        let style = MarkerStyle {
            size: 4.0,
            ..MarkerStyle::default()
        };
        let scale = UnitScale::new(0.5);
        Section::new(0, &Point::from_um(x, y, scale), angle, &style, 1.0, scale, scene)
    }

    #[test]
    fn new_section_is_unselected_and_placed() {
        let mut scene = Scene::new();
        let section = build(&mut scene, 10.0, 20.0, 5.0);
        assert!(!section.is_selected());
        let marker = scene.marker(section.marker()).unwrap();
        assert_eq!(marker.position(), (18.0, 38.0));
        assert_eq!(section.angle(), 5.0);
    }

    #[test]
    fn edits_move_the_marker_synchronously() {
        let mut scene = Scene::new();
        let mut section = build(&mut scene, 0.0, 0.0, 0.0);
        let event = section.edit(ControlField::X, 4.0, &mut scene);
        assert_eq!(event, Some(SectionEvent::Changed(0)));
        assert_eq!(scene.marker(section.marker()).unwrap().center(), (8.0, 0.0));

        let event = section.increment_y(0.5, &mut scene);
        assert_eq!(event, Some(SectionEvent::Changed(0)));
        assert_eq!(section.location().y_um(), 0.5);
    }

    #[test]
    fn selection_restyles_marker_and_row() {
        let mut scene = Scene::new();
        let mut section = build(&mut scene, 0.0, 0.0, 0.0);
        section.select(&mut scene);
        let marker = scene.marker(section.marker()).unwrap();
        assert_eq!(marker.z(), SELECTED_Z);
        assert_eq!(marker.pen(), MarkerStyle::default().selected_pen);
        assert!(section.controls().is_selected());

        section.deselect(&mut scene);
        assert_eq!(scene.marker(section.marker()).unwrap().z(), DESELECTED_Z);
        assert!(!section.controls().is_selected());
    }

    #[test]
    fn serialized_line_is_crlf_terminated() {
        let mut scene = Scene::new();
        let section = build(&mut scene, 1.5, -2.25, 90.0);
        assert_eq!(section.serialize_line(), "section,1.5,-2.25,90\r\n");
    }

    #[test]
    fn release_removes_marker() {
        let mut scene = Scene::new();
        let section = build(&mut scene, 0.0, 0.0, 0.0);
        assert_eq!(scene.marker_count(), 1);
        section.release(&mut scene);
        assert_eq!(scene.marker_count(), 0);
    }
}
