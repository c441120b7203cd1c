use iced::widget::{
    button, canvas::Canvas, column, container, image, row, scrollable, slider, text, text_input,
    Column, Container,
};
use iced::{Alignment, Color, Element, Length, Subscription, Task, Theme};
use std::path::{Path, PathBuf};
use stevecore::acquisition::AcquisitionRequest;
use stevecore::frame::Frame;
use stevecore::scene::{Scene, Tile};
use stevecore::sections::{ContextAction, ControlField, Section};
use stevecore::{Point, Sections, SectionsConfig};

mod canvases;

use canvases::{OverviewCanvas, SectionsCanvas};

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Viewer::boot, Viewer::update, Viewer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Viewer) -> String {
    "steve sections".into()
}

fn application_subscription(_: &Viewer) -> Subscription<Message> {
    Subscription::none()
}

fn application_theme(_: &Viewer) -> Theme {
    Theme::Dark
}

/// Editable text of one control row; committed on submit.
#[derive(Debug, Clone, Default)]
struct RowDraft {
    x: String,
    y: String,
    angle: String,
}

impl RowDraft {
    fn from_section(section: &Section) -> Self {
        let location = section.location();
        Self {
            x: format!("{}", location.x_um()),
            y: format!("{}", location.y_um()),
            angle: format!("{}", section.angle()),
        }
    }

    fn field(&self, field: ControlField) -> &str {
        match field {
            ControlField::X => &self.x,
            ControlField::Y => &self.y,
            ControlField::Angle => &self.angle,
        }
    }

    fn field_mut(&mut self, field: ControlField) -> &mut String {
        match field {
            ControlField::X => &mut self.x,
            ControlField::Y => &mut self.y,
            ControlField::Angle => &mut self.angle,
        }
    }
}

struct Viewer {
    sections: Sections,
    drafts: Vec<RowDraft>,
    composite: Option<image::Handle>,
    composite_size: (usize, usize),
    markers_visible: bool,
    mosaic_path: String,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    RowFocused(usize),
    CheckToggled(usize),
    FieldInput(usize, ControlField, String),
    FieldSubmitted(usize, ControlField),
    ViewKey(i32),
    ViewResized(usize, usize),
    ViewWheel(f64),
    ViewContext(ContextAction),
    OverviewClicked(f64, f64),
    OpacityChanged(f32),
    MarkersToggled,
    MosaicPathChanged(String),
    LoadMosaic,
    SaveMosaic,
}

/// Image paths become tiles laid side by side; `.msc`/`.txt` paths are mosaics.
fn split_arguments(args: impl Iterator<Item = String>) -> (Vec<PathBuf>, Option<PathBuf>) {
    let mut tiles = Vec::new();
    let mut mosaic = None;
    for arg in args.map(PathBuf::from) {
        let is_mosaic = matches!(
            arg.extension().and_then(|ext| ext.to_str()),
            Some("msc") | Some("txt")
        );
        if is_mosaic {
            mosaic = Some(arg);
        } else {
            tiles.push(arg);
        }
    }
    (tiles, mosaic)
}

fn load_scene(paths: &[PathBuf]) -> Scene {
    let mut scene = Scene::new();
    let mut left = 0.0;
    for path in paths {
        match Frame::open(path) {
            Ok(frame) => {
                let width = frame.width() as f64;
                scene.add_tile(Tile::new(frame, left, 0.0));
                left += width;
            }
            Err(err) => log::warn!("skipping tile {}: {err}", path.display()),
        }
    }
    scene
}

impl Viewer {
    fn boot() -> (Self, Task<Message>) {
        let (tiles, mosaic) = split_arguments(std::env::args().skip(1));
        let sections = Sections::new(SectionsConfig::default(), load_scene(&tiles));
        let mut viewer = Viewer {
            sections,
            drafts: Vec::new(),
            composite: None,
            composite_size: (0, 0),
            markers_visible: true,
            mosaic_path: String::new(),
            status: format!("{} tiles loaded", tiles.len()),
            history: Vec::new(),
        };
        if let Some(path) = mosaic {
            viewer.mosaic_path = path.display().to_string();
            viewer.load_mosaic();
        }
        viewer.refresh();
        (viewer, Task::none())
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::FieldInput(index, field, value) => {
                if let Some(draft) = state.drafts.get_mut(index) {
                    *draft.field_mut(field) = value;
                }
                return Task::none();
            }
            Message::FieldSubmitted(index, field) => {
                let parsed = state
                    .drafts
                    .get(index)
                    .map(|draft| draft.field(field).trim().parse::<f64>());
                match parsed {
                    Some(Ok(value)) => {
                        let focused = state.sections.focus_section(index);
                        state.report(focused);
                        let edited = state.sections.edit_section(index, field, value);
                        state.report(edited);
                    }
                    Some(Err(err)) => state.status = format!("Invalid value: {err}"),
                    None => {}
                }
            }
            Message::RowFocused(index) => {
                let focused = state.sections.focus_section(index);
                state.report(focused);
            }
            Message::CheckToggled(index) => {
                let checked = state
                    .sections
                    .section(index)
                    .map(Section::is_checked)
                    .unwrap_or(false);
                let focused = state.sections.focus_section(index);
                state.report(focused);
                let toggled = state.sections.set_section_checked(index, !checked);
                state.report(toggled);
            }
            Message::ViewKey(code) => {
                let request = state.sections.view_key_press(code);
                state.record_request(request);
            }
            Message::ViewResized(width, height) => state.sections.view_resized(width, height),
            Message::ViewWheel(delta) => state.sections.view_wheel(delta),
            Message::ViewContext(action) => {
                let request = state.sections.view_context_action(action);
                state.record_request(request);
            }
            Message::OverviewClicked(x_pix, y_pix) => {
                let point = Point::from_pix(x_pix, y_pix, state.sections.unit_scale());
                let index = state.sections.add_section(&point, 0.0);
                state.push_history(format!(
                    "Added section {index} at ({:.1}, {:.1}) um",
                    point.x_um(),
                    point.y_um()
                ));
            }
            Message::OpacityChanged(opacity) => state.sections.change_opacity(opacity),
            Message::MarkersToggled => {
                state.markers_visible = !state.markers_visible;
                state.sections.set_scene_items_visible(state.markers_visible);
            }
            Message::MosaicPathChanged(path) => {
                state.mosaic_path = path;
                return Task::none();
            }
            Message::LoadMosaic => state.load_mosaic(),
            Message::SaveMosaic => {
                let path = state.mosaic_path.trim().to_string();
                match state.sections.save_mosaic_file(&path) {
                    Ok(()) => {
                        let entry = format!("Saved {} sections to {path}", state.sections.len());
                        state.push_history(entry);
                    }
                    Err(err) => state.status = format!("Save failed: {err}"),
                }
            }
        }
        state.refresh();
        Task::none()
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let rows = state
            .sections
            .sections()
            .iter()
            .zip(&state.drafts)
            .fold(Column::new().spacing(4), |col, (section, draft)| {
                col.push(control_row(section, draft))
            });

        let controls_column = column![
            text("Sections").size(22),
            scrollable(rows).height(Length::Fill),
            text(format!(
                "Foreground opacity {:.2}",
                state.sections.view().foreground_opacity()
            ))
            .size(14),
            slider(
                0.0..=1.0,
                state.sections.view().foreground_opacity(),
                Message::OpacityChanged
            )
            .step(0.05_f32),
            button(if state.markers_visible {
                "Hide markers"
            } else {
                "Show markers"
            })
            .on_press(Message::MarkersToggled),
        ]
        .spacing(10)
        .padding(12)
        .width(Length::Fixed(380.0));

        let sections_canvas = Canvas::new(SectionsCanvas {
            handle: state.composite.as_ref(),
            size: state.composite_size,
        })
        .width(Length::Fill)
        .height(Length::Fill);

        let overview = Canvas::new(OverviewCanvas {
            scene: state.sections.scene(),
        })
        .width(Length::Fill)
        .height(Length::Fixed(260.0));

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let side_column = column![
            text("Mosaic").size(22),
            overview,
            text_input("mosaic file", &state.mosaic_path)
                .on_input(Message::MosaicPathChanged)
                .padding(6),
            row![
                button("Load").on_press(Message::LoadMosaic),
                button("Save").on_press(Message::SaveMosaic),
                button("Positions").on_press(Message::ViewContext(ContextAction::RecordPositions)),
            ]
            .spacing(8),
            text(&state.status).size(14),
            Container::new(scrollable(history_list).height(Length::Fill)).padding(6),
        ]
        .spacing(10)
        .padding(12)
        .width(Length::Fixed(320.0));

        let layout = row![controls_column, sections_canvas, side_column]
            .spacing(12)
            .align_y(Alignment::Start)
            .padding(12);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn load_mosaic(&mut self) {
        let path = self.mosaic_path.trim().to_string();
        match self.sections.load_mosaic_file(Path::new(&path)) {
            Ok(count) => self.push_history(format!("Loaded {count} sections from {path}")),
            Err(err) => self.status = format!("Load failed: {err}"),
        }
    }

    fn report(&mut self, result: stevecore::SectionResult<()>) {
        if let Err(err) = result {
            self.status = err.to_string();
        }
    }

    fn record_request(&mut self, request: Option<AcquisitionRequest>) {
        let Some(request) = request else {
            return;
        };
        let entry = match &request {
            AcquisitionRequest::AddPositions(points) => format!("Recorded {} positions", points.len()),
            AcquisitionRequest::TakePictures(targets) => format!("Requested {} pictures", targets.len()),
        };
        log::info!("{entry}");
        self.push_history(entry);
    }

    /// Re-reads drafts and the painted composite from the section state.
    fn refresh(&mut self) {
        self.drafts = self
            .sections
            .sections()
            .iter()
            .map(RowDraft::from_section)
            .collect();
        let painted = self.sections.view().paint();
        self.composite_size = (painted.width(), painted.height());
        self.composite = if painted.is_empty() {
            None
        } else {
            Some(image::Handle::from_rgba(
                painted.width() as u32,
                painted.height() as u32,
                painted.to_raw(),
            ))
        };
    }

    fn push_history(&mut self, entry: String) {
        self.status = entry.clone();
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

fn control_row<'a>(section: &'a Section, draft: &'a RowDraft) -> Element<'a, Message> {
    let index = section.index();
    let highlight = section.controls().highlight();
    let field = |value: &'a str, field: ControlField| {
        text_input("0", value)
            .on_input(move |value| Message::FieldInput(index, field, value))
            .on_submit(Message::FieldSubmitted(index, field))
            .padding(4)
            .width(Length::Fixed(72.0))
    };

    let content = row![
        button(text(format!("{index}")).size(12)).on_press(Message::RowFocused(index)),
        button(text(if section.is_checked() { "[x]" } else { "[ ]" }).size(12))
            .on_press(Message::CheckToggled(index)),
        field(&draft.x, ControlField::X),
        field(&draft.y, ControlField::Y),
        field(&draft.angle, ControlField::Angle),
    ]
    .spacing(6)
    .align_y(Alignment::Center);

    container(content)
        .padding(4)
        .style(move |_| container::Style {
            background: Some(
                Color::from_rgb8(highlight[0], highlight[1], highlight[2])
                    .scale_alpha(0.25)
                    .into(),
            ),
            ..Default::default()
        })
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_split_into_tiles_and_mosaic() {
        let args = ["a.png", "slide.msc", "b.tif"].into_iter().map(String::from);
        let (tiles, mosaic) = split_arguments(args);
        assert_eq!(tiles, vec![PathBuf::from("a.png"), PathBuf::from("b.tif")]);
        assert_eq!(mosaic, Some(PathBuf::from("slide.msc")));
    }

    #[test]
    fn missing_tiles_are_skipped() {
        let scene = load_scene(&[PathBuf::from("/nonexistent/tile.png")]);
        assert!(scene.tiles().is_empty());
    }
}
