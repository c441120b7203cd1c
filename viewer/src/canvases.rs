use crate::Message;
use iced::widget::canvas::{self, Frame, Geometry, Path, Stroke};
use iced::widget::{image, Action};
use iced::{keyboard, mouse, Color, Point, Rectangle, Renderer, Size, Theme};
use stevecore::scene::Scene;
use stevecore::sections::{ContextAction, Key};

/// Translates an iced key into the key code the sections view understands.
pub fn key_code(key: &keyboard::Key) -> Option<i32> {
    match key {
        keyboard::Key::Named(keyboard::key::Named::ArrowUp) => Some(Key::Up.code()),
        keyboard::Key::Named(keyboard::key::Named::ArrowDown) => Some(Key::Down.code()),
        keyboard::Key::Named(keyboard::key::Named::Delete) => Some(Key::Delete.code()),
        keyboard::Key::Named(keyboard::key::Named::Space) => Some(Key::Space.code()),
        keyboard::Key::Character(chars) => chars
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase() as i32),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct ViewState {
    size: Option<(usize, usize)>,
}

/// The painted composite of the sections view, centred in the canvas.
pub struct SectionsCanvas<'a> {
    pub handle: Option<&'a image::Handle>,
    pub size: (usize, usize),
}

impl<'a> canvas::Program<Message> for SectionsCanvas<'a> {
    type State = ViewState;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::from_rgb(0.1, 0.1, 0.1));

        if let Some(handle) = self.handle {
            let (width, height) = (self.size.0 as f32, self.size.1 as f32);
            let origin = Point::new(
                (bounds.width - width) / 2.0,
                (bounds.height - height) / 2.0,
            );
            frame.draw_image(
                Rectangle::new(origin, Size::new(width, height)),
                canvas::Image::new(handle.clone())
                    .filter_method(image::FilterMethod::Nearest),
            );
        }
        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<Action<Message>> {
        let size = (bounds.width.max(0.0) as usize, bounds.height.max(0.0) as usize);
        if state.size != Some(size) {
            state.size = Some(size);
            return Some(Action::publish(Message::ViewResized(size.0, size.1)));
        }

        let hovered = cursor.position_in(bounds).is_some();
        match event {
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) if hovered => {
                let y = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => *y,
                    mouse::ScrollDelta::Pixels { y, .. } => *y / 120.0,
                };
                if y == 0.0 {
                    return None;
                }
                Some(Action::publish(Message::ViewWheel(f64::from(y))).and_capture())
            }
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Right)) if hovered => {
                Some(
                    Action::publish(Message::ViewContext(ContextAction::TakePictures))
                        .and_capture(),
                )
            }
            canvas::Event::Keyboard(keyboard::Event::KeyPressed { key, .. }) if hovered => {
                key_code(key).map(|code| Action::publish(Message::ViewKey(code)).and_capture())
            }
            _ => None,
        }
    }
}

/// Whole-scene overview: tiles as outlines, markers as circles.
pub struct OverviewCanvas<'a> {
    pub scene: &'a Scene,
}

const OVERVIEW_MARGIN: f32 = 8.0;

impl<'a> OverviewCanvas<'a> {
    /// Scene-to-canvas scale and the scene point drawn at the canvas origin.
    fn fit(&self, bounds: Size) -> (f32, Point) {
        let (left, top, right, bottom) = self.scene.extent().unwrap_or((0.0, 0.0, 512.0, 512.0));
        let width = (right - left).max(1.0) as f32;
        let height = (bottom - top).max(1.0) as f32;
        let scale = ((bounds.width - 2.0 * OVERVIEW_MARGIN) / width)
            .min((bounds.height - 2.0 * OVERVIEW_MARGIN) / height)
            .max(f32::EPSILON);
        let origin = Point::new(
            left as f32 - OVERVIEW_MARGIN / scale,
            top as f32 - OVERVIEW_MARGIN / scale,
        );
        (scale, origin)
    }
}

fn color(rgba: [u8; 4]) -> Color {
    Color::from_rgba8(rgba[0], rgba[1], rgba[2], f32::from(rgba[3]) / 255.0)
}

impl<'a> canvas::Program<Message> for OverviewCanvas<'a> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::from_rgb(0.02, 0.02, 0.04));

        let (scale, origin) = self.fit(bounds.size());
        let to_canvas = |x: f64, y: f64| {
            Point::new((x as f32 - origin.x) * scale, (y as f32 - origin.y) * scale)
        };

        for tile in self.scene.tiles() {
            let (left, top, width, height) = tile.bounds();
            let outline = Path::rectangle(
                to_canvas(left, top),
                Size::new(width as f32 * scale, height as f32 * scale),
            );
            frame.stroke(
                &outline,
                Stroke::default().with_color(Color::from_rgb(0.35, 0.35, 0.45)),
            );
        }

        for marker in self.scene.markers() {
            let (x, y) = marker.center();
            let radius = (marker.size() as f32 * scale / 2.0).max(3.0);
            let circle = Path::circle(to_canvas(x, y), radius);
            frame.stroke(
                &circle,
                Stroke::default().with_width(2.0).with_color(color(marker.pen())),
            );
        }
        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        _state: &mut Self::State,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<Action<Message>> {
        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_in(bounds)?;
                let (scale, origin) = self.fit(bounds.size());
                let x = f64::from(position.x / scale + origin.x);
                let y = f64::from(position.y / scale + origin.y);
                Some(Action::publish(Message::OverviewClicked(x, y)).and_capture())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_view_codes() {
        let up = keyboard::Key::Named(keyboard::key::Named::ArrowUp);
        assert_eq!(key_code(&up), Some(Key::Up.code()));
        let w = keyboard::Key::Character("w".into());
        assert_eq!(key_code(&w), Some(Key::W.code()));
        let five = keyboard::Key::Character("5".into());
        assert_eq!(key_code(&five), Some(Key::Digit5.code()));
        let shift = keyboard::Key::Named(keyboard::key::Named::Shift);
        assert_eq!(key_code(&shift), None);
    }
}
