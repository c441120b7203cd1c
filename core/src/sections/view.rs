use crate::frame::{Frame, Rgba};

pub const ZOOM_STEP: f64 = 1.2;
pub const GUIDE_OPACITY: f32 = 0.2;
pub const GUIDE_COLOR: Rgba = [0, 0, 0, 255];
pub const VIEW_BACKDROP: Rgba = [255, 255, 255, 255];

/// Picture count that requests a grid around each section.
pub const GRID_PICTURES: i32 = -1;

/// Keys understood by the section views, with their platform key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    W,
    A,
    S,
    D,
    Q,
    E,
    P,
    U,
    G,
    Delete,
    Space,
    Digit3,
    Digit5,
    Other(i32),
}

impl Key {
    const TABLE: [(Key, i32, &'static str); 15] = [
        (Key::Up, 0x0100_0013, "up"),
        (Key::Down, 0x0100_0015, "down"),
        (Key::W, 0x57, "w"),
        (Key::A, 0x41, "a"),
        (Key::S, 0x53, "s"),
        (Key::D, 0x44, "d"),
        (Key::Q, 0x51, "q"),
        (Key::E, 0x45, "e"),
        (Key::P, 0x50, "p"),
        (Key::U, 0x55, "u"),
        (Key::G, 0x47, "g"),
        (Key::Delete, 0x0100_0007, "delete"),
        (Key::Space, 0x20, "space"),
        (Key::Digit3, 0x33, "3"),
        (Key::Digit5, 0x35, "5"),
    ];

    pub fn from_code(code: i32) -> Self {
        Self::TABLE
            .iter()
            .find(|(_, known, _)| *known == code)
            .map(|(key, _, _)| *key)
            .unwrap_or(Key::Other(code))
    }

    pub fn code(&self) -> i32 {
        match self {
            Key::Other(code) => *code,
            key => Self::TABLE
                .iter()
                .find(|(known, _, _)| known == key)
                .map(|(_, code, _)| *code)
                .unwrap_or_default(),
        }
    }

    /// Case-insensitive lookup by the short names used in key scripts.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::TABLE
            .iter()
            .find(|(_, _, known)| *known == name)
            .map(|(key, _, _)| *key)
    }
}

/// Raw interaction events the view raises; it never handles them itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewEvent {
    Key(Key),
    Pictures(i32),
    Positions,
    Resize { width: usize, height: usize },
    Zoom(f64),
}

/// Entries of the view's context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextAction {
    TakePictures,
    RecordPositions,
}

/// Composited display: averaged background, live foreground and guides.
#[derive(Debug, Clone)]
pub struct SectionsView {
    background: Option<Frame>,
    foreground: Option<Frame>,
    foreground_opacity: f32,
    width: usize,
    height: usize,
}

impl SectionsView {
    pub fn new(width: usize, height: usize, foreground_opacity: f32) -> Self {
        Self {
            background: None,
            foreground: None,
            foreground_opacity: foreground_opacity.clamp(0.0, 1.0),
            width,
            height,
        }
    }

    pub fn change_opacity(&mut self, foreground_opacity: f32) {
        self.foreground_opacity = foreground_opacity.clamp(0.0, 1.0);
    }

    pub fn foreground_opacity(&self) -> f32 {
        self.foreground_opacity
    }

    pub fn set_background_pixmap(&mut self, pixmap: Option<Frame>) {
        self.background = pixmap;
    }

    pub fn set_foreground_pixmap(&mut self, pixmap: Option<Frame>) {
        self.foreground = pixmap;
    }

    pub fn background_pixmap(&self) -> Option<&Frame> {
        self.background.as_ref()
    }

    pub fn foreground_pixmap(&self) -> Option<&Frame> {
        self.foreground.as_ref()
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn key_press(&self, key: Key) -> ViewEvent {
        match key {
            Key::Space => ViewEvent::Pictures(1),
            Key::Digit3 => ViewEvent::Pictures(3),
            Key::Digit5 => ViewEvent::Pictures(5),
            Key::G => ViewEvent::Pictures(GRID_PICTURES),
            other => ViewEvent::Key(other),
        }
    }

    pub fn context_action(&self, action: ContextAction) -> ViewEvent {
        match action {
            ContextAction::TakePictures => ViewEvent::Pictures(1),
            ContextAction::RecordPositions => ViewEvent::Positions,
        }
    }

    /// Reports a resize only when the size actually changed.
    pub fn resize(&mut self, width: usize, height: usize) -> Option<ViewEvent> {
        if (width, height) == (self.width, self.height) {
            return None;
        }
        self.width = width;
        self.height = height;
        Some(ViewEvent::Resize { width, height })
    }

    pub fn wheel(&self, delta: f64) -> ViewEvent {
        if delta > 0.0 {
            ViewEvent::Zoom(ZOOM_STEP)
        } else {
            ViewEvent::Zoom(1.0 / ZOOM_STEP)
        }
    }

    fn centered(&self, frame: &Frame) -> (i64, i64) {
        let left = (self.width as i64 - frame.width() as i64).div_euclid(2);
        let top = (self.height as i64 - frame.height() as i64).div_euclid(2);
        (left, top)
    }

    pub fn paint(&self) -> Frame {
        let mut canvas = Frame::new(self.width, self.height, VIEW_BACKDROP);

        if let Some(background) = &self.background {
            let (left, top) = self.centered(background);
            canvas.draw_frame(background, left, top, 1.0);
        }
        if let Some(foreground) = &self.foreground {
            let (left, top) = self.centered(foreground);
            canvas.draw_frame(foreground, left, top, self.foreground_opacity);
        }

        let x_mid = (self.width / 2) as i64;
        let y_mid = (self.height / 2) as i64;
        for x in 0..self.width as i64 {
            canvas.blend_pixel(x, y_mid, GUIDE_COLOR, GUIDE_OPACITY);
        }
        for y in 0..self.height as i64 {
            if y != y_mid {
                canvas.blend_pixel(x_mid, y, GUIDE_COLOR, GUIDE_OPACITY);
            }
        }
        canvas
    }
}
