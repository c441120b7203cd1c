//! The shared drawable scene: image tiles placed in pixel space plus the
//! section markers drawn over them.

pub mod marker;

pub use marker::{SceneMarker, DESELECTED_Z, SELECTED_Z};

use crate::frame::{Frame, Rgba};
use std::collections::BTreeMap;

pub const SCENE_BACKDROP: Rgba = [255, 255, 255, 255];

/// Exclusive handle to a marker living in a [`Scene`].
///
/// Not `Clone`: removing the marker consumes the handle.
#[derive(Debug, PartialEq, Eq)]
pub struct MarkerHandle(u64);

/// An image placed with its top-left corner at (`left`, `top`) scene pixels.
#[derive(Debug, Clone)]
pub struct Tile {
    pub frame: Frame,
    pub left: f64,
    pub top: f64,
}

impl Tile {
    pub fn new(frame: Frame, left: f64, top: f64) -> Self {
        Self { frame, left, top }
    }

    pub fn sample(&self, x: f64, y: f64) -> Option<Rgba> {
        let dx = (x - self.left).floor();
        let dy = (y - self.top).floor();
        if dx < 0.0 || dy < 0.0 {
            return None;
        }
        self.frame.pixel(dx as usize, dy as usize)
    }

    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (
            self.left,
            self.top,
            self.frame.width() as f64,
            self.frame.height() as f64,
        )
    }
}

#[derive(Debug)]
pub struct Scene {
    tiles: Vec<Tile>,
    markers: BTreeMap<u64, SceneMarker>,
    next_marker: u64,
    markers_visible: bool,
    chrome_hidden: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            tiles: Vec::new(),
            markers: BTreeMap::new(),
            next_marker: 0,
            markers_visible: true,
            chrome_hidden: false,
        }
    }

    pub fn add_tile(&mut self, tile: Tile) {
        self.tiles.push(tile);
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn add_marker(&mut self, marker: SceneMarker) -> MarkerHandle {
        let id = self.next_marker;
        self.next_marker += 1;
        self.markers.insert(id, marker);
        MarkerHandle(id)
    }

    pub fn remove_marker(&mut self, handle: MarkerHandle) -> Option<SceneMarker> {
        self.markers.remove(&handle.0)
    }

    pub fn marker(&self, handle: &MarkerHandle) -> Option<&SceneMarker> {
        self.markers.get(&handle.0)
    }

    pub fn marker_mut(&mut self, handle: &MarkerHandle) -> Option<&mut SceneMarker> {
        self.markers.get_mut(&handle.0)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Markers in paint order (lowest z first).
    pub fn markers(&self) -> Vec<&SceneMarker> {
        let mut ordered: Vec<&SceneMarker> = self.markers.values().collect();
        ordered.sort_by(|a, b| a.z().total_cmp(&b.z()));
        ordered
    }

    pub fn set_markers_visible(&mut self, visible: bool) {
        self.markers_visible = visible;
    }

    pub fn markers_visible(&self) -> bool {
        self.markers_visible
    }

    /// Previous value is returned so a capture can restore it.
    pub fn set_chrome_hidden(&mut self, hidden: bool) -> bool {
        std::mem::replace(&mut self.chrome_hidden, hidden)
    }

    pub fn chrome_hidden(&self) -> bool {
        self.chrome_hidden
    }

    pub fn draws_markers(&self) -> bool {
        self.markers_visible && !self.chrome_hidden
    }

    /// Colour of the scene at (`x`, `y`) scene pixels.
    pub fn sample(&self, x: f64, y: f64) -> Rgba {
        let mut color = self
            .tiles
            .iter()
            .rev()
            .find_map(|tile| tile.sample(x, y))
            .unwrap_or(SCENE_BACKDROP);

        if self.draws_markers() {
            if let Some(marker) = self
                .markers()
                .into_iter()
                .rev()
                .find(|marker| marker.hits(x, y))
            {
                color = marker.pen();
            }
        }
        color
    }

    /// Bounding box (left, top, right, bottom) of all tiles.
    pub fn extent(&self) -> Option<(f64, f64, f64, f64)> {
        self.tiles.iter().fold(None, |acc, tile| {
            let (left, top, width, height) = tile.bounds();
            let (right, bottom) = (left + width, top + height);
            Some(match acc {
                None => (left, top, right, bottom),
                Some((l, t, r, b)) => (l.min(left), t.min(top), r.max(right), b.max(bottom)),
            })
        })
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
