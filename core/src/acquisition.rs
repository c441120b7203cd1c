use crate::coord::Point;
use serde::{Deserialize, Serialize};

/// One stop for the acquisition driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaptureTarget {
    /// Absolute section centre.
    Location(Point),
    /// Move relative to the preceding location, in picture-field steps.
    Offset { dx: i32, dy: i32 },
}

/// Requests handed to the acquisition driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "request", content = "targets", rename_all = "snake_case")]
pub enum AcquisitionRequest {
    AddPositions(Vec<Point>),
    TakePictures(Vec<CaptureTarget>),
}

impl AcquisitionRequest {
    pub fn len(&self) -> usize {
        match self {
            AcquisitionRequest::AddPositions(points) => points.len(),
            AcquisitionRequest::TakePictures(targets) => targets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Largest spiral handed to the acquisition driver for one section.
pub const MAX_SPIRAL_PICTURES: usize = 4096;

/// The first `count` cells of a square spiral around the origin, origin
/// excluded. `count` is clamped to [`MAX_SPIRAL_PICTURES`].
pub fn create_spiral(count: usize) -> Vec<CaptureTarget> {
    const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

    let count = count.min(MAX_SPIRAL_PICTURES);
    let mut offsets = Vec::with_capacity(count);
    let (mut x, mut y) = (0, 0);
    let mut leg = 0usize;
    while offsets.len() < count {
        let (step_x, step_y) = DIRECTIONS[leg % 4];
        let length = leg / 2 + 1;
        for _ in 0..length {
            if offsets.len() == count {
                break;
            }
            x += step_x;
            y += step_y;
            offsets.push(CaptureTarget::Offset { dx: x, dy: y });
        }
        leg += 1;
    }
    offsets
}

/// `x_count * y_count` cells centred on the origin, visited row by row with
/// every other row reversed.
pub fn create_grid(x_count: usize, y_count: usize) -> Vec<CaptureTarget> {
    let x_half = (x_count.saturating_sub(1) / 2) as i32;
    let y_half = (y_count.saturating_sub(1) / 2) as i32;

    let mut offsets = Vec::with_capacity(x_count * y_count);
    for row in 0..y_count {
        let dy = row as i32 - y_half;
        let mut columns: Vec<i32> = (0..x_count).map(|col| col as i32 - x_half).collect();
        if row % 2 == 1 {
            columns.reverse();
        }
        offsets.extend(columns.into_iter().map(|dx| CaptureTarget::Offset { dx, dy }));
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(targets: &[CaptureTarget]) -> Vec<(i32, i32)> {
        targets
            .iter()
            .filter_map(|target| match target {
                CaptureTarget::Offset { dx, dy } => Some((*dx, *dy)),
                CaptureTarget::Location(_) => None,
            })
            .collect()
    }

    #[test]
    fn spiral_walks_outward_from_the_origin() {
        assert_eq!(
            offsets(&create_spiral(9)),
            vec![
                (1, 0),
                (1, 1),
                (0, 1),
                (-1, 1),
                (-1, 0),
                (-1, -1),
                (0, -1),
                (1, -1),
                (2, -1)
            ]
        );
        assert!(create_spiral(0).is_empty());
    }

    #[test]
    fn oversized_spiral_is_clamped() {
        let spiral = create_spiral(usize::MAX);
        assert_eq!(spiral.len(), MAX_SPIRAL_PICTURES);
        assert_eq!(offsets(&spiral[..2]), vec![(1, 0), (1, 1)]);
    }

    #[test]
    fn grid_is_centred_and_serpentine() {
        let grid = offsets(&create_grid(3, 2));
        assert_eq!(grid, vec![(-1, 0), (0, 0), (1, 0), (1, 1), (0, 1), (-1, 1)]);
        assert_eq!(create_grid(5, 3).len(), 15);
        assert!(create_grid(0, 3).is_empty());
    }

    #[test]
    fn requests_serialize_with_tags() {
        let request = AcquisitionRequest::TakePictures(vec![CaptureTarget::Offset { dx: 1, dy: 0 }]);
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            r#"{"request":"take_pictures","targets":[{"kind":"offset","dx":1,"dy":0}]}"#
        );
    }
}
