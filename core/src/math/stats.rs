use crate::frame::{Frame, CHANNELS};
use ndarray::Array3;

/// Pixel-wise sum of equally sized frames, reduced to their mean on demand.
#[derive(Debug, Default)]
pub struct FrameAccumulator {
    sum: Option<Array3<f64>>,
    count: usize,
}

impl FrameAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a frame to the sum; frames whose shape differs from the first are rejected.
    pub fn add(&mut self, frame: &Frame) -> bool {
        let view = frame.view();
        match self.sum.as_mut() {
            Some(sum) => {
                if sum.shape() != view.shape() {
                    return false;
                }
                sum.zip_mut_with(&view, |acc, &value| *acc += value as f64);
            }
            None => self.sum = Some(view.mapv(|value| value as f64)),
        }
        self.count += 1;
        true
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean frame, truncated to 8 bits; `None` when nothing was added.
    pub fn mean(&self) -> Option<Frame> {
        let sum = self.sum.as_ref()?;
        if self.count == 0 {
            return None;
        }
        let divisor = self.count as f64;
        let pixels = sum.mapv(|value| (value / divisor) as u8);
        debug_assert_eq!(pixels.shape()[2], CHANNELS);
        Frame::from_array(pixels)
    }
}
