use crate::frame::Frame;

/// Common error type for section management.
#[derive(thiserror::Error, Debug)]
pub enum SectionError {
    #[error("malformed section record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
    #[error("section index {index} out of range for {count} sections")]
    InvalidIndex { index: usize, count: usize },
    #[error("image failure: {0}")]
    Image(#[from] image::ImageError),
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
}

pub type SectionResult<T> = Result<T, SectionError>;

/// Outcome of a single capture: a frame, or nothing usable.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderResult {
    Frame(Frame),
    Empty,
}

impl RenderResult {
    pub fn into_frame(self) -> Option<Frame> {
        match self {
            RenderResult::Frame(frame) => Some(frame),
            RenderResult::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RenderResult::Empty)
    }
}
