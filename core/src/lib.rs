//! Section management core for the Rust steve mosaic tool.
//!
//! Sections are regions of interest on a sample. Each one keeps an on-scene
//! marker, an editable control row and its composited preview in lock-step,
//! while the orchestrator averages renders of the checked sections into a
//! background image and renders the active section as a live foreground.

pub mod acquisition;
pub mod config;
pub mod coord;
pub mod frame;
pub mod math;
pub mod prelude;
pub mod scene;
pub mod sections;
pub mod telemetry;

pub use config::SectionsConfig;
pub use coord::{Point, UnitScale};
pub use frame::Frame;
pub use prelude::{RenderResult, SectionError, SectionResult};
pub use sections::Sections;
