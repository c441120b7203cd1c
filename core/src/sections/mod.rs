//! Section bookkeeping: per-section controls and markers, the controls list,
//! the composited view and the orchestrator tying them together.

pub mod controls;
pub mod controls_list;
pub mod mosaic;
pub mod orchestrator;
pub mod renderer;
pub mod section;
pub mod view;

pub use controls::{ControlEvent, ControlField, SectionControls};
pub use controls_list::SectionControlsList;
pub use orchestrator::Sections;
pub use renderer::{SceneRender, SectionRenderer};
pub use section::{Section, SectionEvent};
pub use view::{ContextAction, Key, SectionsView, ViewEvent};
