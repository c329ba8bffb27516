//! Hover-selectable hotspot markers over a container
//!
//! A [`Widget`] validates designer-supplied points, creates a dot and a
//! pulsing ring per point inside its container, and selects the point under
//! the pointer: at most one at a time, with content swaps and marker
//! recoloring driven through the host [`Stage`].

#![forbid(unsafe_code)]

pub mod animation;
pub mod check;
pub mod color;
pub mod config;
pub mod constants;
pub mod driver;
pub mod fx;
pub mod geometry;
pub mod pulse;
pub mod registry;
pub mod selection;
pub mod stage;
pub mod timeline;
pub mod trace;
pub mod types;
pub mod widget;

pub use config::{RawPoint, Scene, WidgetConfig, WidgetOptions};
pub use registry::SelectedPoint;
pub use selection::{SelectionState, Transition};
pub use stage::{HeadlessStage, Stage, Style};
pub use types::{Millis, Offset, PagePosition, PointId};
pub use widget::Widget;
