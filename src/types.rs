//! Small value types shared across modules

use serde::{Deserialize, Serialize};

/// Timestamp or duration in milliseconds on the widget's clock
pub type Millis = u64;

/// Sequential point identifier (registration order)
pub type PointId = usize;

/// Page-relative offset of the container's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub top: f64,
    pub left: f64,
}

impl Offset {
    pub fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }
}

/// Pointer location in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PagePosition {
    pub x: f64,
    pub y: f64,
}

impl PagePosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
