//! Point validation, id assignment and marker creation

use serde::Serialize;
use tracing::{debug, info};

use crate::color::HexColor;
use crate::config::RawPoint;
use crate::constants::{marker, naming};
use crate::stage::{MarkerElement, MarkerKind, Stage, Style};
use crate::types::PointId;

/// Per-instance naming of classes and element ids
///
/// Two widgets on one page never share a class or an element id as long as
/// their instance names differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    instance: String,
}

impl Namespace {
    pub fn new(instance: &str) -> Self {
        Self {
            instance: instance.to_string(),
        }
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    fn prefix(&self) -> String {
        format!("{}_{}", naming::PREFIX, self.instance)
    }

    pub fn dot_class(&self) -> String {
        format!("{}_point_dot", self.prefix())
    }

    pub fn ring_class(&self) -> String {
        format!("{}_point_circle", self.prefix())
    }

    /// Class shared by every element of the content group
    pub fn content_class(&self) -> String {
        format!("{}_content", self.prefix())
    }

    pub fn marker_id(&self, id: PointId, kind: MarkerKind) -> String {
        let suffix = match kind {
            MarkerKind::Dot => "dot",
            MarkerKind::Ring => "ring",
        };
        format!("{}_point_{}_{}", self.prefix(), id, suffix)
    }
}

/// A validated point
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub id: PointId,
    /// Offset from the container's left edge
    pub x: f64,
    /// Offset from the container's top edge
    pub y: f64,
    /// Bound content element, if one was supplied and exists
    pub content_id: Option<String>,
    /// Element id of the dot marker
    pub dot: String,
    /// Element id of the ring marker
    pub ring: String,
}

impl Point {
    #[cfg(test)]
    pub(crate) fn bare(id: PointId, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            content_id: None,
            dot: format!("dot{id}"),
            ring: format!("ring{id}"),
        }
    }
}

/// Public data handed to the select callback
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedPoint {
    pub id: PointId,
    pub x: f64,
    pub y: f64,
    pub content_id: Option<String>,
}

impl From<&Point> for SelectedPoint {
    fn from(point: &Point) -> Self {
        Self {
            id: point.id,
            x: point.x,
            y: point.y,
            content_id: point.content_id.clone(),
        }
    }
}

/// Accepted points in registration order; `points[i].id == i`
#[derive(Debug, Clone, Default)]
pub struct PointSet {
    points: Vec<Point>,
}

impl PointSet {
    pub fn get(&self, id: PointId) -> Option<&Point> {
        self.points.get(id)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }
}

/// Resting dot: 4x4, nudged up/left so it sits on the point
pub fn dot_style(point: &Point, color: HexColor) -> Style {
    Style {
        left: point.x - marker::DOT_OFFSET,
        top: point.y - marker::DOT_OFFSET,
        width: marker::DOT_SIZE,
        height: marker::DOT_SIZE,
        background: Some(color),
        z_index: Some(marker::DOT_Z_INDEX),
        ..Style::default()
    }
}

/// Resting ring: zero-size at the point, fully opaque
pub fn ring_rest_style(point: &Point, color: HexColor) -> Style {
    Style {
        left: point.x,
        top: point.y,
        width: 0.0,
        height: 0.0,
        opacity: 1.0,
        background: Some(color),
        ..Style::default()
    }
}

/// Ring grown to a circle of diameter `2 * radius` centered on the point
pub fn ring_expanded_style(point: &Point, radius: f64, opacity: f64, color: Option<HexColor>) -> Style {
    Style {
        left: point.x - radius,
        top: point.y - radius,
        width: radius * 2.0,
        height: radius * 2.0,
        opacity,
        background: color,
        ..Style::default()
    }
}

/// Validate raw points, assign ids, bind content and create marker elements
pub fn register<S: Stage + ?Sized>(
    raw_points: &[RawPoint],
    stage: &mut S,
    namespace: &Namespace,
    point_color: HexColor,
) -> PointSet {
    let mut points = Vec::with_capacity(raw_points.len());
    let content_class = namespace.content_class();

    for (index, raw) in raw_points.iter().enumerate() {
        let Some((x, y)) = raw.coordinates() else {
            debug!(index = index, x = %raw.x, y = %raw.y, "Dropped point with invalid coordinates");
            continue;
        };
        let id = points.len();

        let content_id = raw
            .content_id
            .as_deref()
            .filter(|content_id| !content_id.is_empty())
            .and_then(|content_id| {
                if stage.content_display(content_id).is_some() {
                    stage.tag_content(content_id, &content_class);
                    Some(content_id.to_string())
                } else {
                    debug!(point = id, content_id = %content_id, "Content element not found, point has no content");
                    None
                }
            });

        let point = Point {
            id,
            x,
            y,
            content_id,
            dot: namespace.marker_id(id, MarkerKind::Dot),
            ring: namespace.marker_id(id, MarkerKind::Ring),
        };

        stage.create_marker(
            &MarkerElement {
                element_id: point.dot.clone(),
                class: namespace.dot_class(),
                kind: MarkerKind::Dot,
            },
            &dot_style(&point, point_color),
        );
        stage.create_marker(
            &MarkerElement {
                element_id: point.ring.clone(),
                class: namespace.ring_class(),
                kind: MarkerKind::Ring,
            },
            &ring_rest_style(&point, point_color),
        );

        points.push(point);
    }

    info!(
        instance = %namespace.instance(),
        accepted = points.len(),
        dropped = raw_points.len() - points.len(),
        "Registered points"
    );
    PointSet { points }
}
