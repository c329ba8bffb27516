//! The host document as seen by a widget
//!
//! A widget never owns the document. It measures the container, looks up and
//! tags content elements, creates its marker elements and pushes styles, all
//! through the `Stage` trait. `HeadlessStage` is an in-memory document used by
//! the CLI and the tests.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::color::HexColor;
use crate::types::Offset;

/// Inline style of an element, as far as a widget cares
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Style {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<HexColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    /// `display` is anything but `none`
    pub displayed: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            opacity: 1.0,
            background: None,
            z_index: None,
            displayed: true,
        }
    }
}

impl Style {
    /// Style of a content element that is either shown or hidden
    pub fn content(displayed: bool) -> Self {
        Self {
            displayed,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Dot,
    Ring,
}

/// An absolutely positioned, round marker element created inside the container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerElement {
    pub element_id: String,
    pub class: String,
    pub kind: MarkerKind,
}

pub trait Stage {
    /// Current page offset of the container
    fn page_offset(&self) -> Offset;

    /// Make the container a positioning context (`position: relative` if static)
    fn make_positioned(&mut self);

    /// `Some(displayed)` if a content element with this id exists
    fn content_display(&self, id: &str) -> Option<bool>;

    /// Add a class to an existing content element
    fn tag_content(&mut self, id: &str, class: &str);

    /// Append a marker element to the container
    fn create_marker(&mut self, marker: &MarkerElement, style: &Style);

    /// Replace the inline style of a marker or content element
    fn apply_style(&mut self, element_id: &str, style: &Style);

    /// Remove a marker element created by `create_marker`
    fn remove_marker(&mut self, element_id: &str);
}

/// A content element declared in a scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSpec {
    pub id: String,
    #[serde(default)]
    pub visible: bool,
}

/// Description of the document a headless widget is mounted in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSpec {
    #[serde(default)]
    pub offset: Offset,
    #[serde(default)]
    pub contents: Vec<ContentSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentNode {
    pub id: String,
    pub classes: Vec<String>,
    pub style: Style,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerNode {
    #[serde(flatten)]
    pub element: MarkerElement,
    pub style: Style,
}

/// In-memory document
#[derive(Debug, Clone, Default, Serialize)]
pub struct HeadlessStage {
    pub offset: Offset,
    pub positioned: bool,
    pub contents: Vec<ContentNode>,
    pub markers: Vec<MarkerNode>,
    /// Number of `apply_style` calls received
    #[serde(skip)]
    pub style_writes: usize,
}

impl HeadlessStage {
    pub fn new(offset: Offset) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    pub fn from_document(document: &DocumentSpec) -> Self {
        let mut stage = Self::new(document.offset);
        for content in &document.contents {
            stage.add_content(&content.id, content.visible);
        }
        stage
    }

    pub fn add_content(&mut self, id: &str, visible: bool) {
        self.contents.push(ContentNode {
            id: id.to_string(),
            classes: Vec::new(),
            style: Style::content(visible),
        });
    }

    /// Move the container, as a scroll or relayout would
    pub fn set_offset(&mut self, offset: Offset) {
        debug!(top = offset.top, left = offset.left, "Container moved");
        self.offset = offset;
    }

    pub fn content(&self, id: &str) -> Option<&ContentNode> {
        self.contents.iter().find(|node| node.id == id)
    }

    pub fn marker(&self, element_id: &str) -> Option<&MarkerNode> {
        self.markers
            .iter()
            .find(|node| node.element.element_id == element_id)
    }

    pub fn is_content_visible(&self, id: &str) -> bool {
        self.content(id).is_some_and(|node| node.style.displayed)
    }

    /// Ids of displayed content elements, in document order
    pub fn visible_contents(&self) -> Vec<&str> {
        self.contents
            .iter()
            .filter(|node| node.style.displayed)
            .map(|node| node.id.as_str())
            .collect()
    }

    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Stage for HeadlessStage {
    fn page_offset(&self) -> Offset {
        self.offset
    }

    fn make_positioned(&mut self) {
        self.positioned = true;
    }

    fn content_display(&self, id: &str) -> Option<bool> {
        self.content(id).map(|node| node.style.displayed)
    }

    fn tag_content(&mut self, id: &str, class: &str) {
        match self.contents.iter_mut().find(|node| node.id == id) {
            Some(node) => {
                if !node.classes.iter().any(|existing| existing == class) {
                    node.classes.push(class.to_string());
                }
            }
            None => warn!(id = %id, "Tried to tag missing content element"),
        }
    }

    fn create_marker(&mut self, marker: &MarkerElement, style: &Style) {
        trace!(element = %marker.element_id, kind = ?marker.kind, "Created marker");
        self.markers.push(MarkerNode {
            element: marker.clone(),
            style: style.clone(),
        });
    }

    fn apply_style(&mut self, element_id: &str, style: &Style) {
        self.style_writes += 1;
        if let Some(node) = self
            .markers
            .iter_mut()
            .find(|node| node.element.element_id == element_id)
        {
            node.style = style.clone();
        } else if let Some(node) = self.contents.iter_mut().find(|node| node.id == element_id) {
            node.style = style.clone();
        } else {
            warn!(element = %element_id, "Style for unknown element dropped");
        }
    }

    fn remove_marker(&mut self, element_id: &str) {
        self.markers.retain(|node| node.element.element_id != element_id);
    }
}
