//! Widget options and scene files
//!
//! `WidgetOptions` is the JSON-facing option set (everything optional, with
//! defaults). `WidgetConfig` is the validated, resolved form the widget runs on.
//! A `Scene` bundles options with a description of the host document so the
//! CLI can build a `HeadlessStage` from a single file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::color::HexColor;
use crate::constants::{defaults, validation};
use crate::stage::DocumentSpec;
use crate::types::Millis;

/// A point as supplied by the caller, before validation
///
/// Coordinates are kept as raw JSON values so that malformed entries
/// (strings, nulls, missing fields) still deserialize and can be dropped
/// by the registry instead of failing the whole options object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    #[serde(default)]
    pub x: Value,
    #[serde(default)]
    pub y: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
}

impl RawPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: Value::from(x),
            y: Value::from(y),
            content_id: None,
        }
    }

    pub fn with_content(mut self, content_id: &str) -> Self {
        self.content_id = Some(content_id.to_string());
        self
    }

    /// Both coordinates, if they are finite numbers >= 0
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let coordinate = |value: &Value| value.as_f64().filter(|v| v.is_finite() && *v >= 0.0);
        Some((coordinate(&self.x)?, coordinate(&self.y)?))
    }
}

/// Recognized widget options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetOptions {
    #[serde(default)]
    pub points: Vec<RawPoint>,

    /// Hit/visual radius in pixels
    #[serde(default = "default_radius")]
    pub radius: f64,

    #[serde(default = "default_point_color")]
    pub point_color: String,

    #[serde(default = "default_selected_point_color")]
    pub selected_point_color: String,

    /// Base transition time in milliseconds
    #[serde(default = "default_fade_duration")]
    pub fade_duration: Millis,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_content_id: Option<String>,

    /// Namespace for generated class names and element ids (generated when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

fn default_radius() -> f64 {
    defaults::RADIUS
}

fn default_point_color() -> String {
    defaults::POINT_COLOR.to_string()
}

fn default_selected_point_color() -> String {
    defaults::SELECTED_POINT_COLOR.to_string()
}

fn default_fade_duration() -> Millis {
    defaults::FADE_DURATION_MS
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            radius: default_radius(),
            point_color: default_point_color(),
            selected_point_color: default_selected_point_color(),
            fade_duration: default_fade_duration(),
            default_content_id: None,
            instance: None,
        }
    }
}

/// Resolved settings the widget runs on
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetConfig {
    pub radius: f64,
    pub point_color: HexColor,
    pub selected_point_color: HexColor,
    pub fade_duration: Millis,
    pub default_content_id: Option<String>,
    pub instance: String,
}

impl WidgetOptions {
    /// Clamp numeric options to usable ranges
    fn validate_and_clamp(&mut self) {
        if !self.radius.is_finite() {
            warn!(radius = self.radius, using = default_radius(), "radius not a number, using default");
            self.radius = default_radius();
        } else if self.radius < validation::MIN_RADIUS {
            warn!(radius = self.radius, min = validation::MIN_RADIUS, "radius below minimum, clamping");
            self.radius = validation::MIN_RADIUS;
        } else if self.radius > validation::MAX_RADIUS {
            warn!(radius = self.radius, max = validation::MAX_RADIUS, "radius exceeds maximum, clamping");
            self.radius = validation::MAX_RADIUS;
        }

        if self.fade_duration > validation::MAX_FADE_DURATION_MS {
            warn!(
                fade_duration = self.fade_duration,
                max = validation::MAX_FADE_DURATION_MS,
                "fade_duration exceeds maximum, clamping"
            );
            self.fade_duration = validation::MAX_FADE_DURATION_MS;
        }
    }

    /// Validate options and resolve colors, falling back to defaults on bad input
    pub fn build_widget_config(&self) -> WidgetConfig {
        let mut options = self.clone();
        options.validate_and_clamp();

        let point_color = HexColor::parse(&options.point_color).unwrap_or_else(|| {
            error!(point_color = %options.point_color, "Invalid point_color hex, using default");
            HexColor::rgb(0xDD, 0x00, 0x00)
        });

        let selected_point_color = HexColor::parse(&options.selected_point_color).unwrap_or_else(|| {
            error!(selected_point_color = %options.selected_point_color, "Invalid selected_point_color hex, using default");
            HexColor::rgb(0x06, 0x99, 0x00)
        });

        let instance = options
            .instance
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());

        WidgetConfig {
            radius: options.radius,
            point_color,
            selected_point_color,
            fade_duration: options.fade_duration,
            default_content_id: options.default_content_id.filter(|id| !id.is_empty()),
            instance,
        }
    }
}

/// A widget plus the document it is mounted in
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub document: DocumentSpec,
    #[serde(default)]
    pub widget: WidgetOptions,
}

impl Scene {
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file {}", path.display()))?;
        let scene: Scene = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse scene file {}", path.display()))?;
        info!(
            path = %path.display(),
            points = scene.widget.points.len(),
            contents = scene.document.contents.len(),
            "Loaded scene"
        );
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_from(json: &str) -> WidgetOptions {
        serde_json::from_str(json).expect("options should parse")
    }

    #[test]
    fn test_defaults_when_empty() {
        let options = options_from("{}");
        assert!(options.points.is_empty());
        assert_eq!(options.radius, 30.0);
        assert_eq!(options.fade_duration, 250);
        assert_eq!(options.point_color, "#DD0000");
        assert_eq!(options.selected_point_color, "#069900");
        assert_eq!(options.default_content_id, None);
    }

    #[test]
    fn test_malformed_points_still_parse() {
        let options = options_from(
            r#"{"points": [
                {"x": 10, "y": 20, "content_id": "a"},
                {"x": "10", "y": 20},
                {"y": 5},
                {"x": -1, "y": 3},
                {"x": 0, "y": 0}
            ]}"#,
        );
        assert_eq!(options.points.len(), 5);
        assert_eq!(options.points[0].coordinates(), Some((10.0, 20.0)));
        assert_eq!(options.points[0].content_id.as_deref(), Some("a"));
        assert_eq!(options.points[1].coordinates(), None);
        assert_eq!(options.points[2].coordinates(), None);
        assert_eq!(options.points[3].coordinates(), None);
        assert_eq!(options.points[4].coordinates(), Some((0.0, 0.0)));
    }

    #[test]
    fn test_build_config_invalid_colors_fallback() {
        let options = WidgetOptions {
            point_color: "not-a-color".to_string(),
            selected_point_color: "#12".to_string(),
            ..WidgetOptions::default()
        };
        let config = options.build_widget_config();
        assert_eq!(config.point_color, HexColor::rgb(0xDD, 0, 0));
        assert_eq!(config.selected_point_color, HexColor::rgb(0x06, 0x99, 0));
    }

    #[test]
    fn test_build_config_clamps_radius_and_fade() {
        let options = WidgetOptions {
            radius: -4.0,
            fade_duration: 10_000_000,
            ..WidgetOptions::default()
        };
        let config = options.build_widget_config();
        assert_eq!(config.radius, validation::MIN_RADIUS);
        assert_eq!(config.fade_duration, validation::MAX_FADE_DURATION_MS);

        let options = WidgetOptions {
            radius: 0.5,
            ..WidgetOptions::default()
        };
        assert_eq!(options.build_widget_config().radius, validation::MIN_RADIUS);

        let options = WidgetOptions {
            radius: f64::NAN,
            ..WidgetOptions::default()
        };
        assert_eq!(options.build_widget_config().radius, 30.0);

        let options = WidgetOptions {
            radius: 1.0e9,
            ..WidgetOptions::default()
        };
        assert_eq!(options.build_widget_config().radius, validation::MAX_RADIUS);
    }

    #[test]
    fn test_instance_injected_or_generated() {
        let options = WidgetOptions {
            instance: Some("hero".to_string()),
            ..WidgetOptions::default()
        };
        assert_eq!(options.build_widget_config().instance, "hero");

        let first = WidgetOptions::default().build_widget_config().instance;
        let second = WidgetOptions::default().build_widget_config().instance;
        assert!(!first.is_empty());
        assert_ne!(first, second);
    }

    #[test]
    fn test_empty_default_content_id_is_unset() {
        let options = WidgetOptions {
            default_content_id: Some(String::new()),
            ..WidgetOptions::default()
        };
        assert_eq!(options.build_widget_config().default_content_id, None);
    }

    #[test]
    fn test_scene_parses_document_and_widget() {
        let scene: Scene = serde_json::from_str(
            r#"{
                "document": {
                    "offset": {"top": 100, "left": 100},
                    "contents": [{"id": "intro", "visible": true}, {"id": "a"}]
                },
                "widget": {"points": [{"x": 50, "y": 50, "content_id": "a"}], "default_content_id": "intro"}
            }"#,
        )
        .expect("scene should parse");
        assert_eq!(scene.document.offset.top, 100.0);
        assert_eq!(scene.document.contents.len(), 2);
        assert!(scene.document.contents[0].visible);
        assert!(!scene.document.contents[1].visible);
        assert_eq!(scene.widget.default_content_id.as_deref(), Some("intro"));
    }
}
