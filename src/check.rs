//! Scene validation report

use crate::config::Scene;
use crate::geometry::compute_bounds;
use crate::registry::{Namespace, register};
use crate::stage::HeadlessStage;

/// Register a scene's points on a throwaway stage and describe the result
///
/// One line per accepted point with its hit box and content binding, plus a
/// warning line if the default content element is missing.
pub fn check_scene(scene: &Scene) -> Vec<String> {
    let config = scene.widget.build_widget_config();
    let mut stage = HeadlessStage::from_document(&scene.document);
    let points = register(
        &scene.widget.points,
        &mut stage,
        &Namespace::new(&config.instance),
        config.point_color,
    );

    let mut lines = vec![format!(
        "{} of {} points accepted (radius {}, offset top {} left {})",
        points.len(),
        scene.widget.points.len(),
        config.radius,
        stage.offset.top,
        stage.offset.left
    )];
    for point in points.iter() {
        let bounds = compute_bounds(point, stage.offset, config.radius);
        lines.push(format!(
            "  #{} ({}, {}) box ({}, {})-({}, {}) content={}",
            point.id,
            point.x,
            point.y,
            bounds.x1,
            bounds.y1,
            bounds.x2,
            bounds.y2,
            point.content_id.as_deref().unwrap_or("-")
        ));
    }
    if let Some(id) = &config.default_content_id
        && stage.content(id).is_none()
    {
        lines.push(format!("  default content '{id}' not found in document"));
    }
    lines
}
