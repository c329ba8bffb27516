//! Single-selection state machine and its visual effects
//!
//! The controller only ever moves `Unselected -> Selected(id)` or
//! `Selected(id) -> Unselected`. While a point is selected no other point is
//! hit-tested, so the pointer has to leave the active box before anything
//! else can be picked.

use serde::Serialize;
use tracing::{debug, info};

use crate::animation::{Motion, Props};
use crate::constants::{marker, timing};
use crate::fx::{Fx, Job};
use crate::geometry::GeometryTracker;
use crate::registry::{SelectedPoint, ring_expanded_style};
use crate::stage::Stage;
use crate::types::{PagePosition, PointId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "point", rename_all = "snake_case")]
pub enum SelectionState {
    #[default]
    Unselected,
    Selected(PointId),
}

/// A state change produced by a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "transition", content = "point", rename_all = "snake_case")]
pub enum Transition {
    Selected(PointId),
    Unselected(PointId),
}

pub type SelectCallback = Box<dyn FnMut(&SelectedPoint)>;

#[derive(Default)]
pub struct SelectionController {
    state: SelectionState,
    on_select: Option<SelectCallback>,
}

impl std::fmt::Debug for SelectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionController")
            .field("state", &self.state)
            .field("on_select", &self.on_select.is_some())
            .finish()
    }
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_callback(&mut self, callback: SelectCallback) {
        self.on_select = Some(callback);
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn selected(&self) -> Option<PointId> {
        match self.state {
            SelectionState::Selected(id) => Some(id),
            SelectionState::Unselected => None,
        }
    }

    pub fn is_selected(&self, id: PointId) -> bool {
        self.state == SelectionState::Selected(id)
    }

    /// Decide the transition, if any, for a pointer move
    pub fn on_pointer_move(&mut self, position: PagePosition, geometry: &GeometryTracker) -> Option<Transition> {
        match self.state {
            SelectionState::Unselected => geometry.first_hit(position).and_then(|id| self.select(id)),
            SelectionState::Selected(id) if geometry.hit(id, position) => None,
            SelectionState::Selected(_) => self.unselect(),
        }
    }

    /// Select a point; a no-op when it is already selected or another is
    pub fn select(&mut self, id: PointId) -> Option<Transition> {
        match self.state {
            SelectionState::Unselected => {
                self.state = SelectionState::Selected(id);
                info!(point = id, "Point selected");
                Some(Transition::Selected(id))
            }
            SelectionState::Selected(current) if current == id => None,
            SelectionState::Selected(current) => {
                debug!(point = id, selected = current, "Ignoring select while another point is active");
                None
            }
        }
    }

    pub fn unselect(&mut self) -> Option<Transition> {
        let id = self.selected()?;
        self.state = SelectionState::Unselected;
        info!(point = id, "Point unselected");
        Some(Transition::Unselected(id))
    }

    /// Run the visual side of a transition
    pub fn apply<S: Stage>(&mut self, transition: Transition, fx: &mut Fx<'_, S>) {
        match transition {
            Transition::Selected(id) => self.enter_selected(id, fx),
            Transition::Unselected(id) => Self::enter_unselected(id, fx),
        }
    }

    fn enter_selected<S: Stage>(&mut self, id: PointId, fx: &mut Fx<'_, S>) {
        let points = fx.points;
        let config = fx.config;
        let Some(point) = points.get(id) else {
            return;
        };

        fx.fade_out_group(config.fade_duration, |epoch| Job::ShowPointContent { point: id, epoch });

        // Selection overrides any pulse in flight
        fx.stop(&point.ring, false);
        let selected_color = config.selected_point_color;
        fx.css(&point.dot, |style| style.background = Some(selected_color));
        let ring = ring_expanded_style(point, config.radius, marker::SELECTED_RING_OPACITY, Some(selected_color));
        fx.css(&point.ring, |style| *style = ring.clone());

        if let Some(callback) = self.on_select.as_mut() {
            callback(&SelectedPoint::from(point));
        }
    }

    fn enter_unselected<S: Stage>(id: PointId, fx: &mut Fx<'_, S>) {
        let points = fx.points;
        let config = fx.config;
        let Some(point) = points.get(id) else {
            return;
        };

        fx.fade_out_group(
            config.fade_duration * timing::UNSELECT_FADE_FACTOR,
            |epoch| Job::ShowDefaultContent { epoch },
        );
        fx.animate(
            &point.ring,
            Motion::Animate(Props::opacity(0.0)),
            config.fade_duration,
            Some(Job::RingFaded { point: id }),
        );
    }

    /// Selection fade finished: show the point's content unless a newer swap started
    pub fn show_point_content<S: Stage>(&self, id: PointId, epoch: u64, fx: &mut Fx<'_, S>) {
        if epoch != fx.content.epoch() {
            debug!(point = id, epoch = epoch, "Stale content swap dropped");
            return;
        }
        let points = fx.points;
        let duration = fx.config.fade_duration;
        if let Some(content_id) = points.get(id).and_then(|point| point.content_id.as_deref()) {
            fx.fade_in(content_id, duration);
        }
    }

    /// Unselect fade finished: show default content if still unselected
    pub fn show_default_content<S: Stage>(&self, epoch: u64, fx: &mut Fx<'_, S>) {
        if self.state != SelectionState::Unselected || epoch != fx.content.epoch() {
            debug!(epoch = epoch, state = ?self.state, "Default content stays hidden");
            return;
        }
        let Some(default_content) = fx.content.default_content().map(str::to_string) else {
            return;
        };
        let duration = fx.config.fade_duration;
        fx.fade_in(&default_content, duration);
    }

    /// Ring fade after an unselect finished: restore the resting color
    pub fn restore_marker_color<S: Stage>(&self, id: PointId, fx: &mut Fx<'_, S>) {
        let points = fx.points;
        let Some(point) = points.get(id) else {
            return;
        };
        let color = fx.config.point_color;
        fx.css(&point.dot, |style| style.background = Some(color));
        fx.css(&point.ring, |style| style.background = Some(color));
    }
}
