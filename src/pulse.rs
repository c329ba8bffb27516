//! Round-robin ring pulse over unselected points

use tracing::trace;

use crate::animation::{Motion, Props};
use crate::constants::timing;
use crate::fx::{Fx, Job};
use crate::registry::ring_rest_style;
use crate::selection::SelectionController;
use crate::stage::Stage;
use crate::types::PointId;

/// Cursor over the point set, advanced once per tick
#[derive(Debug, Clone)]
pub struct PulseScheduler {
    cursor: PointId,
    total: usize,
    running: bool,
}

impl PulseScheduler {
    pub fn new(total: usize) -> Self {
        Self {
            cursor: 0,
            total,
            running: false,
        }
    }

    /// Point the next tick will pulse
    pub fn cursor(&self) -> PointId {
        self.cursor
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Schedule the first tick right away; nothing to pulse means no loop
    pub fn start<S: Stage>(&mut self, fx: &mut Fx<'_, S>) {
        if self.total == 0 || self.running {
            return;
        }
        self.running = true;
        fx.schedule(0, Job::PulseTick);
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advance the cursor, wrapping after the last point
    fn advance(&mut self) {
        self.cursor = if self.cursor + 1 >= self.total { 0 } else { self.cursor + 1 };
    }

    /// Pulse the cursor point unless it is selected, advance, reschedule
    ///
    /// Returns the point that was pulsed, if any.
    pub fn tick<S: Stage>(&mut self, selection: &SelectionController, fx: &mut Fx<'_, S>) -> Option<PointId> {
        if !self.running {
            return None;
        }
        let points = fx.points;
        let radius = fx.config.radius;
        let id = self.cursor;

        let pulsed = match points.get(id) {
            Some(point) if !selection.is_selected(id) => {
                // keep at most one pulse waiting behind the running one
                if fx.animator.queued(&point.ring) == 0 {
                    let grown = Props {
                        left: Some(point.x - radius),
                        top: Some(point.y - radius),
                        width: Some(radius * 2.0),
                        height: Some(radius * 2.0),
                        opacity: Some(0.0),
                    };
                    fx.animate(
                        &point.ring,
                        Motion::Animate(grown),
                        timing::PULSE_DURATION_MS,
                        Some(Job::PulseSettled { point: id }),
                    );
                }
                Some(id)
            }
            _ => {
                trace!(point = id, "Skipping pulse for selected point");
                None
            }
        };

        self.advance();
        fx.schedule(timing::PULSE_INTERVAL_MS, Job::PulseTick);
        pulsed
    }

    /// Pulse finished: collapse the ring again unless its point got selected
    pub fn settle<S: Stage>(&self, id: PointId, selection: &SelectionController, fx: &mut Fx<'_, S>) {
        if selection.is_selected(id) {
            return;
        }
        let points = fx.points;
        let Some(point) = points.get(id) else {
            return;
        };
        let rest = ring_rest_style(point, fx.config.point_color);
        fx.css(&point.ring, |style| {
            let background = style.background;
            *style = rest.clone();
            style.background = background;
        });
    }
}
