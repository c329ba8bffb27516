//! Effect context shared by the selection controller and the pulse scheduler
//!
//! `Fx` borrows the widget's animator, timeline, content group and stage for
//! the duration of one event so effects can restyle elements, queue tweens and
//! schedule follow-up jobs, with every style change pushed to the stage.

use tracing::trace;

use crate::animation::{Animator, Motion};
use crate::config::WidgetConfig;
use crate::registry::PointSet;
use crate::stage::{Stage, Style};
use crate::timeline::Timeline;
use crate::types::{Millis, PointId};

/// Deferred work, resumed from the timeline or from a finished tween
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Group fade after a selection finished; show the point's content
    ShowPointContent { point: PointId, epoch: u64 },
    /// Group fade after an unselect finished; show default content
    ShowDefaultContent { epoch: u64 },
    /// Ring faded out after an unselect; restore marker colors
    RingFaded { point: PointId },
    /// A ring pulse finished; reset the ring
    PulseSettled { point: PointId },
    /// Next pulse
    PulseTick,
}

/// Content elements toggled by one widget, default content first
#[derive(Debug, Clone, Default)]
pub struct ContentGroup {
    members: Vec<String>,
    default_content: Option<String>,
    epoch: u64,
}

impl ContentGroup {
    pub fn new(default_content: Option<String>, points: &PointSet) -> Self {
        let mut members: Vec<String> = default_content.iter().cloned().collect();
        for content_id in points.iter().filter_map(|point| point.content_id.as_ref()) {
            if !members.contains(content_id) {
                members.push(content_id.clone());
            }
        }
        Self {
            members,
            default_content,
            epoch: 0,
        }
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn default_content(&self) -> Option<&str> {
        self.default_content.as_deref()
    }

    /// Generation of the latest content swap
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

pub struct Fx<'a, S: Stage> {
    pub now: Millis,
    pub stage: &'a mut S,
    pub animator: &'a mut Animator<Job>,
    pub timeline: &'a mut Timeline<Job>,
    pub content: &'a mut ContentGroup,
    pub config: &'a WidgetConfig,
    pub points: &'a PointSet,
}

impl<S: Stage> Fx<'_, S> {
    /// Push an element's committed style to the stage
    pub fn render(&mut self, element_id: &str) {
        if let Some(style) = self.animator.style(element_id) {
            self.stage.apply_style(element_id, style);
        }
    }

    pub fn css(&mut self, element_id: &str, change: impl Fn(&mut Style)) {
        self.animator.css(element_id, change);
        self.render(element_id);
    }

    pub fn animate(&mut self, element_id: &str, motion: Motion, duration: Millis, on_done: Option<Job>) {
        self.animator.enqueue(self.now, element_id, motion, duration, on_done);
        self.render(element_id);
    }

    pub fn stop(&mut self, element_id: &str, jump_to_end: bool) {
        self.animator.stop(self.now, element_id, jump_to_end);
        self.render(element_id);
    }

    pub fn schedule(&mut self, delay: Millis, job: Job) {
        self.timeline.schedule(self.now.saturating_add(delay), job);
    }

    fn is_tracked_displayed(&self, element_id: &str) -> bool {
        self.animator
            .style(element_id)
            .is_some_and(|style| style.displayed)
    }

    /// Whether a content element is showing on the stage right now
    ///
    /// The host may show or hide group members behind the widget's back. An
    /// idle track is re-seeded from the stage so the next tween starts from
    /// what is actually on screen.
    pub fn sync_display(&mut self, element_id: &str) -> bool {
        let Some(shown) = self.stage.content_display(element_id) else {
            return false;
        };
        if shown != self.is_tracked_displayed(element_id) && !self.animator.is_animating(element_id) {
            trace!(element = %element_id, shown = shown, "Content display changed by host");
            self.animator.css(element_id, |style| {
                style.displayed = shown;
                style.opacity = 1.0;
            });
        }
        shown
    }

    /// Fade out every displayed group member and schedule `then` for when the
    /// fade is over
    ///
    /// Each call starts a new content swap; the job carries its epoch so a
    /// completion from an older swap can be recognized and dropped.
    pub fn fade_out_group(&mut self, duration: Millis, then: impl FnOnce(u64) -> Job) {
        self.content.epoch += 1;
        let epoch = self.content.epoch;

        let members = self.content.members.clone();
        let visible: Vec<String> = members
            .into_iter()
            .filter(|id| self.sync_display(id))
            .collect();
        trace!(epoch = epoch, visible = ?visible, duration = duration, "Fading out content group");

        for element_id in &visible {
            self.stop(element_id, true);
            self.animate(element_id, Motion::FadeOut, duration, None);
        }
        self.schedule(duration, then(epoch));
    }

    pub fn fade_in(&mut self, element_id: &str, duration: Millis) {
        self.sync_display(element_id);
        self.animate(element_id, Motion::FadeIn, duration, None);
    }
}
