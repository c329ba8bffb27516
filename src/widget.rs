//! Composition root: one widget per container
//!
//! The widget owns its stage and all per-instance state. Hosts feed it
//! pointer events and the current time; timed work (fades, pulses) runs when
//! the clock is advanced past its deadline, in timestamp order.

use tracing::{debug, info, trace};

use crate::animation::Animator;
use crate::config::{WidgetConfig, WidgetOptions};
use crate::fx::{ContentGroup, Fx, Job};
use crate::geometry::GeometryTracker;
use crate::pulse::PulseScheduler;
use crate::registry::{Namespace, PointSet, SelectedPoint, dot_style, register, ring_rest_style};
use crate::selection::{SelectionController, SelectionState, Transition};
use crate::stage::{Stage, Style};
use crate::timeline::Timeline;
use crate::types::{Millis, PagePosition};

pub struct Widget<S: Stage> {
    stage: S,
    config: WidgetConfig,
    namespace: Namespace,
    points: PointSet,
    geometry: GeometryTracker,
    selection: SelectionController,
    pulse: PulseScheduler,
    animator: Animator<Job>,
    timeline: Timeline<Job>,
    content: ContentGroup,
    clock: Millis,
    torn_down: bool,
}

impl<S: Stage> Widget<S> {
    /// Mount a widget on `stage` at time `now`
    pub fn new(options: &WidgetOptions, mut stage: S, now: Millis) -> Self {
        let config = options.build_widget_config();
        let namespace = Namespace::new(&config.instance);
        stage.make_positioned();

        let default_content = config.default_content_id.as_deref().and_then(|id| {
            if stage.content_display(id).is_some() {
                stage.tag_content(id, &namespace.content_class());
                Some(id.to_string())
            } else {
                debug!(default_content_id = %id, "Default content element not found");
                None
            }
        });

        let points = register(&options.points, &mut stage, &namespace, config.point_color);
        let content = ContentGroup::new(default_content, &points);

        let mut animator = Animator::new();
        for id in content.members() {
            let displayed = stage.content_display(id).unwrap_or(false);
            animator.insert(id, Style::content(displayed));
        }
        for point in points.iter() {
            animator.insert(&point.dot, dot_style(point, config.point_color));
            animator.insert(&point.ring, ring_rest_style(point, config.point_color));
        }

        let geometry = GeometryTracker::new(stage.page_offset(), config.radius, points.as_slice());
        let pulse = PulseScheduler::new(points.len());

        info!(
            instance = %namespace.instance(),
            points = points.len(),
            contents = content.members().len(),
            radius = config.radius,
            "Widget mounted"
        );

        let mut widget = Self {
            stage,
            config,
            namespace,
            points,
            geometry,
            selection: SelectionController::new(),
            pulse,
            animator,
            timeline: Timeline::new(),
            content,
            clock: now,
            torn_down: false,
        };
        let (mut fx, _, pulse) = widget.parts();
        pulse.start(&mut fx);
        widget
    }

    /// Register the callback fired on every selection
    pub fn on_select(&mut self, callback: impl FnMut(&SelectedPoint) + 'static) {
        self.selection.set_callback(Box::new(callback));
    }

    fn parts(&mut self) -> (Fx<'_, S>, &mut SelectionController, &mut PulseScheduler) {
        (
            Fx {
                now: self.clock,
                stage: &mut self.stage,
                animator: &mut self.animator,
                timeline: &mut self.timeline,
                content: &mut self.content,
                config: &self.config,
                points: &self.points,
            },
            &mut self.selection,
            &mut self.pulse,
        )
    }

    /// Pointer entered the container: re-measure its offset
    pub fn pointer_enter(&mut self, now: Millis) {
        if self.torn_down {
            return;
        }
        self.advance_to(now);
        let measured = self.stage.page_offset();
        self.geometry.refresh(measured, self.points.as_slice());
    }

    /// Pointer moved to a page position
    pub fn pointer_move(&mut self, now: Millis, position: PagePosition) -> Option<Transition> {
        if self.torn_down {
            return None;
        }
        self.advance_to(now);
        let transition = self.selection.on_pointer_move(position, &self.geometry)?;
        let (mut fx, selection, _) = self.parts();
        selection.apply(transition, &mut fx);
        Some(transition)
    }

    /// Run every fade completion, tween completion and pulse tick due by `now`
    pub fn advance_to(&mut self, now: Millis) {
        if now < self.clock {
            trace!(now = now, clock = self.clock, "Clock went backwards, ignoring");
            return;
        }
        loop {
            let tween_due = self.animator.next_deadline().filter(|at| *at <= now);
            let job_due = self.timeline.next_due().filter(|at| *at <= now);

            match (tween_due, job_due) {
                (Some(tween_at), job_at) if job_at.is_none_or(|job_at| tween_at <= job_at) => {
                    let Some(finished) = self.animator.pop_due(tween_at) else {
                        break;
                    };
                    self.clock = finished.at;
                    self.render(&finished.element_id);
                    if let Some(job) = finished.job {
                        self.run(job);
                    }
                    self.animator.resume(finished.at, &finished.element_id);
                    self.render(&finished.element_id);
                }
                (_, Some(job_at)) => {
                    let Some((at, job)) = self.timeline.pop_due(job_at) else {
                        break;
                    };
                    self.clock = at;
                    self.run(job);
                }
                _ => break,
            }
        }
        self.clock = now;
    }

    fn render(&mut self, element_id: &str) {
        if let Some(style) = self.animator.style(element_id) {
            self.stage.apply_style(element_id, style);
        }
    }

    fn run(&mut self, job: Job) {
        trace!(job = ?job, at = self.clock, "Running job");
        let (mut fx, selection, pulse) = self.parts();
        match job {
            Job::ShowPointContent { point, epoch } => selection.show_point_content(point, epoch, &mut fx),
            Job::ShowDefaultContent { epoch } => selection.show_default_content(epoch, &mut fx),
            Job::RingFaded { point } => selection.restore_marker_color(point, &mut fx),
            Job::PulseSettled { point } => pulse.settle(point, selection, &mut fx),
            Job::PulseTick => {
                pulse.tick(selection, &mut fx);
            }
        }
    }

    /// Push interpolated styles of running tweens to the stage
    pub fn render_frame(&mut self, now: Millis) {
        for (element_id, style) in self.animator.frame(now) {
            self.stage.apply_style(element_id, &style);
        }
    }

    /// Earliest time at which `advance_to` has work to do
    pub fn next_deadline(&self) -> Option<Millis> {
        match (self.animator.next_deadline(), self.timeline.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Stop the pulse loop, drop pending work and remove marker elements
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.pulse.stop();
        self.timeline.clear();
        self.animator.clear();
        for point in self.points.iter() {
            self.stage.remove_marker(&point.dot);
            self.stage.remove_marker(&point.ring);
        }
        info!(instance = %self.namespace.instance(), "Widget torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn selection_state(&self) -> SelectionState {
        self.selection.state()
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn geometry(&self) -> &GeometryTracker {
        &self.geometry
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn clock(&self) -> Millis {
        self.clock
    }

    pub fn pulse_cursor(&self) -> usize {
        self.pulse.cursor()
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::HexColor;
    use crate::config::RawPoint;
    use crate::stage::HeadlessStage;
    use crate::types::Offset;
    use std::cell::RefCell;
    use std::rc::Rc;

    const RED: HexColor = HexColor::rgb(0xDD, 0, 0);
    const GREEN: HexColor = HexColor::rgb(0x06, 0x99, 0);

    fn stage_with_contents() -> HeadlessStage {
        let mut stage = HeadlessStage::new(Offset::new(100.0, 100.0));
        stage.add_content("intro", true);
        stage.add_content("about", false);
        stage
    }

    fn options(points: Vec<RawPoint>) -> WidgetOptions {
        WidgetOptions {
            points,
            default_content_id: Some("intro".to_string()),
            instance: Some("test".to_string()),
            ..WidgetOptions::default()
        }
    }

    fn widget(points: Vec<RawPoint>) -> Widget<HeadlessStage> {
        Widget::new(&options(points), stage_with_contents(), 0)
    }

    fn at(x: f64, y: f64) -> PagePosition {
        PagePosition::new(x, y)
    }

    fn ring_style(widget: &Widget<HeadlessStage>, id: usize) -> Style {
        let ring = &widget.points().get(id).expect("point").ring;
        widget.stage().marker(ring).expect("ring").style.clone()
    }

    fn dot_style_of(widget: &Widget<HeadlessStage>, id: usize) -> Style {
        let dot = &widget.points().get(id).expect("point").dot;
        widget.stage().marker(dot).expect("dot").style.clone()
    }

    #[test]
    fn test_mount_tags_content_and_positions_container() {
        let widget = widget(vec![RawPoint::new(50.0, 50.0).with_content("about")]);
        let class = widget.namespace().content_class();
        let stage = widget.stage();
        assert!(stage.positioned);
        assert_eq!(stage.content("intro").map(|n| n.classes.clone()), Some(vec![class.clone()]));
        assert_eq!(stage.content("about").map(|n| n.classes.clone()), Some(vec![class]));
        assert_eq!(stage.markers.len(), 2);
        assert_eq!(widget.selection_state(), SelectionState::Unselected);
    }

    #[test]
    fn test_scenario_select_then_unselect() {
        let mut widget = widget(vec![RawPoint::new(50.0, 50.0)]);
        assert_eq!(
            widget.pointer_move(10, at(150.0, 150.0)),
            Some(Transition::Selected(0))
        );
        assert_eq!(widget.pointer_move(20, at(121.0, 150.0)), None);
        assert_eq!(
            widget.pointer_move(30, at(119.0, 150.0)),
            Some(Transition::Unselected(0))
        );
    }

    #[test]
    fn test_select_recolors_and_expands_ring() {
        let mut widget = widget(vec![RawPoint::new(50.0, 50.0)]);
        // first pulse starts at mount time
        widget.advance_to(100);
        assert!(widget.animator.is_animating(&widget.points().get(0).expect("point").ring));

        widget.pointer_move(100, at(150.0, 150.0));
        let ring = ring_style(&widget, 0);
        assert_eq!((ring.left, ring.top, ring.width, ring.height), (20.0, 20.0, 60.0, 60.0));
        assert_eq!(ring.opacity, 0.5);
        assert_eq!(ring.background, Some(GREEN));
        assert_eq!(dot_style_of(&widget, 0).background, Some(GREEN));

        // the interrupted pulse never resets the ring, later ticks skip it
        widget.advance_to(5000);
        let ring = ring_style(&widget, 0);
        assert_eq!(ring.opacity, 0.5);
        assert_eq!(ring.width, 60.0);
    }

    #[test]
    fn test_unselect_fades_ring_then_restores_color() {
        let mut widget = widget(vec![RawPoint::new(50.0, 50.0)]);
        widget.pointer_move(0, at(150.0, 150.0));
        widget.pointer_move(1000, at(10.0, 10.0));

        widget.advance_to(1100);
        assert_eq!(dot_style_of(&widget, 0).background, Some(GREEN));

        widget.advance_to(1250);
        assert_eq!(dot_style_of(&widget, 0).background, Some(RED));
        assert_eq!(ring_style(&widget, 0).background, Some(RED));
    }

    #[test]
    fn test_content_swap_on_select() {
        let mut widget = widget(vec![RawPoint::new(50.0, 50.0).with_content("about")]);
        widget.pointer_move(0, at(150.0, 150.0));

        // intro fading out, about not yet shown
        widget.advance_to(100);
        assert!(widget.stage().is_content_visible("intro"));
        assert!(!widget.stage().is_content_visible("about"));

        widget.advance_to(250);
        assert!(!widget.stage().is_content_visible("intro"));
        assert!(widget.stage().is_content_visible("about"));

        widget.advance_to(600);
        assert_eq!(widget.stage().visible_contents(), vec!["about"]);
        assert_eq!(widget.stage().content("about").map(|n| n.style.opacity), Some(1.0));
    }

    #[test]
    fn test_select_point_without_content_hides_default() {
        let mut widget = widget(vec![RawPoint::new(50.0, 50.0)]);
        assert!(widget.stage().is_content_visible("intro"));
        widget.pointer_move(0, at(150.0, 150.0));
        widget.advance_to(2000);
        assert!(widget.stage().visible_contents().is_empty());
    }

    #[test]
    fn test_unselect_restores_default_after_slow_fade() {
        let mut widget = widget(vec![RawPoint::new(50.0, 50.0).with_content("about")]);
        widget.pointer_move(0, at(150.0, 150.0));
        widget.advance_to(1000);
        assert_eq!(widget.stage().visible_contents(), vec!["about"]);

        widget.pointer_move(1000, at(10.0, 10.0));
        // unselect fade is four times the base duration
        widget.advance_to(1999);
        assert_eq!(widget.stage().visible_contents(), vec!["about"]);
        widget.advance_to(2000);
        assert_eq!(widget.stage().visible_contents(), vec!["intro"]);
        widget.advance_to(2250);
        assert_eq!(widget.stage().content("intro").map(|n| n.style.opacity), Some(1.0));
    }

    #[test]
    fn test_reselect_during_unselect_fade_keeps_default_hidden() {
        let mut widget = widget(vec![RawPoint::new(50.0, 50.0).with_content("about")]);
        widget.pointer_move(0, at(150.0, 150.0));
        widget.advance_to(1000);

        widget.pointer_move(1000, at(10.0, 10.0));
        assert_eq!(
            widget.pointer_move(1300, at(150.0, 150.0)),
            Some(Transition::Selected(0))
        );
        widget.advance_to(5000);
        assert_eq!(widget.stage().visible_contents(), vec!["about"]);
    }

    #[test]
    fn test_later_swap_wins_over_stale_completion() {
        let mut widget = widget(vec![
            RawPoint::new(50.0, 50.0).with_content("about"),
            RawPoint::new(300.0, 50.0),
        ]);
        // select 0, leave it, select 1 before 0's fade-in job fires
        widget.pointer_move(0, at(150.0, 150.0));
        widget.pointer_move(100, at(10.0, 10.0));
        widget.pointer_move(150, at(400.0, 150.0));
        assert_eq!(widget.selection_state(), SelectionState::Selected(1));

        widget.advance_to(5000);
        assert!(widget.stage().visible_contents().is_empty());
    }

    #[test]
    fn test_content_shown_by_host_is_faded_on_select() {
        let mut stage = stage_with_contents();
        stage.add_content("garden", false);
        let points = vec![
            RawPoint::new(50.0, 50.0).with_content("about"),
            RawPoint::new(300.0, 50.0).with_content("garden"),
        ];
        let mut widget = Widget::new(&options(points), stage, 0);

        widget.stage_mut().apply_style("about", &Style::content(true));
        assert_eq!(
            widget.pointer_move(10, at(400.0, 150.0)),
            Some(Transition::Selected(1))
        );
        widget.advance_to(3000);
        assert_eq!(widget.stage().visible_contents(), vec!["garden"]);
    }

    #[test]
    fn test_content_hidden_by_host_comes_back_on_unselect() {
        let mut widget = widget(vec![RawPoint::new(50.0, 50.0)]);
        widget.stage_mut().apply_style("intro", &Style::content(false));

        widget.pointer_move(0, at(150.0, 150.0));
        widget.pointer_move(100, at(10.0, 10.0));
        widget.advance_to(3000);
        assert_eq!(widget.stage().visible_contents(), vec!["intro"]);
        assert_eq!(widget.stage().content("intro").map(|n| n.style.opacity), Some(1.0));
    }

    #[test]
    fn test_missing_default_content_degrades() {
        let mut options = options(vec![RawPoint::new(50.0, 50.0)]);
        options.default_content_id = Some("nowhere".to_string());
        let mut widget = Widget::new(&options, stage_with_contents(), 0);
        widget.pointer_move(0, at(150.0, 150.0));
        widget.pointer_move(10, at(0.0, 0.0));
        widget.advance_to(5000);
        // content outside the group is never touched
        assert_eq!(widget.stage().visible_contents(), vec!["intro"]);
        assert!(widget.stage().content("intro").is_some_and(|n| n.classes.is_empty()));
    }

    #[test]
    fn test_callback_fires_once_per_selection() {
        let mut widget = widget(vec![RawPoint::new(50.0, 50.0).with_content("about")]);
        let seen: Rc<RefCell<Vec<SelectedPoint>>> = Rc::default();
        let sink = Rc::clone(&seen);
        widget.on_select(move |point| sink.borrow_mut().push(point.clone()));

        widget.pointer_move(0, at(150.0, 150.0));
        let writes = widget.stage().style_writes;
        for step in 1..10 {
            widget.pointer_move(step, at(150.0 + step as f64, 150.0));
        }
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(
            seen.borrow()[0],
            SelectedPoint { id: 0, x: 50.0, y: 50.0, content_id: Some("about".to_string()) }
        );
        // no restyle from the repeated hovers
        assert_eq!(widget.stage().style_writes, writes);
        assert_eq!(ring_style(&widget, 0).opacity, 0.5);
    }

    #[test]
    fn test_pulse_cycles_in_registry_order_and_skips_selected() {
        let mut widget = widget(vec![
            RawPoint::new(50.0, 50.0),
            RawPoint::new(300.0, 50.0),
            RawPoint::new(600.0, 50.0),
        ]);
        let rings: Vec<String> = widget.points().iter().map(|p| p.ring.clone()).collect();

        widget.advance_to(0);
        assert!(widget.animator.is_animating(&rings[0]));
        assert!(!widget.animator.is_animating(&rings[1]));
        assert_eq!(widget.pulse_cursor(), 1);

        // select point 1 before its turn
        widget.pointer_move(200, at(400.0, 150.0));
        assert_eq!(widget.selection_state(), SelectionState::Selected(1));

        widget.advance_to(400);
        assert!(!widget.animator.is_animating(&rings[1]));
        assert_eq!(widget.pulse_cursor(), 2);

        widget.advance_to(800);
        assert!(widget.animator.is_animating(&rings[2]));
        assert_eq!(widget.pulse_cursor(), 0);

        widget.advance_to(1200);
        assert_eq!(widget.pulse_cursor(), 1);

        let mut cursors = Vec::new();
        for tick in 4..10u64 {
            widget.advance_to(tick * 400);
            cursors.push(widget.pulse_cursor());
        }
        assert_eq!(cursors, vec![2, 0, 1, 2, 0, 1]);
        assert_eq!(ring_style(&widget, 1).opacity, 0.5);
    }

    #[test]
    fn test_pulse_resets_ring_after_cycle() {
        let mut widget = widget(vec![
            RawPoint::new(50.0, 50.0),
            RawPoint::new(300.0, 50.0),
            RawPoint::new(600.0, 50.0),
            RawPoint::new(900.0, 50.0),
        ]);
        // point 0 pulses at 0 and again at 1600; settled at 1400 in between
        widget.advance_to(1400);
        let ring = ring_style(&widget, 0);
        assert_eq!((ring.width, ring.height, ring.opacity), (0.0, 0.0, 1.0));
        assert_eq!((ring.left, ring.top), (50.0, 50.0));
    }

    #[test]
    fn test_pulse_queue_stays_bounded() {
        let mut widget = widget(vec![RawPoint::new(50.0, 50.0)]);
        widget.advance_to(60_000);
        let ring = widget.points().get(0).expect("point").ring.clone();
        assert!(widget.animator.queued(&ring) <= 1);
    }

    #[test]
    fn test_pointer_enter_recomputes_after_scroll() {
        let mut widget = widget(vec![RawPoint::new(50.0, 50.0)]);
        widget.stage_mut().set_offset(Offset::new(0.0, 0.0));

        // stale boxes until the pointer re-enters
        assert_eq!(widget.pointer_move(10, at(50.0, 50.0)), None);
        widget.pointer_enter(20);
        assert_eq!(widget.geometry().offset(), Offset::new(0.0, 0.0));
        assert_eq!(widget.pointer_move(30, at(50.0, 50.0)), Some(Transition::Selected(0)));
    }

    #[test]
    fn test_two_instances_do_not_collide() {
        let mut first = options(vec![RawPoint::new(1.0, 1.0)]);
        first.instance = Some("one".to_string());
        let mut second = options(vec![RawPoint::new(1.0, 1.0)]);
        second.instance = Some("two".to_string());

        let one = Widget::new(&first, stage_with_contents(), 0);
        let two = Widget::new(&second, one.stage().clone(), 0);
        let mut ids: Vec<&str> = two
            .stage()
            .markers
            .iter()
            .map(|node| node.element.element_id.as_str())
            .collect();
        assert_eq!(ids.len(), 4);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        assert_eq!(
            two.stage().content("intro").map(|n| n.classes.len()),
            Some(2)
        );
    }

    #[test]
    fn test_no_points_means_no_pulse() {
        let widget = widget(vec![RawPoint::new(-1.0, 5.0)]);
        assert!(widget.points().is_empty());
        assert_eq!(widget.next_deadline(), None);
    }

    #[test]
    fn test_teardown_stops_everything() {
        let mut widget = widget(vec![RawPoint::new(50.0, 50.0)]);
        widget.advance_to(100);
        widget.teardown();

        assert!(widget.is_torn_down());
        assert_eq!(widget.next_deadline(), None);
        assert!(widget.stage().markers.is_empty());
        assert_eq!(widget.pointer_move(200, at(150.0, 150.0)), None);
    }

    #[test]
    fn test_render_frame_pushes_interpolated_ring() {
        let mut widget = widget(vec![RawPoint::new(50.0, 50.0)]);
        widget.advance_to(0);
        widget.render_frame(700);
        let ring = ring_style(&widget, 0);
        assert!(ring.width > 0.0 && ring.width < 60.0);
        assert!(ring.opacity > 0.0 && ring.opacity < 1.0);
    }
}
