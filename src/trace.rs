//! Pointer traces and deterministic replay
//!
//! A trace is a list of timestamped pointer events, either a JSON array or
//! one JSON object per line:
//!
//! ```json
//! {"at": 0, "kind": "enter"}
//! {"at": 120, "kind": "move", "x": 150, "y": 150}
//! {"at": 900, "kind": "scroll", "top": 40, "left": 100}
//! ```

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use tracing::{info, warn};

use crate::config::Scene;
use crate::constants::timing;
use crate::registry::SelectedPoint;
use crate::selection::{SelectionState, Transition};
use crate::stage::HeadlessStage;
use crate::types::{Millis, Offset, PagePosition};
use crate::widget::Widget;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    /// Pointer entered the container
    Enter,
    /// Pointer moved to a page position
    Move { x: f64, y: f64 },
    /// The container moved on the page (scroll, relayout)
    Scroll { top: f64, left: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub at: Millis,
    #[serde(flatten)]
    pub event: PointerEvent,
}

/// Parse a trace from a JSON array or JSON lines, sorted by time
pub fn parse_trace(contents: &str) -> Result<Vec<TimedEvent>> {
    let mut events: Vec<TimedEvent> = if contents.trim_start().starts_with('[') {
        serde_json::from_str(contents).context("Failed to parse trace array")?
    } else {
        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(number, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Failed to parse trace line {}", number + 1))
            })
            .collect::<Result<_>>()?
    };

    if events.windows(2).any(|pair| pair[0].at > pair[1].at) {
        warn!("Trace events out of order, sorting by timestamp");
        events.sort_by_key(|event| event.at);
    }
    Ok(events)
}

pub fn load_trace(path: &Path) -> Result<Vec<TimedEvent>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read trace file {}", path.display()))?;
    parse_trace(&contents).with_context(|| format!("Invalid trace file {}", path.display()))
}

/// Feed one pointer event into a headless widget
pub fn dispatch(widget: &mut Widget<HeadlessStage>, at: Millis, event: PointerEvent) -> Option<Transition> {
    match event {
        PointerEvent::Enter => {
            widget.pointer_enter(at);
            None
        }
        PointerEvent::Move { x, y } => widget.pointer_move(at, PagePosition::new(x, y)),
        PointerEvent::Scroll { top, left } => {
            widget.advance_to(at);
            widget.stage_mut().set_offset(Offset::new(top, left));
            None
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimedTransition {
    pub at: Millis,
    #[serde(flatten)]
    pub transition: Transition,
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub transitions: Vec<TimedTransition>,
    pub selections: Vec<SelectedPoint>,
    pub final_state: SelectionState,
    pub finished_at: Millis,
    pub document: serde_json::Value,
}

/// Reject quiet stretches too long to simulate tick by tick
fn check_gaps(times: impl Iterator<Item = Millis>) -> Result<()> {
    let mut previous: Option<Millis> = None;
    for at in times {
        if let Some(before) = previous
            && at.saturating_sub(before) > timing::MAX_REPLAY_GAP_MS
        {
            bail!(
                "Gap of {} ms between {} and {} exceeds {} ms",
                at - before,
                before,
                at,
                timing::MAX_REPLAY_GAP_MS
            );
        }
        previous = Some(at);
    }
    Ok(())
}

/// Run a trace against a scene on a headless stage
///
/// The widget is mounted at the first event's timestamp, so traces may use
/// any clock origin. The clock is then advanced to the absolute time `until`
/// (or the last event) before reporting.
pub fn replay(scene: &Scene, events: &[TimedEvent], until: Option<Millis>) -> Result<ReplayReport> {
    let start = events.first().map_or(0, |event| event.at);
    let last = events.last().map_or(start, |event| event.at);
    let finished_at = until.unwrap_or(last).max(last);
    check_gaps(
        std::iter::once(start)
            .chain(events.iter().map(|event| event.at))
            .chain(std::iter::once(finished_at)),
    )?;

    let stage = HeadlessStage::from_document(&scene.document);
    let mut widget = Widget::new(&scene.widget, stage, start);

    let selections = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&selections);
    widget.on_select(move |point| sink.borrow_mut().push(point.clone()));

    let mut transitions = Vec::new();
    for event in events {
        if let Some(transition) = dispatch(&mut widget, event.at, event.event) {
            info!(at = event.at, transition = ?transition, "Transition");
            transitions.push(TimedTransition {
                at: event.at,
                transition,
            });
        }
    }
    widget.advance_to(finished_at);

    let selections = selections.borrow().clone();
    Ok(ReplayReport {
        transitions,
        selections,
        final_state: widget.selection_state(),
        finished_at,
        document: widget.stage().snapshot(),
    })
}
