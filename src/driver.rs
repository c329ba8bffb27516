//! Live driver: pointer events from a line reader, timeline on the wall clock

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::constants::timing;
use crate::stage::HeadlessStage;
use crate::trace::{PointerEvent, dispatch};
use crate::types::Millis;
use crate::widget::Widget;

/// Drive a headless widget until the input ends or Ctrl-C
///
/// Each input line is one `PointerEvent` as JSON, timestamped on arrival
/// relative to `mounted_at` on the widget's clock. Returns the document
/// snapshot taken just before the widget is torn down.
pub async fn run_live<R>(
    widget: &mut Widget<HeadlessStage>,
    input: R,
    mounted_at: Millis,
) -> Result<serde_json::Value>
where
    R: AsyncBufRead + Unpin,
{
    let start = Instant::now();
    let now = move || mounted_at.saturating_add(start.elapsed().as_millis() as Millis);

    let mut lines = input.lines();
    let mut frames = time::interval(Duration::from_millis(timing::FRAME_INTERVAL_MS));
    frames.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!("Live driver started");

    loop {
        let deadline = widget
            .next_deadline()
            .map(|at| start + Duration::from_millis(at.saturating_sub(mounted_at)));
        let wake = async {
            match deadline {
                Some(deadline) => time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read pointer events")? else {
                    debug!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<PointerEvent>(&line) {
                    Ok(event) => {
                        if let Some(transition) = dispatch(widget, now(), event) {
                            info!(transition = ?transition, "Transition");
                        }
                    }
                    Err(e) => warn!(line = %line, error = %e, "Ignoring malformed pointer event"),
                }
            }
            _ = wake => widget.advance_to(now()),
            _ = frames.tick() => widget.render_frame(now()),
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
        }
    }

    widget.advance_to(now());
    let snapshot = widget.stage().snapshot();
    widget.teardown();
    Ok(snapshot)
}
